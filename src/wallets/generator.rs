use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{FleetError, FleetResult};
use crate::keys::{KeyProvider, generate_wallet_keys};
use crate::storage::Store;

use super::config::GeneratorConfig;
use super::models::ChildWallet;
use super::registry::WalletRegistry;

/// Progress snapshot delivered after each completed group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchProgress {
    pub completed: u32,
    pub total: u32,
    pub group: usize,
    pub groups: usize,
}

impl BatchProgress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.completed as f64 / self.total as f64) * 100.0
    }
}

/// Creates child wallets in fixed-size concurrent groups
pub struct BatchGenerator<K: KeyProvider> {
    keys: K,
    config: GeneratorConfig,
}

impl<K: KeyProvider> BatchGenerator<K> {
    pub fn new(keys: K, config: GeneratorConfig) -> Self {
        Self { keys, config }
    }

    pub fn key_provider(&self) -> &K {
        &self.keys
    }

    /// Generate `count` child wallets and append them to the registry.
    ///
    /// The whole index range is reserved before any generation starts. Groups
    /// run one after another, wallets inside a group run concurrently. A single
    /// failure aborts the call and nothing is persisted.
    pub async fn create_many<S, F>(
        &self,
        registry: &mut WalletRegistry<S>,
        count: u32,
        mut on_progress: F,
    ) -> FleetResult<Vec<ChildWallet>>
    where
        S: Store,
        F: FnMut(BatchProgress),
    {
        if count == 0 {
            return Err(FleetError::precondition(
                "wallet count must be a positive integer",
            ));
        }

        registry.reload()?;

        let first = registry.next_child_index();
        let last = first
            .checked_add(count - 1)
            .ok_or_else(|| FleetError::precondition("child index space exhausted"))?;
        let indices: Vec<u32> = (first..=last).collect();

        let batch_size = self.config.batch_size.max(1);
        let groups = indices.len().div_ceil(batch_size);
        let created_at = Utc::now();

        info!(
            "Generating {} child wallet(s) #{}..#{} in {} group(s) of up to {}",
            count, first, last, groups, batch_size
        );

        let mut records = Vec::with_capacity(indices.len());
        for (group, chunk) in indices.chunks(batch_size).enumerate() {
            // Every wallet in the group runs to completion before a failure is reported.
            let generated = join_all(
                chunk
                    .iter()
                    .map(|&index| self.generate_child(index, created_at)),
            )
            .await;
            let generated = generated.into_iter().collect::<FleetResult<Vec<_>>>()?;
            records.extend(generated);

            let progress = BatchProgress {
                completed: records.len() as u32,
                total: count,
                group: group + 1,
                groups,
            };
            info!(
                "Group {}/{} done ({}/{} wallets)",
                progress.group, progress.groups, progress.completed, progress.total
            );
            on_progress(progress);
        }

        registry.add_children(records.clone())?;
        info!("Stored {} new child wallet(s)", records.len());

        Ok(records)
    }

    async fn generate_child(&self, index: u32, created_at: DateTime<Utc>) -> FleetResult<ChildWallet> {
        let keys = generate_wallet_keys(&self.keys, self.config.word_count)
            .await
            .map_err(|e| FleetError::Generation {
                wallet: format!("child #{}", index),
                reason: e.to_string(),
            })?;

        Ok(ChildWallet::new(index, keys, created_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryStore, MockKeyProvider};
    use std::collections::HashSet;

    fn generator(keys: MockKeyProvider) -> BatchGenerator<MockKeyProvider> {
        BatchGenerator::new(keys, GeneratorConfig::new())
    }

    #[tokio::test]
    async fn test_create_many_runs_in_groups() -> anyhow::Result<()> {
        let generator = generator(MockKeyProvider::new());
        let mut registry = WalletRegistry::new(MemoryStore::new());
        let mut progress = Vec::new();

        let created = generator
            .create_many(&mut registry, 25, |p| progress.push(p))
            .await?;

        let completed: Vec<u32> = progress.iter().map(|p| p.completed).collect();
        assert_eq!(completed, vec![10, 20, 25]);
        assert!(progress.iter().all(|p| p.groups == 3));
        assert_eq!(progress.last().map(BatchProgress::percent), Some(100.0));

        let indices: Vec<u32> = created.iter().map(ChildWallet::index).collect();
        assert_eq!(indices, (1..=25).collect::<Vec<_>>());
        assert_eq!(registry.children().len(), 25);
        assert_eq!(generator.key_provider().max_in_flight(), 10);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_many_continues_indices_and_ids_stay_unique() -> anyhow::Result<()> {
        let generator = generator(MockKeyProvider::new());
        let store = MemoryStore::new();
        let mut registry = WalletRegistry::new(store.clone());

        generator.create_many(&mut registry, 4, |_| {}).await?;
        let second = generator.create_many(&mut registry, 3, |_| {}).await?;

        let indices: Vec<u32> = second.iter().map(ChildWallet::index).collect();
        assert_eq!(indices, vec![5, 6, 7]);

        let mut reloaded = WalletRegistry::new(store);
        reloaded.reload()?;
        let ids: HashSet<&str> = reloaded.children().iter().map(ChildWallet::id).collect();
        let addresses: HashSet<&str> = reloaded
            .children()
            .iter()
            .map(ChildWallet::address)
            .collect();
        assert_eq!(ids.len(), 7);
        assert_eq!(addresses.len(), 7);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_zero_is_rejected() {
        let generator = generator(MockKeyProvider::new());
        let mut registry = WalletRegistry::new(MemoryStore::new());

        let err = generator
            .create_many(&mut registry, 0, |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, FleetError::Precondition(_)));
    }

    #[tokio::test]
    async fn test_failure_mid_batch_commits_nothing() -> anyhow::Result<()> {
        let generator = generator(MockKeyProvider::failing_on(13));
        let store = MemoryStore::new();
        let mut registry = WalletRegistry::new(store.clone());
        let mut groups_done = 0;

        let err = generator
            .create_many(&mut registry, 25, |_| groups_done += 1)
            .await
            .unwrap_err();

        assert!(matches!(err, FleetError::Generation { ref wallet, .. } if wallet == "child #13"));
        assert_eq!(groups_done, 1);
        assert!(registry.children().is_empty());
        assert!(store.load(crate::wallets::CHILDREN_DOCUMENT)?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_group_failure_lets_siblings_finish() -> anyhow::Result<()> {
        let generator = generator(MockKeyProvider::failing_on(11));
        let store = MemoryStore::new();
        let mut registry = WalletRegistry::new(store.clone());

        let err = generator
            .create_many(&mut registry, 20, |_| {})
            .await
            .unwrap_err();

        assert!(matches!(err, FleetError::Generation { ref wallet, .. } if wallet == "child #11"));
        assert_eq!(generator.key_provider().generated(), 20);
        assert_eq!(generator.key_provider().completed(), 19);
        assert!(registry.children().is_empty());
        assert!(store.load(crate::wallets::CHILDREN_DOCUMENT)?.is_none());
        Ok(())
    }
}
