use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{FleetError, FleetResult, StorageError};
use crate::keys::{DEFAULT_WORD_COUNT, KeyProvider, generate_wallet_keys};
use crate::storage::Store;

use super::models::{
    ChildWallet, ChildrenDocument, MasterWallet, RegistryStats, WalletRecord, WalletsView,
};

/// Document holding the single master wallet record
pub const MASTER_DOCUMENT: &str = "master_wallet";

/// Document holding the full child wallet list
pub const CHILDREN_DOCUMENT: &str = "child_wallets";

/// Source of truth for wallet identity and membership.
///
/// Every mutation rewrites the complete child list so the stored document is
/// always a self-consistent snapshot.
#[derive(Debug)]
pub struct WalletRegistry<S: Store> {
    store: S,
    master: Option<MasterWallet>,
    children: Vec<ChildWallet>,
}

impl<S: Store> WalletRegistry<S> {
    /// Create an empty registry; call `initialize` or `reload` before use
    pub fn new(store: S) -> Self {
        Self {
            store,
            master: None,
            children: Vec::new(),
        }
    }

    /// Load stored wallets and create the master wallet if none exists yet
    pub async fn initialize<K: KeyProvider>(&mut self, keys: &K) -> FleetResult<&MasterWallet> {
        self.reload()?;

        let master = match self.master.take() {
            Some(master) => master,
            None => self.bootstrap_master(keys).await?,
        };

        info!(
            "Registry ready: master {} with {} child wallet(s)",
            master.address(),
            self.children.len()
        );
        Ok(self.master.insert(master))
    }

    async fn bootstrap_master<K: KeyProvider>(&self, keys: &K) -> FleetResult<MasterWallet> {
        let wallet_keys = generate_wallet_keys(keys, DEFAULT_WORD_COUNT)
            .await
            .map_err(|e| FleetError::Generation {
                wallet: "master wallet".to_string(),
                reason: e.to_string(),
            })?;

        let master = MasterWallet::new(wallet_keys);
        let doc = serde_json::to_value(WalletRecord::Master(master.clone()))
            .map_err(StorageError::from)?;
        self.store.save(MASTER_DOCUMENT, &doc)?;

        info!("Created master wallet {}", master.address());
        Ok(master)
    }

    /// Replace in-memory state with what is currently stored
    pub fn reload(&mut self) -> Result<(), StorageError> {
        self.master = self.load_master()?;
        self.children = self.load_children()?;
        Ok(())
    }

    fn load_master(&self) -> Result<Option<MasterWallet>, StorageError> {
        let Some(doc) = self.store.load(MASTER_DOCUMENT)? else {
            return Ok(None);
        };

        match serde_json::from_value::<WalletRecord>(doc) {
            Ok(WalletRecord::Master(master)) => Ok(Some(master)),
            Ok(WalletRecord::Child(_)) => Err(StorageError::Malformed {
                name: MASTER_DOCUMENT.to_string(),
                reason: "holds a child wallet record".to_string(),
            }),
            Err(e) => Err(StorageError::Malformed {
                name: MASTER_DOCUMENT.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn load_children(&self) -> Result<Vec<ChildWallet>, StorageError> {
        let doc = match self.store.load(CHILDREN_DOCUMENT) {
            Ok(Some(doc)) => doc,
            Ok(None) => return Ok(Vec::new()),
            Err(StorageError::Json(e)) => {
                warn!("Child wallet list is not valid JSON, starting empty: {}", e);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        match parse_children(doc) {
            Ok(children) => Ok(children),
            Err(reason) => {
                warn!("Child wallet list is malformed, starting empty: {}", reason);
                Ok(Vec::new())
            }
        }
    }

    /// Append new child wallets in order and persist the full list.
    ///
    /// Indices must continue strictly upwards from the current last child.
    /// When persisting fails the in-memory list may already contain the new
    /// records; reload before retrying.
    pub fn add_children(&mut self, records: Vec<ChildWallet>) -> FleetResult<()> {
        let mut last = self.children.last().map_or(0, ChildWallet::index);
        for record in &records {
            if record.index() <= last {
                return Err(FleetError::precondition(format!(
                    "child index {} does not follow {}",
                    record.index(),
                    last
                )));
            }
            last = record.index();
        }

        self.children.extend(records);
        self.persist_children()?;
        Ok(())
    }

    /// Write the complete child list to the store
    pub fn persist_children(&self) -> Result<(), StorageError> {
        let doc = ChildrenDocument {
            children: self
                .children
                .iter()
                .cloned()
                .map(WalletRecord::Child)
                .collect(),
            last_updated: Utc::now(),
            total_count: self.children.len(),
        };
        self.store
            .save(CHILDREN_DOCUMENT, &serde_json::to_value(doc)?)?;
        Ok(())
    }

    pub fn master(&self) -> Option<&MasterWallet> {
        self.master.as_ref()
    }

    pub fn children(&self) -> &[ChildWallet] {
        &self.children
    }

    /// Balances are the only mutable part of a child record
    pub(crate) fn children_mut(&mut self) -> &mut [ChildWallet] {
        &mut self.children
    }

    /// Index the next created child wallet receives
    pub fn next_child_index(&self) -> u32 {
        self.children
            .iter()
            .map(ChildWallet::index)
            .max()
            .unwrap_or(0)
            + 1
    }

    pub fn all_wallets(&self) -> WalletsView<'_> {
        WalletsView {
            master: self.master.as_ref(),
            children: &self.children,
            total_children: self.children.len(),
        }
    }

    pub fn stats(&self) -> RegistryStats {
        let has_master = self.master.is_some();
        RegistryStats {
            has_master,
            total_children: self.children.len(),
            total_wallets: self.children.len() + usize::from(has_master),
        }
    }
}

fn parse_children(doc: Value) -> Result<Vec<ChildWallet>, String> {
    let doc: ChildrenDocument = serde_json::from_value(doc).map_err(|e| e.to_string())?;

    doc.children
        .into_iter()
        .map(|record| match record {
            WalletRecord::Child(child) => Ok(child),
            WalletRecord::Master(_) => Err("master wallet found in child list".to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FileStore;
    use crate::testing::{MemoryStore, MockKeyProvider};
    use crate::wallets::models::WalletKeys;
    use serde_json::json;
    use tempfile::TempDir;

    fn child(index: u32) -> ChildWallet {
        let keys = WalletKeys {
            address: format!("0:child{}", index),
            mnemonic: vec!["word".to_string(); 24],
            public_key: format!("pub{}", index),
            private_key: format!("priv{}", index),
            workchain: 0,
        };
        ChildWallet::new(index, keys, Utc::now())
    }

    #[tokio::test]
    async fn test_initialize_bootstraps_master_once() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let keys = MockKeyProvider::new();

        let mut registry = WalletRegistry::new(store.clone());
        let address = registry.initialize(&keys).await?.address().to_string();

        let mut reopened = WalletRegistry::new(store);
        let reloaded = reopened.initialize(&keys).await?.address().to_string();

        assert_eq!(address, reloaded);
        assert_eq!(keys.generated(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_initialize_fails_when_store_unreadable() {
        let store = MemoryStore::new();
        store.fail_loads(true);
        let mut registry = WalletRegistry::new(store);

        let err = registry.initialize(&MockKeyProvider::new()).await.unwrap_err();
        assert!(matches!(err, FleetError::Storage(_)));
    }

    #[tokio::test]
    async fn test_malformed_master_is_fatal() {
        let store = MemoryStore::new();
        store.insert(MASTER_DOCUMENT, json!({ "kind": "master", "id": 12 }));
        let mut registry = WalletRegistry::new(store);

        let err = registry.initialize(&MockKeyProvider::new()).await.unwrap_err();
        assert!(matches!(
            err,
            FleetError::Storage(StorageError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_children_reset_to_empty() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store.insert(CHILDREN_DOCUMENT, json!({ "children": "oops" }));
        let mut registry = WalletRegistry::new(store);

        registry.initialize(&MockKeyProvider::new()).await?;
        assert!(registry.children().is_empty());
        Ok(())
    }

    #[test]
    fn test_corrupt_children_file_resets_to_empty() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        std::fs::write(dir.path().join("child_wallets.json"), "[[[")?;
        let mut registry = WalletRegistry::new(FileStore::new(dir.path())?);

        registry.reload()?;
        assert!(registry.children().is_empty());
        Ok(())
    }

    #[test]
    fn test_children_file_with_invalid_utf8_resets_to_empty() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        std::fs::write(dir.path().join("child_wallets.json"), [0xff, 0xfe, b'{'])?;
        let mut registry = WalletRegistry::new(FileStore::new(dir.path())?);

        registry.reload()?;
        assert!(registry.children().is_empty());
        assert_eq!(registry.next_child_index(), 1);
        Ok(())
    }

    #[test]
    fn test_add_children_round_trips_through_store() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let store = FileStore::new(dir.path())?;

        let mut registry = WalletRegistry::new(store.clone());
        registry.add_children(vec![child(1), child(2), child(3)])?;

        let mut reloaded = WalletRegistry::new(store);
        reloaded.reload()?;

        assert_eq!(reloaded.children(), registry.children());
        assert_eq!(reloaded.next_child_index(), 4);

        let doc = FileStore::new(dir.path())?.load(CHILDREN_DOCUMENT)?.unwrap();
        assert_eq!(doc["totalCount"], 3);
        assert_eq!(doc["children"][0]["kind"], "child");
        Ok(())
    }

    #[test]
    fn test_add_children_rejects_reused_index() -> anyhow::Result<()> {
        let mut registry = WalletRegistry::new(MemoryStore::new());
        registry.add_children(vec![child(1), child(2)])?;

        assert!(registry.add_children(vec![child(2)]).is_err());
        assert!(registry.add_children(vec![child(4), child(3)]).is_err());
        assert_eq!(registry.children().len(), 2);
        Ok(())
    }

    #[test]
    fn test_add_children_surfaces_storage_failure() {
        let store = MemoryStore::new();
        store.fail_saves(true);
        let mut registry = WalletRegistry::new(store);

        let err = registry.add_children(vec![child(1)]).unwrap_err();
        assert!(matches!(err, FleetError::Storage(_)));
    }

    #[tokio::test]
    async fn test_stats_and_snapshot() -> anyhow::Result<()> {
        let mut registry = WalletRegistry::new(MemoryStore::new());
        assert!(!registry.stats().has_master);

        registry.initialize(&MockKeyProvider::new()).await?;
        registry.add_children(vec![child(1), child(2)])?;

        let stats = registry.stats();
        assert!(stats.has_master);
        assert_eq!(stats.total_children, 2);
        assert_eq!(stats.total_wallets, 3);

        let view = registry.all_wallets();
        assert_eq!(view.total_children, 2);
        assert!(view.master.is_some());
        Ok(())
    }
}
