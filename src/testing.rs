//! In-memory collaborators shared by the unit tests.

use anyhow::{Result, anyhow};
use bigdecimal::BigDecimal;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::chain::{ChainClient, TransferReceipt};
use crate::error::StorageError;
use crate::keys::{KeyPair, KeyProvider};
use crate::storage::Store;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    docs: Arc<Mutex<HashMap<String, Value>>>,
    fail_loads: Arc<AtomicBool>,
    fail_saves: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn insert(&self, name: &str, doc: Value) {
        self.docs.lock().unwrap().insert(name.to_string(), doc);
    }

    pub fn names_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.docs
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn io_error() -> StorageError {
        StorageError::Io(std::io::Error::other("store offline"))
    }
}

impl Store for MemoryStore {
    fn load(&self, name: &str) -> Result<Option<Value>, StorageError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(Self::io_error());
        }
        Ok(self.docs.lock().unwrap().get(name).cloned())
    }

    fn save(&self, name: &str, doc: &Value) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Self::io_error());
        }
        self.docs
            .lock()
            .unwrap()
            .insert(name.to_string(), doc.clone());
        Ok(())
    }

    fn save_new(&self, name: &str, doc: &Value) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Self::io_error());
        }
        let mut docs = self.docs.lock().unwrap();
        if docs.contains_key(name) {
            return Err(StorageError::AlreadyExists(name.to_string()));
        }
        docs.insert(name.to_string(), doc.clone());
        Ok(())
    }
}

/// Seeds stay unique across provider instances so addresses never collide
static NEXT_SEED: AtomicU32 = AtomicU32::new(1);

/// Key provider that can be told to fail on the n-th wallet
#[derive(Debug, Default)]
pub struct MockKeyProvider {
    generated: AtomicU32,
    completed: AtomicU32,
    fail_on_call: Option<u32>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockKeyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(call: u32) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::default()
        }
    }

    pub fn generated(&self) -> u32 {
        self.generated.load(Ordering::SeqCst)
    }

    /// Wallets whose address was computed
    pub fn completed(&self) -> u32 {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl KeyProvider for MockKeyProvider {
    async fn generate_mnemonic(&self, word_count: usize) -> Result<Vec<String>> {
        let call = self.generated.fetch_add(1, Ordering::SeqCst) + 1;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_on_call == Some(call) {
            return Err(anyhow!("entropy source exhausted"));
        }
        let seed = NEXT_SEED.fetch_add(1, Ordering::SeqCst);
        Ok((0..word_count).map(|i| format!("w{}x{}", seed, i)).collect())
    }

    async fn derive_key_pair(&self, mnemonic: &[String]) -> Result<KeyPair> {
        let seed = mnemonic.first().cloned().unwrap_or_default();
        Ok(KeyPair {
            public_key: format!("pub-{}", seed),
            private_key: format!("priv-{}", seed),
        })
    }

    async fn compute_address(&self, workchain: i32, public_key: &str) -> Result<String> {
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{}:{}", workchain, public_key))
    }
}

/// Chain client with a settable balance and per-address transfer failures
#[derive(Debug, Default)]
pub struct MockChainClient {
    balance: Mutex<Option<u64>>,
    rejected: Mutex<HashSet<String>>,
    transfers: Mutex<Vec<(String, BigDecimal)>>,
}

impl MockChainClient {
    pub fn with_balance(nano: u64) -> Self {
        let client = Self::default();
        *client.balance.lock().unwrap() = Some(nano);
        client
    }

    pub fn offline() -> Self {
        Self::default()
    }

    pub fn reject(&self, address: &str) {
        self.rejected.lock().unwrap().insert(address.to_string());
    }

    pub fn transfers(&self) -> Vec<(String, BigDecimal)> {
        self.transfers.lock().unwrap().clone()
    }
}

impl ChainClient for MockChainClient {
    async fn get_balance(&self, _address: &str) -> Result<u64> {
        self.balance
            .lock()
            .unwrap()
            .ok_or_else(|| anyhow!("network unreachable"))
    }

    async fn transfer(&self, to_address: &str, amount: &BigDecimal) -> Result<TransferReceipt> {
        if self.rejected.lock().unwrap().contains(to_address) {
            return Err(anyhow!("recipient rejected transfer"));
        }
        let mut transfers = self.transfers.lock().unwrap();
        transfers.push((to_address.to_string(), amount.clone()));
        Ok(TransferReceipt {
            transaction_id: format!("tx-{}", transfers.len()),
        })
    }
}
