use bigdecimal::{BigDecimal, ParseBigDecimalError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::utils::decimal::to_balance_string;

/// Fixed identifier of the single master wallet
pub const MASTER_WALLET_ID: &str = "master";

/// Key material shared by master and child wallets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletKeys {
    pub address: String,
    /// Stored in cleartext, no encryption layer
    pub mnemonic: Vec<String>,
    pub public_key: String,
    pub private_key: String,
    pub workchain: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterWallet {
    id: String,
    #[serde(flatten)]
    keys: WalletKeys,
    created_at: DateTime<Utc>,
}

impl MasterWallet {
    pub fn new(keys: WalletKeys) -> Self {
        Self {
            id: MASTER_WALLET_ID.to_string(),
            keys,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn address(&self) -> &str {
        &self.keys.address
    }

    pub fn keys(&self) -> &WalletKeys {
        &self.keys
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildWallet {
    id: String,
    #[serde(flatten)]
    keys: WalletKeys,
    created_at: DateTime<Utc>,
    index: u32,
    #[serde(default = "zero_balance")]
    balance: String,
}

fn zero_balance() -> String {
    "0".to_string()
}

impl ChildWallet {
    /// Build a child record; the id combines the batch timestamp with the index
    pub fn new(index: u32, keys: WalletKeys, created_at: DateTime<Utc>) -> Self {
        Self {
            id: format!("wallet_{}_{}", created_at.timestamp_millis(), index),
            keys,
            created_at,
            index,
            balance: zero_balance(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn address(&self) -> &str {
        &self.keys.address
    }

    pub fn keys(&self) -> &WalletKeys {
        &self.keys
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Cached simulated balance as stored
    pub fn balance(&self) -> &str {
        &self.balance
    }

    pub fn balance_decimal(&self) -> Result<BigDecimal, ParseBigDecimalError> {
        BigDecimal::from_str(&self.balance)
    }

    /// Add to the cached balance and return the new value
    pub(crate) fn credit_balance(
        &mut self,
        amount: &BigDecimal,
    ) -> Result<BigDecimal, ParseBigDecimalError> {
        let updated = self.balance_decimal()? + amount;
        self.balance = to_balance_string(&updated);
        Ok(updated)
    }
}

/// A persisted wallet, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum WalletRecord {
    Master(MasterWallet),
    Child(ChildWallet),
}

/// On-disk layout of the child wallet list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildrenDocument {
    pub children: Vec<WalletRecord>,
    pub last_updated: DateTime<Utc>,
    pub total_count: usize,
}

/// Read-only view over the registry contents
#[derive(Debug, Clone, Copy)]
pub struct WalletsView<'a> {
    pub master: Option<&'a MasterWallet>,
    pub children: &'a [ChildWallet],
    pub total_children: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub has_master: bool,
    pub total_children: usize,
    pub total_wallets: usize,
}
