// Public library interface for wallet-fleet
pub mod chain;
pub mod cli_utils;
pub mod distribution;
pub mod error;
pub mod keys;
pub mod ledger;
pub mod oracle;
pub mod storage;
pub mod utils;
pub mod wallets;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{FleetError, FleetResult, StorageError};
