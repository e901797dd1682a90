use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How each per-wallet transfer is carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    /// Credit cached child balances and draw from the simulated ledger
    Simulated,
    /// Submit each transfer through the chain client
    Live,
}

impl fmt::Display for TransferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferMode::Simulated => write!(f, "simulated"),
            TransferMode::Live => write!(f, "live"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionConfig {
    pub mode: TransferMode,

    /// Artificial latency added to every simulated transfer
    pub simulated_delay_ms: u64,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            mode: TransferMode::Simulated,
            simulated_delay_ms: 100,
        }
    }
}

impl DistributionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: TransferMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_simulated_delay_ms(mut self, delay_ms: u64) -> Self {
        self.simulated_delay_ms = delay_ms;
        self
    }
}
