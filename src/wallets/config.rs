use serde::{Deserialize, Serialize};

use crate::keys::DEFAULT_WORD_COUNT;

/// Configuration for batch child wallet generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Wallets generated concurrently per group
    pub batch_size: usize,

    /// Mnemonic length for every generated wallet
    pub word_count: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            word_count: DEFAULT_WORD_COUNT,
        }
    }
}

impl GeneratorConfig {
    /// Create a new generator config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set group size, clamped to at least one wallet
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }
}
