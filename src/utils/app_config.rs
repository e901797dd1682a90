use clap::Parser;
use std::path::PathBuf;

use crate::distribution::{DistributionConfig, TransferMode};
use crate::error::{FleetError, FleetResult};
use crate::wallets::GeneratorConfig;

/// Process-wide settings, read from flags or the environment (`.env` honoured)
#[derive(Parser, Debug, Clone)]
pub struct FleetConfig {
    /// Directory holding wallet and report documents
    #[clap(long, env, default_value = "./wallet_data")]
    pub fleet_data_dir: PathBuf,

    /// `simulated` credits cached balances, `live` submits chain transfers
    #[clap(long, env, value_enum, default_value_t = TransferMode::Simulated)]
    pub fleet_transfer_mode: TransferMode,

    #[clap(long, env, default_value = "https://toncenter.com/api/v2")]
    pub fleet_chain_endpoint: String,

    #[clap(long, env)]
    pub fleet_chain_api_key: Option<String>,

    #[clap(long, env, default_value = "https://api.coingecko.com/api/v3")]
    pub fleet_price_endpoint: String,

    /// `<asset>/<fiat>` pair used for fiat top-ups
    #[clap(long, env, default_value = "the-open-network/usd")]
    pub fleet_price_pair: String,

    /// Wallets generated concurrently per group
    #[clap(long, env, default_value_t = 10)]
    pub fleet_batch_size: usize,

    /// Largest number of wallets a single create request may ask for
    #[clap(long, env, default_value_t = 1000)]
    pub fleet_max_wallets_per_call: u32,

    #[clap(long, env, default_value_t = 100)]
    pub fleet_simulated_delay_ms: u64,

    #[clap(long, env, default_value_t = 3)]
    pub fleet_retry_limit: u32,

    #[clap(long, env, default_value_t = 500)]
    pub fleet_retry_delay_ms: u64,
}

impl FleetConfig {
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig::new().with_batch_size(self.fleet_batch_size)
    }

    pub fn distribution_config(&self) -> DistributionConfig {
        DistributionConfig::new()
            .with_mode(self.fleet_transfer_mode)
            .with_simulated_delay_ms(self.fleet_simulated_delay_ms)
    }

    /// Enforce the per-request wallet creation bound
    pub fn check_wallet_count(&self, count: u32) -> FleetResult<()> {
        if count == 0 || count > self.fleet_max_wallets_per_call {
            return Err(FleetError::precondition(format!(
                "wallet count must be between 1 and {}, got {}",
                self.fleet_max_wallets_per_call, count
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let config = FleetConfig::try_parse_from([
            "wallet-fleet",
            "--fleet-batch-size",
            "5",
            "--fleet-transfer-mode",
            "live",
            "--fleet-data-dir",
            "/tmp/fleet",
        ])
        .unwrap();

        assert_eq!(config.fleet_batch_size, 5);
        assert_eq!(config.fleet_transfer_mode, TransferMode::Live);
        assert_eq!(config.fleet_data_dir, PathBuf::from("/tmp/fleet"));
        assert_eq!(config.generator_config().batch_size, 5);
        assert_eq!(config.distribution_config().mode, TransferMode::Live);
    }

    #[test]
    fn test_wallet_count_bound() {
        let config = FleetConfig::try_parse_from([
            "wallet-fleet",
            "--fleet-max-wallets-per-call",
            "1000",
        ])
        .unwrap();

        assert!(config.check_wallet_count(1).is_ok());
        assert!(config.check_wallet_count(1000).is_ok());
        assert!(config.check_wallet_count(0).is_err());
        assert!(config.check_wallet_count(1001).is_err());
    }
}
