use anyhow::{Result, anyhow};
use bigdecimal::BigDecimal;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::utils::retry::ExponentialBackoffRetry;

/// Smallest chain units per whole token
pub const NANO_PER_TOKEN: u64 = 1_000_000_000;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub transaction_id: String,
}

/// Network access consumed by the ledger and the distribution engine
pub trait ChainClient {
    /// Balance of `address` in nano units
    async fn get_balance(&self, address: &str) -> Result<u64>;

    /// Send `amount` whole tokens to `to_address`
    async fn transfer(&self, to_address: &str, amount: &BigDecimal) -> Result<TransferReceipt>;
}

pub fn nano_to_tokens(nano: u64) -> BigDecimal {
    BigDecimal::from(nano) / BigDecimal::from(NANO_PER_TOKEN)
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    ok: bool,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

fn parse_balance(response: BalanceResponse) -> Result<u64> {
    if !response.ok {
        return Err(anyhow!(
            "node rejected balance query: {}",
            response.error.unwrap_or_else(|| "no reason given".to_string())
        ));
    }

    match response.result {
        Some(Value::String(s)) => s
            .parse::<u64>()
            .map_err(|e| anyhow!("balance {:?} is not an integer: {}", s, e)),
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| anyhow!("balance {} is not a non-negative integer", n)),
        other => Err(anyhow!("unexpected balance payload: {:?}", other)),
    }
}

/// HTTP JSON-API client (toncenter-compatible `getAddressBalance`).
///
/// Balance reads are retried with backoff. Outgoing transfers are not
/// implemented and always fail.
#[derive(Debug, Clone)]
pub struct HttpChainClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    retry_limit: u32,
    retry_delay_ms: u64,
}

impl HttpChainClient {
    pub fn new(endpoint: &str, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            retry_limit: 3,
            retry_delay_ms: 500,
        })
    }

    /// Set retry configuration for balance reads
    pub fn with_retry(mut self, limit: u32, delay_ms: u64) -> Self {
        self.retry_limit = limit;
        self.retry_delay_ms = delay_ms;
        self
    }

    async fn fetch_balance(&self, address: &str) -> Result<u64> {
        let mut request = self
            .client
            .get(format!("{}/getAddressBalance", self.endpoint))
            .query(&[("address", address)]);
        if let Some(key) = &self.api_key {
            request = request.header("X-API-Key", key);
        }

        let response: BalanceResponse = request.send().await?.error_for_status()?.json().await?;
        parse_balance(response)
    }
}

impl ChainClient for HttpChainClient {
    async fn get_balance(&self, address: &str) -> Result<u64> {
        let mut retry = ExponentialBackoffRetry::new(self.retry_delay_ms, self.retry_limit);
        let balance = retry
            .execute("balance lookup", || self.fetch_balance(address))
            .await?;

        debug!("Balance of {}: {} nano", address, balance);
        Ok(balance)
    }

    async fn transfer(&self, to_address: &str, amount: &BigDecimal) -> Result<TransferReceipt> {
        warn!(
            "Refusing live transfer of {} to {}: not supported",
            amount, to_address
        );
        Err(anyhow!(
            "live transfers are not supported by {}: transaction signing is not implemented",
            self.endpoint
        ))
    }
}
