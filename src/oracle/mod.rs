use anyhow::{Result, anyhow};
use bigdecimal::{BigDecimal, Zero};
use reqwest::Client;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{FleetError, FleetResult};
use crate::utils::decimal::round_amount;
use crate::utils::retry::ExponentialBackoffRetry;

/// Fiat price per token used whenever the oracle cannot answer
pub const FALLBACK_SPOT_PRICE: &str = "2.5";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub fn fallback_spot_price() -> BigDecimal {
    BigDecimal::from_str(FALLBACK_SPOT_PRICE).unwrap_or_else(|_| BigDecimal::from(1))
}

/// Spot price source for a `<asset>/<fiat>` pair
pub trait PriceOracle {
    async fn spot_price(&self, pair: &str) -> Result<BigDecimal>;
}

/// Ask the oracle, falling back to `FALLBACK_SPOT_PRICE` on any failure
pub async fn spot_price_or_fallback<P: PriceOracle>(oracle: &P, pair: &str) -> BigDecimal {
    let failure = match oracle.spot_price(pair).await {
        Ok(price) if price > BigDecimal::zero() => return price,
        Ok(price) => FleetError::OracleUnavailable(format!("non-positive price {}", price)),
        Err(e) => FleetError::OracleUnavailable(e.to_string()),
    };

    warn!("{} - using fallback price {}", failure, FALLBACK_SPOT_PRICE);
    fallback_spot_price()
}

/// Tokens bought by `fiat` at `price`, truncated to 6 fraction digits
pub fn fiat_to_tokens(fiat: &BigDecimal, price: &BigDecimal) -> FleetResult<BigDecimal> {
    if *fiat <= BigDecimal::zero() {
        return Err(FleetError::precondition("fiat amount must be positive"));
    }
    if *price <= BigDecimal::zero() {
        return Err(FleetError::precondition("spot price must be positive"));
    }
    Ok(round_amount(&(fiat / price)))
}

/// CoinGecko-style `simple/price` client; pairs look like `the-open-network/usd`
#[derive(Debug, Clone)]
pub struct HttpPriceOracle {
    client: Client,
    endpoint: String,
    retry_limit: u32,
    retry_delay_ms: u64,
}

impl HttpPriceOracle {
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            retry_limit: 2,
            retry_delay_ms: 500,
        })
    }

    pub fn with_retry(mut self, limit: u32, delay_ms: u64) -> Self {
        self.retry_limit = limit;
        self.retry_delay_ms = delay_ms;
        self
    }

    async fn fetch_price(&self, asset: &str, fiat: &str) -> Result<BigDecimal> {
        let body: Value = self
            .client
            .get(format!("{}/simple/price", self.endpoint))
            .query(&[("ids", asset), ("vs_currencies", fiat)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_price(&body, asset, fiat)
    }
}

fn split_pair(pair: &str) -> Result<(&str, &str)> {
    pair.split_once('/')
        .filter(|(asset, fiat)| !asset.is_empty() && !fiat.is_empty())
        .ok_or_else(|| anyhow!("price pair {:?} must look like <asset>/<fiat>", pair))
}

fn parse_price(body: &Value, asset: &str, fiat: &str) -> Result<BigDecimal> {
    let quote = body
        .get(asset)
        .and_then(|quotes| quotes.get(fiat))
        .ok_or_else(|| anyhow!("no {}/{} quote in response", asset, fiat))?;

    match quote {
        Value::Number(n) => Ok(BigDecimal::from_str(&n.to_string())?),
        Value::String(s) => Ok(BigDecimal::from_str(s)?),
        other => Err(anyhow!("unexpected quote payload: {}", other)),
    }
}

impl PriceOracle for HttpPriceOracle {
    async fn spot_price(&self, pair: &str) -> Result<BigDecimal> {
        let (asset, fiat) = split_pair(pair)?;

        let mut retry = ExponentialBackoffRetry::new(self.retry_delay_ms, self.retry_limit);
        let price = retry
            .execute("price lookup", || self.fetch_price(asset, fiat))
            .await?;

        info!("Spot price {} = {}", pair, price);
        Ok(price)
    }
}
