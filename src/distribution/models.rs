use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::config::TransferMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Success,
    Failed,
}

/// Result of one transfer attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutcome {
    pub wallet_index: u32,
    pub recipient: String,
    pub amount: BigDecimal,
    pub status: TransferStatus,
    /// Transaction id, balance note or error message
    pub detail: String,
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        self.status == TransferStatus::Success
    }
}

/// Audit record of one distribution call, written once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionReport {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub mode: TransferMode,
    pub total_amount: BigDecimal,
    pub wallet_count: usize,
    pub amount_per_wallet: BigDecimal,
    pub success_count: usize,
    pub failed_count: usize,
    /// True when at least one transfer went through
    pub success: bool,
    pub outcomes: Vec<TransferOutcome>,
}

impl DistributionReport {
    pub fn new(
        mode: TransferMode,
        total_amount: BigDecimal,
        amount_per_wallet: BigDecimal,
        outcomes: Vec<TransferOutcome>,
    ) -> Self {
        let success_count = outcomes.iter().filter(|o| o.is_success()).count();
        let failed_count = outcomes.len() - success_count;

        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            mode,
            total_amount,
            wallet_count: outcomes.len(),
            amount_per_wallet,
            success_count,
            failed_count,
            success: success_count > 0,
            outcomes,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.wallet_count == 0 {
            return 0.0;
        }
        (self.success_count as f64 / self.wallet_count as f64) * 100.0
    }

    pub fn failures(&self) -> impl Iterator<Item = &TransferOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}
