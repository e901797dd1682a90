use bigdecimal::{BigDecimal, Zero};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::chain::{ChainClient, TransferReceipt};
use crate::error::{FleetError, FleetResult};
use crate::ledger::BalanceLedger;
use crate::storage::Store;
use crate::utils::decimal::{round_amount, to_balance_string};
use crate::wallets::{ChildWallet, WalletRegistry};

use super::config::{DistributionConfig, TransferMode};
use super::models::{DistributionReport, TransferOutcome, TransferStatus};
use super::report::ReportWriter;

/// Share of the available balance distributed when no amount is given
pub const AUTO_DISTRIBUTION_PERCENT: u32 = 95;

/// Turn a requested amount into the amount to distribute.
///
/// Zero means "95% of what is available".
pub fn resolve_amount(requested: &BigDecimal, available: &BigDecimal) -> FleetResult<BigDecimal> {
    if *requested < BigDecimal::zero() {
        return Err(FleetError::precondition("distribution amount must not be negative"));
    }
    if !requested.is_zero() {
        return Ok(requested.clone());
    }

    let share = round_amount(
        &(available * BigDecimal::from(AUTO_DISTRIBUTION_PERCENT) / BigDecimal::from(100)),
    );
    if share <= BigDecimal::zero() {
        return Err(FleetError::precondition(format!(
            "nothing to distribute: available balance is {}",
            available
        )));
    }
    Ok(share)
}

/// Splits an amount evenly across every child wallet, one transfer at a time
pub struct DistributionEngine<C: ChainClient, S: Store> {
    chain: Arc<C>,
    reports: ReportWriter<S>,
    config: DistributionConfig,
}

impl<C: ChainClient, S: Store> DistributionEngine<C, S> {
    pub fn new(chain: Arc<C>, reports: ReportWriter<S>, config: DistributionConfig) -> Self {
        Self {
            chain,
            reports,
            config,
        }
    }

    pub fn mode(&self) -> TransferMode {
        self.config.mode
    }

    /// Distribute `total` evenly across the current child wallets.
    ///
    /// Transfers are attempted sequentially in registry order and a failed
    /// transfer never stops the loop. If saving the updated child list fails
    /// the transfers have already happened; the error carries the counts.
    pub async fn distribute(
        &self,
        registry: &mut WalletRegistry<S>,
        ledger: &mut BalanceLedger<C>,
        total: &BigDecimal,
    ) -> FleetResult<DistributionReport> {
        if *total <= BigDecimal::zero() {
            return Err(FleetError::precondition("distribution amount must be positive"));
        }

        registry.reload()?;

        if registry.master().is_none() {
            return Err(FleetError::precondition(
                "no master wallet exists, initialize the registry first",
            ));
        }
        let wallet_count = registry.children().len();
        if wallet_count == 0 {
            return Err(FleetError::precondition("no child wallets to distribute to"));
        }

        let amount_per_wallet = round_amount(&(total / BigDecimal::from(wallet_count as u64)));
        if amount_per_wallet <= BigDecimal::zero() {
            return Err(FleetError::precondition(format!(
                "{} is too small to split across {} wallets",
                total, wallet_count
            )));
        }

        info!(
            "Distributing {} across {} wallet(s), {} each ({} mode)",
            total, wallet_count, amount_per_wallet, self.config.mode
        );

        let mut outcomes = Vec::with_capacity(wallet_count);
        for child in registry.children_mut().iter_mut().take(wallet_count) {
            let outcome = match self.config.mode {
                TransferMode::Simulated => self.simulate_transfer(child, &amount_per_wallet).await,
                TransferMode::Live => self.live_transfer(child, &amount_per_wallet).await,
            };
            debug!(
                "Wallet #{} {:?}: {}",
                outcome.wallet_index, outcome.status, outcome.detail
            );
            outcomes.push(outcome);
        }

        let report = DistributionReport::new(
            self.config.mode,
            total.clone(),
            amount_per_wallet,
            outcomes,
        );

        if let Err(source) = registry.persist_children() {
            error!(
                "Transfers finished ({} ok, {} failed) but the wallet list could not be saved",
                report.success_count, report.failed_count
            );
            return Err(FleetError::DistributionPersistence {
                succeeded: report.success_count,
                failed: report.failed_count,
                source,
            });
        }

        // Live transfers draw from the real balance.
        if self.config.mode == TransferMode::Simulated {
            ledger.debit(total)?;
        }

        if let Err(e) = self.reports.write(&report) {
            warn!("Distribution report could not be written: {}", e);
        }

        info!(
            "Distribution finished: {} succeeded, {} failed",
            report.success_count, report.failed_count
        );
        Ok(report)
    }

    async fn simulate_transfer(&self, child: &mut ChildWallet, amount: &BigDecimal) -> TransferOutcome {
        tokio::time::sleep(Duration::from_millis(self.config.simulated_delay_ms)).await;

        let (status, detail) = match child.credit_balance(amount) {
            Ok(balance) => (
                TransferStatus::Success,
                format!("simulated, balance now {}", to_balance_string(&balance)),
            ),
            Err(e) => (
                TransferStatus::Failed,
                format!("cached balance {:?} is unreadable: {}", child.balance(), e),
            ),
        };

        TransferOutcome {
            wallet_index: child.index(),
            recipient: child.address().to_string(),
            amount: amount.clone(),
            status,
            detail,
        }
    }

    async fn live_transfer(&self, child: &ChildWallet, amount: &BigDecimal) -> TransferOutcome {
        let (status, detail) = match self.submit_transfer(child.address(), amount).await {
            Ok(receipt) => (TransferStatus::Success, receipt.transaction_id),
            Err(e) => {
                warn!("{}", e);
                (TransferStatus::Failed, e.to_string())
            }
        };

        TransferOutcome {
            wallet_index: child.index(),
            recipient: child.address().to_string(),
            amount: amount.clone(),
            status,
            detail,
        }
    }

    async fn submit_transfer(&self, recipient: &str, amount: &BigDecimal) -> FleetResult<TransferReceipt> {
        self.chain
            .transfer(recipient, amount)
            .await
            .map_err(|e| FleetError::Transfer {
                recipient: recipient.to_string(),
                reason: e.to_string(),
            })
    }
}
