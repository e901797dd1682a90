use bigdecimal::{BigDecimal, Zero};
use std::sync::Arc;
use tracing::{info, warn};

use crate::chain::{ChainClient, nano_to_tokens};
use crate::error::{FleetError, FleetResult};
use crate::utils::decimal::{DISPLAY_SCALE, format_fixed};

/// Master wallet balance as real on-chain funds plus a simulated adjustment.
///
/// The simulated accumulator lives for the process only and is never
/// persisted; a restart resets it to zero.
#[derive(Debug)]
pub struct BalanceLedger<C: ChainClient> {
    chain: Arc<C>,
    simulated: BigDecimal,
}

impl<C: ChainClient> BalanceLedger<C> {
    pub fn new(chain: Arc<C>) -> Self {
        Self {
            chain,
            simulated: BigDecimal::zero(),
        }
    }

    pub fn simulated(&self) -> &BigDecimal {
        &self.simulated
    }

    /// Real plus simulated balance of `address`.
    ///
    /// A chain failure degrades to the simulated part alone.
    pub async fn total_balance(&self, address: &str) -> BigDecimal {
        match self.chain.get_balance(address).await {
            Ok(nano) => nano_to_tokens(nano) + &self.simulated,
            Err(e) => {
                warn!(
                    "Balance query for {} failed, reporting simulated balance only: {}",
                    address, e
                );
                self.simulated.clone()
            }
        }
    }

    /// `total_balance` rendered with 4 fraction digits
    pub async fn real_plus_simulated_balance(&self, address: &str) -> String {
        format_fixed(&self.total_balance(address).await, DISPLAY_SCALE)
    }

    /// Record funds that reached the master wallet outside a real transfer
    pub fn credit(&mut self, amount: &BigDecimal) -> FleetResult<()> {
        if *amount <= BigDecimal::zero() {
            return Err(FleetError::precondition("credit amount must be positive"));
        }
        self.simulated += amount;
        info!("Simulated balance credited {} -> {}", amount, self.simulated);
        Ok(())
    }

    /// Remove consumed funds, never dropping below zero
    pub fn debit(&mut self, amount: &BigDecimal) -> FleetResult<()> {
        if *amount < BigDecimal::zero() {
            return Err(FleetError::precondition("debit amount must not be negative"));
        }
        if *amount > self.simulated {
            warn!(
                "Debit {} exceeds simulated balance {}, clamping to zero",
                amount, self.simulated
            );
            self.simulated = BigDecimal::zero();
        } else {
            self.simulated -= amount;
        }
        Ok(())
    }
}
