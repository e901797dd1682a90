use bigdecimal::BigDecimal;
use dialoguer::{Confirm, Input as DialoguerInput};
use std::str::FromStr;

use crate::cli_utils::{CliError, CliResult};

/// Input utilities
pub struct Input;

impl Input {
    /// Get a positive wallet count no larger than `max`
    pub fn get_wallet_count(prompt: &str, max: u32) -> CliResult<u32> {
        let input: String = DialoguerInput::new()
            .with_prompt(format!("{} (1-{})", prompt, max))
            .interact_text()?;

        match input.trim().parse::<u32>() {
            Ok(count) if (1..=max).contains(&count) => Ok(count),
            _ => Err(CliError::ValidationError(format!(
                "Enter a whole number between 1 and {}",
                max
            ))),
        }
    }

    /// Get a non-negative decimal amount
    pub fn get_amount(prompt: &str) -> CliResult<BigDecimal> {
        let input: String = DialoguerInput::new().with_prompt(prompt).interact_text()?;

        parse_amount(&input)
    }

    /// Get a boolean choice
    pub fn get_bool(prompt: &str) -> CliResult<bool> {
        Ok(Confirm::new().with_prompt(prompt).interact()?)
    }
}

/// Parse a non-negative decimal, as typed by a user
pub fn parse_amount(input: &str) -> CliResult<BigDecimal> {
    let amount = BigDecimal::from_str(input.trim())
        .map_err(|_| CliError::ValidationError("Invalid decimal format".to_string()))?;

    if amount < BigDecimal::from(0) {
        return Err(CliError::ValidationError(
            "Amount must not be negative".to_string(),
        ));
    }
    Ok(amount)
}
