use bigdecimal::{BigDecimal, RoundingMode};

/// Fraction digits kept for per-wallet amounts and cached balances
pub const AMOUNT_SCALE: i64 = 6;

/// Fraction digits shown for reported balances
pub const DISPLAY_SCALE: i64 = 4;

/// Truncate to `AMOUNT_SCALE` fraction digits, never rounding up
pub fn round_amount(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(AMOUNT_SCALE, RoundingMode::Down)
}

/// Canonical string form for persisted balances ("1.8", "0")
pub fn to_balance_string(value: &BigDecimal) -> String {
    round_amount(value).normalized().to_plain_string()
}

/// Fixed-width rendering, e.g. `format_fixed(1, 4) == "1.0000"`
pub fn format_fixed(value: &BigDecimal, places: i64) -> String {
    value
        .with_scale_round(places, RoundingMode::HalfUp)
        .to_plain_string()
}
