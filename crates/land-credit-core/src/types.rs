use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%).
pub type Rate = Decimal;

/// Rates expressed as percentages (5.0 = 5%). Record fields that carry
/// user-facing rates (interest, appreciation, ratios) use this form.
pub type Percent = Decimal;

/// Multiples (e.g., 1.8x equity multiple)
pub type Multiple = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// Convert a percentage (4.6) to a decimal rate (0.046).
pub fn pct_to_rate(pct: Percent) -> Rate {
    pct / Decimal::ONE_HUNDRED
}

/// Convert a decimal rate (0.046) to a percentage (4.6).
pub fn rate_to_pct(rate: Rate) -> Percent {
    rate.saturating_mul(Decimal::ONE_HUNDRED)
}

/// Round to whole currency units, half away from zero.
pub fn round_currency(amount: Money) -> Money {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a ratio or percentage for reporting.
pub fn round_ratio(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// `numerator / denominator`, or zero when the denominator is not positive.
/// A quotient too large to represent saturates.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or(if numerator.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    })
}

/// `(1 + rate)^periods` by repeated multiplication. Saturates at
/// `Decimal::MAX` (or `MIN`) instead of overflowing.
pub fn compound_factor(rate: Rate, periods: u32) -> Decimal {
    let mut factor = Decimal::ONE;
    let step = Decimal::ONE + rate;
    for _ in 0..periods {
        match factor.checked_mul(step) {
            Some(next) => factor = next,
            None => return factor.saturating_mul(step),
        }
    }
    factor
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_currency_half_away_from_zero() {
        assert_eq!(round_currency(dec!(10.5)), dec!(11));
        assert_eq!(round_currency(dec!(11.5)), dec!(12));
        assert_eq!(round_currency(dec!(-10.5)), dec!(-11));
        assert_eq!(round_currency(dec!(10.49)), dec!(10));
    }

    #[test]
    fn test_safe_div_zero_denominator() {
        assert_eq!(safe_div(dec!(10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(safe_div(dec!(10), dec!(-2)), Decimal::ZERO);
        assert_eq!(safe_div(dec!(10), dec!(4)), dec!(2.5));
        assert_eq!(safe_div(Decimal::MAX, dec!(0.5)), Decimal::MAX);
    }

    #[test]
    fn test_compound_factor() {
        assert_eq!(compound_factor(dec!(0.10), 2), dec!(1.21));
        assert_eq!(compound_factor(dec!(0.10), 0), Decimal::ONE);
    }

    #[test]
    fn test_compound_factor_saturates() {
        assert_eq!(compound_factor(dec!(0.08), 1000), Decimal::MAX);
        assert_eq!(compound_factor(dec!(20), 30), Decimal::MAX);
    }
}
