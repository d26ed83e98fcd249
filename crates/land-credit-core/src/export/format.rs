use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::types::{safe_div, Money, Percent};

/// How currency amounts are rendered. The default is `$ 1.234.567`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub thousands_separator: String,
    pub decimal_separator: String,
    pub decimals: u32,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: "$".into(),
            thousands_separator: ".".into(),
            decimal_separator: ",".into(),
            decimals: 0,
        }
    }
}

pub fn format_currency(amount: Money, fmt: &CurrencyFormat) -> String {
    let number = format_number(
        amount,
        fmt.decimals,
        &fmt.thousands_separator,
        &fmt.decimal_separator,
    );
    match number.strip_prefix('-') {
        Some(abs) => format!("-{} {}", fmt.symbol, abs),
        None => format!("{} {}", fmt.symbol, number),
    }
}

/// `12.345` at 2 decimals gives `"12.35%"`.
pub fn format_percent(value: Percent, decimals: u32) -> String {
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}%", decimals as usize, rounded)
}

/// Amount in units of account, e.g. `"4.14 UF"`. Zero without a unit value.
pub fn format_units(amount: Money, unit_value: Money, label: &str) -> String {
    format!("{} {}", format_number(safe_div(amount, unit_value), 2, ",", "."), label)
}

/// Round half away from zero and group the integer digits in threes.
pub fn format_number(value: Decimal, decimals: u32, thousands: &str, decimal: &str) -> String {
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let digits = format!("{:.*}", decimals as usize, rounded.abs());
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits.as_str(), None),
    };

    let len = int_part.len();
    let mut out = String::with_capacity(len + len / 3 + decimals as usize + 2);
    if rounded < Decimal::ZERO {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(thousands);
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push_str(decimal);
        out.push_str(frac);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_currency_format() {
        let fmt = CurrencyFormat::default();
        assert_eq!(format_currency(dec!(1234567), &fmt), "$ 1.234.567");
        assert_eq!(format_currency(dec!(153134.41), &fmt), "$ 153.134");
        assert_eq!(format_currency(dec!(999.5), &fmt), "$ 1.000");
        assert_eq!(format_currency(Decimal::ZERO, &fmt), "$ 0");
    }

    #[test]
    fn test_negative_currency() {
        let fmt = CurrencyFormat::default();
        assert_eq!(format_currency(dec!(-1500000), &fmt), "-$ 1.500.000");
        // Rounds to zero: no sign
        assert_eq!(format_currency(dec!(-0.4), &fmt), "$ 0");
    }

    #[test]
    fn test_custom_currency_format() {
        let fmt = CurrencyFormat {
            symbol: "USD".into(),
            thousands_separator: ",".into(),
            decimal_separator: ".".into(),
            decimals: 2,
        };
        assert_eq!(format_currency(dec!(1234.5), &fmt), "USD 1,234.50");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(12.345), 2), "12.35%");
        assert_eq!(format_percent(dec!(7.5), 2), "7.50%");
        assert_eq!(format_percent(dec!(-3), 1), "-3.0%");
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(dec!(153134), dec!(37000), "UF"), "4.14 UF");
        assert_eq!(format_units(dec!(153134), Decimal::ZERO, "UF"), "0.00 UF");
    }

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(dec!(100), 0, ".", ","), "100");
        assert_eq!(format_number(dec!(1000), 0, ".", ","), "1.000");
        assert_eq!(format_number(dec!(123456789.126), 2, ".", ","), "123.456.789,13");
    }
}
