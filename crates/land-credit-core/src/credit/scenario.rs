use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{pct_to_rate, safe_div, Money, Percent, Rate};

/// Longest credit term the engine schedules. Longer terms are rejected by
/// validation and clamped by the schedule generator.
pub const MAX_TERM_YEARS: u32 = 100;

/// One-time costs paid at signing, on top of the down payment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosingCosts {
    pub notary: Money,
    pub registration: Money,
    pub appraisal: Money,
    /// One-time insurance premium (recurring cover is `monthly_insurance`)
    pub insurance: Money,
    pub stamp_tax: Money,
    pub other: Money,
}

impl ClosingCosts {
    pub fn total(&self) -> Money {
        self.notary + self.registration + self.appraisal + self.insurance + self.stamp_tax
            + self.other
    }
}

/// `years * 12` for a term clamped to [`MAX_TERM_YEARS`].
pub fn schedule_months(years: u32) -> u32 {
    years
        .min(MAX_TERM_YEARS)
        .checked_mul(12)
        .unwrap_or(MAX_TERM_YEARS * 12)
}

/// A bank's mortgage-style credit offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditScenario {
    pub id: String,
    pub bank_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    /// Headline amount the bank advertises
    pub advertised_credit_amount: Money,
    /// Down payment the borrower must contribute
    pub required_down_payment: Money,
    /// Amount actually received: max(0, advertised - down payment)
    #[serde(default)]
    pub effective_credit_amount: Money,
    /// Annual interest rate in percent (4.6 = 4.6%)
    pub annual_interest_rate: Percent,
    pub term_years: u32,
    #[serde(default)]
    pub closing_costs: ClosingCosts,
    /// Recurring insurance added to every monthly payment
    #[serde(default)]
    pub monthly_insurance: Money,
    /// Currency units per unit of account at the time of the offer
    #[serde(default)]
    pub unit_of_account_value: Money,
    #[serde(default)]
    pub preferential_tax_regime: bool,
    #[serde(default)]
    pub required_monthly_income: Money,
    /// Maximum monthly payment as a percentage of income
    #[serde(default = "default_max_payment_to_income")]
    pub max_payment_to_income_ratio: Percent,
}

fn default_max_payment_to_income() -> Percent {
    dec!(25)
}

impl CreditScenario {
    /// Build an offer with the effective amount derived from the advertised
    /// amount and down payment. Remaining fields take neutral defaults.
    pub fn new(
        id: impl Into<String>,
        bank_name: impl Into<String>,
        advertised_credit_amount: Money,
        required_down_payment: Money,
        annual_interest_rate: Percent,
        term_years: u32,
    ) -> Self {
        Self {
            id: id.into(),
            bank_name: bank_name.into(),
            product_name: None,
            advertised_credit_amount,
            required_down_payment,
            effective_credit_amount: derive_effective_credit(
                advertised_credit_amount,
                required_down_payment,
            ),
            annual_interest_rate,
            term_years,
            closing_costs: ClosingCosts::default(),
            monthly_insurance: Decimal::ZERO,
            unit_of_account_value: Decimal::ZERO,
            preferential_tax_regime: false,
            required_monthly_income: Decimal::ZERO,
            max_payment_to_income_ratio: default_max_payment_to_income(),
        }
    }

    /// The effective credit recomputed from the advertised amount. Calculators
    /// always use this rather than the stored field.
    pub fn effective_credit(&self) -> Money {
        derive_effective_credit(self.advertised_credit_amount, self.required_down_payment)
    }

    /// Whether the stored effective amount matches the derived one.
    pub fn is_consistent(&self) -> bool {
        self.effective_credit_amount == self.effective_credit()
    }

    pub fn total_closing_costs(&self) -> Money {
        self.closing_costs.total()
    }

    /// Scheduled months, with the term clamped to [`MAX_TERM_YEARS`].
    pub fn total_months(&self) -> u32 {
        schedule_months(self.term_years)
    }

    pub fn monthly_rate(&self) -> Rate {
        pct_to_rate(self.annual_interest_rate) / dec!(12)
    }

    /// Express `amount` in units of account. Zero when no snapshot is set.
    pub fn to_units(&self, amount: Money) -> Decimal {
        safe_div(amount, self.unit_of_account_value)
    }
}

fn derive_effective_credit(advertised: Money, down_payment: Money) -> Money {
    (advertised - down_payment).max(Decimal::ZERO)
}
