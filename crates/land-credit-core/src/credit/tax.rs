use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assumptions::AnalysisAssumptions;
use crate::types::{Money, Rate};

/// Mortgage-interest deduction estimate.
///
/// Uses a single flat effective rate on interest up to a cap expressed in
/// reference tax units. Progressive brackets are not modelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxAnalysis {
    pub annual_interest_paid: Money,
    /// Annual ceiling on deductible interest
    pub deduction_cap: Money,
    pub deductible_interest: Money,
    pub effective_tax_rate: Rate,
    pub annual_tax_benefit: Money,
    pub lifetime_tax_benefit: Money,
    pub years: u32,
    pub preferential_regime: bool,
    /// Stamp tax waived under the preferential regime
    pub stamp_tax_savings: Money,
}

/// Annual and lifetime tax savings from deducting `annual_interest_paid`.
pub fn calculate_tax_benefits(
    annual_interest_paid: Money,
    preferential_regime: bool,
    years: u32,
    assumptions: &AnalysisAssumptions,
) -> TaxAnalysis {
    let interest = annual_interest_paid.max(Decimal::ZERO);
    let deduction_cap = assumptions.deduction_cap();
    let deductible_interest = interest.min(deduction_cap);
    let annual_tax_benefit = deductible_interest * assumptions.effective_tax_rate;

    TaxAnalysis {
        annual_interest_paid: interest,
        deduction_cap,
        deductible_interest,
        effective_tax_rate: assumptions.effective_tax_rate,
        annual_tax_benefit,
        lifetime_tax_benefit: annual_tax_benefit * Decimal::from(years),
        years,
        preferential_regime,
        stamp_tax_savings: Decimal::ZERO,
    }
}

/// Portion of `stamp_tax` waived when the preferential regime applies.
pub fn stamp_tax_relief(
    stamp_tax: Money,
    preferential_regime: bool,
    assumptions: &AnalysisAssumptions,
) -> Money {
    if preferential_regime {
        stamp_tax.max(Decimal::ZERO) * assumptions.stamp_tax_relief_ratio
    } else {
        Decimal::ZERO
    }
}
