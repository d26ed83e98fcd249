use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assumptions::AnalysisAssumptions;
use crate::credit::amortization::{self, AmortizationEntry};
use crate::credit::scenario::CreditScenario;
use crate::credit::tax;
use crate::types::{compound_factor, rate_to_pct, round_currency, round_ratio, safe_div, Money};
use crate::types::{Multiple, Percent};

/// What the credit actually costs once the down payment, closing costs,
/// interest and insurance are counted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrueCostAnalysis {
    pub down_payment: Money,
    /// Sum of one-time closing costs
    pub operational_expenses: Money,
    /// Down payment + closing costs
    pub total_cash_required: Money,
    pub effective_credit: Money,
    pub total_interest_paid: Money,
    pub total_insurance_paid: Money,
    /// Principal + interest + insurance repaid over the term
    pub total_credit_cost: Money,
    /// total_credit_cost / effective_credit (0 without credit)
    pub true_cost_multiplier: Multiple,
    /// Level payment including insurance
    pub monthly_payment: Money,
    /// Monthly payment as % of required monthly income
    pub payment_to_income_ratio: Percent,
    pub meets_income_requirement: bool,
    /// Growth forgone on the down payment over the term
    pub down_payment_opportunity_cost: Money,
    /// Tax saving on first-year interest
    pub estimated_annual_tax_benefit: Money,
    /// Monthly payment in units of account (0 without a snapshot)
    pub monthly_payment_in_units: Decimal,
    pub total_credit_cost_in_units: Decimal,
}

/// Reconstruct the full cost of a credit offer.
///
/// The effective credit is always recomputed as `max(0, advertised - down)`;
/// when it is zero the schedule is all zeros and no annuity is evaluated.
pub fn calculate_true_cost(
    credit: &CreditScenario,
    assumptions: &AnalysisAssumptions,
) -> TrueCostAnalysis {
    calculate_true_cost_with_schedule(credit, assumptions).0
}

/// As [`calculate_true_cost`], also returning the schedule it was built from.
pub fn calculate_true_cost_with_schedule(
    credit: &CreditScenario,
    assumptions: &AnalysisAssumptions,
) -> (TrueCostAnalysis, Vec<AmortizationEntry>) {
    let effective_credit = credit.effective_credit();
    let down_payment = credit.required_down_payment.max(Decimal::ZERO);
    let operational_expenses = credit.total_closing_costs();
    let total_cash_required = down_payment + operational_expenses;

    let schedule = amortization::generate_schedule(
        effective_credit,
        credit.annual_interest_rate,
        credit.term_years,
        credit.monthly_insurance,
    );
    let summary = amortization::summarize(&schedule);

    let monthly_payment = if effective_credit > Decimal::ZERO && credit.term_years > 0 {
        round_currency(
            amortization::monthly_payment(
                effective_credit,
                credit.annual_interest_rate,
                credit.total_months(),
            ) + credit.monthly_insurance.max(Decimal::ZERO),
        )
    } else {
        Decimal::ZERO
    };

    let total_credit_cost =
        summary.total_principal + summary.total_interest + summary.total_insurance;
    let true_cost_multiplier = round_ratio(safe_div(total_credit_cost, effective_credit), 4);

    let payment_to_income_ratio = round_ratio(
        rate_to_pct(safe_div(monthly_payment, credit.required_monthly_income)),
        2,
    );
    let meets_income_requirement = payment_to_income_ratio <= credit.max_payment_to_income_ratio;

    let down_payment_opportunity_cost = round_currency(down_payment.saturating_mul(
        compound_factor(assumptions.opportunity_cost_rate, credit.term_years) - Decimal::ONE,
    ));

    let first_year_interest = summary
        .yearly
        .first()
        .map(|y| y.interest)
        .unwrap_or(Decimal::ZERO);
    let estimated_annual_tax_benefit = round_currency(
        tax::calculate_tax_benefits(
            first_year_interest,
            credit.preferential_tax_regime,
            credit.term_years,
            assumptions,
        )
        .annual_tax_benefit,
    );

    debug!(
        credit_id = %credit.id,
        effective_credit = %effective_credit,
        monthly_payment = %monthly_payment,
        multiplier = %true_cost_multiplier,
        "true cost computed"
    );

    let analysis = TrueCostAnalysis {
        down_payment,
        operational_expenses,
        total_cash_required,
        effective_credit,
        total_interest_paid: summary.total_interest,
        total_insurance_paid: summary.total_insurance,
        total_credit_cost,
        true_cost_multiplier,
        monthly_payment,
        payment_to_income_ratio,
        meets_income_requirement,
        down_payment_opportunity_cost,
        estimated_annual_tax_benefit,
        monthly_payment_in_units: round_ratio(credit.to_units(monthly_payment), 4),
        total_credit_cost_in_units: round_ratio(credit.to_units(total_credit_cost), 4),
    };

    (analysis, schedule)
}
