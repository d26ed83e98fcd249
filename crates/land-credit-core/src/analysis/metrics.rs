use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::combo;
use crate::assumptions::AnalysisAssumptions;
use crate::credit::amortization::{self, AmortizationEntry};
use crate::credit::scenario::{CreditScenario, MAX_TERM_YEARS};
use crate::credit::true_cost::TrueCostAnalysis;
use crate::land::opportunity::LandOpportunity;
use crate::time_value::{self, IrrSettings, IrrSolution};
use crate::types::{rate_to_pct, round_ratio, safe_div, Money, Multiple, Percent, Years};

/// Investment return metrics for a land/credit pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedMetrics {
    /// Year-1 cash flow / cash invested (%)
    pub cash_on_cash_return: Percent,
    /// NOI / price (%)
    pub cap_rate: Percent,
    /// price / annual gross rent (0 without rent)
    pub gross_rent_multiplier: Multiple,
    /// NOI / annual debt service; the no-debt sentinel when there is no debt
    pub dscr: Decimal,
    /// Effective credit / price (%)
    pub loan_to_value: Percent,
    /// Annual IRR (%)
    pub irr: Percent,
    /// false when the solver stopped without meeting its tolerance
    pub irr_converged: bool,
    pub irr_iterations: u32,
    pub equity_multiple: Multiple,
    pub payback_period_years: Years,
    /// (operating expenses + debt service) / gross rent (%)
    pub break_even_occupancy: Percent,
    pub net_operating_income: Money,
    pub annual_debt_service: Money,
    /// NOI - annual debt service
    pub annual_cash_flow: Money,
}

/// Cash the buyer must put in: the credit's own cash requirement plus any
/// part of the price the effective credit does not cover.
pub fn cash_required(land: &LandOpportunity, true_cost: &TrueCostAnalysis) -> Money {
    true_cost.total_cash_required + additional_cash_needed(land, true_cost)
}

/// Price in excess of the effective credit.
pub fn additional_cash_needed(land: &LandOpportunity, true_cost: &TrueCostAnalysis) -> Money {
    (land.price - true_cost.effective_credit).max(Decimal::ZERO)
}

/// Compute cap rate, cash-on-cash, DSCR, LTV, IRR, equity multiple, payback
/// and break-even occupancy.
///
/// `annual_rent` is gross; a fixed share (`operating_expense_ratio`) is
/// reserved for operating expenses.
pub fn calculate_advanced_metrics(
    land: &LandOpportunity,
    credit: &CreditScenario,
    true_cost: &TrueCostAnalysis,
    annual_rent: Money,
    assumptions: &AnalysisAssumptions,
) -> AdvancedMetrics {
    let schedule = amortization::generate_schedule(
        true_cost.effective_credit,
        credit.annual_interest_rate,
        credit.term_years,
        credit.monthly_insurance,
    );
    metrics_from_schedule(land, true_cost, &schedule, annual_rent, assumptions)
}

/// As [`calculate_advanced_metrics`] with an already generated schedule.
pub(crate) fn metrics_from_schedule(
    land: &LandOpportunity,
    true_cost: &TrueCostAnalysis,
    schedule: &[AmortizationEntry],
    annual_rent: Money,
    assumptions: &AnalysisAssumptions,
) -> AdvancedMetrics {
    let annual_rent = annual_rent.max(Decimal::ZERO);
    let invested = cash_required(land, true_cost);

    // --- Income ---
    let operating_expenses = annual_rent * assumptions.operating_expense_ratio;
    let noi = annual_rent - operating_expenses;
    let annual_debt_service = true_cost.monthly_payment * dec!(12);
    let annual_cash_flow = noi - annual_debt_service;

    let cap_rate = rate_to_pct(safe_div(noi, land.price));
    let cash_on_cash_return = rate_to_pct(safe_div(annual_cash_flow, invested));
    let gross_rent_multiplier = safe_div(land.price, annual_rent);

    let dscr = if annual_debt_service.is_zero() {
        assumptions.dscr_no_debt_sentinel
    } else {
        noi / annual_debt_service
    };

    let loan_to_value = rate_to_pct(safe_div(true_cost.effective_credit, land.price));

    // --- Holding-period cash flows ---
    let horizon = assumptions.holding_period_years.clamp(1, MAX_TERM_YEARS);
    let yearly = amortization::summarize(schedule).yearly;
    let periodic: Vec<Money> = (1..=horizon)
        .map(|year| {
            let debt_service = yearly
                .get((year - 1) as usize)
                .map(|y| y.payment)
                .unwrap_or(Decimal::ZERO);
            noi - debt_service
        })
        .collect();

    let exit_value = combo::projected_value(land, horizon);
    let exit_balance =
        amortization::balance_after(schedule, horizon * 12, true_cost.effective_credit);
    let final_value = exit_value.saturating_sub(exit_balance);

    let irr = solve_holding_irr(invested, &periodic, final_value, assumptions);

    let distributions = periodic
        .iter()
        .fold(final_value, |acc, cf| acc.saturating_add(*cf));
    let equity_multiple = safe_div(distributions, invested);

    // Non-positive cash flow gives a long but finite payback
    let payback_period_years = invested / annual_cash_flow.max(Decimal::ONE);

    let break_even_occupancy =
        rate_to_pct(safe_div(operating_expenses + annual_debt_service, annual_rent));

    debug!(
        land_id = %land.id,
        noi = %noi,
        dscr = %dscr,
        irr = %irr.rate,
        irr_converged = irr.converged,
        "advanced metrics computed"
    );

    AdvancedMetrics {
        cash_on_cash_return: round_ratio(cash_on_cash_return, 2),
        cap_rate: round_ratio(cap_rate, 2),
        gross_rent_multiplier: round_ratio(gross_rent_multiplier, 2),
        dscr: round_ratio(dscr, 2),
        loan_to_value: round_ratio(loan_to_value, 2),
        irr: round_ratio(rate_to_pct(irr.rate), 2),
        irr_converged: irr.converged,
        irr_iterations: irr.iterations,
        equity_multiple: round_ratio(equity_multiple, 2),
        payback_period_years: round_ratio(payback_period_years, 2),
        break_even_occupancy: round_ratio(break_even_occupancy, 2),
        net_operating_income: round_ratio(noi, 0),
        annual_debt_service,
        annual_cash_flow: round_ratio(annual_cash_flow, 0),
    }
}

/// IRR over `[-invested, periodic..., final_value]`. Nothing invested means
/// there is no rate to solve for.
fn solve_holding_irr(
    invested: Money,
    periodic: &[Money],
    final_value: Money,
    assumptions: &AnalysisAssumptions,
) -> IrrSolution {
    let no_solution = IrrSolution {
        rate: Decimal::ZERO,
        iterations: 0,
        converged: false,
    };
    if invested <= Decimal::ZERO {
        return no_solution;
    }

    let mut flows = Vec::with_capacity(periodic.len() + 2);
    flows.push(-invested);
    flows.extend_from_slice(periodic);
    flows.push(final_value);

    time_value::irr(&flows, &IrrSettings::from(assumptions)).unwrap_or(no_solution)
}
