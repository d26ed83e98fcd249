use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::analysis::metrics::{self, AdvancedMetrics};
use crate::analysis::scoring::{self, Recommendation, ScoreAdjustment, ScoringInputs};
use crate::assumptions::AnalysisAssumptions;
use crate::credit::amortization::{self, AmortizationEntry};
use crate::credit::scenario::{CreditScenario, MAX_TERM_YEARS};
use crate::credit::tax::{self, TaxAnalysis};
use crate::credit::true_cost::{self, TrueCostAnalysis};
use crate::error::LandCreditError;
use crate::land::opportunity::{LandOpportunity, LandStatus};
use crate::land::residual::{self, ResidualInput, ResidualLandValue};
use crate::time_value::future_value;
use crate::types::*;
use crate::LandCreditResult;

/// Horizons (years) for value projections and annualized ROI.
pub const PROJECTION_HORIZONS: [u32; 3] = [5, 10, 20];

const METHODOLOGY: &str =
    "Land & Credit Combo Analysis (true cost, appreciation projection, return metrics, viability score)";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A land/credit pairing to analyse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboInput {
    pub land: LandOpportunity,
    pub credit: CreditScenario,
    /// Overrides for this pairing; defaults apply when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assumptions: Option<AnalysisAssumptions>,
}

/// Appreciated value and owner's position at one horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueProjection {
    pub years: u32,
    pub projected_value: Money,
    pub remaining_balance: Money,
    pub cumulative_payments: Money,
    /// projected value - balance - cash required - payments
    pub net_profit: Money,
    pub total_roi: Percent,
    pub annualized_roi: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboAnalysis {
    /// Cash required + every scheduled payment
    pub total_investment: Money,
    pub monthly_payment: Money,
    /// Credit cash requirement + price not covered by the credit
    pub cash_required: Money,
    pub additional_cash_needed: Money,
    pub roi_5y: Percent,
    pub roi_10y: Percent,
    pub roi_20y: Percent,
    pub projections: Vec<ValueProjection>,
    /// First month where the appreciated value exceeds the cumulative cash
    /// outlay (cash required + payments), if within term
    pub break_even_month: Option<u32>,
    /// First month where the appreciated value net of the outstanding loan
    /// exceeds the cumulative cash outlay, if within term
    pub equity_break_even_month: Option<u32>,
    pub true_cost: TrueCostAnalysis,
    pub advanced_metrics: AdvancedMetrics,
    pub tax_analysis: TaxAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residual_value: Option<ResidualLandValue>,
    pub score: u8,
    pub recommendation: Recommendation,
    pub score_breakdown: Vec<ScoreAdjustment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandCreditCombo {
    pub land: LandOpportunity,
    pub credit: CreditScenario,
    pub analysis: ComboAnalysis,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Validate a pairing, analyse it and wrap the result with warnings.
pub fn run_analysis(input: &ComboInput) -> LandCreditResult<ComputationOutput<LandCreditCombo>> {
    let start = Instant::now();
    let assumptions = input.assumptions.clone().unwrap_or_default();

    let mut warnings = validate_pair(&input.land, &input.credit)?;
    let analysis = analyze(&input.land, &input.credit, &assumptions);
    warnings.extend(analysis_warnings(&input.land, &input.credit, &analysis));

    let combo = LandCreditCombo {
        land: input.land.clone(),
        credit: input.credit.clone(),
        analysis,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        METHODOLOGY,
        &assumptions,
        warnings,
        elapsed,
        combo,
    ))
}

/// Run every stage for one pairing. Never fails: degenerate inputs produce
/// zeros, sentinels or `None`.
pub fn analyze(
    land: &LandOpportunity,
    credit: &CreditScenario,
    assumptions: &AnalysisAssumptions,
) -> ComboAnalysis {
    // --- (a) true cost ---
    let (true_cost, schedule) = true_cost::calculate_true_cost_with_schedule(credit, assumptions);

    // --- (b) cash ---
    let additional_cash_needed = metrics::additional_cash_needed(land, &true_cost);
    let cash_required = metrics::cash_required(land, &true_cost);
    let total_scheduled: Money = schedule.iter().map(|e| e.payment).sum();
    let total_investment = cash_required + total_scheduled;

    // --- (c, d) projections and ROI ---
    let projections: Vec<ValueProjection> = PROJECTION_HORIZONS
        .iter()
        .map(|&years| project(land, &true_cost, &schedule, cash_required, years))
        .collect();
    let roi_at = |years: u32| {
        projections
            .iter()
            .find(|p| p.years == years)
            .map(|p| p.annualized_roi)
            .unwrap_or(Decimal::ZERO)
    };
    let (roi_5y, roi_10y, roi_20y) = (roi_at(5), roi_at(10), roi_at(20));

    // --- (e) break-even ---
    let (break_even_month, equity_break_even_month) =
        break_even_months(land, &true_cost, &schedule, cash_required);

    // --- (f) metrics and tax ---
    let annual_rent = land.annual_rent();
    let advanced_metrics =
        metrics::metrics_from_schedule(land, &true_cost, &schedule, annual_rent, assumptions);
    let tax_analysis = combo_tax(credit, &true_cost, assumptions);

    // --- (g) residual ---
    let residual_value = land
        .development_potential
        .as_ref()
        .filter(|dev| dev.buildable_area > Decimal::ZERO)
        .and_then(|dev| ResidualInput::from_development(dev, assumptions.target_profit_margin))
        .map(|inp| residual::calculate_residual_land_value(&inp).with_area(land.area));

    // --- (h) score ---
    let card = scoring::score(
        &ScoringInputs {
            land,
            credit,
            metrics: &advanced_metrics,
            roi_10y,
            monthly_payment: true_cost.monthly_payment,
            cash_required,
            annual_rent,
        },
        &assumptions.scoring,
    );

    debug!(
        land_id = %land.id,
        credit_id = %credit.id,
        cash_required = %cash_required,
        roi_10y = %roi_10y,
        break_even_month = ?break_even_month,
        equity_break_even_month = ?equity_break_even_month,
        score = card.score,
        "combo analysed"
    );

    ComboAnalysis {
        total_investment,
        monthly_payment: true_cost.monthly_payment,
        cash_required,
        additional_cash_needed,
        roi_5y,
        roi_10y,
        roi_20y,
        projections,
        break_even_month,
        equity_break_even_month,
        true_cost,
        advanced_metrics,
        tax_analysis,
        residual_value,
        score: card.score,
        recommendation: card.recommendation,
        score_breakdown: card.adjustments,
    }
}

/// Annualized ROI (%) at a horizon.
///
/// `total = (value - balance - (cash_required + payments)) / cash_required`,
/// annualized as `(1 + total)^(1/years) - 1`. A total loss (or worse) reports
/// -100%; nothing invested reports 0.
pub fn annualized_roi(
    projected_value: Money,
    remaining_balance: Money,
    cumulative_payments: Money,
    cash_required: Money,
    years: u32,
) -> Percent {
    if cash_required <= Decimal::ZERO || years == 0 {
        return Decimal::ZERO;
    }
    let outlay = cash_required + cumulative_payments;
    let net = projected_value
        .saturating_sub(remaining_balance)
        .saturating_sub(outlay);
    let growth = net
        .checked_div(cash_required)
        .and_then(|total| total.checked_add(Decimal::ONE))
        .unwrap_or(if net.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        });
    if growth <= Decimal::ZERO {
        return dec!(-100);
    }
    let annualized = growth
        .checked_powd(Decimal::ONE / Decimal::from(years))
        .map(|g| g - Decimal::ONE)
        .unwrap_or(Decimal::ZERO);
    round_ratio(rate_to_pct(annualized), 2)
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

pub(crate) fn projected_value(land: &LandOpportunity, years: u32) -> Money {
    future_value(land.price, pct_to_rate(land.expected_annual_appreciation), years)
}

fn project(
    land: &LandOpportunity,
    true_cost: &TrueCostAnalysis,
    schedule: &[AmortizationEntry],
    cash_required: Money,
    years: u32,
) -> ValueProjection {
    let month = years * 12;
    let projected_value = projected_value(land, years);
    let remaining_balance =
        amortization::balance_after(schedule, month, true_cost.effective_credit);
    let cumulative_payments = amortization::paid_through(schedule, month);
    let net_profit = projected_value
        .saturating_sub(remaining_balance)
        .saturating_sub(cash_required + cumulative_payments);

    ValueProjection {
        years,
        projected_value: round_currency(projected_value),
        remaining_balance,
        cumulative_payments,
        net_profit: round_currency(net_profit),
        total_roi: round_ratio(rate_to_pct(safe_div(net_profit, cash_required)), 2),
        annualized_roi: annualized_roi(
            projected_value,
            remaining_balance,
            cumulative_payments,
            cash_required,
            years,
        ),
    }
}

/// Month-by-month search over the credit term. Returns the first month the
/// appreciated value exceeds the cumulative outlay, and the first month it
/// does so net of the outstanding balance.
fn break_even_months(
    land: &LandOpportunity,
    true_cost: &TrueCostAnalysis,
    schedule: &[AmortizationEntry],
    cash_required: Money,
) -> (Option<u32>, Option<u32>) {
    let growth = Decimal::ONE + pct_to_rate(land.expected_annual_appreciation);
    let monthly_factor = if growth == Decimal::ONE {
        Decimal::ONE
    } else if growth > Decimal::ZERO {
        growth
            .checked_powd(Decimal::ONE / dec!(12))
            .unwrap_or(Decimal::ONE)
    } else {
        Decimal::ZERO
    };

    let mut gross = None;
    let mut equity = None;
    let mut value = land.price;
    let mut paid = Decimal::ZERO;
    for entry in schedule {
        value = value.saturating_mul(monthly_factor);
        paid += entry.payment;
        let outlay = cash_required + paid;
        if gross.is_none() && value > outlay {
            gross = Some(entry.month);
        }
        if equity.is_none() {
            let balance =
                amortization::balance_after(schedule, entry.month, true_cost.effective_credit);
            if value.saturating_sub(balance) > outlay {
                equity = Some(entry.month);
            }
        }
        if gross.is_some() && equity.is_some() {
            break;
        }
    }
    (gross, equity)
}

/// Tax benefit on average annual interest, plus stamp tax relief.
fn combo_tax(
    credit: &CreditScenario,
    true_cost: &TrueCostAnalysis,
    assumptions: &AnalysisAssumptions,
) -> TaxAnalysis {
    let average_interest = if credit.term_years > 0 {
        true_cost.total_interest_paid / Decimal::from(credit.term_years)
    } else {
        Decimal::ZERO
    };
    let mut analysis = tax::calculate_tax_benefits(
        average_interest,
        credit.preferential_tax_regime,
        credit.term_years,
        assumptions,
    );
    analysis.stamp_tax_savings = tax::stamp_tax_relief(
        credit.closing_costs.stamp_tax,
        credit.preferential_tax_regime,
        assumptions,
    );
    analysis
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Largest monetary amount accepted on any record field.
pub const MAX_AMOUNT: Money = dec!(1000000000000000);
/// Highest annual interest rate accepted, in percent.
pub const MAX_ANNUAL_RATE_PCT: Percent = dec!(100);
/// Highest expected annual appreciation accepted, in percent.
pub const MAX_APPRECIATION_PCT: Percent = dec!(100);

fn non_negative(value: Decimal, field: &str) -> LandCreditResult<()> {
    if value < Decimal::ZERO {
        return Err(LandCreditError::InvalidInput {
            field: field.into(),
            reason: "Must not be negative".into(),
        });
    }
    Ok(())
}

fn at_most(value: Decimal, max: Decimal, field: &str) -> LandCreditResult<()> {
    if value > max {
        return Err(LandCreditError::InvalidInput {
            field: field.into(),
            reason: format!("Must not exceed {}", max),
        });
    }
    Ok(())
}

fn amount(value: Money, field: &str) -> LandCreditResult<()> {
    non_negative(value, field)?;
    at_most(value, MAX_AMOUNT, field)
}

/// Reject impossible records; return warnings for suspicious ones.
pub(crate) fn validate_pair(
    land: &LandOpportunity,
    credit: &CreditScenario,
) -> LandCreditResult<Vec<String>> {
    let mut warnings = Vec::new();

    amount(land.price, "land.price")?;
    amount(land.area, "land.area")?;
    amount(land.appraisal_value, "land.appraisal_value")?;
    if let Some(rent) = land.estimated_rental_income {
        amount(rent, "land.estimated_rental_income")?;
    }
    if land.expected_annual_appreciation <= dec!(-100) {
        return Err(LandCreditError::InvalidInput {
            field: "land.expected_annual_appreciation".into(),
            reason: "Appreciation must be greater than -100%".into(),
        });
    }
    at_most(
        land.expected_annual_appreciation,
        MAX_APPRECIATION_PCT,
        "land.expected_annual_appreciation",
    )?;

    amount(credit.advertised_credit_amount, "credit.advertised_credit_amount")?;
    amount(credit.required_down_payment, "credit.required_down_payment")?;
    non_negative(credit.annual_interest_rate, "credit.annual_interest_rate")?;
    at_most(
        credit.annual_interest_rate,
        MAX_ANNUAL_RATE_PCT,
        "credit.annual_interest_rate",
    )?;
    if credit.term_years > MAX_TERM_YEARS {
        return Err(LandCreditError::InvalidInput {
            field: "credit.term_years".into(),
            reason: format!("Must not exceed {} years", MAX_TERM_YEARS),
        });
    }
    amount(credit.monthly_insurance, "credit.monthly_insurance")?;
    amount(credit.required_monthly_income, "credit.required_monthly_income")?;
    let costs = &credit.closing_costs;
    for (value, field) in [
        (costs.notary, "credit.closing_costs.notary"),
        (costs.registration, "credit.closing_costs.registration"),
        (costs.appraisal, "credit.closing_costs.appraisal"),
        (costs.insurance, "credit.closing_costs.insurance"),
        (costs.stamp_tax, "credit.closing_costs.stamp_tax"),
        (costs.other, "credit.closing_costs.other"),
    ] {
        amount(value, field)?;
    }

    if !credit.is_consistent() {
        warnings.push(format!(
            "Stored effective credit {} differs from advertised - down payment ({}); using the derived amount",
            credit.effective_credit_amount,
            credit.effective_credit()
        ));
    }
    if !land.is_consistent() {
        warnings.push(format!(
            "Stored discount {:.2}% differs from price vs appraisal ({:.2}%); using the derived value",
            land.percentage_below_appraisal,
            land.derived_discount_pct()
        ));
    }
    if credit.term_years == 0 {
        warnings.push("Credit term is zero years; no payment schedule generated".into());
    }
    if land.status == LandStatus::Sold {
        warnings.push(format!("Land '{}' is marked as sold", land.name));
    }

    Ok(warnings)
}

fn analysis_warnings(
    land: &LandOpportunity,
    credit: &CreditScenario,
    analysis: &ComboAnalysis,
) -> Vec<String> {
    let mut warnings = Vec::new();
    let m = &analysis.advanced_metrics;

    if analysis.true_cost.effective_credit.is_zero() {
        warnings.push("Effective credit is zero: down payment covers the advertised amount".into());
    }
    if credit.required_monthly_income > Decimal::ZERO && !analysis.true_cost.meets_income_requirement
    {
        warnings.push(format!(
            "Payment-to-income {:.2}% exceeds the {:.2}% maximum",
            analysis.true_cost.payment_to_income_ratio, credit.max_payment_to_income_ratio
        ));
    }
    if analysis.cash_required > Decimal::ZERO && !m.irr_converged && m.irr_iterations == 0 {
        warnings.push("Holding-period cash flows never turn positive; IRR is undefined".into());
    } else if analysis.cash_required > Decimal::ZERO && !m.irr_converged {
        warnings.push(format!(
            "IRR did not converge after {} iterations; {:.2}% is a best-effort estimate",
            m.irr_iterations, m.irr
        ));
    }
    if analysis.break_even_month.is_none() && credit.term_years > 0 {
        warnings.push("No break-even within the credit term".into());
    }
    if land.annual_rent() > Decimal::ZERO
        && !m.annual_debt_service.is_zero()
        && m.dscr < dec!(1.2)
    {
        warnings.push(format!("DSCR {:.2} is below 1.20", m.dscr));
    }
    if land.appraisal_value > Decimal::ZERO && land.price > land.appraisal_value {
        warnings.push(format!(
            "Land price exceeds appraisal by {:.2}%",
            -land.derived_discount_pct()
        ));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::land::opportunity::DevelopmentPotential;

    fn land() -> LandOpportunity {
        LandOpportunity::new(
            "t1",
            "Parcela Norte",
            dec!(30000000),
            dec!(5000),
            dec!(36000000),
            dec!(5),
        )
    }

    fn credit() -> CreditScenario {
        CreditScenario::new("c1", "Banco Uno", dec!(30000000), dec!(6000000), dec!(4.6), 20)
    }

    #[test]
    fn test_cash_and_investment_totals() {
        let a = analyze(&land(), &credit(), &AnalysisAssumptions::default());
        assert_eq!(a.additional_cash_needed, dec!(6000000));
        assert_eq!(a.cash_required, dec!(12000000));
        // 24,000,000 principal + ~12,752,258 interest
        assert!((a.total_investment - dec!(48752258)).abs() <= dec!(1));
        assert_eq!(a.monthly_payment, dec!(153134));
    }

    #[test]
    fn test_projections_for_each_horizon() {
        let a = analyze(&land(), &credit(), &AnalysisAssumptions::default());
        let years: Vec<u32> = a.projections.iter().map(|p| p.years).collect();
        assert_eq!(years, vec![5, 10, 20]);
        // 30M * 1.05^5
        assert_eq!(a.projections[0].projected_value, dec!(38288447));
        assert_eq!(a.projections[2].remaining_balance, Decimal::ZERO);
        assert_eq!(a.roi_10y, a.projections[1].annualized_roi);
    }

    #[test]
    fn test_annualized_roi_edges() {
        assert_eq!(annualized_roi(dec!(100), dec!(0), dec!(0), Decimal::ZERO, 5), Decimal::ZERO);
        // value 0, outlay 100 -> total -200% -> floor
        assert_eq!(annualized_roi(dec!(0), dec!(0), dec!(0), dec!(100), 5), dec!(-100));
        // doubles over one year: (200 - 100) / 100 = 100%
        assert_eq!(annualized_roi(dec!(300), dec!(0), dec!(0), dec!(100), 1), dec!(100));
    }

    #[test]
    fn test_break_even_compares_value_with_outlay() {
        // 30M at +5% against 12M cash plus 153,134 a month: month 1
        let a = analyze(&land(), &credit(), &AnalysisAssumptions::default());
        assert_eq!(a.break_even_month, Some(1));
        // Net of the 24M loan the owner needs years of appreciation
        assert_eq!(a.equity_break_even_month, Some(90));
    }

    #[test]
    fn test_break_even_without_debt_is_immediate() {
        let credit = CreditScenario::new("c0", "Cash", dec!(0), dec!(0), dec!(4.6), 20);
        let a = analyze(&land(), &credit, &AnalysisAssumptions::default());
        // Price paid in cash; any appreciation lifts the value above it at month 1
        assert_eq!(a.break_even_month, Some(1));
        assert_eq!(a.equity_break_even_month, Some(1));
        assert_eq!(a.advanced_metrics.dscr, dec!(999));
    }

    #[test]
    fn test_break_even_requires_value_to_exceed_outlay() {
        // No appreciation, all cash: value equals the outlay but never exceeds it
        let mut land = land();
        land.expected_annual_appreciation = Decimal::ZERO;
        let credit = CreditScenario::new("c0", "Cash", dec!(0), dec!(0), dec!(4.6), 20);
        let a = analyze(&land, &credit, &AnalysisAssumptions::default());
        assert_eq!(a.cash_required, land.price);
        assert_eq!(a.break_even_month, None);
    }

    #[test]
    fn test_no_break_even_with_depreciation() {
        let mut land = land();
        land.expected_annual_appreciation = dec!(-5);
        let credit = CreditScenario::new("c0", "Cash", dec!(0), dec!(0), dec!(4.6), 20);
        let a = analyze(&land, &credit, &AnalysisAssumptions::default());
        // Bought outright: the shrinking value never gets back to the price paid
        assert_eq!(a.break_even_month, None);
        assert_eq!(a.equity_break_even_month, None);
        assert!(a.roi_10y < Decimal::ZERO);
    }

    #[test]
    fn test_tax_uses_average_interest() {
        let mut credit = credit();
        credit.preferential_tax_regime = true;
        credit.closing_costs.stamp_tax = dec!(192000);
        let a = analyze(&land(), &credit, &AnalysisAssumptions::default());
        let expected_avg = a.true_cost.total_interest_paid / dec!(20);
        assert_eq!(a.tax_analysis.annual_interest_paid, expected_avg);
        assert_eq!(a.tax_analysis.stamp_tax_savings, dec!(96000));
    }

    #[test]
    fn test_residual_only_with_development_plan() {
        let a = analyze(&land(), &credit(), &AnalysisAssumptions::default());
        assert!(a.residual_value.is_none());

        let mut land = land();
        land.development_potential = Some(DevelopmentPotential {
            buildable_area: dec!(3000),
            gross_development_value: Some(dec!(100000000)),
            construction_cost: Some(dec!(40000000)),
            ..DevelopmentPotential::default()
        });
        let a = analyze(&land, &credit(), &AnalysisAssumptions::default());
        let r = a.residual_value.unwrap();
        // 100M - 40M - 20% margin
        assert_eq!(r.residual_value, dec!(40000000));
        assert_eq!(r.value_per_unit_area, Some(dec!(8000)));
    }

    #[test]
    fn test_run_analysis_rejects_negative_price() {
        let mut land = land();
        land.price = dec!(-1);
        let input = ComboInput {
            land,
            credit: credit(),
            assumptions: None,
        };
        assert!(matches!(
            run_analysis(&input),
            Err(LandCreditError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_run_analysis_rejects_total_depreciation() {
        let mut land = land();
        land.expected_annual_appreciation = dec!(-100);
        let input = ComboInput {
            land,
            credit: credit(),
            assumptions: None,
        };
        assert!(run_analysis(&input).is_err());
    }

    fn rejected_field(land: LandOpportunity, credit: CreditScenario) -> String {
        let input = ComboInput {
            land,
            credit,
            assumptions: None,
        };
        match run_analysis(&input) {
            Err(LandCreditError::InvalidInput { field, .. }) => field,
            other => panic!("expected InvalidInput, got {:?}", other.map(|o| o.result.analysis.score)),
        }
    }

    #[test]
    fn test_run_analysis_rejects_term_beyond_limit() {
        let mut credit = credit();
        credit.term_years = 1000;
        assert_eq!(rejected_field(land(), credit.clone()), "credit.term_years");

        // The infallible path clamps the schedule instead of overflowing
        let a = analyze(&land(), &credit, &AnalysisAssumptions::default());
        assert!(a.score <= 100);
        assert!(a.true_cost.down_payment_opportunity_cost > Decimal::ZERO);
    }

    #[test]
    fn test_run_analysis_rejects_extreme_appreciation() {
        let mut land = land();
        land.expected_annual_appreciation = dec!(2000);
        assert_eq!(
            rejected_field(land.clone(), credit()),
            "land.expected_annual_appreciation"
        );

        // 21x a year for 20 years saturates instead of overflowing
        let a = analyze(&land, &credit(), &AnalysisAssumptions::default());
        assert_eq!(a.projections[2].projected_value, Decimal::MAX);
        assert_eq!(a.break_even_month, Some(1));
    }

    #[test]
    fn test_run_analysis_rejects_extreme_rate() {
        let mut credit = credit();
        credit.annual_interest_rate = dec!(500);
        credit.term_years = 30;
        assert_eq!(rejected_field(land(), credit.clone()), "credit.annual_interest_rate");

        let a = analyze(&land(), &credit, &AnalysisAssumptions::default());
        // Effectively interest-only: 24M * 500% / 12
        assert_eq!(a.monthly_payment, dec!(10000000));
        assert!(a.advanced_metrics.loan_to_value > Decimal::ZERO);
    }

    #[test]
    fn test_run_analysis_rejects_amount_beyond_limit() {
        let mut land = land();
        land.price = MAX_AMOUNT + Decimal::ONE;
        assert_eq!(rejected_field(land, credit()), "land.price");
    }

    #[test]
    fn test_run_analysis_warns_on_inconsistent_credit() {
        let mut credit = credit();
        credit.effective_credit_amount = dec!(25000000);
        let input = ComboInput {
            land: land(),
            credit,
            assumptions: None,
        };
        let out = run_analysis(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("effective credit")));
        assert_eq!(out.result.analysis.true_cost.effective_credit, dec!(24000000));
    }

    #[test]
    fn test_run_analysis_uses_supplied_assumptions() {
        let assumptions = AnalysisAssumptions {
            opportunity_cost_rate: dec!(0),
            ..AnalysisAssumptions::default()
        };
        let input = ComboInput {
            land: land(),
            credit: credit(),
            assumptions: Some(assumptions),
        };
        let out = run_analysis(&input).unwrap();
        assert_eq!(
            out.result.analysis.true_cost.down_payment_opportunity_cost,
            Decimal::ZERO
        );
        assert_eq!(out.assumptions["opportunity_cost_rate"], "0");
    }
}
