use land_credit_core::assumptions::AnalysisAssumptions;
use land_credit_core::credit::{amortization, scenario::CreditScenario, tax, true_cost};
use land_credit_core::time_value::{self, IrrSettings};
use land_credit_core::LandCreditError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Amortization
// ===========================================================================

#[test]
fn test_reference_mortgage_schedule() {
    let schedule = amortization::generate_schedule(dec!(24_000_000), dec!(4.6), 20, Decimal::ZERO);
    assert_eq!(schedule.len(), 240);

    // Level payment 153,134.41 -> 153,134 after rounding
    let payment = amortization::monthly_payment(dec!(24_000_000), dec!(4.6), 240);
    assert!((payment - dec!(153_134.41)).abs() < dec!(0.01));

    let summary = amortization::summarize(&schedule);
    assert_eq!(summary.total_principal, dec!(24_000_000));
    assert_eq!(summary.total_interest, dec!(12_752_258));
    assert_eq!(summary.yearly.len(), 20);
    assert_eq!(summary.yearly[0].interest, dec!(1_088_334));
    assert_eq!(summary.yearly[0].closing_balance, dec!(23_250_721));
}

#[test]
fn test_schedule_balances_and_cumulatives() {
    let schedule = amortization::generate_schedule(dec!(24_000_000), dec!(4.6), 20, Decimal::ZERO);
    assert_eq!(
        amortization::balance_after(&schedule, 60, dec!(24_000_000)),
        dec!(19_884_643)
    );
    assert_eq!(
        amortization::balance_after(&schedule, 120, dec!(24_000_000)),
        dec!(14_707_333)
    );
    assert_eq!(
        amortization::balance_after(&schedule, 0, dec!(24_000_000)),
        dec!(24_000_000)
    );
    assert_eq!(
        amortization::balance_after(&schedule, 999, dec!(24_000_000)),
        Decimal::ZERO
    );
    assert_eq!(amortization::paid_through(&schedule, 60), dec!(9_188_065));

    // Cumulative columns are monotone and end at the totals
    for pair in schedule.windows(2) {
        assert!(pair[1].cumulative_interest >= pair[0].cumulative_interest);
        assert!(pair[1].remaining_balance <= pair[0].remaining_balance);
    }
    let last = schedule.last().unwrap();
    assert_eq!(last.remaining_balance, Decimal::ZERO);
    assert_eq!(last.cumulative_principal, dec!(24_000_000));
}

#[test]
fn test_zero_rate_schedule() {
    let schedule = amortization::generate_schedule(dec!(120_000), Decimal::ZERO, 1, Decimal::ZERO);
    assert_eq!(schedule.len(), 12);
    for entry in &schedule {
        assert_eq!(entry.payment, dec!(10_000));
        assert_eq!(entry.interest, Decimal::ZERO);
    }
}

#[test]
fn test_insurance_adds_to_each_payment() {
    let schedule = amortization::generate_schedule(dec!(120_000), Decimal::ZERO, 1, dec!(500));
    let summary = amortization::summarize(&schedule);
    assert_eq!(summary.total_insurance, dec!(6_000));
    assert_eq!(schedule[0].payment, dec!(10_500));
}

// ===========================================================================
// True cost and tax
// ===========================================================================

fn reference_credit() -> CreditScenario {
    let mut credit = CreditScenario::new(
        "banco-uno-20",
        "Banco Uno",
        dec!(30_000_000),
        dec!(6_000_000),
        dec!(4.6),
        20,
    );
    credit.closing_costs.notary = dec!(150_000);
    credit.closing_costs.registration = dec!(250_000);
    credit.closing_costs.stamp_tax = dec!(192_000);
    credit.required_monthly_income = dec!(500_000);
    credit
}

#[test]
fn test_true_cost_reference_credit() {
    let tc = true_cost::calculate_true_cost(&reference_credit(), &AnalysisAssumptions::default());
    assert_eq!(tc.effective_credit, dec!(24_000_000));
    assert_eq!(tc.operational_expenses, dec!(592_000));
    assert_eq!(tc.total_cash_required, dec!(6_592_000));
    assert_eq!(tc.monthly_payment, dec!(153_134));
    assert_eq!(tc.total_interest_paid, dec!(12_752_258));
    assert_eq!(tc.total_credit_cost, dec!(36_752_258));
    // 153,134 / 500,000 = 30.63% > 25%
    assert_eq!(tc.payment_to_income_ratio, dec!(30.63));
    assert!(!tc.meets_income_requirement);
}

#[test]
fn test_effective_credit_never_negative() {
    for down in [dec!(0), dec!(29_999_999), dec!(30_000_000), dec!(45_000_000)] {
        let mut credit = reference_credit();
        credit.required_down_payment = down;
        let tc = true_cost::calculate_true_cost(&credit, &AnalysisAssumptions::default());
        assert_eq!(tc.effective_credit, (dec!(30_000_000) - down).max(Decimal::ZERO));
    }
}

#[test]
fn test_tax_cap_binds_for_large_interest() {
    let a = AnalysisAssumptions::default();
    let t = tax::calculate_tax_benefits(dec!(10_000_000), false, 20, &a);
    assert_eq!(t.deductible_interest, dec!(6_225_984));
    assert_eq!(t.annual_tax_benefit, dec!(933_897.60));
    assert_eq!(t.lifetime_tax_benefit, dec!(18_677_952.00));
}

#[test]
fn test_stamp_tax_relief_only_when_preferential() {
    let a = AnalysisAssumptions::default();
    assert_eq!(tax::stamp_tax_relief(dec!(192_000), true, &a), dec!(96_000));
    assert_eq!(tax::stamp_tax_relief(dec!(192_000), false, &a), Decimal::ZERO);
}

// ===========================================================================
// IRR
// ===========================================================================

#[test]
fn test_irr_single_period() {
    let sol = time_value::irr(&[dec!(-100), dec!(121)], &IrrSettings::default()).unwrap();
    assert!(sol.converged);
    assert!((sol.rate - dec!(0.21)).abs() < dec!(0.000001));
}

#[test]
fn test_irr_requires_two_flows() {
    let err = time_value::irr(&[dec!(-100)], &IrrSettings::default()).unwrap_err();
    assert!(matches!(err, LandCreditError::InsufficientData(_)));
}

#[test]
fn test_irr_without_sign_change_is_not_converged() {
    let sol = time_value::irr(&[dec!(100), dec!(100), dec!(100)], &IrrSettings::default()).unwrap();
    assert!(!sol.converged);

    let zeros = time_value::irr(&[Decimal::ZERO; 3], &IrrSettings::default()).unwrap();
    assert!(!zeros.converged);
    assert_eq!(zeros.rate, Decimal::ZERO);
}
