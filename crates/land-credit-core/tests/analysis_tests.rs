use land_credit_core::analysis::combo::{self, ComboInput, LandCreditCombo};
use land_credit_core::analysis::compare;
use land_credit_core::analysis::scoring::Recommendation;
use land_credit_core::assumptions::AnalysisAssumptions;
use land_credit_core::credit::scenario::CreditScenario;
use land_credit_core::export::csv_export;
use land_credit_core::land::opportunity::{LandOpportunity, Zoning};
use land_credit_core::scenarios::stress;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn parcela_norte() -> LandOpportunity {
    let mut land = LandOpportunity::new(
        "parcela-norte",
        "Parcela Norte",
        dec!(30_000_000),
        dec!(5_000),
        dec!(36_000_000),
        dec!(5),
    );
    land.zoning = Zoning::Residential;
    land.has_utilities = true;
    land.has_road_access = true;
    land
}

fn banco_uno() -> CreditScenario {
    CreditScenario::new(
        "banco-uno-20",
        "Banco Uno",
        dec!(30_000_000),
        dec!(6_000_000),
        dec!(4.6),
        20,
    )
}

fn analysed(land: LandOpportunity, credit: CreditScenario) -> LandCreditCombo {
    let analysis = combo::analyze(&land, &credit, &AnalysisAssumptions::default());
    LandCreditCombo {
        land,
        credit,
        analysis,
    }
}

// ===========================================================================
// Combo analysis
// ===========================================================================

#[test]
fn test_reference_combo_roi_by_horizon() {
    let c = analysed(parcela_norte(), banco_uno());
    let a = &c.analysis;

    assert_eq!(a.cash_required, dec!(12_000_000));
    // (38.29M - 19.88M balance - 12M cash - 9.19M paid) / 12M, annualized over 5y
    assert!((a.roi_5y - dec!(-5.14)).abs() <= dec!(0.01));
    assert!((a.roi_10y - dec!(2.78)).abs() <= dec!(0.01));
    assert!((a.roi_20y - dec!(6.57)).abs() <= dec!(0.01));
    assert_eq!(a.projections[0].remaining_balance, dec!(19_884_643));
    assert_eq!(a.projections[0].cumulative_payments, dec!(9_188_065));
}

#[test]
fn test_score_and_recommendation_are_consistent() {
    let c = analysed(parcela_norte(), banco_uno());
    let a = &c.analysis;
    assert!(a.score <= 100);

    let rules = AnalysisAssumptions::default().scoring;
    let raw: i32 = rules.base_score + a.score_breakdown.iter().map(|s| s.points).sum::<i32>();
    assert_eq!(i32::from(a.score), raw.clamp(0, 100));
    let expected = land_credit_core::analysis::scoring::recommend(a.score, &rules.recommendation);
    assert_eq!(a.recommendation, expected);
}

#[test]
fn test_run_analysis_from_json() {
    let json = r#"{
        "land": {
            "id": "lote-7",
            "name": "Lote 7",
            "price": "45000000",
            "area": "2500",
            "appraisal_value": "50000000",
            "percentage_below_appraisal": "10",
            "zoning": "mixed",
            "has_utilities": true,
            "expected_annual_appreciation": "6",
            "estimated_rental_income": "300000"
        },
        "credit": {
            "id": "banco-dos",
            "bank_name": "Banco Dos",
            "advertised_credit_amount": "36000000",
            "required_down_payment": "9000000",
            "annual_interest_rate": "4.2",
            "term_years": 25,
            "preferential_tax_regime": true
        }
    }"#;
    let input: ComboInput = serde_json::from_str(json).unwrap();
    let out = combo::run_analysis(&input).unwrap();
    let a = &out.result.analysis;

    assert_eq!(a.true_cost.effective_credit, dec!(27_000_000));
    // 45M - 27M not covered by the credit, plus the 9M down payment
    assert_eq!(a.additional_cash_needed, dec!(18_000_000));
    assert_eq!(a.cash_required, dec!(27_000_000));
    assert_eq!(a.advanced_metrics.net_operating_income, dec!(2_700_000));
    assert_eq!(a.advanced_metrics.loan_to_value, dec!(60));
    assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    assert!(a
        .score_breakdown
        .iter()
        .any(|s| s.factor == "preferential_tax" && s.points == 3));
}

#[test]
fn test_unpaid_down_payment_exceeding_credit() {
    let mut credit = banco_uno();
    credit.required_down_payment = dec!(31_000_000);
    let out = combo::run_analysis(&ComboInput {
        land: parcela_norte(),
        credit,
        assumptions: None,
    })
    .unwrap();
    let a = &out.result.analysis;
    assert_eq!(a.monthly_payment, Decimal::ZERO);
    assert_eq!(a.advanced_metrics.dscr, dec!(999));
    assert!(out.warnings.iter().any(|w| w.contains("Effective credit is zero")));
}

// ===========================================================================
// Comparison and export
// ===========================================================================

#[test]
fn test_compare_picks_each_dimension() {
    let cheap_rate = {
        let mut c = banco_uno();
        c.id = "banco-tres".into();
        c.bank_name = "Banco Tres".into();
        c.annual_interest_rate = dec!(3.9);
        c
    };
    let small_down = {
        let mut c = banco_uno();
        c.id = "banco-cuatro".into();
        c.bank_name = "Banco Cuatro".into();
        c.required_down_payment = dec!(3_000_000);
        c
    };
    let combos = vec![
        analysed(parcela_norte(), banco_uno()),
        analysed(parcela_norte(), cheap_rate),
        analysed(parcela_norte(), small_down),
    ];
    let cmp = compare::compare(&combos);

    // Leverage: half the cash in for a slightly larger loan
    assert_eq!(cmp.best_by_roi.unwrap().credit.id, "banco-cuatro");
    assert_eq!(cmp.best_by_cash_required.unwrap().credit.id, "banco-cuatro");
    assert_eq!(cmp.best_by_monthly_payment.unwrap().credit.id, "banco-tres");
}

#[test]
fn test_comparison_csv_round_trips_labels() {
    let combos = vec![
        analysed(parcela_norte(), banco_uno()),
        analysed(parcela_norte(), banco_uno()),
    ];
    let csv = csv_export::export_comparison_csv(&combos).unwrap();
    let labels: Vec<&str> = csv
        .lines()
        .skip(1)
        .map(|l| l.split(',').next().unwrap_or_default())
        .collect();
    assert_eq!(labels, csv_export::ROW_LABELS.to_vec());
}

#[test]
fn test_recommendation_label_in_csv() {
    let c = analysed(parcela_norte(), banco_uno());
    let rows = csv_export::combo_csv_rows(&c);
    let (label, value) = rows.last().unwrap();
    assert_eq!(label, "Recommendation");
    assert_eq!(value, c.analysis.recommendation.label());
    assert!(matches!(
        c.analysis.recommendation,
        Recommendation::StrongBuy
            | Recommendation::Buy
            | Recommendation::Neutral
            | Recommendation::Avoid
            | Recommendation::StrongAvoid
    ));
}

// ===========================================================================
// Stress
// ===========================================================================

#[test]
fn test_stress_report_consistent_with_analysis() {
    let input = ComboInput {
        land: parcela_norte(),
        credit: banco_uno(),
        assumptions: None,
    };
    let report = stress::stress_appreciation(&input, &[], None).unwrap().result;
    let analysis = combo::analyze(&input.land, &input.credit, &AnalysisAssumptions::default());
    assert_eq!(report.base_roi, analysis.roi_10y);
    assert_eq!(report.results.len(), stress::default_shocks().len());
    // Worse shocks give lower ROI
    let roi: Vec<Decimal> = report.results.iter().map(|r| r.shocked_roi).collect();
    assert!(roi[0] < roi[1]);
    assert!(roi[1] < roi[3]);
    assert!(roi[3] < report.base_roi);
    assert!(roi[2] > report.base_roi);
}
