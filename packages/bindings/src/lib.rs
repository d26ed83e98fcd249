use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use land_credit_core::analysis::combo::{self, ComboInput, LandCreditCombo};
use land_credit_core::analysis::compare;
use land_credit_core::assumptions::AnalysisAssumptions;
use land_credit_core::credit::scenario::CreditScenario;
use land_credit_core::credit::{amortization, tax, true_cost};
use land_credit_core::export::csv_export;
use land_credit_core::land::residual::{self, ResidualInput};
use land_credit_core::scenarios::stress::{self, AppreciationShock};
use land_credit_core::time_value::{self, IrrSettings};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<T: serde::de::DeserializeOwned>(json: &str) -> NapiResult<T> {
    serde_json::from_str(json).map_err(to_napi_error)
}

fn to_json(value: &impl serde::Serialize) -> NapiResult<String> {
    serde_json::to_string(value).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_combo(input_json: String) -> NapiResult<String> {
    let input: ComboInput = parse(&input_json)?;
    let output = combo::run_analysis(&input).map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn compare_combos(input_json: String) -> NapiResult<String> {
    let inputs: Vec<ComboInput> = parse(&input_json)?;
    let output = compare::compare_inputs(&inputs).map_err(to_napi_error)?;
    to_json(&output)
}

#[derive(Deserialize)]
struct StressRequest {
    #[serde(flatten)]
    combo: ComboInput,
    #[serde(default)]
    shocks: Vec<AppreciationShock>,
}

#[napi]
pub fn stress_appreciation(input_json: String) -> NapiResult<String> {
    let request: StressRequest = parse(&input_json)?;
    let output = stress::stress_appreciation(&request.combo, &request.shocks, None)
        .map_err(to_napi_error)?;
    to_json(&output)
}

// ---------------------------------------------------------------------------
// Credit
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ScheduleRequest {
    principal: Decimal,
    annual_interest_rate: Decimal,
    term_years: u32,
    #[serde(default)]
    monthly_insurance: Decimal,
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let req: ScheduleRequest = parse(&input_json)?;
    amortization::validate_terms(
        req.principal,
        req.annual_interest_rate,
        req.term_years,
        req.monthly_insurance,
    )
    .map_err(to_napi_error)?;
    let schedule = amortization::generate_schedule(
        req.principal,
        req.annual_interest_rate,
        req.term_years,
        req.monthly_insurance,
    );
    let summary = amortization::summarize(&schedule);
    to_json(&serde_json::json!({ "summary": summary, "entries": schedule }))
}

#[derive(Deserialize)]
struct TrueCostRequest {
    credit: CreditScenario,
    #[serde(default)]
    assumptions: AnalysisAssumptions,
}

#[napi]
pub fn true_credit_cost(input_json: String) -> NapiResult<String> {
    let req: TrueCostRequest = parse(&input_json)?;
    to_json(&true_cost::calculate_true_cost(&req.credit, &req.assumptions))
}

#[derive(Deserialize)]
struct TaxRequest {
    annual_interest_paid: Decimal,
    #[serde(default)]
    preferential_regime: bool,
    years: u32,
    #[serde(default)]
    stamp_tax: Decimal,
    #[serde(default)]
    assumptions: AnalysisAssumptions,
}

#[napi]
pub fn tax_benefits(input_json: String) -> NapiResult<String> {
    let req: TaxRequest = parse(&input_json)?;
    let mut analysis = tax::calculate_tax_benefits(
        req.annual_interest_paid,
        req.preferential_regime,
        req.years,
        &req.assumptions,
    );
    analysis.stamp_tax_savings =
        tax::stamp_tax_relief(req.stamp_tax, req.preferential_regime, &req.assumptions);
    to_json(&analysis)
}

#[derive(Deserialize)]
struct IrrRequest {
    cash_flows: Vec<Decimal>,
    #[serde(default)]
    assumptions: AnalysisAssumptions,
}

#[napi]
pub fn internal_rate_of_return(input_json: String) -> NapiResult<String> {
    let req: IrrRequest = parse(&input_json)?;
    let solution = time_value::irr(&req.cash_flows, &IrrSettings::from(&req.assumptions))
        .map_err(to_napi_error)?;
    to_json(&solution)
}

// ---------------------------------------------------------------------------
// Land
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ResidualRequest {
    #[serde(flatten)]
    input: ResidualInput,
    #[serde(default)]
    area: Option<Decimal>,
}

#[napi]
pub fn residual_land_value(input_json: String) -> NapiResult<String> {
    let req: ResidualRequest = parse(&input_json)?;
    let mut valuation = residual::calculate_residual_land_value(&req.input);
    if let Some(area) = req.area {
        valuation = valuation.with_area(area);
    }
    to_json(&valuation)
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// CSV for already analysed combos (the `result` of `analyzeCombo`).
#[napi]
pub fn export_csv(combos_json: String) -> NapiResult<String> {
    let combos: Vec<LandCreditCombo> = parse(&combos_json)?;
    match combos.as_slice() {
        [single] => csv_export::export_combo_csv(single),
        many => csv_export::export_comparison_csv(many),
    }
    .map_err(to_napi_error)
}
