use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::analysis::combo::{self, ComboInput};
use crate::analysis::metrics;
use crate::assumptions::AnalysisAssumptions;
use crate::credit::amortization;
use crate::credit::true_cost;
use crate::error::LandCreditError;
use crate::types::*;
use crate::LandCreditResult;

/// Horizon the shocks are applied at.
pub const STRESS_HORIZON_YEARS: u32 = 10;

/// A one-off change to the projected land value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppreciationShock {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Change applied to the projected value, in percent (-20 = 20% lower)
    pub impact_pct: Percent,
}

impl AppreciationShock {
    fn new(name: &str, description: &str, impact_pct: Percent) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            impact_pct,
        }
    }
}

/// Crash, correction, boom and inflation-spike shocks.
pub fn default_shocks() -> Vec<AppreciationShock> {
    vec![
        AppreciationShock::new("market_crash", "Land values fall sharply", dec!(-20)),
        AppreciationShock::new("market_correction", "Moderate price correction", dec!(-10)),
        AppreciationShock::new("market_boom", "Strong demand lifts land values", dec!(30)),
        AppreciationShock::new(
            "inflation_spike",
            "Real value eroded by high inflation",
            dec!(-5),
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShockResult {
    pub name: String,
    pub description: String,
    pub impact_pct: Percent,
    pub shocked_value: Money,
    pub shocked_roi: Percent,
    /// Shocked ROI minus base ROI, in percentage points
    pub roi_change: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressReport {
    pub horizon_years: u32,
    pub base_value: Money,
    pub base_roi: Percent,
    pub results: Vec<ShockResult>,
}

/// Apply each shock to the 10-year projected value and report the shocked
/// annualized ROI against the base case. An empty `shocks` slice runs the
/// default set.
pub fn stress_appreciation(
    input: &ComboInput,
    shocks: &[AppreciationShock],
    assumptions: Option<&AnalysisAssumptions>,
) -> LandCreditResult<ComputationOutput<StressReport>> {
    let start = Instant::now();
    let assumptions = assumptions
        .cloned()
        .or_else(|| input.assumptions.clone())
        .unwrap_or_default();

    let mut warnings = combo::validate_pair(&input.land, &input.credit)?;

    let defaults;
    let shocks = if shocks.is_empty() {
        defaults = default_shocks();
        &defaults[..]
    } else {
        shocks
    };
    for shock in shocks {
        if shock.impact_pct <= dec!(-100) {
            return Err(LandCreditError::InvalidInput {
                field: format!("shock:{}", shock.name),
                reason: "Impact must be greater than -100%".into(),
            });
        }
    }

    let (tc, schedule) = true_cost::calculate_true_cost_with_schedule(&input.credit, &assumptions);
    let cash_required = metrics::cash_required(&input.land, &tc);
    if cash_required.is_zero() {
        warnings.push("No cash required; ROI is reported as zero for every shock".into());
    }

    let month = STRESS_HORIZON_YEARS * 12;
    let balance = amortization::balance_after(&schedule, month, tc.effective_credit);
    let paid = amortization::paid_through(&schedule, month);
    let roi = |value: Money| {
        combo::annualized_roi(value, balance, paid, cash_required, STRESS_HORIZON_YEARS)
    };

    let base_value = combo::projected_value(&input.land, STRESS_HORIZON_YEARS);
    let base_roi = roi(base_value);

    let results: Vec<ShockResult> = shocks
        .iter()
        .map(|shock| {
            let shocked_value =
                base_value.saturating_mul(Decimal::ONE + pct_to_rate(shock.impact_pct));
            let shocked_roi = roi(shocked_value);
            ShockResult {
                name: shock.name.clone(),
                description: shock.description.clone(),
                impact_pct: shock.impact_pct,
                shocked_value: round_currency(shocked_value),
                shocked_roi,
                roi_change: shocked_roi - base_roi,
            }
        })
        .collect();

    debug!(
        land_id = %input.land.id,
        credit_id = %input.credit.id,
        shocks = results.len(),
        base_roi = %base_roi,
        "appreciation stress complete"
    );

    let report = StressReport {
        horizon_years: STRESS_HORIZON_YEARS,
        base_value: round_currency(base_value),
        base_roi,
        results,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Appreciation stress test (shocks to 10-year projected land value)",
        &serde_json::json!({
            "horizon_years": STRESS_HORIZON_YEARS,
            "num_shocks": shocks.len(),
        }),
        warnings,
        elapsed,
        report,
    ))
}
