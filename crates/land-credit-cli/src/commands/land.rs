use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Instant;

use land_credit_core::land::residual::{self, ResidualInput};
use land_credit_core::with_metadata;

use crate::input;

/// Arguments for a residual land valuation
#[derive(Args)]
pub struct ResidualArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Gross development value
    #[arg(long, alias = "gdv")]
    pub gross_development_value: Option<Decimal>,

    /// Construction cost
    #[arg(long)]
    pub construction_cost: Option<Decimal>,

    /// Professional fees
    #[arg(long)]
    pub fees: Option<Decimal>,

    /// Finance costs
    #[arg(long)]
    pub finance: Option<Decimal>,

    /// Marketing costs
    #[arg(long)]
    pub marketing: Option<Decimal>,

    /// Contingency
    #[arg(long)]
    pub contingency: Option<Decimal>,

    /// Developer margin on GDV (decimal, 0.20 = 20%)
    #[arg(long)]
    pub profit_margin: Option<Decimal>,

    /// Parcel area, to report value per unit area
    #[arg(long)]
    pub area: Option<Decimal>,
}

pub fn run_residual(args: ResidualArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let residual_input: ResidualInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        ResidualInput {
            gross_development_value: args
                .gross_development_value
                .ok_or("--gross-development-value is required (or provide --input)")?,
            construction_cost: args
                .construction_cost
                .ok_or("--construction-cost is required (or provide --input)")?,
            fees: args.fees.unwrap_or(Decimal::ZERO),
            finance: args.finance.unwrap_or(Decimal::ZERO),
            marketing: args.marketing.unwrap_or(Decimal::ZERO),
            contingency: args.contingency.unwrap_or(Decimal::ZERO),
            profit_margin: args
                .profit_margin
                .ok_or("--profit-margin is required (or provide --input)")?,
        }
    };

    let mut warnings = Vec::new();
    let mut valuation = residual::calculate_residual_land_value(&residual_input);
    if let Some(area) = args.area {
        valuation = valuation.with_area(area);
    }
    if valuation.residual_value.is_zero() {
        warnings.push(format!(
            "Development costs and profit ({}) consume the full GDV; residual floored at zero",
            valuation.total_costs
        ));
    }

    let output = with_metadata(
        "Residual land value: GDV less development costs and developer profit",
        &residual_input,
        warnings,
        start.elapsed().as_micros() as u64,
        valuation,
    );
    Ok(serde_json::to_value(output)?)
}
