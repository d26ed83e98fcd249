use clap::Args;
use serde_json::Value;

use land_credit_core::analysis::combo::{self, ComboInput};
use land_credit_core::analysis::compare;
use land_credit_core::assumptions::AnalysisAssumptions;
use land_credit_core::export::csv_export;
use land_credit_core::scenarios::stress::{self, AppreciationShock};

use crate::input;

/// Arguments for analysing one land/credit pairing
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to JSON input file ({"land": {...}, "credit": {...}})
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for comparing several pairings
#[derive(Args)]
pub struct CompareArgs {
    /// Path to JSON file holding an array of pairings
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for appreciation stress scenarios
#[derive(Args)]
pub struct StressArgs {
    /// Path to JSON input file ({"land", "credit", optional "shocks"})
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for CSV export
#[derive(Args)]
pub struct ExportArgs {
    /// Path to JSON file holding one pairing or an array of pairings
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(serde::Deserialize)]
struct StressInput {
    #[serde(flatten)]
    combo: ComboInput,
    #[serde(default)]
    shocks: Vec<AppreciationShock>,
}

pub fn run_analyze(
    args: AnalyzeArgs,
    assumptions: Option<&AnalysisAssumptions>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut combo_input: ComboInput = read_required(&args.input)?;
    apply_assumptions(&mut combo_input, assumptions);
    let result = combo::run_analysis(&combo_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_compare(
    args: CompareArgs,
    assumptions: Option<&AnalysisAssumptions>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut inputs: Vec<ComboInput> = read_required(&args.input)?;
    for combo_input in &mut inputs {
        apply_assumptions(combo_input, assumptions);
    }
    let result = compare::compare_inputs(&inputs)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_stress(
    args: StressArgs,
    assumptions: Option<&AnalysisAssumptions>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let stress_input: StressInput = read_required(&args.input)?;
    let result = stress::stress_appreciation(&stress_input.combo, &stress_input.shocks, assumptions)?;
    Ok(serde_json::to_value(result)?)
}

/// Analyse and render the fixed-row CSV. One pairing gives `Metric,Value`;
/// several give one column each.
pub fn run_export(
    args: ExportArgs,
    assumptions: Option<&AnalysisAssumptions>,
) -> Result<String, Box<dyn std::error::Error>> {
    let value: Value = read_required(&args.input)?;
    let mut inputs: Vec<ComboInput> = match value {
        Value::Array(_) => serde_json::from_value(value)?,
        other => vec![serde_json::from_value(other)?],
    };

    let mut combos = Vec::with_capacity(inputs.len());
    for combo_input in &mut inputs {
        apply_assumptions(combo_input, assumptions);
        combos.push(combo::run_analysis(combo_input)?.result);
    }

    let csv = match combos.as_slice() {
        [single] => csv_export::export_combo_csv(single)?,
        many => csv_export::export_comparison_csv(many)?,
    };
    Ok(csv)
}

/// A file given with `--input` wins over piped stdin.
fn read_required<T: serde::de::DeserializeOwned>(
    path: &Option<String>,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        input::file::read_json(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(data)
    } else {
        Err("--input <file.json> is required (or pipe JSON on stdin)".into())
    }
}

/// Global `--assumptions` fill in pairings that carry none of their own.
fn apply_assumptions(combo_input: &mut ComboInput, assumptions: Option<&AnalysisAssumptions>) {
    if combo_input.assumptions.is_none() {
        combo_input.assumptions = assumptions.cloned();
    }
}
