use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Instant;

use land_credit_core::assumptions::AnalysisAssumptions;
use land_credit_core::credit::amortization;
use land_credit_core::credit::scenario::CreditScenario;
use land_credit_core::credit::tax;
use land_credit_core::credit::true_cost;
use land_credit_core::time_value::{self, IrrSettings};
use land_credit_core::with_metadata;

use crate::input;

/// Arguments for an amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to a credit scenario JSON file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (4.6 = 4.6%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Monthly insurance premium
    #[arg(long)]
    pub insurance: Option<Decimal>,

    /// Only print yearly totals
    #[arg(long)]
    pub yearly: bool,
}

/// Arguments for the true cost of a credit offer
#[derive(Args)]
pub struct TrueCostArgs {
    /// Path to a credit scenario JSON file
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the mortgage-interest tax benefit
#[derive(Args)]
pub struct TaxArgs {
    /// Annual interest paid
    #[arg(long)]
    pub annual_interest: Decimal,

    /// Years the benefit is claimed
    #[arg(long, default_value_t = 1)]
    pub years: u32,

    /// The credit qualifies for the preferential housing regime
    #[arg(long)]
    pub preferential: bool,

    /// Stamp tax paid at closing
    #[arg(long)]
    pub stamp_tax: Option<Decimal>,
}

/// Arguments for an IRR calculation
#[derive(Args)]
pub struct IrrArgs {
    /// Comma-separated cash flows, initial outlay first (e.g. -100,10,121)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub cash_flows: Option<Vec<Decimal>>,

    /// Path to a JSON array of cash flows
    #[arg(long)]
    pub input: Option<String>,

    /// Also report NPV at this periodic rate (decimal, 0.08 = 8%)
    #[arg(long, allow_hyphen_values = true)]
    pub discount_rate: Option<Decimal>,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let (principal, rate, years, insurance) = if let Some(ref path) = args.input {
        let credit: CreditScenario = input::file::read_json(path)?;
        schedule_terms(&credit)
    } else if let Some(credit) = input::stdin::read_stdin::<CreditScenario>()? {
        schedule_terms(&credit)
    } else {
        (
            args.principal
                .ok_or("--principal is required (or provide --input)")?,
            args.rate.ok_or("--rate is required (or provide --input)")?,
            args.years.ok_or("--years is required (or provide --input)")?,
            args.insurance.unwrap_or(Decimal::ZERO),
        )
    };

    amortization::validate_terms(principal, rate, years, insurance)?;

    let schedule = amortization::generate_schedule(principal, rate, years, insurance);
    let summary = amortization::summarize(&schedule);

    let result = if args.yearly {
        serde_json::to_value(&summary)?
    } else {
        serde_json::json!({
            "summary": summary,
            "entries": schedule,
        })
    };

    let output = with_metadata(
        "Level-payment (French) amortization, rounded cumulative totals",
        &serde_json::json!({
            "principal": principal.to_string(),
            "annual_rate_pct": rate.to_string(),
            "years": years,
            "monthly_insurance": insurance.to_string(),
        }),
        Vec::new(),
        start.elapsed().as_micros() as u64,
        result,
    );
    Ok(serde_json::to_value(output)?)
}

fn schedule_terms(credit: &CreditScenario) -> (Decimal, Decimal, u32, Decimal) {
    (
        credit.effective_credit(),
        credit.annual_interest_rate,
        credit.term_years,
        credit.monthly_insurance,
    )
}

pub fn run_true_cost(
    args: TrueCostArgs,
    assumptions: Option<&AnalysisAssumptions>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let credit: CreditScenario = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <credit.json> is required (or pipe JSON on stdin)".into());
    };

    let assumptions = assumptions.cloned().unwrap_or_default();
    let analysis = true_cost::calculate_true_cost(&credit, &assumptions);

    let mut warnings = Vec::new();
    if !credit.is_consistent() {
        warnings.push(format!(
            "Stored effective credit {} differs from advertised - down payment; using {}",
            credit.effective_credit_amount, analysis.effective_credit
        ));
    }
    if credit.required_monthly_income > Decimal::ZERO && !analysis.meets_income_requirement {
        warnings.push(format!(
            "Payment-to-income {}% exceeds the {}% maximum",
            analysis.payment_to_income_ratio, credit.max_payment_to_income_ratio
        ));
    }

    let output = with_metadata(
        "True credit cost (down payment, closing costs, interest, insurance, opportunity cost)",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        analysis,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_tax(
    args: TaxArgs,
    assumptions: Option<&AnalysisAssumptions>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let assumptions = assumptions.cloned().unwrap_or_default();
    let mut analysis =
        tax::calculate_tax_benefits(args.annual_interest, args.preferential, args.years, &assumptions);
    if let Some(stamp_tax) = args.stamp_tax {
        analysis.stamp_tax_savings = tax::stamp_tax_relief(stamp_tax, args.preferential, &assumptions);
    }

    let output = with_metadata(
        "Mortgage-interest deduction at a flat effective rate, capped in tax units",
        &serde_json::json!({
            "reference_tax_unit_value": assumptions.reference_tax_unit_value.to_string(),
            "deduction_cap_tax_units": assumptions.deduction_cap_tax_units.to_string(),
            "effective_tax_rate": assumptions.effective_tax_rate.to_string(),
        }),
        Vec::new(),
        start.elapsed().as_micros() as u64,
        analysis,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_irr(
    args: IrrArgs,
    assumptions: Option<&AnalysisAssumptions>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let cash_flows: Vec<Decimal> = if let Some(flows) = args.cash_flows {
        flows
    } else if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--cash-flows is required (or provide --input)".into());
    };

    let settings = assumptions.map(IrrSettings::from).unwrap_or_default();
    let solution = time_value::irr(&cash_flows, &settings)?;

    // Zero iterations: no sign change, so there is no rate to report
    let undefined = !solution.converged && solution.iterations == 0;
    let mut warnings = Vec::new();
    if undefined {
        warnings.push("Cash flows need both an outflow and an inflow; IRR is undefined".into());
    } else if !solution.converged {
        warnings.push(format!(
            "IRR did not converge after {} iterations; {} is a best-effort estimate",
            solution.iterations, solution.rate
        ));
    }

    let npv = match args.discount_rate {
        Some(rate) => Some(time_value::npv(rate, &cash_flows)?),
        None => None,
    };

    let output = with_metadata(
        "Newton-Raphson IRR on periodic cash flows",
        &settings,
        warnings,
        start.elapsed().as_micros() as u64,
        serde_json::json!({
            "irr": (!undefined).then_some(solution.rate),
            "iterations": solution.iterations,
            "converged": solution.converged,
            "npv": npv,
        }),
    );
    Ok(serde_json::to_value(output)?)
}
