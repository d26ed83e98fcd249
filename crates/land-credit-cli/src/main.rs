mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::analysis::{AnalyzeArgs, CompareArgs, ExportArgs, StressArgs};
use commands::credit::{IrrArgs, ScheduleArgs, TaxArgs, TrueCostArgs};
use commands::land::ResidualArgs;
use land_credit_core::assumptions::AnalysisAssumptions;

/// Land purchase and mortgage-credit analysis
#[derive(Parser)]
#[command(
    name = "lca",
    version,
    about = "Land purchase and mortgage-credit analysis",
    long_about = "A CLI for evaluating land purchases financed with mortgage credit, \
                  with decimal precision. Computes the true cost of a credit offer, \
                  amortization schedules, appreciation-based ROI, cap rate, DSCR, IRR, \
                  residual land value and a composite viability score."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// JSON or YAML file overriding analysis assumptions
    #[arg(long, global = true)]
    assumptions: Option<String>,

    /// Log calculation stages to stderr (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse one land/credit pairing
    Analyze(AnalyzeArgs),
    /// Analyse, rank and compare several pairings
    Compare(CompareArgs),
    /// Monthly amortization schedule
    Schedule(ScheduleArgs),
    /// True cost of a credit offer
    TrueCost(TrueCostArgs),
    /// Mortgage-interest tax benefit
    Tax(TaxArgs),
    /// Residual land value of a development scheme
    Residual(ResidualArgs),
    /// Internal rate of return of a cash-flow series
    Irr(IrrArgs),
    /// Appreciation stress scenarios for a pairing
    Stress(StressArgs),
    /// Export one or more pairings as CSV
    Export(ExportArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "land_credit_core=debug,lca=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_assumptions(
    path: &Option<String>,
) -> Result<Option<AnalysisAssumptions>, Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            let assumptions = input::file::read_assumptions(p)?;
            tracing::debug!(path = %p, "loaded assumption overrides");
            Ok(Some(assumptions))
        }
        None => Ok(None),
    }
}

fn fail(e: Box<dyn std::error::Error>) -> ! {
    eprintln!("{}: {}", "error".red().bold(), e);
    process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let assumptions = match load_assumptions(&cli.assumptions) {
        Ok(a) => a,
        Err(e) => fail(e),
    };
    let assumptions = assumptions.as_ref();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Analyze(args) => commands::analysis::run_analyze(args, assumptions),
        Commands::Compare(args) => commands::analysis::run_compare(args, assumptions),
        Commands::Schedule(args) => commands::credit::run_schedule(args),
        Commands::TrueCost(args) => commands::credit::run_true_cost(args, assumptions),
        Commands::Tax(args) => commands::credit::run_tax(args, assumptions),
        Commands::Residual(args) => commands::land::run_residual(args),
        Commands::Irr(args) => commands::credit::run_irr(args, assumptions),
        Commands::Stress(args) => commands::analysis::run_stress(args, assumptions),
        Commands::Export(args) => match commands::analysis::run_export(args, assumptions) {
            Ok(csv) => {
                print!("{}", csv);
                process::exit(0);
            }
            Err(e) => fail(e),
        },
        Commands::Version => {
            println!("lca {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => fail(e),
    }
}
