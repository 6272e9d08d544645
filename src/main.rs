//! Financial Tools CLI
//!
//! Command-line interface for running the advisory calculators
//!
//! ```bash
//! financial_tools allocate --age 32 --risk aggressive --amount 50000
//! financial_tools project --principal 10000 --rate 8 --years 20 --monthly 500
//! financial_tools call calculate_retirement_needs '{"current_age": 35, ...}'
//! financial_tools batch --input scenarios.csv --output results.csv
//! ```

use std::fmt::Display;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use serde::Serialize;

use financial_tools::assumptions::DEFAULT_ASSUMPTIONS_FILE;
use financial_tools::scenario::{load_projection_scenarios, write_projection_summaries, write_schedule};
use financial_tools::{
    Assumptions, CompoundInterestInput, InvestmentComparisonInput, InvestmentOption,
    RetirementInput, RiskCategory, RiskTolerance, ScenarioRunner, StockMetricsInput, ToolCall,
};

/// Financial advisory calculators
#[derive(Parser)]
#[command(name = "financial_tools")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// CSV of `parameter,value` overrides for the default assumptions
    /// (falls back to data/advisory_assumptions.csv when present)
    #[arg(long, global = true)]
    assumptions: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable report
    Text,
    /// Pretty-printed JSON
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend a stocks/bonds/cash split
    Allocate {
        #[arg(long)]
        age: i32,
        #[arg(long)]
        risk: RiskTolerance,
        #[arg(long)]
        amount: f64,
    },

    /// Project compound growth with monthly contributions
    Project {
        #[arg(long)]
        principal: f64,
        /// Annual rate in percent
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        years: i32,
        #[arg(long, default_value_t = 0.0)]
        monthly: f64,
        /// Also write the year-end schedule to this CSV file
        #[arg(long)]
        schedule_csv: Option<PathBuf>,
    },

    /// Score a stock's fundamentals
    Evaluate {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: f64,
        #[arg(long, allow_hyphen_values = true)]
        pe: f64,
        #[arg(long)]
        dividend_yield: f64,
        #[arg(long, allow_hyphen_values = true)]
        revenue_growth: f64,
        #[arg(long)]
        debt_to_equity: f64,
    },

    /// Size a retirement corpus and the monthly savings to reach it
    Plan {
        #[arg(long)]
        current_age: i32,
        #[arg(long)]
        retirement_age: i32,
        #[arg(long)]
        savings: f64,
        #[arg(long)]
        income: f64,
        /// Expected annual return in percent
        #[arg(long)]
        expected_return: f64,
    },

    /// Compare two investment options
    Compare {
        #[arg(long)]
        a_name: String,
        #[arg(long, allow_hyphen_values = true)]
        a_return: f64,
        #[arg(long)]
        a_risk: RiskCategory,
        #[arg(long)]
        b_name: String,
        #[arg(long, allow_hyphen_values = true)]
        b_return: f64,
        #[arg(long)]
        b_risk: RiskCategory,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        years: i32,
    },

    /// Print the tool definitions offered to an agent runtime
    Tools,

    /// Invoke a tool by name with JSON keyword arguments
    Call {
        tool: String,
        #[arg(default_value = "{}")]
        arguments: String,
    },

    /// Project every growth scenario in a CSV file
    Batch {
        #[arg(long)]
        input: PathBuf,
        /// Summary CSV destination (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn emit<T: Serialize + Display>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", value),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

fn load_assumptions(path: Option<&Path>) -> Result<Assumptions> {
    let default_file = Path::new(DEFAULT_ASSUMPTIONS_FILE);
    let path = match path {
        Some(path) => path,
        None if default_file.is_file() => default_file,
        None => return Ok(Assumptions::default_advisory()),
    };
    info!("loading assumptions from {}", path.display());
    Assumptions::from_csv_path(path)
        .with_context(|| format!("failed to load assumptions from {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let assumptions = load_assumptions(cli.assumptions.as_deref())?;

    match cli.command {
        Commands::Allocate { age, risk, amount } => {
            let result = assumptions.allocation.allocate(&financial_tools::AllocationInput {
                age,
                risk_tolerance: risk,
                total_amount: amount,
            })?;
            emit(&result, cli.format)?;
        }

        Commands::Project {
            principal,
            rate,
            years,
            monthly,
            schedule_csv,
        } => {
            let input = CompoundInterestInput {
                principal,
                annual_rate: rate,
                years,
                monthly_contribution: monthly,
            };
            let result = input.project(true)?;
            if let Some(path) = schedule_csv {
                let file = File::create(&path)
                    .with_context(|| format!("unable to create {}", path.display()))?;
                write_schedule(file, &result)?;
                info!("schedule written to {}", path.display());
            }
            emit(&result, cli.format)?;
        }

        Commands::Evaluate {
            name,
            price,
            pe,
            dividend_yield,
            revenue_growth,
            debt_to_equity,
        } => {
            let result = assumptions.stock.evaluate(&StockMetricsInput {
                name,
                current_price: price,
                pe_ratio: pe,
                dividend_yield,
                revenue_growth,
                debt_to_equity,
            })?;
            emit(&result, cli.format)?;
        }

        Commands::Plan {
            current_age,
            retirement_age,
            savings,
            income,
            expected_return,
        } => {
            let result = assumptions.retirement.plan(&RetirementInput {
                current_age,
                retirement_age,
                current_savings: savings,
                desired_annual_income: income,
                expected_return,
            })?;
            emit(&result, cli.format)?;
        }

        Commands::Compare {
            a_name,
            a_return,
            a_risk,
            b_name,
            b_return,
            b_risk,
            amount,
            years,
        } => {
            let result = assumptions.comparison.compare(&InvestmentComparisonInput {
                option_a: InvestmentOption::new(a_name, a_return, a_risk),
                option_b: InvestmentOption::new(b_name, b_return, b_risk),
                investment_amount: amount,
                time_horizon: years,
            })?;
            emit(&result, cli.format)?;
        }

        Commands::Tools => {
            let runner = ScenarioRunner::with_assumptions(assumptions);
            println!("{}", serde_json::to_string_pretty(&runner.registry().definitions())?);
        }

        Commands::Call { tool, arguments } => {
            let arguments: serde_json::Value =
                serde_json::from_str(&arguments).context("arguments must be a JSON object")?;
            let runner = ScenarioRunner::with_assumptions(assumptions);
            let data = runner.registry().call(&ToolCall::new(tool, arguments))?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }

        Commands::Batch { input, output } => {
            let file = File::open(&input)
                .with_context(|| format!("unable to open {}", input.display()))?;
            let scenarios = load_projection_scenarios(file)?;
            info!("loaded {} scenarios from {}", scenarios.len(), input.display());

            let runner = ScenarioRunner::with_assumptions(assumptions);
            let outcomes = runner.run_projections(&scenarios, false);

            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("unable to create {}", path.display()))?;
                    write_projection_summaries(file, &scenarios, &outcomes)?;
                    println!("Output written to {}", path.display());
                }
                None => write_projection_summaries(io::stdout().lock(), &scenarios, &outcomes)?,
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_assumptions_file_is_an_error() {
        let err = load_assumptions(Some(Path::new("data/no_such_assumptions.csv"))).unwrap_err();
        assert!(err.to_string().contains("no_such_assumptions.csv"));
    }

    #[test]
    fn test_falls_back_to_shipped_file() {
        assert!(Path::new(DEFAULT_ASSUMPTIONS_FILE).is_file());
        assert_eq!(load_assumptions(None).unwrap(), Assumptions::default_advisory());
    }
}
