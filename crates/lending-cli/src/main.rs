mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::offers::OffersArgs;
use commands::payment::PaymentArgs;
use commands::prequalify::PrequalifyArgs;
use commands::quote::QuoteArgs;
use commands::schedule::ScheduleArgs;
use config::LendConfig;

/// Loan payment estimates and pre-qualification
#[derive(Parser)]
#[command(
    name = "lend",
    version,
    about = "Loan payment estimates and pre-qualification",
    long_about = "A CLI for consumer lending calculations with decimal precision. \
                  Computes installment and revolving payments, amortization schedules, \
                  offer quotes, and runs the pre-qualification workflow."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (defaults to the config file's, then json)
    #[arg(long, global = true)]
    output: Option<OutputFormat>,

    /// Path to a TOML config file
    #[arg(long, global = true, env = "LEND_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly payment for a loan or credit line
    Payment(PaymentArgs),
    /// Month-by-month amortization schedule
    Schedule(ScheduleArgs),
    /// List offers with their estimated payments
    Offers(OffersArgs),
    /// Price an offer at a chosen amount and term
    Quote(QuoteArgs),
    /// Run a pre-qualification application end to end
    Prequalify(PrequalifyArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, Copy, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Yaml,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let config = match LendConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };
    init_tracing(&config);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::payment::run_payment(args),
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::Offers(args) => commands::offers::run_offers(args, &config),
        Commands::Quote(args) => commands::quote::run_quote(args),
        Commands::Prequalify(args) => commands::prequalify::run_prequalify(args, &config),
        Commands::Version => {
            println!("lend {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            let format = cli
                .output
                .or(config.output.format)
                .unwrap_or(OutputFormat::Json);
            output::format_output(&format, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

/// Logs go to stderr so they never mix with command output.
fn init_tracing(config: &LendConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
