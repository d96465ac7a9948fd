use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use lending_core::amortization::{self, LoanTerms};

use crate::input;

/// Arguments for the monthly payment calculation
#[derive(Args)]
pub struct PaymentArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed, or credit line for revolving credit
    #[arg(long, alias = "amount")]
    pub principal: Option<Decimal>,

    /// Nominal APR as a percentage (7.99 = 7.99%)
    #[arg(long, alias = "apr")]
    pub rate: Option<Decimal>,

    /// Term in months; omit for revolving credit
    #[arg(long, alias = "term-months")]
    pub term: Option<u32>,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms: LoanTerms = match input::load(args.input.as_deref())? {
        Some(terms) => terms,
        None => terms_from_flags(args.principal, args.rate, args.term)?,
    };

    let result = amortization::calculate_payment(&terms)?;
    Ok(serde_json::to_value(result)?)
}

pub(crate) fn terms_from_flags(
    principal: Option<Decimal>,
    rate: Option<Decimal>,
    term: Option<u32>,
) -> Result<LoanTerms, Box<dyn std::error::Error>> {
    Ok(LoanTerms {
        principal: principal.ok_or("--principal is required (or provide --input)")?,
        annual_rate_percent: rate.ok_or("--rate is required (or provide --input)")?,
        term_months: term,
    })
}
