use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use lending_core::amortization::{self, ScheduleInput};

use crate::commands::payment::terms_from_flags;
use crate::input;

/// Arguments for the amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long, alias = "amount")]
    pub principal: Option<Decimal>,

    /// Nominal APR as a percentage
    #[arg(long, alias = "apr")]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long, alias = "term-months")]
    pub term: Option<u32>,

    /// Due date of the first installment (YYYY-MM-DD)
    #[arg(long)]
    pub first_payment_date: Option<NaiveDate>,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: ScheduleInput = match input::load(args.input.as_deref())? {
        Some(data) => data,
        None => ScheduleInput {
            terms: terms_from_flags(args.principal, args.rate, args.term)?,
            first_payment_date: args.first_payment_date,
        },
    };

    let result = amortization::build_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}
