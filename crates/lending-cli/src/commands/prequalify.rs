use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use lending_core::offers::catalog::{CatalogKind, ProductKind};
use lending_core::prequalification::agreement::AgreementSection;
use lending_core::prequalification::application::{
    run_prequalification, PreQualificationScript, DEFAULT_INCOME,
};

use crate::config::LendConfig;
use crate::input;

/// Arguments for a pre-qualification run
#[derive(Args)]
pub struct PrequalifyArgs {
    /// Path to JSON application script (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Stated annual income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Consent to a soft credit pull
    #[arg(long)]
    pub consent: bool,

    /// Catalog the offer comes from
    #[arg(long, default_value = "prequalification")]
    pub catalog: CatalogKind,

    /// Offer to accept
    #[arg(long)]
    pub product: Option<ProductKind>,

    /// Customized amount (defaults to the offer maximum)
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Customized term in months (defaults to the longest available)
    #[arg(long, alias = "term-months")]
    pub term: Option<u32>,

    /// One-time passcode
    #[arg(long)]
    pub otp: Option<String>,

    /// Agreement sections to acknowledge: terms, privacy, electronic
    #[arg(long, value_delimiter = ',', value_parser = parse_section)]
    pub acknowledge: Vec<AgreementSection>,

    /// Disbursement date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub disbursement_date: Option<NaiveDate>,
}

pub fn run_prequalify(args: PrequalifyArgs, config: &LendConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let script: PreQualificationScript = match input::load(args.input.as_deref())? {
        Some(script) => script,
        None => PreQualificationScript {
            income: args.income.unwrap_or(DEFAULT_INCOME),
            soft_pull_consent: args.consent,
            catalog: args.catalog,
            product: args.product.ok_or("--product is required (or provide --input)")?,
            amount: args.amount,
            term_months: args.term,
            otp: args.otp.ok_or("--otp is required (or provide --input)")?,
            acknowledged: args.acknowledge,
            disbursement_date: args
                .disbursement_date
                .unwrap_or_else(|| Local::now().date_naive()),
        },
    };

    let result = run_prequalification(&script, &config.verification.otp_code)?;
    Ok(serde_json::to_value(result)?)
}

fn parse_section(s: &str) -> Result<AgreementSection, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "terms" => Ok(AgreementSection::Terms),
        "privacy" => Ok(AgreementSection::Privacy),
        "electronic" => Ok(AgreementSection::Electronic),
        other => Err(format!("unknown agreement section '{other}'")),
    }
}
