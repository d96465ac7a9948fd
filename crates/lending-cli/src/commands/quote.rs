use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use lending_core::offers::catalog::{CatalogKind, ProductKind};
use lending_core::offers::quote::{self, QuoteRequest};

use crate::input;

/// Arguments for pricing an offer
#[derive(Args)]
pub struct QuoteArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Catalog the product comes from
    #[arg(long, default_value = "prequalification")]
    pub catalog: CatalogKind,

    /// personal, auto, credit_card or mortgage
    #[arg(long)]
    pub product: Option<ProductKind>,

    /// Amount to borrow (defaults to the offer maximum)
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Term in months (defaults to the longest available)
    #[arg(long, alias = "term-months")]
    pub term: Option<u32>,
}

pub fn run_quote(args: QuoteArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: QuoteRequest = match input::load(args.input.as_deref())? {
        Some(request) => request,
        None => QuoteRequest {
            catalog: args.catalog,
            product: args.product.ok_or("--product is required (or provide --input)")?,
            amount: args.amount,
            term_months: args.term,
        },
    };

    let result = quote::calculate_quote(&request)?;
    Ok(serde_json::to_value(result)?)
}
