use clap::Args;
use serde_json::Value;

use lending_core::offers::catalog::{CatalogKind, OfferCatalog};
use lending_core::offers::quote;

use crate::config::LendConfig;

/// Arguments for listing offers
#[derive(Args)]
pub struct OffersArgs {
    /// Catalog to list: prequalification or pre_approved
    #[arg(long, default_value = "prequalification")]
    pub catalog: CatalogKind,

    /// Show the InstaCash offer instead of a catalog
    #[arg(long, conflicts_with = "catalog")]
    pub instacash: bool,
}

pub fn run_offers(args: OffersArgs, config: &LendConfig) -> Result<Value, Box<dyn std::error::Error>> {
    if args.instacash {
        let result = quote::quote_instacash(&config.instacash)?;
        return Ok(serde_json::to_value(result)?);
    }

    let result = quote::offer_board(&OfferCatalog::for_kind(args.catalog))?;
    Ok(serde_json::to_value(result)?)
}
