use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use lending_core::offers::catalog::{CatalogKind, InstaCashOffer, OfferCatalog};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn monthly_payment(input_json: String) -> NapiResult<String> {
    let input: lending_core::amortization::LoanTerms =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        lending_core::amortization::calculate_payment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: lending_core::amortization::ScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lending_core::amortization::build_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Offers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ListOffersInput {
    #[serde(default)]
    catalog: CatalogKind,
    /// Price this InstaCash offer instead of the catalog.
    #[serde(default)]
    instacash: Option<InstaCashOffer>,
}

#[napi]
pub fn list_offers(input_json: String) -> NapiResult<String> {
    let input: ListOffersInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    match input.instacash {
        Some(offer) => {
            let output =
                lending_core::offers::quote::quote_instacash(&offer).map_err(to_napi_error)?;
            serde_json::to_string(&output).map_err(to_napi_error)
        }
        None => {
            let catalog = OfferCatalog::for_kind(input.catalog);
            let output =
                lending_core::offers::quote::offer_board(&catalog).map_err(to_napi_error)?;
            serde_json::to_string(&output).map_err(to_napi_error)
        }
    }
}

#[napi]
pub fn quote_offer(input_json: String) -> NapiResult<String> {
    let input: lending_core::offers::quote::QuoteRequest =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lending_core::offers::quote::calculate_quote(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Pre-qualification
// ---------------------------------------------------------------------------

#[napi]
pub fn run_prequalification(input_json: String, verification_code: String) -> NapiResult<String> {
    let input: lending_core::prequalification::application::PreQualificationScript =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lending_core::prequalification::application::run_prequalification(
        &input,
        &verification_code,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
