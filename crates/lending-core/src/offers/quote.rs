//! Pricing of offers at the amount and term a borrower selects.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::amortization::{calculate_payment, LoanTerms, PaymentOutput};
use crate::error::LendingError;
use crate::offers::catalog::{
    AprQuote, CatalogKind, InstaCashOffer, OfferCatalog, OfferProduct, ProductKind,
};
use crate::types::{with_metadata, ComputationOutput, Money, Months, Percent};
use crate::LendingResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub catalog: CatalogKind,
    pub product: ProductKind,
    /// Requested amount; the product maximum when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    /// Requested term; the longest available term when absent. Ignored for
    /// revolving products.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_months: Option<Months>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferQuote {
    pub product: ProductKind,
    pub name: String,
    pub amount: Money,
    pub apr: AprQuote,
    /// Rate the estimate is priced at.
    pub annual_rate_percent: Percent,
    pub term_months: Option<Months>,
    pub payment: PaymentOutput,
}

impl OfferQuote {
    pub fn terms(&self) -> LoanTerms {
        LoanTerms {
            principal: self.amount,
            annual_rate_percent: self.annual_rate_percent,
            term_months: self.term_months,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferBoard {
    pub catalog: CatalogKind,
    pub offers: Vec<OfferQuote>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstaCashQuote {
    pub quote: OfferQuote,
    pub expires_in_hours: u32,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Price `product` at `amount` over `term_months`.
///
/// The amount must sit on the product's slider grid and the term must be one
/// the product offers. Revolving products ignore the term.
pub fn quote_offer(
    product: &OfferProduct,
    amount: Money,
    term_months: Option<Months>,
) -> LendingResult<OfferQuote> {
    validate_amount(product, amount)?;
    let term_months = resolve_term(product, term_months)?;

    let terms = LoanTerms {
        principal: amount,
        annual_rate_percent: product.apr.pricing_rate(),
        term_months,
    };
    let payment = calculate_payment(&terms)?.result;

    debug!(
        product = %product.kind,
        amount = %amount,
        term_months = ?term_months,
        payment = %payment.monthly_payment,
        "offer quote"
    );

    Ok(OfferQuote {
        product: product.kind,
        name: product.name.clone(),
        amount,
        apr: product.apr.clone(),
        annual_rate_percent: terms.annual_rate_percent,
        term_months,
        payment,
    })
}

/// Resolve a request against its catalog and price it.
pub fn calculate_quote(request: &QuoteRequest) -> LendingResult<ComputationOutput<OfferQuote>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let catalog = OfferCatalog::for_kind(request.catalog);
    let product = catalog.product(request.product)?;

    if product.is_revolving() && request.term_months.is_some() {
        warnings.push(format!(
            "{} is revolving credit; the requested term is ignored.",
            product.name
        ));
    }
    if let AprQuote::Range { min, max } = &product.apr {
        warnings.push(format!(
            "Estimate priced at {max}% APR, the top of the {min}%-{max}% range."
        ));
    }

    let amount = request.amount.unwrap_or(product.max_amount);
    let quote = quote_offer(product, amount, request.term_months)?;

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "catalog": request.catalog,
        "default_amount": "product maximum",
        "default_term": "longest available term",
        "apr_range_pricing": "top of range",
    });

    Ok(with_metadata(
        "Offer quote priced through the level-payment calculator",
        &assumptions,
        warnings,
        elapsed,
        quote,
    ))
}

/// Price every product in a catalog at its default selection.
pub fn offer_board(catalog: &OfferCatalog) -> LendingResult<ComputationOutput<OfferBoard>> {
    let start = Instant::now();

    let offers = catalog
        .products
        .iter()
        .map(|product| {
            let defaults = product.default_terms();
            quote_offer(product, defaults.principal, defaults.term_months)
        })
        .collect::<LendingResult<Vec<_>>>()?;

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "selection": "maximum amount over the longest term",
        "apr_range_pricing": "top of range",
    });

    Ok(with_metadata(
        "Offer board",
        &assumptions,
        Vec::new(),
        elapsed,
        OfferBoard {
            catalog: catalog.kind,
            offers,
        },
    ))
}

/// Price the InstaCash offer.
pub fn quote_instacash(offer: &InstaCashOffer) -> LendingResult<ComputationOutput<InstaCashQuote>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if offer.expires_in_hours == 0 {
        warnings.push("InstaCash offer has expired.".into());
    }

    let product = offer.as_product();
    let quote = quote_offer(&product, offer.amount, Some(offer.term_months))?;

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "amount": "fixed by cash-flow underwriting",
        "expires_in_hours": offer.expires_in_hours,
    });

    Ok(with_metadata(
        "InstaCash offer quote",
        &assumptions,
        warnings,
        elapsed,
        InstaCashQuote {
            quote,
            expires_in_hours: offer.expires_in_hours,
        },
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_amount(product: &OfferProduct, amount: Money) -> LendingResult<()> {
    if amount < product.min_amount || amount > product.max_amount {
        return Err(LendingError::InvalidAmount {
            amount,
            reason: format!(
                "{} amounts range from {} to {}",
                product.name, product.min_amount, product.max_amount
            ),
        });
    }
    if product.amount_step > Decimal::ZERO
        && !((amount - product.min_amount) % product.amount_step).is_zero()
    {
        return Err(LendingError::InvalidAmount {
            amount,
            reason: format!(
                "{} amounts move in steps of {} from {}",
                product.name, product.amount_step, product.min_amount
            ),
        });
    }
    Ok(())
}

fn resolve_term(product: &OfferProduct, requested: Option<Months>) -> LendingResult<Option<Months>> {
    if product.is_revolving() {
        return Ok(None);
    }
    match requested {
        None => Ok(product.terms.longest()),
        Some(term) if product.terms.allows(term) => Ok(Some(term)),
        Some(term) => Err(LendingError::InvalidTerm {
            term_months: term,
            reason: format!(
                "{} is offered over {:?} months",
                product.name,
                product.terms.values()
            ),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
