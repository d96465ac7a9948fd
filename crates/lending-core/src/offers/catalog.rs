//! Hardcoded offer catalogs shown by the lending flows.
//!
//! Products carry only presentation data (amount ranges, APR, terms). Prices
//! are never stored here; they are derived through the amortization
//! calculator by [`super::quote`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::amortization::LoanTerms;
use crate::error::LendingError;
use crate::types::{Money, Months, Percent};
use crate::LendingResult;

/// Lowest amount offered on a pre-approved card, as a share of the maximum.
const PRE_APPROVED_MIN_SHARE: Decimal = dec!(0.2);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Personal,
    Auto,
    CreditCard,
    Mortgage,
    InstaCash,
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Personal => "personal",
            Self::Auto => "auto",
            Self::CreditCard => "credit_card",
            Self::Mortgage => "mortgage",
            Self::InstaCash => "instacash",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ProductKind {
    type Err = LendingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "personal" | "personal_loan" => Ok(Self::Personal),
            "auto" | "auto_loan" => Ok(Self::Auto),
            "credit" | "credit_card" | "card" => Ok(Self::CreditCard),
            "mortgage" => Ok(Self::Mortgage),
            "instacash" | "insta_cash" => Ok(Self::InstaCash),
            other => Err(LendingError::InvalidInput {
                field: "product".into(),
                reason: format!(
                    "Unknown product '{other}'; expected personal, auto, credit_card, mortgage or instacash"
                ),
            }),
        }
    }
}

/// APR as advertised on an offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AprQuote {
    Fixed { rate: Percent },
    /// Pre-approved range; the final rate depends on underwriting.
    Range { min: Percent, max: Percent },
}

impl AprQuote {
    /// Rate used to price an estimate. Ranges are priced at the top so the
    /// estimate is never lower than what the borrower may be offered.
    pub fn pricing_rate(&self) -> Percent {
        match self {
            Self::Fixed { rate } => *rate,
            Self::Range { max, .. } => *max,
        }
    }
}

/// Repayment terms a product can be booked with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TermOptions {
    /// No fixed term (credit cards).
    Revolving,
    /// Slider from `min` to `max` months in `step` increments.
    Range { min: Months, max: Months, step: Months },
    /// Explicit list of selectable terms.
    Fixed { terms: Vec<Months> },
}

impl TermOptions {
    pub fn allows(&self, term_months: Months) -> bool {
        match self {
            Self::Revolving => false,
            Self::Range { min, max, step } => {
                term_months >= *min
                    && term_months <= *max
                    && *step > 0
                    && (term_months - min) % step == 0
            }
            Self::Fixed { terms } => terms.contains(&term_months),
        }
    }

    /// Longest selectable term; the default selection on an offer.
    pub fn longest(&self) -> Option<Months> {
        match self {
            Self::Revolving => None,
            Self::Range { min, max, step } => {
                if *step == 0 || max < min {
                    Some(*min)
                } else {
                    Some(max - (max - min) % step)
                }
            }
            Self::Fixed { terms } => terms.iter().copied().max(),
        }
    }

    pub fn values(&self) -> Vec<Months> {
        match self {
            Self::Revolving => Vec::new(),
            Self::Range { min, max, step } => {
                if *step == 0 {
                    return vec![*min];
                }
                (*min..=*max).step_by(*step as usize).collect()
            }
            Self::Fixed { terms } => terms.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferProduct {
    pub kind: ProductKind,
    pub name: String,
    pub min_amount: Money,
    pub max_amount: Money,
    pub amount_step: Money,
    pub apr: AprQuote,
    pub terms: TermOptions,
}

impl OfferProduct {
    pub fn is_revolving(&self) -> bool {
        matches!(self.terms, TermOptions::Revolving)
    }

    /// Terms of the offer as first presented: the maximum amount over the
    /// longest term, priced at [`AprQuote::pricing_rate`].
    pub fn default_terms(&self) -> LoanTerms {
        LoanTerms {
            principal: self.max_amount,
            annual_rate_percent: self.apr.pricing_rate(),
            term_months: self.terms.longest(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    /// Offers returned after a soft credit pull.
    #[default]
    Prequalification,
    /// Product tiers shown once eligibility is confirmed.
    PreApproved,
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prequalification => write!(f, "prequalification"),
            Self::PreApproved => write!(f, "pre_approved"),
        }
    }
}

impl FromStr for CatalogKind {
    type Err = LendingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "prequalification" | "prequal" => Ok(Self::Prequalification),
            "pre_approved" | "preapproved" => Ok(Self::PreApproved),
            other => Err(LendingError::InvalidInput {
                field: "catalog".into(),
                reason: format!("Unknown catalog '{other}'; expected prequalification or pre_approved"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferCatalog {
    pub kind: CatalogKind,
    pub products: Vec<OfferProduct>,
}

impl OfferCatalog {
    pub fn for_kind(kind: CatalogKind) -> Self {
        match kind {
            CatalogKind::Prequalification => Self::prequalification(),
            CatalogKind::PreApproved => Self::pre_approved(),
        }
    }

    /// Fixed-rate offers presented after the soft credit pull.
    pub fn prequalification() -> Self {
        let slider = |kind: ProductKind,
                      name: &str,
                      max_amount: Money,
                      rate: Percent,
                      max_term: Option<Months>| {
            let min_amount = if kind == ProductKind::CreditCard {
                dec!(1000)
            } else {
                dec!(5000)
            };
            OfferProduct {
                kind,
                name: name.into(),
                min_amount,
                max_amount,
                amount_step: dec!(100),
                apr: AprQuote::Fixed { rate },
                terms: match max_term {
                    Some(max) => TermOptions::Range {
                        min: 12,
                        max,
                        step: 12,
                    },
                    None => TermOptions::Revolving,
                },
            }
        };

        OfferCatalog {
            kind: CatalogKind::Prequalification,
            products: vec![
                slider(ProductKind::Personal, "Personal Loan", dec!(25000), dec!(7.99), Some(60)),
                slider(ProductKind::Auto, "Auto Loan", dec!(35000), dec!(4.99), Some(72)),
                slider(ProductKind::CreditCard, "Credit Card", dec!(10000), dec!(14.99), None),
                slider(ProductKind::Mortgage, "Mortgage", dec!(300000), dec!(6.5), Some(360)),
            ],
        }
    }

    /// APR-range tiers shown on the pre-approved offer cards.
    pub fn pre_approved() -> Self {
        let tier = |kind: ProductKind,
                    name: &str,
                    max_amount: Money,
                    min: Percent,
                    max: Percent,
                    terms: TermOptions| OfferProduct {
            kind,
            name: name.into(),
            min_amount: max_amount * PRE_APPROVED_MIN_SHARE,
            max_amount,
            amount_step: Decimal::ONE,
            apr: AprQuote::Range { min, max },
            terms,
        };

        OfferCatalog {
            kind: CatalogKind::PreApproved,
            products: vec![
                tier(
                    ProductKind::Personal,
                    "Personal Loan",
                    dec!(25000),
                    dec!(8.99),
                    dec!(15.99),
                    TermOptions::Fixed {
                        terms: vec![12, 24, 36, 48, 60],
                    },
                ),
                tier(
                    ProductKind::CreditCard,
                    "Credit Card",
                    dec!(10000),
                    dec!(16.99),
                    dec!(24.99),
                    TermOptions::Revolving,
                ),
                tier(
                    ProductKind::Auto,
                    "Auto Loan",
                    dec!(35000),
                    dec!(4.99),
                    dec!(9.99),
                    TermOptions::Fixed {
                        terms: vec![36, 48, 60, 72],
                    },
                ),
            ],
        }
    }

    pub fn product(&self, kind: ProductKind) -> LendingResult<&OfferProduct> {
        self.products
            .iter()
            .find(|p| p.kind == kind)
            .ok_or_else(|| LendingError::NotFound(format!("no {kind} offer in the {} catalog", self.kind)))
    }
}

/// Single pre-approved loan sized from the member's cash flow, valid for a
/// limited number of hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstaCashOffer {
    pub amount: Money,
    pub term_months: Months,
    pub annual_rate_percent: Percent,
    pub expires_in_hours: u32,
}

impl Default for InstaCashOffer {
    fn default() -> Self {
        InstaCashOffer {
            amount: dec!(2500),
            term_months: 12,
            annual_rate_percent: dec!(9.99),
            expires_in_hours: 48,
        }
    }
}

impl InstaCashOffer {
    /// The offer as a product with a single selectable amount and term.
    pub fn as_product(&self) -> OfferProduct {
        OfferProduct {
            kind: ProductKind::InstaCash,
            name: "InstaCash".into(),
            min_amount: self.amount,
            max_amount: self.amount,
            amount_step: if self.amount > Decimal::ZERO {
                self.amount
            } else {
                Decimal::ONE
            },
            apr: AprQuote::Fixed {
                rate: self.annual_rate_percent,
            },
            terms: TermOptions::Fixed {
                terms: vec![self.term_months],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prequalification_catalog_contents() {
        let catalog = OfferCatalog::prequalification();
        assert_eq!(catalog.products.len(), 4);

        let card = catalog.product(ProductKind::CreditCard).unwrap();
        assert!(card.is_revolving());
        assert_eq!(card.min_amount, dec!(1000));

        let mortgage = catalog.product(ProductKind::Mortgage).unwrap();
        assert_eq!(mortgage.min_amount, dec!(5000));
        assert_eq!(mortgage.terms.longest(), Some(360));
        assert_eq!(mortgage.apr.pricing_rate(), dec!(6.5));
    }

    #[test]
    fn test_pre_approved_minimum_is_twenty_percent() {
        let catalog = OfferCatalog::pre_approved();
        let auto = catalog.product(ProductKind::Auto).unwrap();
        assert_eq!(auto.min_amount, dec!(7000));
        assert_eq!(auto.apr.pricing_rate(), dec!(9.99));
        assert!(catalog.product(ProductKind::Mortgage).is_err());
    }

    #[test]
    fn test_term_range_grid() {
        let terms = TermOptions::Range {
            min: 12,
            max: 60,
            step: 12,
        };
        assert!(terms.allows(36));
        assert!(!terms.allows(30));
        assert!(!terms.allows(72));
        assert_eq!(terms.values(), vec![12, 24, 36, 48, 60]);
        assert_eq!(terms.longest(), Some(60));
    }

    #[test]
    fn test_term_range_longest_stays_on_grid() {
        let terms = TermOptions::Range {
            min: 12,
            max: 50,
            step: 12,
        };
        assert_eq!(terms.longest(), Some(48));
    }

    #[test]
    fn test_product_kind_parsing() {
        assert_eq!("credit-card".parse::<ProductKind>().unwrap(), ProductKind::CreditCard);
        assert_eq!("Auto".parse::<ProductKind>().unwrap(), ProductKind::Auto);
        assert!("boat".parse::<ProductKind>().is_err());
    }

    #[test]
    fn test_instacash_as_product() {
        let offer = InstaCashOffer::default();
        let product = offer.as_product();
        assert_eq!(product.kind, ProductKind::InstaCash);
        assert_eq!(product.default_terms().term_months, Some(12));
        assert_eq!(product.default_terms().principal, dec!(2500));
    }
}
