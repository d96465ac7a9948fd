//! Pre-qualification application workflow.
//!
//! The application moves through a fixed sequence of steps:
//!
//! 1. `Income`: stated annual income and consent to a soft credit pull.
//! 2. `SelectOffer`: one offer from the pre-qualification catalog.
//! 3. `Customize`: amount and term within the offer's sliders.
//! 4. `Verify`: six-digit one-time passcode.
//! 5. `Agreement`: each disclosure section acknowledged, then signed.
//! 6. `Complete`: summary of the accepted loan.
//!
//! Every operation checks the current step; calls out of order fail with
//! [`LendingError::WorkflowViolation`] and leave the application unchanged.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Instant;
use tracing::debug;

use crate::error::LendingError;
use crate::offers::catalog::{CatalogKind, OfferCatalog, OfferProduct, ProductKind};
use crate::offers::quote::{quote_offer, OfferQuote};
use crate::prequalification::agreement::{draft_agreement, AgreementSection, LoanAgreement};
use crate::types::{with_metadata, ComputationOutput, Money, Months};
use crate::LendingResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const INCOME_MIN: Money = dec!(30000);
pub const INCOME_MAX: Money = dec!(500000);
pub const INCOME_STEP: Money = dec!(1000);
pub const DEFAULT_INCOME: Money = dec!(75000);

/// Number of digits in a one-time passcode.
pub const OTP_LENGTH: usize = 6;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStep {
    Income,
    SelectOffer,
    Customize,
    Verify,
    Agreement,
    Complete,
}

impl fmt::Display for ApplicationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Income => "income",
            Self::SelectOffer => "select_offer",
            Self::Customize => "customize",
            Self::Verify => "verify",
            Self::Agreement => "agreement",
            Self::Complete => "complete",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationSummary {
    pub income: Money,
    pub quote: OfferQuote,
    pub agreement: LoanAgreement,
    pub acknowledged: Vec<AgreementSection>,
}

/// A complete pass through the workflow, as submitted in one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreQualificationScript {
    #[serde(default = "default_income")]
    pub income: Money,
    pub soft_pull_consent: bool,
    #[serde(default)]
    pub catalog: CatalogKind,
    pub product: ProductKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_months: Option<Months>,
    pub otp: String,
    #[serde(default)]
    pub acknowledged: Vec<AgreementSection>,
    pub disbursement_date: NaiveDate,
}

fn default_income() -> Money {
    DEFAULT_INCOME
}

#[derive(Debug, Clone)]
pub struct PreQualification {
    catalog: OfferCatalog,
    verification_code: String,
    step: ApplicationStep,
    income: Money,
    soft_pull_consent: bool,
    selected: Option<OfferProduct>,
    amount: Money,
    term_months: Option<Months>,
    acknowledged: BTreeSet<AgreementSection>,
    summary: Option<ApplicationSummary>,
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

impl PreQualification {
    /// Start an application against `catalog`. `verification_code` is the
    /// passcode the borrower must enter at the verification step.
    pub fn new(catalog: OfferCatalog, verification_code: impl Into<String>) -> LendingResult<Self> {
        let verification_code = verification_code.into();
        validate_otp_format("verification_code", &verification_code)?;

        Ok(PreQualification {
            catalog,
            verification_code,
            step: ApplicationStep::Income,
            income: DEFAULT_INCOME,
            soft_pull_consent: false,
            selected: None,
            amount: Decimal::ZERO,
            term_months: None,
            acknowledged: BTreeSet::new(),
            summary: None,
        })
    }

    pub fn step(&self) -> ApplicationStep {
        self.step
    }

    pub fn income(&self) -> Money {
        self.income
    }

    pub fn offers(&self) -> &[OfferProduct] {
        &self.catalog.products
    }

    pub fn selected_offer(&self) -> Option<&OfferProduct> {
        self.selected.as_ref()
    }

    pub fn set_income(&mut self, income: Money) -> LendingResult<()> {
        self.expect_step(ApplicationStep::Income, "income can only be changed before offers are shown")?;
        if income < INCOME_MIN || income > INCOME_MAX {
            return Err(LendingError::InvalidInput {
                field: "income".into(),
                reason: format!("Annual income must be between {INCOME_MIN} and {INCOME_MAX}"),
            });
        }
        if !((income - INCOME_MIN) % INCOME_STEP).is_zero() {
            return Err(LendingError::InvalidInput {
                field: "income".into(),
                reason: format!("Annual income moves in steps of {INCOME_STEP}"),
            });
        }
        self.income = income;
        Ok(())
    }

    pub fn set_soft_pull_consent(&mut self, consent: bool) -> LendingResult<()> {
        self.expect_step(ApplicationStep::Income, "consent is given on the income step")?;
        self.soft_pull_consent = consent;
        Ok(())
    }

    /// Submit income and consent; offers become available.
    pub fn submit_income(&mut self) -> LendingResult<()> {
        self.expect_step(ApplicationStep::Income, "income was already submitted")?;
        if !self.soft_pull_consent {
            return Err(self.violation("soft credit pull consent is required to see offers"));
        }
        self.transition(ApplicationStep::SelectOffer);
        Ok(())
    }

    /// Choose an offer. The selection starts at the offer's maximum amount
    /// and longest term.
    pub fn select_offer(&mut self, kind: ProductKind) -> LendingResult<OfferQuote> {
        self.expect_step(ApplicationStep::SelectOffer, "an offer can only be chosen from the offer list")?;
        let product = self.catalog.product(kind)?.clone();
        let defaults = product.default_terms();
        let quote = quote_offer(&product, defaults.principal, defaults.term_months)?;

        self.amount = defaults.principal;
        self.term_months = defaults.term_months;
        self.selected = Some(product);
        self.transition(ApplicationStep::Customize);
        Ok(quote)
    }

    pub fn set_amount(&mut self, amount: Money) -> LendingResult<OfferQuote> {
        self.expect_step(ApplicationStep::Customize, "the amount is adjusted while customizing")?;
        let quote = quote_offer(self.selected_product()?, amount, self.term_months)?;
        self.amount = amount;
        Ok(quote)
    }

    pub fn set_term(&mut self, term_months: Months) -> LendingResult<OfferQuote> {
        self.expect_step(ApplicationStep::Customize, "the term is adjusted while customizing")?;
        let product = self.selected_product()?;
        if product.is_revolving() {
            return Err(LendingError::InvalidTerm {
                term_months,
                reason: format!("{} is revolving credit with no fixed term", product.name),
            });
        }
        let quote = quote_offer(product, self.amount, Some(term_months))?;
        self.term_months = Some(term_months);
        Ok(quote)
    }

    /// Current quote, priced at the customized amount and term.
    pub fn quote(&self) -> LendingResult<OfferQuote> {
        quote_offer(self.selected_product()?, self.amount, self.term_months)
    }

    /// Accept the customized offer and move on to passcode verification.
    pub fn request_verification(&mut self) -> LendingResult<()> {
        self.expect_step(ApplicationStep::Customize, "verification follows customization")?;
        self.transition(ApplicationStep::Verify);
        Ok(())
    }

    /// Check a passcode. A mismatch keeps the application on this step.
    pub fn verify_otp(&mut self, code: &str) -> LendingResult<()> {
        self.expect_step(ApplicationStep::Verify, "no passcode has been requested")?;
        validate_otp_format("otp", code)?;
        if code != self.verification_code {
            debug!(step = %self.step, "passcode mismatch");
            return Err(LendingError::VerificationFailed);
        }
        self.transition(ApplicationStep::Agreement);
        Ok(())
    }

    pub fn acknowledge(&mut self, section: AgreementSection, agreed: bool) -> LendingResult<()> {
        self.expect_step(ApplicationStep::Agreement, "agreement sections are shown after verification")?;
        if agreed {
            self.acknowledged.insert(section);
        } else {
            self.acknowledged.remove(&section);
        }
        Ok(())
    }

    pub fn all_sections_acknowledged(&self) -> bool {
        AgreementSection::ALL
            .iter()
            .all(|s| self.acknowledged.contains(s))
    }

    /// E-sign the agreement and complete the application.
    pub fn sign(&mut self, disbursement_date: NaiveDate) -> LendingResult<ApplicationSummary> {
        self.expect_step(ApplicationStep::Agreement, "signing follows verification")?;
        if !self.all_sections_acknowledged() {
            let missing: Vec<String> = AgreementSection::ALL
                .iter()
                .filter(|s| !self.acknowledged.contains(s))
                .map(|s| s.to_string())
                .collect();
            return Err(self.violation(&format!(
                "every agreement section must be acknowledged (missing: {})",
                missing.join(", ")
            )));
        }

        let quote = self.quote()?;
        let agreement = draft_agreement(&quote, disbursement_date)?;
        let summary = ApplicationSummary {
            income: self.income,
            quote,
            agreement,
            acknowledged: self.acknowledged.iter().copied().collect(),
        };

        self.summary = Some(summary.clone());
        self.transition(ApplicationStep::Complete);
        Ok(summary)
    }

    pub fn summary(&self) -> LendingResult<&ApplicationSummary> {
        self.summary
            .as_ref()
            .ok_or_else(|| self.violation("the application has not been signed"))
    }

    /// Return to the previous step. Only offer selection and customization
    /// can be revisited; leaving customization keeps no selection.
    pub fn back(&mut self) -> LendingResult<()> {
        match self.step {
            ApplicationStep::SelectOffer => {
                self.transition(ApplicationStep::Income);
                Ok(())
            }
            ApplicationStep::Customize => {
                self.selected = None;
                self.amount = Decimal::ZERO;
                self.term_months = None;
                self.transition(ApplicationStep::SelectOffer);
                Ok(())
            }
            _ => Err(self.violation("this step cannot be revisited")),
        }
    }

    fn selected_product(&self) -> LendingResult<&OfferProduct> {
        self.selected
            .as_ref()
            .ok_or_else(|| self.violation("no offer has been selected"))
    }

    fn expect_step(&self, expected: ApplicationStep, reason: &str) -> LendingResult<()> {
        if self.step == expected {
            Ok(())
        } else {
            Err(self.violation(reason))
        }
    }

    fn violation(&self, reason: &str) -> LendingError {
        LendingError::WorkflowViolation {
            step: self.step.to_string(),
            reason: reason.to_string(),
        }
    }

    fn transition(&mut self, next: ApplicationStep) {
        debug!(from = %self.step, to = %next, "prequalification step");
        self.step = next;
    }
}

// ---------------------------------------------------------------------------
// Scripted run
// ---------------------------------------------------------------------------

/// Drive a fresh application through every step from a single script.
pub fn run_prequalification(
    script: &PreQualificationScript,
    verification_code: &str,
) -> LendingResult<ComputationOutput<ApplicationSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let mut app = PreQualification::new(OfferCatalog::for_kind(script.catalog), verification_code)?;
    app.set_income(script.income)?;
    app.set_soft_pull_consent(script.soft_pull_consent)?;
    app.submit_income()?;

    app.select_offer(script.product)?;
    if let Some(amount) = script.amount {
        app.set_amount(amount)?;
    }
    if let Some(term) = script.term_months {
        let revolving = app.selected_offer().map(|p| p.is_revolving()).unwrap_or(false);
        if revolving {
            warnings.push(format!(
                "{} is revolving credit; term of {term} months ignored.",
                script.product
            ));
        } else {
            app.set_term(term)?;
        }
    }

    app.request_verification()?;
    app.verify_otp(&script.otp)?;

    for section in &script.acknowledged {
        app.acknowledge(*section, true)?;
    }
    let summary = app.sign(script.disbursement_date)?;

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "catalog": script.catalog,
        "income_range": [INCOME_MIN, INCOME_MAX],
        "otp_length": OTP_LENGTH,
        "pricing": "customized amount and term",
    });

    Ok(with_metadata(
        "Pre-qualification application",
        &assumptions,
        warnings,
        elapsed,
        summary,
    ))
}

fn validate_otp_format(field: &str, code: &str) -> LendingResult<()> {
    if code.len() != OTP_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(LendingError::InvalidInput {
            field: field.into(),
            reason: format!("passcodes are {OTP_LENGTH} digits"),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const CODE: &str = "123456";

    fn at_customize(kind: ProductKind) -> PreQualification {
        let mut app = PreQualification::new(OfferCatalog::prequalification(), CODE).unwrap();
        app.set_soft_pull_consent(true).unwrap();
        app.submit_income().unwrap();
        app.select_offer(kind).unwrap();
        app
    }

    #[test]
    fn test_consent_required() {
        let mut app = PreQualification::new(OfferCatalog::prequalification(), CODE).unwrap();
        assert!(matches!(
            app.submit_income().unwrap_err(),
            LendingError::WorkflowViolation { .. }
        ));
        assert_eq!(app.step(), ApplicationStep::Income);
    }

    #[test]
    fn test_income_bounds_and_step() {
        let mut app = PreQualification::new(OfferCatalog::prequalification(), CODE).unwrap();
        assert!(app.set_income(dec!(29000)).is_err());
        assert!(app.set_income(dec!(501000)).is_err());
        assert!(app.set_income(dec!(75500)).is_err());
        app.set_income(dec!(120000)).unwrap();
        assert_eq!(app.income(), dec!(120000));
    }

    #[test]
    fn test_selection_seeds_maximums() {
        let app = at_customize(ProductKind::Auto);
        let quote = app.quote().unwrap();
        assert_eq!(quote.amount, dec!(35000));
        assert_eq!(quote.term_months, Some(72));
    }

    #[test]
    fn test_quote_tracks_customized_term() {
        let mut app = at_customize(ProductKind::Personal);
        app.set_amount(dec!(10000)).unwrap();
        app.set_term(36).unwrap();
        let quote = app.quote().unwrap();
        assert_eq!(quote.term_months, Some(36));
        assert_eq!(quote.payment.monthly_payment, dec!(313.32));
    }

    #[test]
    fn test_rejected_customization_keeps_previous_values() {
        let mut app = at_customize(ProductKind::Personal);
        assert!(app.set_amount(dec!(30000)).is_err());
        assert!(app.set_term(72).is_err());
        let quote = app.quote().unwrap();
        assert_eq!(quote.amount, dec!(25000));
        assert_eq!(quote.term_months, Some(60));
    }

    #[test]
    fn test_revolving_offer_has_no_term() {
        let mut app = at_customize(ProductKind::CreditCard);
        assert!(matches!(
            app.set_term(12).unwrap_err(),
            LendingError::InvalidTerm { .. }
        ));
    }

    #[test]
    fn test_wrong_passcode_stays_on_verify() {
        let mut app = at_customize(ProductKind::Personal);
        app.request_verification().unwrap();
        assert!(matches!(
            app.verify_otp("654321").unwrap_err(),
            LendingError::VerificationFailed
        ));
        assert!(matches!(
            app.verify_otp("12345").unwrap_err(),
            LendingError::InvalidInput { .. }
        ));
        assert_eq!(app.step(), ApplicationStep::Verify);
        app.verify_otp(CODE).unwrap();
        assert_eq!(app.step(), ApplicationStep::Agreement);
    }

    #[test]
    fn test_sign_requires_all_sections() {
        let mut app = at_customize(ProductKind::Personal);
        app.request_verification().unwrap();
        app.verify_otp(CODE).unwrap();
        app.acknowledge(AgreementSection::Terms, true).unwrap();
        app.acknowledge(AgreementSection::Privacy, true).unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        match app.sign(date).unwrap_err() {
            LendingError::WorkflowViolation { reason, .. } => assert!(reason.contains("electronic")),
            other => panic!("Expected WorkflowViolation, got {other:?}"),
        }

        app.acknowledge(AgreementSection::Electronic, true).unwrap();
        let summary = app.sign(date).unwrap();
        assert_eq!(app.step(), ApplicationStep::Complete);
        assert_eq!(summary.acknowledged.len(), 3);
        assert_eq!(summary.agreement.first_due_date, NaiveDate::from_ymd_opt(2024, 4, 15).unwrap());
    }

    #[test]
    fn test_unacknowledging_a_section() {
        let mut app = at_customize(ProductKind::Mortgage);
        app.request_verification().unwrap();
        app.verify_otp(CODE).unwrap();
        for s in AgreementSection::ALL {
            app.acknowledge(s, true).unwrap();
        }
        app.acknowledge(AgreementSection::Privacy, false).unwrap();
        assert!(!app.all_sections_acknowledged());
    }

    #[test]
    fn test_back_clears_selection() {
        let mut app = at_customize(ProductKind::Auto);
        app.back().unwrap();
        assert_eq!(app.step(), ApplicationStep::SelectOffer);
        assert!(app.selected_offer().is_none());
        app.back().unwrap();
        assert_eq!(app.step(), ApplicationStep::Income);
        assert!(app.back().is_err());
    }

    #[test]
    fn test_out_of_order_calls_rejected() {
        let mut app = PreQualification::new(OfferCatalog::prequalification(), CODE).unwrap();
        assert!(app.select_offer(ProductKind::Personal).is_err());
        assert!(app.verify_otp(CODE).is_err());
        assert!(app.summary().is_err());
    }

    #[test]
    fn test_invalid_verification_code_rejected() {
        assert!(PreQualification::new(OfferCatalog::prequalification(), "abc").is_err());
    }
}
