#![cfg(feature = "prequalification")]

use chrono::NaiveDate;
use lending_core::offers::catalog::{CatalogKind, OfferCatalog, ProductKind};
use lending_core::prequalification::agreement::AgreementSection;
use lending_core::prequalification::application::{
    run_prequalification, ApplicationStep, PreQualification, PreQualificationScript,
};
use lending_core::LendingError;
use rust_decimal_macros::dec;

const CODE: &str = "123456";

fn script(product: ProductKind) -> PreQualificationScript {
    PreQualificationScript {
        income: dec!(85000),
        soft_pull_consent: true,
        catalog: CatalogKind::Prequalification,
        product,
        amount: None,
        term_months: None,
        otp: CODE.into(),
        acknowledged: AgreementSection::ALL.to_vec(),
        disbursement_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
    }
}

// ===========================================================================
// Step-by-step workflow
// ===========================================================================

#[test]
fn test_full_walkthrough() {
    let mut app = PreQualification::new(OfferCatalog::prequalification(), CODE).unwrap();
    assert_eq!(app.step(), ApplicationStep::Income);

    app.set_income(dec!(95000)).unwrap();
    app.set_soft_pull_consent(true).unwrap();
    app.submit_income().unwrap();
    assert_eq!(app.offers().len(), 4);

    let initial = app.select_offer(ProductKind::Personal).unwrap();
    assert_eq!(initial.payment.monthly_payment, dec!(506.79));

    app.set_amount(dec!(10000)).unwrap();
    let quote = app.set_term(36).unwrap();
    assert_eq!(quote.payment.monthly_payment, dec!(313.32));

    app.request_verification().unwrap();
    app.verify_otp(CODE).unwrap();
    for section in AgreementSection::ALL {
        app.acknowledge(section, true).unwrap();
    }

    let summary = app
        .sign(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
        .unwrap();
    assert_eq!(summary.income, dec!(95000));
    assert_eq!(summary.agreement.principal, dec!(10000));
    assert_eq!(summary.agreement.term_months, Some(36));
    assert_eq!(summary.agreement.monthly_payment, dec!(313.32));
    assert_eq!(summary.agreement.late_fee, dec!(25));
    assert_eq!(app.summary().unwrap().quote.amount, dec!(10000));
}

#[test]
fn test_customization_after_verification_rejected() {
    let mut app = PreQualification::new(OfferCatalog::prequalification(), CODE).unwrap();
    app.set_soft_pull_consent(true).unwrap();
    app.submit_income().unwrap();
    app.select_offer(ProductKind::Auto).unwrap();
    app.request_verification().unwrap();

    match app.set_amount(dec!(20000)).unwrap_err() {
        LendingError::WorkflowViolation { step, .. } => assert_eq!(step, "verify"),
        other => panic!("Expected WorkflowViolation, got {other:?}"),
    }
}

// ===========================================================================
// Scripted runs
// ===========================================================================

#[test]
fn test_scripted_run_defaults_to_offer_maximum() {
    let out = run_prequalification(&script(ProductKind::Mortgage), CODE).unwrap();
    let summary = out.result;
    assert_eq!(summary.quote.amount, dec!(300000));
    assert_eq!(summary.agreement.monthly_payment, dec!(1896.20));
    assert_eq!(summary.agreement.late_fee, dec!(94.81));
    assert_eq!(
        summary.agreement.first_due_date,
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
    );
    assert!(out.warnings.is_empty());
}

#[test]
fn test_scripted_run_revolving_term_ignored() {
    let mut s = script(ProductKind::CreditCard);
    s.term_months = Some(12);
    let out = run_prequalification(&s, CODE).unwrap();
    assert_eq!(out.result.agreement.term_months, None);
    assert_eq!(out.result.agreement.monthly_payment, dec!(124.92));
    assert_eq!(out.warnings.len(), 1);
}

#[test]
fn test_scripted_run_wrong_passcode() {
    let mut s = script(ProductKind::Personal);
    s.otp = "000000".into();
    assert!(matches!(
        run_prequalification(&s, CODE).unwrap_err(),
        LendingError::VerificationFailed
    ));
}

#[test]
fn test_scripted_run_requires_consent_and_acknowledgement() {
    let mut s = script(ProductKind::Personal);
    s.soft_pull_consent = false;
    assert!(matches!(
        run_prequalification(&s, CODE).unwrap_err(),
        LendingError::WorkflowViolation { .. }
    ));

    let mut s = script(ProductKind::Personal);
    s.acknowledged = vec![AgreementSection::Terms];
    assert!(matches!(
        run_prequalification(&s, CODE).unwrap_err(),
        LendingError::WorkflowViolation { .. }
    ));
}

#[test]
fn test_script_from_json() {
    let json = r#"{
        "soft_pull_consent": true,
        "product": "auto",
        "amount": "20000",
        "term_months": 48,
        "otp": "123456",
        "acknowledged": ["terms", "privacy", "electronic"],
        "disbursement_date": "2024-03-15"
    }"#;
    let s: PreQualificationScript = serde_json::from_str(json).unwrap();
    assert_eq!(s.income, dec!(75000));
    let out = run_prequalification(&s, CODE).unwrap();
    assert_eq!(out.result.quote.term_months, Some(48));
}
