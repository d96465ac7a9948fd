use chrono::NaiveDate;
use lending_core::amortization::{
    build_schedule, calculate_payment, monthly_payment, LoanTerms, PaymentMode, ScheduleInput,
};
use lending_core::LendingError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, label: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tol,
        "{label}: expected ~{expected}, got {actual} (diff {diff}, tol {tol})"
    );
}

// ===========================================================================
// Payment calculator
// ===========================================================================

#[test]
fn test_personal_loan_payment() {
    let terms = LoanTerms::installment(dec!(25000), dec!(7.99), 60);
    let out = calculate_payment(&terms).unwrap();
    assert_eq!(out.result.monthly_payment, dec!(506.79));
    assert_close(out.result.monthly_payment_exact, dec!(506.7902), dec!(0.0001), "exact");
    assert_eq!(out.result.mode, PaymentMode::Installment { term_months: 60 });
    assert!(out.warnings.is_empty());
}

#[test]
fn test_auto_loan_payment() {
    let terms = LoanTerms::installment(dec!(35000), dec!(4.99), 72);
    assert_eq!(calculate_payment(&terms).unwrap().result.monthly_payment, dec!(563.51));
}

#[test]
fn test_mortgage_payment_and_totals() {
    let terms = LoanTerms::installment(dec!(300000), dec!(6.5), 360);
    let out = calculate_payment(&terms).unwrap().result;
    assert_eq!(out.monthly_payment, dec!(1896.20));
    let total = out.total_repayment.unwrap();
    let interest = out.total_interest.unwrap();
    assert_eq!(total - interest, dec!(300000));
    // 1896.204070... * 360
    assert_eq!(total, dec!(682633.47));
}

#[test]
fn test_revolving_minimum_payment() {
    let terms = LoanTerms::revolving(dec!(10000), dec!(14.99));
    let out = calculate_payment(&terms).unwrap();
    assert_eq!(out.result.monthly_payment, dec!(124.92));
    assert_eq!(out.result.mode, PaymentMode::Revolving);
    assert!(out.result.total_repayment.is_none());
    assert!(out.warnings.iter().any(|w| w.contains("interest-only")));
}

#[test]
fn test_zero_rate_is_straight_line() {
    let terms = LoanTerms::installment(dec!(12000), Decimal::ZERO, 24);
    assert_eq!(monthly_payment(&terms).unwrap(), dec!(500));
}

#[test]
fn test_zero_principal_rejected() {
    let terms = LoanTerms::installment(Decimal::ZERO, dec!(7.99), 60);
    assert!(matches!(
        calculate_payment(&terms).unwrap_err(),
        LendingError::InvalidAmount { .. }
    ));
}

#[test]
fn test_sub_cent_payment_warns() {
    let terms = LoanTerms::installment(dec!(0.01), dec!(5), 360);
    let out = calculate_payment(&terms).unwrap();
    assert_eq!(out.result.monthly_payment, Decimal::ZERO);
    assert!(out.result.monthly_payment_exact > Decimal::ZERO);
    assert!(out.warnings.iter().any(|w| w.contains("rounds to zero")));
}

#[test]
fn test_invalid_inputs() {
    match monthly_payment(&LoanTerms::installment(dec!(-1), dec!(5), 12)).unwrap_err() {
        LendingError::InvalidAmount { amount, .. } => assert_eq!(amount, dec!(-1)),
        other => panic!("Expected InvalidAmount, got {other:?}"),
    }
    match monthly_payment(&LoanTerms::installment(dec!(1000), dec!(-0.5), 12)).unwrap_err() {
        LendingError::InvalidRate { rate } => assert_eq!(rate, dec!(-0.5)),
        other => panic!("Expected InvalidRate, got {other:?}"),
    }
    match monthly_payment(&LoanTerms::installment(dec!(1000), dec!(5), 0)).unwrap_err() {
        LendingError::InvalidTerm { term_months, .. } => assert_eq!(term_months, 0),
        other => panic!("Expected InvalidTerm, got {other:?}"),
    }
}

#[test]
fn test_terms_deserialize_without_term_as_revolving() {
    let terms: LoanTerms =
        serde_json::from_str(r#"{"principal": "10000", "annual_rate_percent": "14.99"}"#).unwrap();
    assert_eq!(terms.mode(), PaymentMode::Revolving);
}

// ===========================================================================
// Schedule
// ===========================================================================

#[test]
fn test_schedule_reconciles() {
    let input = ScheduleInput {
        terms: LoanTerms::installment(dec!(25000), dec!(7.99), 60),
        first_payment_date: None,
    };
    let schedule = build_schedule(&input).unwrap().result;

    assert_eq!(schedule.periods.len(), 60);
    assert_eq!(schedule.level_payment, dec!(506.79));
    let last = schedule.periods.last().unwrap();
    assert_eq!(last.closing_balance, Decimal::ZERO);

    let principal: Decimal = schedule.periods.iter().map(|p| p.principal).sum();
    assert_eq!(principal, dec!(25000));
    assert_eq!(schedule.total_paid - schedule.total_interest, dec!(25000));
    assert_close(schedule.final_payment, dec!(506.79), dec!(1), "final payment");
}

#[test]
fn test_schedule_due_dates() {
    let input = ScheduleInput {
        terms: LoanTerms::installment(dec!(2500), dec!(9.99), 12),
        first_payment_date: NaiveDate::from_ymd_opt(2025, 1, 31),
    };
    let schedule = build_schedule(&input).unwrap().result;
    let dates: Vec<NaiveDate> = schedule
        .periods
        .iter()
        .take(3)
        .map(|p| p.due_date.unwrap())
        .collect();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        ]
    );
}

#[test]
fn test_schedule_rejects_revolving() {
    let input = ScheduleInput {
        terms: LoanTerms::revolving(dec!(10000), dec!(14.99)),
        first_payment_date: None,
    };
    match build_schedule(&input).unwrap_err() {
        LendingError::InvalidInput { field, .. } => assert_eq!(field, "term_months"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}
