//! Monthly payment and amortization for consumer credit products.
//!
//! Every offer flow prices through [`monthly_payment`]: installment products
//! use the fixed-rate, fixed-term annuity payment and revolving products use
//! the interest-only minimum payment convention. All math in
//! `rust_decimal::Decimal`; rounding to cents happens only in the
//! presentation fields of the outputs.

use chrono::NaiveDate;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::LendingError;
use crate::types::{round_cents, with_metadata, ComputationOutput, Money, Months, Percent, Rate};
use crate::LendingResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

/// Longest schedule that will be laid out period by period (100 years).
pub const MAX_SCHEDULE_PERIODS: Months = 1200;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Terms of a credit product as presented to the borrower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed (or credit line for revolving products).
    pub principal: Money,
    /// Nominal APR as a percentage (8.99 = 8.99%).
    pub annual_rate_percent: Percent,
    /// Number of monthly installments; absent for revolving credit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_months: Option<Months>,
}

impl LoanTerms {
    pub fn installment(principal: Money, annual_rate_percent: Percent, term_months: Months) -> Self {
        LoanTerms {
            principal,
            annual_rate_percent,
            term_months: Some(term_months),
        }
    }

    pub fn revolving(principal: Money, annual_rate_percent: Percent) -> Self {
        LoanTerms {
            principal,
            annual_rate_percent,
            term_months: None,
        }
    }

    pub fn mode(&self) -> PaymentMode {
        match self.term_months {
            Some(term_months) => PaymentMode::Installment { term_months },
            None => PaymentMode::Revolving,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentMode {
    /// Fully amortizing level payments over a fixed number of months.
    Installment { term_months: Months },
    /// No fixed term; a minimum payment is quoted per month.
    Revolving,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOutput {
    pub mode: PaymentMode,
    /// Periodic rate applied each month (annual percent / 12 / 100).
    pub monthly_rate: Rate,
    /// Payment rounded to cents for display.
    pub monthly_payment: Money,
    /// Payment at full precision.
    pub monthly_payment_exact: Money,
    /// Sum of all installments (installment mode only).
    pub total_repayment: Option<Money>,
    /// Total repayment less principal (installment mode only).
    pub total_interest: Option<Money>,
}

/// Input for a period-by-period schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    #[serde(flatten)]
    pub terms: LoanTerms,
    /// Due date of the first installment; later installments fall on the
    /// same day of each following month.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_payment_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulePeriod {
    pub period: Months,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub opening_balance: Money,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub closing_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub level_payment: Money,
    pub final_payment: Money,
    pub total_paid: Money,
    pub total_interest: Money,
    pub periods: Vec<SchedulePeriod>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Periodic monthly rate for a nominal APR quoted as a percentage.
pub fn monthly_rate(annual_rate_percent: Percent) -> Rate {
    annual_rate_percent / MONTHS_PER_YEAR / PERCENT
}

/// Monthly payment at full precision.
///
/// Installment terms: `P * r * (1 + r)^n / ((1 + r)^n - 1)` with
/// `r = APR / 12 / 100`, or `P / n` when the rate is zero.
///
/// Revolving terms: `P * (APR / 100) / 12`. This minimum-payment convention
/// is a fixed product policy; it is interest-only by construction.
pub fn monthly_payment(terms: &LoanTerms) -> LendingResult<Money> {
    validate_terms(terms)?;

    let payment = match terms.term_months {
        Some(n) => installment_payment(terms.principal, monthly_rate(terms.annual_rate_percent), n)?,
        None => revolving_payment(terms.principal, terms.annual_rate_percent)?,
    };

    debug!(
        principal = %terms.principal,
        apr = %terms.annual_rate_percent,
        term_months = ?terms.term_months,
        payment = %payment,
        "monthly payment"
    );

    Ok(payment)
}

/// Monthly payment wrapped in the standard output envelope, with the
/// cent-rounded presentation figure and lifetime totals.
pub fn calculate_payment(terms: &LoanTerms) -> LendingResult<ComputationOutput<PaymentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let exact = monthly_payment(terms)?;
    let rounded = round_cents(exact);

    let (total_repayment, total_interest) = match terms.term_months {
        Some(n) => {
            let total = exact
                .checked_mul(Decimal::from(n))
                .ok_or_else(|| LendingError::ArithmeticOverflow {
                    context: "total repayment".into(),
                })?;
            (
                Some(round_cents(total)),
                Some(round_cents(total - terms.principal)),
            )
        }
        None => {
            warnings.push(
                "Revolving minimum payment is interest-only and does not reduce the balance."
                    .into(),
            );
            (None, None)
        }
    };

    if rounded.is_zero() {
        warnings.push(format!(
            "Payment of {exact} rounds to zero at cent precision."
        ));
    }

    let output = PaymentOutput {
        mode: terms.mode(),
        monthly_rate: monthly_rate(terms.annual_rate_percent),
        monthly_payment: rounded,
        monthly_payment_exact: exact,
        total_repayment,
        total_interest,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "monthly_rate": "annual_rate_percent / 12 / 100",
        "installment": "P * r * (1 + r)^n / ((1 + r)^n - 1); P / n at zero rate",
        "revolving_minimum": "P * (annual_rate_percent / 100) / 12",
        "display_rounding": "cents, midpoint away from zero",
    });

    Ok(with_metadata(
        "Level-payment annuity (installment) / interest-only minimum (revolving)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Lay out an installment loan month by month.
///
/// The level payment is the calculator's payment rounded to cents and each
/// month's interest is rounded to cents. The final installment clears the
/// remaining balance, so the schedule always closes at exactly zero.
pub fn build_schedule(
    input: &ScheduleInput,
) -> LendingResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let terms = &input.terms;

    validate_terms(terms)?;
    let n = terms.term_months.ok_or_else(|| LendingError::InvalidInput {
        field: "term_months".into(),
        reason: "An amortization schedule requires a fixed term; revolving credit has none."
            .into(),
    })?;
    if n > MAX_SCHEDULE_PERIODS {
        return Err(LendingError::InvalidTerm {
            term_months: n,
            reason: format!("schedules are limited to {MAX_SCHEDULE_PERIODS} months"),
        });
    }

    let rate = monthly_rate(terms.annual_rate_percent);
    let level_payment = round_cents(monthly_payment(terms)?);

    let mut periods = Vec::with_capacity(n as usize);
    let mut balance = terms.principal;
    let mut total_paid = Decimal::ZERO;
    let mut total_interest = Decimal::ZERO;

    for period in 1..=n {
        let opening = balance;
        let interest = round_cents(opening.checked_mul(rate).ok_or_else(|| {
            LendingError::ArithmeticOverflow {
                context: format!("interest for period {period}"),
            }
        })?);

        let (payment, principal) = if period == n || level_payment - interest >= opening {
            let payoff = opening.checked_add(interest).ok_or_else(|| {
                LendingError::ArithmeticOverflow {
                    context: format!("payoff in period {period}"),
                }
            })?;
            (payoff, opening)
        } else {
            (level_payment, level_payment - interest)
        };
        balance = opening - principal;

        let due_date = match input.first_payment_date {
            Some(first) => Some(due_date(first, period)?),
            None => None,
        };

        total_paid = total_paid.checked_add(payment).ok_or_else(|| {
            LendingError::ArithmeticOverflow {
                context: "total paid".into(),
            }
        })?;
        total_interest = total_interest.checked_add(interest).ok_or_else(|| {
            LendingError::ArithmeticOverflow {
                context: "total interest".into(),
            }
        })?;
        periods.push(SchedulePeriod {
            period,
            due_date,
            opening_balance: opening,
            payment,
            interest,
            principal,
            closing_balance: balance,
        });

        if balance.is_zero() {
            break;
        }
    }

    if periods.len() < n as usize {
        warnings.push(format!(
            "Loan is repaid after {} of {} periods because the payment is rounded up to cents.",
            periods.len(),
            n
        ));
    }
    if periods.iter().any(|p| p.principal < Decimal::ZERO) {
        warnings.push(
            "Level payment at cent precision does not cover interest in some periods.".into(),
        );
    }

    let final_payment = periods.last().map(|p| p.payment).unwrap_or(level_payment);

    debug!(
        periods = periods.len(),
        level_payment = %level_payment,
        final_payment = %final_payment,
        "amortization schedule"
    );

    let output = AmortizationSchedule {
        level_payment,
        final_payment,
        total_paid,
        total_interest,
        periods,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "level_payment": "calculator payment rounded to cents",
        "interest": "opening balance * monthly rate, rounded to cents",
        "final_period": "pays off remaining balance",
        "due_dates": "same day each month, clamped to month end",
    });

    Ok(with_metadata(
        "Level-payment amortization schedule",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_terms(terms: &LoanTerms) -> LendingResult<()> {
    if terms.principal <= Decimal::ZERO {
        return Err(LendingError::InvalidAmount {
            amount: terms.principal,
            reason: "principal must be greater than zero".into(),
        });
    }
    if terms.annual_rate_percent < Decimal::ZERO {
        return Err(LendingError::InvalidRate {
            rate: terms.annual_rate_percent,
        });
    }
    if terms.term_months == Some(0) {
        return Err(LendingError::InvalidTerm {
            term_months: 0,
            reason: "term must be at least one month".into(),
        });
    }
    Ok(())
}

fn installment_payment(principal: Money, rate: Rate, n: Months) -> LendingResult<Money> {
    let straight_line = principal / Decimal::from(n);
    if rate.is_zero() {
        return Ok(straight_line);
    }

    // P * r * (1 + r)^n / ((1 + r)^n - 1) == P * r / (1 - (1 + r)^-n)
    let discount = Decimal::ONE / (Decimal::ONE + rate);
    // A base below one cannot overflow; `None` is an underflow to zero.
    let denominator = Decimal::ONE
        - discount
            .checked_powu(u64::from(n))
            .unwrap_or(Decimal::ZERO);
    if denominator <= Decimal::ZERO {
        // Rate too small to register at 28 significant digits.
        return Ok(straight_line);
    }

    let interest = principal
        .checked_mul(rate)
        .ok_or_else(|| LendingError::ArithmeticOverflow {
            context: "installment payment".into(),
        })?;
    interest
        .checked_div(denominator)
        .ok_or_else(|| LendingError::ArithmeticOverflow {
            context: "installment payment".into(),
        })
}

fn revolving_payment(principal: Money, annual_rate_percent: Percent) -> LendingResult<Money> {
    let annual_interest = principal
        .checked_mul(annual_rate_percent / PERCENT)
        .ok_or_else(|| LendingError::ArithmeticOverflow {
            context: "revolving minimum payment".into(),
        })?;
    Ok(annual_interest / MONTHS_PER_YEAR)
}

fn due_date(first: NaiveDate, period: Months) -> LendingResult<NaiveDate> {
    first
        .checked_add_months(chrono::Months::new(period - 1))
        .ok_or_else(|| LendingError::InvalidInput {
            field: "first_payment_date".into(),
            reason: format!("due date for period {period} is out of range"),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
