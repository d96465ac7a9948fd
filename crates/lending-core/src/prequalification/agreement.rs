//! Loan agreement disclosures presented for e-signature.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LendingError;
use crate::offers::catalog::ProductKind;
use crate::offers::quote::OfferQuote;
use crate::types::{round_cents, Money, Months, Percent};
use crate::LendingResult;

/// Late fee as a share of the monthly payment.
const LATE_FEE_RATE: Decimal = dec!(0.05);

/// Floor on the late fee.
const LATE_FEE_MINIMUM: Money = dec!(25);

/// Days after the due date before a payment is late.
pub const GRACE_PERIOD_DAYS: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementSection {
    /// Loan terms and conditions.
    Terms,
    /// Receipt of the privacy notice.
    Privacy,
    /// Consent to transact electronically.
    Electronic,
}

impl AgreementSection {
    pub const ALL: [AgreementSection; 3] = [
        AgreementSection::Terms,
        AgreementSection::Privacy,
        AgreementSection::Electronic,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Terms => "Loan Agreement Terms and Conditions",
            Self::Privacy => "Privacy Notice",
            Self::Electronic => "Electronic Communications Consent",
        }
    }
}

impl fmt::Display for AgreementSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terms => write!(f, "terms"),
            Self::Privacy => write!(f, "privacy"),
            Self::Electronic => write!(f, "electronic"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanAgreement {
    pub product: ProductKind,
    pub name: String,
    pub principal: Money,
    pub annual_rate_percent: Percent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_months: Option<Months>,
    pub monthly_payment: Money,
    pub late_fee: Money,
    pub grace_period_days: u32,
    pub prepayment_penalty: bool,
    pub disbursement_date: NaiveDate,
    pub first_due_date: NaiveDate,
}

/// Late fee on a missed installment: 5% of the payment or 25.00, whichever
/// is greater.
pub fn late_fee(monthly_payment: Money) -> Money {
    round_cents((monthly_payment * LATE_FEE_RATE).max(LATE_FEE_MINIMUM))
}

/// Draft the agreement for an accepted quote. Payments fall due on the same
/// day each month as the disbursement, starting the following month.
pub fn draft_agreement(quote: &OfferQuote, disbursement_date: NaiveDate) -> LendingResult<LoanAgreement> {
    let first_due_date = disbursement_date
        .checked_add_months(chrono::Months::new(1))
        .ok_or_else(|| LendingError::InvalidInput {
            field: "disbursement_date".into(),
            reason: "first due date is out of range".into(),
        })?;

    let monthly_payment = quote.payment.monthly_payment;

    Ok(LoanAgreement {
        product: quote.product,
        name: quote.name.clone(),
        principal: quote.amount,
        annual_rate_percent: quote.annual_rate_percent,
        term_months: quote.term_months,
        monthly_payment,
        late_fee: late_fee(monthly_payment),
        grace_period_days: GRACE_PERIOD_DAYS,
        prepayment_penalty: false,
        disbursement_date,
        first_due_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offers::catalog::OfferCatalog;
    use crate::offers::quote::quote_offer;

    #[test]
    fn test_late_fee_floor() {
        assert_eq!(late_fee(dec!(124.92)), dec!(25));
        assert_eq!(late_fee(dec!(499.99)), dec!(25));
    }

    #[test]
    fn test_late_fee_percentage() {
        // 5% of 1,896.20 = 94.81
        assert_eq!(late_fee(dec!(1896.20)), dec!(94.81));
    }

    #[test]
    fn test_draft_agreement_dates() {
        let catalog = OfferCatalog::prequalification();
        let product = catalog.product(ProductKind::Auto).unwrap();
        let quote = quote_offer(product, dec!(35000), Some(72)).unwrap();
        let disbursed = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();

        let agreement = draft_agreement(&quote, disbursed).unwrap();
        assert_eq!(agreement.first_due_date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(agreement.monthly_payment, dec!(563.51));
        assert_eq!(agreement.late_fee, dec!(28.18));
        assert!(!agreement.prepayment_penalty);
    }
}
