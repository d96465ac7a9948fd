use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LendingError {
    #[error("Invalid amount: {amount} — {reason}")]
    InvalidAmount { amount: Decimal, reason: String },

    #[error("Invalid rate: {rate}% — annual rate cannot be negative")]
    InvalidRate { rate: Decimal },

    #[error("Invalid term: {term_months} months — {reason}")]
    InvalidTerm { term_months: u32, reason: String },

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Workflow violation at step {step}: {reason}")]
    WorkflowViolation { step: String, reason: String },

    #[error("Verification failed: the one-time passcode does not match")]
    VerificationFailed,

    #[error("Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LendingError {
    fn from(e: serde_json::Error) -> Self {
        LendingError::SerializationError(e.to_string())
    }
}
