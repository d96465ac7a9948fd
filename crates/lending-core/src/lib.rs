pub mod amortization;
pub mod error;
pub mod types;

#[cfg(feature = "offers")]
pub mod offers;

#[cfg(feature = "prequalification")]
pub mod prequalification;

pub use error::LendingError;
pub use types::*;

/// Standard result type for all lending operations
pub type LendingResult<T> = Result<T, LendingError>;
