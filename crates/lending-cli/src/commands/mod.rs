pub mod offers;
pub mod payment;
pub mod prequalify;
pub mod quote;
pub mod schedule;
