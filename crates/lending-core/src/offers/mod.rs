pub mod catalog;
pub mod quote;
