pub mod agreement;
pub mod application;
