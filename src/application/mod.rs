//! Application layer: turning user input into validated entities.
//!
//! # Modules
//!
//! - [`forms`] - `ClientForm`, `SecurityForm`, `InvestmentForm` with
//!   per-field error collection

pub mod forms;

pub use forms::{ClientForm, InvestmentForm, SecurityForm};
