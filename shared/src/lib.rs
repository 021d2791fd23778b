//! Shared types and domain rules for the StockHub inventory platform
//!
//! This crate contains the order lifecycle, the stock ledger arithmetic and
//! the input validation used by the backend. Nothing in here touches I/O.

pub mod error;
pub mod models;
pub mod types;
pub mod validation;

pub use error::*;
pub use models::*;
pub use types::*;
pub use validation::*;
