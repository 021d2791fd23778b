//! Domain models for the StockHub inventory platform

mod catalog;
mod order;
mod party;
mod product;
mod stock;

pub use catalog::*;
pub use order::*;
pub use party::*;
pub use product::*;
pub use stock::*;
