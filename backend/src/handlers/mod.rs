//! HTTP handlers for the StockHub API

pub mod catalog;
pub mod counterparty;
pub mod health;
pub mod order;
pub mod product;
pub mod reporting;
pub mod stock;

pub use catalog::*;
pub use counterparty::*;
pub use health::*;
pub use order::*;
pub use product::*;
pub use reporting::*;
pub use stock::*;
