//! Business logic services for the StockHub platform

pub mod category;
pub mod counterparty;
pub mod order;
pub mod product;
pub mod reporting;
pub mod stock;
pub mod unit;

pub use category::CategoryService;
pub use counterparty::CounterpartyService;
pub use order::OrderService;
pub use product::ProductService;
pub use reporting::ReportingService;
pub use stock::StockService;
pub use unit::UnitService;
