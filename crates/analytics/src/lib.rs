//! # Storefront Analytics Engine
//!
//! This crate turns the storefront's orders and inventory snapshots into the
//! sales, inventory and customer figures shown on the admin dashboard and in
//! downloadable reports.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of the data
//!   store or the payment gateway. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** The `AnalyticsEngine` is a stateless calculator. It takes
//!   orders and items as input and produces metric structs as output, so concurrent
//!   report requests never share anything.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: The main struct that contains the calculation logic.
//! - `AnalyticsReport` and the `*Metrics` structs: the derived records.
//! - `export`: CSV and JSON renderings of a report.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod export;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{AnalyticsEngine, CONVERSION_RATE_PLACEHOLDER, SALES_FORECAST_CONFIDENCE};
pub use error::AnalyticsError;
pub use report::{
    AnalyticsReport, CategoryPerformance, CustomerMetrics, CustomerSpend, DailySales, DaySales,
    InventoryMetrics, ProductPerformance, ReportPeriod, SalesForecast, SalesMetrics, StockLevel,
    TrendSummary,
};
