//! # Inventory Forecasting Engine
//!
//! Turns per-item sales history and current stock levels into reorder
//! recommendations for the school-supply catalog.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It depends only on `core-types`
//!   (Layer 0) and never touches the data store, the network or the clock unless
//!   asked to through [`ForecastingEngine::generate_forecast`].
//! - **Stateless Calculation:** The `ForecastingEngine` holds no state. Identical
//!   inputs produce identical reports, apart from the provenance timestamp.
//!
//! ## Public API
//!
//! - `ForecastingEngine`: moving averages, trend classification, per-item and
//!   store-wide forecasts, and the urgent/overstock filters.
//! - `InventoryForecastReport` / `ForecastResult`: the derived output records.
//! - `export`: CSV and JSON renderings of a report.
//! - `ForecastError`: the errors that can be returned from this crate.

pub mod engine;
pub mod error;
pub mod export;
pub mod report;

pub use engine::{ForecastParams, ForecastingEngine, MOVING_AVERAGE_PERIOD, NO_STOCKOUT_DAYS};
pub use error::ForecastError;
pub use report::{ForecastPeriod, ForecastResult, ForecastSummary, InventoryForecastReport};
