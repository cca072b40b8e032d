use chrono::{DateTime, NaiveDate, Utc};
use core_types::Trend;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The demand forecast and reorder recommendation for a single inventory item.
///
/// Created fresh on every forecast run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub item_id: String,
    pub item_name: String,
    pub current_stock: u32,
    pub average_daily_sales: Decimal,
    /// Expected units sold over the 30-day horizon, trend-adjusted.
    pub forecasted_demand: Decimal,
    pub recommended_reorder_point: Decimal,
    pub recommended_order_quantity: u64,
    /// `NO_STOCKOUT_DAYS` when the item has no recorded demand.
    pub days_until_stockout: Decimal,
    pub confidence: Decimal,
    pub trend: Trend,
}

impl ForecastResult {
    /// True when the stock on hand has fallen below the reorder point.
    pub fn needs_reorder(&self) -> bool {
        Decimal::from(self.current_stock) < self.recommended_reorder_point
    }
}

/// The calendar window a forecast covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Store-wide totals for a forecast run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    /// Items expected to run out within the supplier lead time.
    pub items_at_risk: usize,
    /// Units to order across all items that are below their reorder point.
    pub total_recommended_orders: u64,
    /// Cost of `total_recommended_orders` at current unit prices.
    pub estimated_cost: Decimal,
}

/// The store-wide forecast.
///
/// `items` is ordered by ascending `days_until_stockout`, most urgent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryForecastReport {
    pub generated_at: DateTime<Utc>,
    pub forecast_period: ForecastPeriod,
    pub items: Vec<ForecastResult>,
    pub summary: ForecastSummary,
}
