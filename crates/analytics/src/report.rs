use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Units and revenue for one product name across a set of orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPerformance {
    pub name: String,
    pub quantity: u64,
    pub revenue: Decimal,
}

/// Units and revenue for one product category across a set of orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPerformance {
    pub category: String,
    pub quantity: u64,
    pub revenue: Decimal,
}

/// Sales for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub sales: Decimal,
    pub orders: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SalesMetrics {
    pub total_sales: Decimal,
    pub total_orders: usize,
    pub average_order_value: Decimal,
    /// Always `CONVERSION_RATE_PLACEHOLDER`; visitor counts are not tracked.
    pub conversion_rate: Decimal,
    /// Top five by revenue.
    pub top_products: Vec<ProductPerformance>,
    /// Top five by revenue.
    pub top_categories: Vec<CategoryPerformance>,
    /// One entry per day with orders, ascending by date.
    pub sales_trend: Vec<DailySales>,
}

/// A catalog entry's stock position, as listed among the movers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLevel {
    pub id: String,
    pub name: String,
    pub stock_quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InventoryMetrics {
    pub total_items: usize,
    /// Items with between 1 and 10 units left.
    pub low_stock_items: usize,
    pub out_of_stock_items: usize,
    pub average_stock_level: Decimal,
    pub total_stock_value: Decimal,
    /// Up to five items stocked below the average level.
    pub fast_moving_items: Vec<StockLevel>,
    /// Up to five items stocked above the average level.
    pub slow_moving_items: Vec<StockLevel>,
    /// Needs per-item sales velocity, which this report does not receive.
    pub turnover_rate: Option<Decimal>,
}

/// What a single customer has spent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSpend {
    pub customer_identifier: String,
    pub order_count: usize,
    pub total_spent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomerMetrics {
    pub total_customers: usize,
    pub repeat_customers: usize,
    /// Percentage of customers with more than one order.
    pub repeat_rate: Decimal,
    pub average_customer_value: Decimal,
    /// Top five by total spend.
    pub top_customers: Vec<CustomerSpend>,
}

/// The inclusive time range a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A day's sales, or an empty date when the period had no orders.
///
/// The empty date is `None`, which the JSON export writes as `"date": null`
/// and the CSV export as an empty cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DaySales {
    pub date: Option<NaiveDate>,
    pub sales: Decimal,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendSummary {
    pub best_day: DaySales,
    pub worst_day: DaySales,
    /// Percentage change in sales against the preceding period of equal length.
    pub growth_rate: Decimal,
}

/// A straight-line projection of the current period's sales.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SalesForecast {
    pub next_month: Decimal,
    /// Always `SALES_FORECAST_CONFIDENCE`.
    pub confidence: Decimal,
}

/// The complete, time-bounded business report.
///
/// This struct is the final output of `AnalyticsEngine::generate_report` and the
/// payload of both export formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub generated_at: DateTime<Utc>,
    pub period: ReportPeriod,
    pub sales: SalesMetrics,
    pub inventory: InventoryMetrics,
    pub customers: CustomerMetrics,
    pub trends: TrendSummary,
    pub forecast: SalesForecast,
}
