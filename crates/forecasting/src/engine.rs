use crate::error::ForecastError;
use crate::report::{ForecastPeriod, ForecastResult, ForecastSummary, InventoryForecastReport};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use core_types::{InventoryItem, SalesObservation, Trend};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

/// Number of most recent observations averaged into the daily sales rate.
pub const MOVING_AVERAGE_PERIOD: usize = 7;

/// Sentinel for `days_until_stockout` when an item has no demand at all.
pub const NO_STOCKOUT_DAYS: Decimal = dec!(999);

const FORECAST_HORIZON_DAYS: i64 = 30;
const TREND_THRESHOLD_PCT: Decimal = dec!(10);
const INCREASING_DEMAND_FACTOR: Decimal = dec!(1.15);
const DECREASING_DEMAND_FACTOR: Decimal = dec!(0.85);
const ORDER_BUFFER_FACTOR: Decimal = dec!(1.2);
const OVERSTOCK_FACTOR: Decimal = dec!(1.5);
const CONFIDENCE_FLOOR: Decimal = dec!(0.5);
const CONFIDENCE_SPAN: Decimal = dec!(0.45);
const CONFIDENCE_CAP: Decimal = dec!(0.95);

/// Supplier-side parameters for a forecast run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastParams {
    /// Days between placing a restock order and receiving it.
    pub lead_time_days: u32,
    /// Units kept on hand on top of expected lead-time demand.
    pub safety_stock: u32,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            lead_time_days: 7,
            safety_stock: 10,
        }
    }
}

/// A stateless calculator that turns sales history into reorder recommendations.
#[derive(Debug, Default)]
pub struct ForecastingEngine {}

impl ForecastingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Averages the most recent `period` values, or all of them when fewer exist.
    ///
    /// `values` must be in chronological order, most recent last.
    /// Returns `None` for an empty sequence.
    pub fn moving_average(&self, values: &[u32], period: usize) -> Option<Decimal> {
        if values.is_empty() || period == 0 {
            return None;
        }
        let window = &values[values.len().saturating_sub(period)..];
        Some(mean(window))
    }

    /// Compares the mean of the later half of `values` against the earlier half.
    ///
    /// On odd lengths the earlier half is the shorter one. A change beyond
    /// +/-10% is a trend; anything within that band is stable.
    pub fn classify_trend(&self, values: &[u32]) -> Trend {
        if values.len() < 2 {
            return Trend::Stable;
        }

        let (first, second) = values.split_at(values.len() / 2);
        let first_avg = mean(first);
        let second_avg = mean(second);

        // Percentage change is unbounded when demand starts from nothing.
        if first_avg.is_zero() {
            return if second_avg > Decimal::ZERO {
                Trend::Increasing
            } else {
                Trend::Stable
            };
        }

        let change_pct = (second_avg - first_avg) / first_avg * dec!(100);
        if change_pct > TREND_THRESHOLD_PCT {
            Trend::Increasing
        } else if change_pct < -TREND_THRESHOLD_PCT {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }

    /// Forecasts demand and reorder needs for a single item.
    ///
    /// # Arguments
    ///
    /// * `sales_history` - Daily quantities sold, oldest first. Must not be empty;
    ///   pass `[0]` for an item that has never sold.
    /// * `params` - Lead time and safety stock to plan against.
    pub fn forecast_item(
        &self,
        item_id: &str,
        item_name: &str,
        current_stock: u32,
        sales_history: &[u32],
        params: &ForecastParams,
    ) -> Result<ForecastResult, ForecastError> {
        let average_daily_sales = self
            .moving_average(sales_history, MOVING_AVERAGE_PERIOD)
            .ok_or_else(|| ForecastError::EmptySalesHistory {
                item_id: item_id.to_string(),
            })?;
        let trend = self.classify_trend(sales_history);

        let trend_factor = match trend {
            Trend::Increasing => INCREASING_DEMAND_FACTOR,
            Trend::Decreasing => DECREASING_DEMAND_FACTOR,
            Trend::Stable => Decimal::ONE,
        };
        let forecasted_demand =
            average_daily_sales * Decimal::from(FORECAST_HORIZON_DAYS) * trend_factor;

        let recommended_reorder_point = average_daily_sales * Decimal::from(params.lead_time_days)
            + Decimal::from(params.safety_stock);

        let recommended_order_quantity = (forecasted_demand * ORDER_BUFFER_FACTOR)
            .ceil()
            .to_u64()
            .unwrap_or_default();

        let days_until_stockout = if average_daily_sales > Decimal::ZERO {
            Decimal::from(current_stock) / average_daily_sales
        } else {
            NO_STOCKOUT_DAYS
        };

        let confidence = (CONFIDENCE_FLOOR
            + Decimal::from(sales_history.len()) / dec!(100) * CONFIDENCE_SPAN)
            .min(CONFIDENCE_CAP);

        tracing::debug!(
            item_id,
            %average_daily_sales,
            %days_until_stockout,
            %trend,
            "Forecasted item"
        );

        Ok(ForecastResult {
            item_id: item_id.to_string(),
            item_name: item_name.to_string(),
            current_stock,
            average_daily_sales,
            forecasted_demand,
            recommended_reorder_point,
            recommended_order_quantity,
            days_until_stockout,
            confidence,
            trend,
        })
    }

    /// Forecasts every item in the catalog, stamped with the current time.
    pub fn generate_forecast(
        &self,
        items: &[InventoryItem],
        sales_data: &[SalesObservation],
        params: &ForecastParams,
    ) -> Result<InventoryForecastReport, ForecastError> {
        self.generate_forecast_at(items, sales_data, params, Utc::now())
    }

    /// Forecasts every item in the catalog as of `generated_at`.
    ///
    /// Each item's observations are ordered by date before forecasting; same-day
    /// observations keep their given order. Items with no observations are
    /// forecast from a single zero-demand day.
    pub fn generate_forecast_at(
        &self,
        items: &[InventoryItem],
        sales_data: &[SalesObservation],
        params: &ForecastParams,
        generated_at: DateTime<Utc>,
    ) -> Result<InventoryForecastReport, ForecastError> {
        let mut history_by_item: HashMap<&str, Vec<&SalesObservation>> = HashMap::new();
        for observation in sales_data {
            history_by_item
                .entry(observation.item_id.as_str())
                .or_default()
                .push(observation);
        }

        let mut results = Vec::with_capacity(items.len());
        let mut total_recommended_orders: u64 = 0;
        let mut estimated_cost = Decimal::ZERO;

        for item in items {
            let quantities: Vec<u32> = match history_by_item.get_mut(item.id.as_str()) {
                Some(observations) => {
                    observations.sort_by_key(|o| o.date);
                    observations.iter().map(|o| o.quantity).collect()
                }
                None => vec![0],
            };

            let result =
                self.forecast_item(&item.id, &item.name, item.stock_quantity, &quantities, params)?;

            if result.needs_reorder() {
                total_recommended_orders =
                    total_recommended_orders.saturating_add(result.recommended_order_quantity);
                estimated_cost = Decimal::from(result.recommended_order_quantity)
                    .checked_mul(item.unit_price)
                    .and_then(|cost| estimated_cost.checked_add(cost))
                    .unwrap_or_else(|| {
                        tracing::warn!(item_id = %item.id, "Estimated reorder cost saturated");
                        Decimal::MAX
                    });
            }

            results.push(result);
        }

        // Stable, so equally urgent items keep catalog order.
        results.sort_by(|a, b| a.days_until_stockout.cmp(&b.days_until_stockout));

        let lead_time = Decimal::from(params.lead_time_days);
        let items_at_risk = results
            .iter()
            .filter(|r| r.days_until_stockout < lead_time)
            .count();

        let start = generated_at.date_naive();
        let report = InventoryForecastReport {
            generated_at,
            forecast_period: ForecastPeriod {
                start,
                end: start
                    .checked_add_signed(Duration::days(FORECAST_HORIZON_DAYS))
                    .unwrap_or(NaiveDate::MAX),
            },
            items: results,
            summary: ForecastSummary {
                items_at_risk,
                total_recommended_orders,
                estimated_cost,
            },
        };

        tracing::info!(
            items = report.items.len(),
            items_at_risk,
            total_recommended_orders,
            %estimated_cost,
            "Generated inventory forecast"
        );

        Ok(report)
    }

    /// Items that will run out in fewer than `threshold_days`.
    pub fn get_urgent_reorders<'a>(
        &self,
        report: &'a InventoryForecastReport,
        threshold_days: u32,
    ) -> Vec<&'a ForecastResult> {
        let threshold = Decimal::from(threshold_days);
        report
            .items
            .iter()
            .filter(|r| r.days_until_stockout < threshold)
            .collect()
    }

    /// Items holding more than one and a half times their forecasted demand.
    pub fn get_overstocked_items<'a>(
        &self,
        report: &'a InventoryForecastReport,
    ) -> Vec<&'a ForecastResult> {
        report
            .items
            .iter()
            .filter(|r| Decimal::from(r.current_stock) > r.forecasted_demand * OVERSTOCK_FACTOR)
            .collect()
    }
}

fn mean(values: &[u32]) -> Decimal {
    let sum: u64 = values.iter().map(|&v| u64::from(v)).sum();
    Decimal::from(sum) / Decimal::from(values.len())
}
