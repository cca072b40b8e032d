//! Text renderings of an [`InventoryForecastReport`] for download endpoints.

use crate::error::ForecastError;
use crate::report::InventoryForecastReport;
use csv::WriterBuilder;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const ITEM_HEADER: [&str; 10] = [
    "Item ID",
    "Item Name",
    "Current Stock",
    "Avg Daily Sales",
    "Forecasted Demand (30d)",
    "Reorder Point",
    "Recommended Order Qty",
    "Days Until Stockout",
    "Confidence",
    "Trend",
];

/// Renders the report as sectioned CSV: header, summary, then one row per item.
///
/// `currency` only labels the cost line.
pub fn to_csv(report: &InventoryForecastReport, currency: &str) -> Result<String, ForecastError> {
    let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());

    writer.write_record(["Inventory Forecast Report"])?;
    writer.write_record([
        "Generated",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string().as_str(),
    ])?;
    writer.write_record([
        "Forecast Period",
        report.forecast_period.start.to_string().as_str(),
        report.forecast_period.end.to_string().as_str(),
    ])?;
    writer.write_record([""])?;

    writer.write_record(["Summary"])?;
    writer.write_record([
        "Items at Risk",
        report.summary.items_at_risk.to_string().as_str(),
    ])?;
    writer.write_record([
        "Total Recommended Orders",
        report.summary.total_recommended_orders.to_string().as_str(),
    ])?;
    writer.write_record([
        format!("Estimated Cost ({currency})"),
        report.summary.estimated_cost.round_dp(2).to_string(),
    ])?;
    writer.write_record([""])?;

    writer.write_record(ITEM_HEADER)?;
    for item in &report.items {
        writer.write_record([
            item.item_id.clone(),
            item.item_name.clone(),
            item.current_stock.to_string(),
            item.average_daily_sales.round_dp(2).to_string(),
            item.forecasted_demand.round_dp(2).to_string(),
            item.recommended_reorder_point.round_dp(2).to_string(),
            item.recommended_order_quantity.to_string(),
            item.days_until_stockout.round_dp(1).to_string(),
            whole_percent(item.confidence),
            item.trend.to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ForecastError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ForecastError::Export(e.to_string()))
}

/// Pretty-printed JSON dump of the whole report.
pub fn to_json(report: &InventoryForecastReport) -> Result<String, ForecastError> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn whole_percent(ratio: Decimal) -> String {
    format!("{}%", (ratio * dec!(100)).round())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ForecastPeriod, ForecastResult, ForecastSummary};
    use chrono::{NaiveDate, TimeZone, Utc};
    use core_types::Trend;

    fn sample_report() -> InventoryForecastReport {
        InventoryForecastReport {
            generated_at: Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap(),
            forecast_period: ForecastPeriod {
                start: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 2, 14).unwrap(),
            },
            items: vec![ForecastResult {
                item_id: "i1".into(),
                item_name: "Geometry Set, Oxford".into(),
                current_stock: 5,
                average_daily_sales: dec!(2.3333),
                forecasted_demand: dec!(70),
                recommended_reorder_point: dec!(26.3331),
                recommended_order_quantity: 84,
                days_until_stockout: dec!(2.1428),
                confidence: dec!(0.5135),
                trend: Trend::Stable,
            }],
            summary: ForecastSummary {
                items_at_risk: 1,
                total_recommended_orders: 84,
                estimated_cost: dec!(420000),
            },
        }
    }

    #[test]
    fn csv_has_sections_and_formatted_rows() {
        let csv = to_csv(&sample_report(), "TZS").unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Inventory Forecast Report");
        assert_eq!(lines[1], "Generated,2024-01-15 09:30:00 UTC");
        assert_eq!(lines[2], "Forecast Period,2024-01-15,2024-02-14");
        assert!(lines.contains(&"Items at Risk,1"));
        assert!(lines.contains(&"Estimated Cost (TZS),420000"));
        assert_eq!(
            lines.last().copied(),
            Some("i1,\"Geometry Set, Oxford\",5,2.33,70,26.33,84,2.1,51%,stable")
        );
    }

    #[test]
    fn json_round_trips() {
        let report = sample_report();
        let json = to_json(&report).unwrap();
        let parsed: InventoryForecastReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
