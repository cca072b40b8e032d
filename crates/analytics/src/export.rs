//! CSV and JSON renderings of an [`AnalyticsReport`].
//!
//! The CSV layout is a fixed sequence of sections: header and period, sales,
//! top products, top categories, daily sales, inventory, customers.

use crate::error::AnalyticsError;
use crate::report::{AnalyticsReport, DaySales};
use csv::{Writer, WriterBuilder};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

type CsvWriter = Writer<Vec<u8>>;

/// Renders the report as sectioned CSV. `currency` only labels monetary rows.
pub fn to_csv(report: &AnalyticsReport, currency: &str) -> Result<String, AnalyticsError> {
    let mut w = WriterBuilder::new().flexible(true).from_writer(Vec::new());

    w.write_record(["Analytics Report"])?;
    w.write_record([
        "Period",
        report.period.start.to_rfc3339().as_str(),
        report.period.end.to_rfc3339().as_str(),
    ])?;
    w.write_record(["Generated", report.generated_at.to_rfc3339().as_str()])?;
    w.write_record([""])?;

    write_sales(&mut w, report, currency)?;
    write_inventory(&mut w, report, currency)?;
    write_customers(&mut w, report, currency)?;

    let bytes = w
        .into_inner()
        .map_err(|e| AnalyticsError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| AnalyticsError::Export(e.to_string()))
}

/// Pretty-printed structural dump; parses back into an identical `AnalyticsReport`.
pub fn to_json(report: &AnalyticsReport) -> Result<String, AnalyticsError> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn write_sales(
    w: &mut CsvWriter,
    report: &AnalyticsReport,
    currency: &str,
) -> Result<(), AnalyticsError> {
    let sales = &report.sales;

    w.write_record(["Sales Metrics"])?;
    w.write_record([format!("Total Sales ({currency})"), money(sales.total_sales)])?;
    w.write_record(["Total Orders".to_string(), sales.total_orders.to_string()])?;
    w.write_record([
        format!("Average Order Value ({currency})"),
        money(sales.average_order_value),
    ])?;
    w.write_record(["Conversion Rate".to_string(), percent(sales.conversion_rate)])?;
    write_day(w, "Best Day", &report.trends.best_day)?;
    write_day(w, "Worst Day", &report.trends.worst_day)?;
    w.write_record(["Growth Rate".to_string(), percent(report.trends.growth_rate)])?;
    w.write_record([
        format!("Forecast Next Month ({currency})"),
        money(report.forecast.next_month),
    ])?;
    w.write_record([
        "Forecast Confidence".to_string(),
        percent(report.forecast.confidence * dec!(100)),
    ])?;
    w.write_record([""])?;

    w.write_record(["Top Products"])?;
    w.write_record(["Product", "Quantity", "Revenue"])?;
    for p in &sales.top_products {
        w.write_record([p.name.clone(), p.quantity.to_string(), money(p.revenue)])?;
    }
    w.write_record([""])?;

    w.write_record(["Top Categories"])?;
    w.write_record(["Category", "Quantity", "Revenue"])?;
    for c in &sales.top_categories {
        w.write_record([c.category.clone(), c.quantity.to_string(), money(c.revenue)])?;
    }
    w.write_record([""])?;

    w.write_record(["Daily Sales"])?;
    w.write_record(["Date", "Orders", "Sales"])?;
    for day in &sales.sales_trend {
        w.write_record([day.date.to_string(), day.orders.to_string(), money(day.sales)])?;
    }
    w.write_record([""])?;

    Ok(())
}

fn write_inventory(
    w: &mut CsvWriter,
    report: &AnalyticsReport,
    currency: &str,
) -> Result<(), AnalyticsError> {
    let inventory = &report.inventory;

    w.write_record(["Inventory Metrics"])?;
    w.write_record(["Total Items".to_string(), inventory.total_items.to_string()])?;
    w.write_record(["Low Stock Items".to_string(), inventory.low_stock_items.to_string()])?;
    w.write_record([
        "Out of Stock Items".to_string(),
        inventory.out_of_stock_items.to_string(),
    ])?;
    w.write_record([
        "Average Stock Level".to_string(),
        inventory.average_stock_level.round_dp(1).to_string(),
    ])?;
    w.write_record([
        format!("Total Stock Value ({currency})"),
        money(inventory.total_stock_value),
    ])?;
    w.write_record([
        "Turnover Rate".to_string(),
        inventory
            .turnover_rate
            .map(|r| r.round_dp(2).to_string())
            .unwrap_or_else(|| "n/a".to_string()),
    ])?;

    for (label, levels) in [
        ("Fast Moving Candidates", &inventory.fast_moving_items),
        ("Slow Moving Candidates", &inventory.slow_moving_items),
    ] {
        w.write_record([label])?;
        w.write_record(["Item ID", "Name", "Stock"])?;
        for level in levels {
            w.write_record([
                level.id.clone(),
                level.name.clone(),
                level.stock_quantity.to_string(),
            ])?;
        }
    }
    w.write_record([""])?;

    Ok(())
}

fn write_customers(
    w: &mut CsvWriter,
    report: &AnalyticsReport,
    currency: &str,
) -> Result<(), AnalyticsError> {
    let customers = &report.customers;

    w.write_record(["Customer Metrics"])?;
    w.write_record(["Total Customers".to_string(), customers.total_customers.to_string()])?;
    w.write_record(["Repeat Customers".to_string(), customers.repeat_customers.to_string()])?;
    w.write_record(["Repeat Rate".to_string(), percent(customers.repeat_rate)])?;
    w.write_record([
        format!("Average Customer Value ({currency})"),
        money(customers.average_customer_value),
    ])?;

    w.write_record(["Top Customers"])?;
    w.write_record(["Customer", "Orders", "Total Spent"])?;
    for c in &customers.top_customers {
        w.write_record([
            c.customer_identifier.clone(),
            c.order_count.to_string(),
            money(c.total_spent),
        ])?;
    }

    Ok(())
}

fn write_day(w: &mut CsvWriter, label: &str, day: &DaySales) -> Result<(), AnalyticsError> {
    let date = day.date.map(|d| d.to_string()).unwrap_or_default();
    w.write_record([label.to_string(), date, money(day.sales)])?;
    Ok(())
}

fn money(amount: Decimal) -> String {
    amount.round_dp(2).to_string()
}

/// Formats an already-scaled percentage, e.g. `50` as `50.0%`.
fn percent(value: Decimal) -> String {
    format!("{:.1}%", value.round_dp(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn sample_report() -> AnalyticsReport {
        let day = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        AnalyticsReport {
            generated_at: Utc.with_ymd_and_hms(2024, 2, 1, 6, 0, 0).unwrap(),
            period: ReportPeriod {
                start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap(),
            },
            sales: SalesMetrics {
                total_sales: dec!(150000),
                total_orders: 3,
                average_order_value: dec!(50000),
                conversion_rate: Decimal::ZERO,
                top_products: vec![ProductPerformance {
                    name: "Atlas, East Africa".into(),
                    quantity: 3,
                    revenue: dec!(150000),
                }],
                top_categories: vec![CategoryPerformance {
                    category: "Books".into(),
                    quantity: 3,
                    revenue: dec!(150000),
                }],
                sales_trend: vec![DailySales {
                    date: day,
                    sales: dec!(150000),
                    orders: 3,
                }],
            },
            inventory: InventoryMetrics {
                total_items: 2,
                low_stock_items: 1,
                out_of_stock_items: 0,
                average_stock_level: dec!(12.5),
                total_stock_value: dec!(62500),
                fast_moving_items: vec![StockLevel {
                    id: "i2".into(),
                    name: "Ruler".into(),
                    stock_quantity: 5,
                }],
                slow_moving_items: vec![],
                turnover_rate: None,
            },
            customers: CustomerMetrics {
                total_customers: 2,
                repeat_customers: 1,
                repeat_rate: dec!(50),
                average_customer_value: dec!(75000),
                top_customers: vec![CustomerSpend {
                    customer_identifier: "+255754000111".into(),
                    order_count: 2,
                    total_spent: dec!(100000),
                }],
            },
            trends: TrendSummary {
                best_day: DaySales {
                    date: Some(day),
                    sales: dec!(150000),
                },
                worst_day: DaySales {
                    date: Some(day),
                    sales: dec!(150000),
                },
                growth_rate: dec!(12.3456),
            },
            forecast: SalesForecast {
                next_month: dec!(168518.4),
                confidence: dec!(0.75),
            },
        }
    }

    #[test]
    fn csv_sections_appear_in_order() {
        let csv = to_csv(&sample_report(), "TZS").unwrap();

        let sections = [
            "Analytics Report",
            "Sales Metrics",
            "Top Products",
            "Top Categories",
            "Daily Sales",
            "Inventory Metrics",
            "Customer Metrics",
        ];
        let positions: Vec<usize> = sections
            .iter()
            .map(|s| csv.lines().position(|l| l == *s).unwrap())
            .collect();
        assert!(positions.windows(2).all(|p| p[0] < p[1]));

        assert!(csv.contains("Total Sales (TZS),150000\n"));
        assert!(csv.contains("Best Day,2024-01-03,150000\n"));
        assert!(csv.contains("Growth Rate,12.3%\n"));
        assert!(csv.contains("Forecast Confidence,75.0%\n"));
        assert!(csv.contains("\"Atlas, East Africa\",3,150000\n"));
        assert!(csv.contains("Repeat Rate,50.0%\n"));
        assert!(csv.contains("Turnover Rate,n/a\n"));
    }

    #[test]
    fn empty_day_is_null_in_json_and_blank_in_csv() {
        let mut report = sample_report();
        report.trends.worst_day = DaySales::default();

        let value: serde_json::Value = serde_json::from_str(&to_json(&report).unwrap()).unwrap();
        assert!(value["trends"]["worst_day"]["date"].is_null());

        let csv = to_csv(&report, "TZS").unwrap();
        assert!(csv.contains("Worst Day,,0\n"));
    }

    #[test]
    fn json_round_trips_with_top_level_sections() {
        let report = sample_report();
        let json = to_json(&report).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for key in ["period", "sales", "inventory", "customers"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }

        let parsed: AnalyticsReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
