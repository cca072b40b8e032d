use crate::error::AnalyticsError;
use crate::report::{
    AnalyticsReport, CategoryPerformance, CustomerMetrics, CustomerSpend, DailySales, DaySales,
    InventoryMetrics, ProductPerformance, ReportPeriod, SalesForecast, SalesMetrics, StockLevel,
    TrendSummary,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use core_types::{InventoryItem, Order};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{BTreeMap, HashMap};

/// Conversion rate reported while the storefront records no visitor traffic.
pub const CONVERSION_RATE_PLACEHOLDER: Decimal = Decimal::ZERO;

/// Fixed confidence attached to the next-month sales projection.
pub const SALES_FORECAST_CONFIDENCE: Decimal = dec!(0.75);

const TOP_N: usize = 5;
const LOW_STOCK_THRESHOLD: u32 = 10;
const SECONDS_PER_DAY: i64 = 86_400;

/// A stateless calculator for deriving business metrics from storefront activity.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Totals, top sellers and the daily sales series for a set of orders.
    pub fn calculate_sales_metrics(&self, orders: &[Order]) -> SalesMetrics {
        let orders: Vec<&Order> = orders.iter().collect();
        self.sales_metrics_for(&orders)
    }

    /// Stock-level counts over a catalog snapshot.
    pub fn calculate_inventory_metrics(&self, items: &[InventoryItem]) -> InventoryMetrics {
        let mut metrics = InventoryMetrics::default();
        if items.is_empty() {
            return metrics;
        }

        metrics.total_items = items.len();
        metrics.out_of_stock_items = items.iter().filter(|i| i.stock_quantity == 0).count();
        metrics.low_stock_items = items
            .iter()
            .filter(|i| i.stock_quantity > 0 && i.stock_quantity <= LOW_STOCK_THRESHOLD)
            .count();

        let total_stock: u64 = items.iter().map(|i| u64::from(i.stock_quantity)).sum();
        metrics.average_stock_level = Decimal::from(total_stock) / Decimal::from(items.len());
        metrics.total_stock_value = items.iter().map(InventoryItem::stock_value).sum();

        // Without sales velocity, stock relative to the average stands in for movement.
        let average = metrics.average_stock_level;
        metrics.fast_moving_items = items
            .iter()
            .filter(|i| Decimal::from(i.stock_quantity) < average)
            .take(TOP_N)
            .map(stock_level)
            .collect();
        metrics.slow_moving_items = items
            .iter()
            .filter(|i| Decimal::from(i.stock_quantity) > average)
            .take(TOP_N)
            .map(stock_level)
            .collect();

        tracing::debug!(
            total_items = metrics.total_items,
            low_stock = metrics.low_stock_items,
            out_of_stock = metrics.out_of_stock_items,
            "Calculated inventory metrics"
        );

        metrics
    }

    /// Per-customer spend and repeat-purchase figures.
    pub fn calculate_customer_metrics(&self, orders: &[Order]) -> CustomerMetrics {
        let orders: Vec<&Order> = orders.iter().collect();
        self.customer_metrics_for(&orders)
    }

    /// Builds the full report for orders placed within `[start, end]`, stamped now.
    pub fn generate_report(
        &self,
        orders: &[Order],
        items: &[InventoryItem],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<AnalyticsReport, AnalyticsError> {
        self.generate_report_at(orders, items, start, end, Utc::now())
    }

    /// Builds the full report for orders placed within `[start, end]`.
    ///
    /// # Arguments
    ///
    /// * `orders` - Every order the caller has; this method does the period filtering,
    ///   and also needs the preceding period for the growth rate.
    /// * `items` - The current catalog. Inventory is a point-in-time snapshot and is
    ///   not filtered by period.
    /// * `generated_at` - Provenance timestamp recorded on the report.
    ///
    /// # Returns
    ///
    /// The `AnalyticsReport`, or `AnalyticsError::InvalidPeriod` when `start > end`.
    pub fn generate_report_at(
        &self,
        orders: &[Order],
        items: &[InventoryItem],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        generated_at: DateTime<Utc>,
    ) -> Result<AnalyticsReport, AnalyticsError> {
        if start > end {
            tracing::warn!(%start, %end, "Rejected report with reversed period");
            return Err(AnalyticsError::InvalidPeriod { start, end });
        }

        let in_period: Vec<&Order> = orders
            .iter()
            .filter(|o| {
                let placed = placed_at(o);
                placed >= start && placed <= end
            })
            .collect();

        let sales = self.sales_metrics_for(&in_period);
        let inventory = self.calculate_inventory_metrics(items);
        let customers = self.customer_metrics_for(&in_period);

        let trends = TrendSummary {
            best_day: best_day(&sales.sales_trend),
            worst_day: worst_day(&sales.sales_trend),
            growth_rate: self.growth_rate(orders, sales.total_sales, start, end),
        };

        let forecast = SalesForecast {
            next_month: project_next_month(sales.total_sales, trends.growth_rate),
            confidence: SALES_FORECAST_CONFIDENCE,
        };

        tracing::info!(
            %start,
            %end,
            orders = sales.total_orders,
            total_sales = %sales.total_sales,
            growth_rate = %trends.growth_rate,
            "Generated analytics report"
        );

        Ok(AnalyticsReport {
            generated_at,
            period: ReportPeriod { start, end },
            sales,
            inventory,
            customers,
            trends,
            forecast,
        })
    }

    fn sales_metrics_for(&self, orders: &[&Order]) -> SalesMetrics {
        let mut metrics = SalesMetrics {
            conversion_rate: CONVERSION_RATE_PLACEHOLDER,
            ..SalesMetrics::default()
        };
        if orders.is_empty() {
            return metrics;
        }

        metrics.total_orders = orders.len();
        metrics.total_sales = orders.iter().map(|o| o.total_amount).sum();
        metrics.average_order_value = metrics.total_sales / Decimal::from(orders.len());

        let line_items = || orders.iter().flat_map(|o| o.line_items.iter());

        metrics.top_products =
            top_by_revenue(line_items().map(|l| (l.name.as_str(), l.quantity, l.line_revenue)))
                .into_iter()
                .map(|t| ProductPerformance {
                    name: t.key,
                    quantity: t.quantity,
                    revenue: t.revenue,
                })
                .collect();

        metrics.top_categories =
            top_by_revenue(line_items().map(|l| (l.category.as_str(), l.quantity, l.line_revenue)))
                .into_iter()
                .map(|t| CategoryPerformance {
                    category: t.key,
                    quantity: t.quantity,
                    revenue: t.revenue,
                })
                .collect();

        let mut by_day: BTreeMap<NaiveDate, (Decimal, usize)> = BTreeMap::new();
        for order in orders {
            let day = by_day.entry(order.order_date()).or_insert((Decimal::ZERO, 0));
            day.0 += order.total_amount;
            day.1 += 1;
        }
        metrics.sales_trend = by_day
            .into_iter()
            .map(|(date, (sales, orders))| DailySales { date, sales, orders })
            .collect();

        tracing::debug!(
            total_orders = metrics.total_orders,
            total_sales = %metrics.total_sales,
            days = metrics.sales_trend.len(),
            "Calculated sales metrics"
        );

        metrics
    }

    fn customer_metrics_for(&self, orders: &[&Order]) -> CustomerMetrics {
        let mut metrics = CustomerMetrics::default();
        if orders.is_empty() {
            return metrics;
        }

        let mut customers: Vec<CustomerSpend> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for order in orders {
            let slot = *index
                .entry(order.customer_identifier.as_str())
                .or_insert_with(|| {
                    customers.push(CustomerSpend {
                        customer_identifier: order.customer_identifier.clone(),
                        order_count: 0,
                        total_spent: Decimal::ZERO,
                    });
                    customers.len() - 1
                });
            customers[slot].order_count += 1;
            customers[slot].total_spent += order.total_amount;
        }

        metrics.total_customers = customers.len();
        metrics.repeat_customers = customers.iter().filter(|c| c.order_count > 1).count();
        metrics.repeat_rate = Decimal::from(metrics.repeat_customers)
            / Decimal::from(metrics.total_customers)
            * dec!(100);

        let total_spent: Decimal = customers.iter().map(|c| c.total_spent).sum();
        metrics.average_customer_value = total_spent / Decimal::from(metrics.total_customers);

        customers.sort_by(|a, b| b.total_spent.cmp(&a.total_spent));
        customers.truncate(TOP_N);
        metrics.top_customers = customers;

        metrics
    }

    /// Sales growth against the equally long window ending just before `start`.
    ///
    /// Zero when that window has no sales, cannot be represented, or the
    /// percentage does not fit in a `Decimal`.
    fn growth_rate(
        &self,
        orders: &[Order],
        current_sales: Decimal,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Decimal {
        let period_days = period_length_days(start, end);
        let Some(previous_start) = start.checked_sub_signed(Duration::days(period_days)) else {
            tracing::warn!(
                %start,
                period_days,
                "Previous period is out of range; growth set to zero"
            );
            return Decimal::ZERO;
        };

        let previous_sales: Decimal = orders
            .iter()
            .filter(|o| {
                let placed = placed_at(o);
                placed >= previous_start && placed < start
            })
            .map(|o| o.total_amount)
            .sum();

        if previous_sales.is_zero() {
            return Decimal::ZERO;
        }
        current_sales
            .checked_sub(previous_sales)
            .and_then(|change| change.checked_div(previous_sales))
            .and_then(|ratio| ratio.checked_mul(dec!(100)))
            .unwrap_or_else(|| {
                tracing::warn!(
                    %current_sales,
                    %previous_sales,
                    "Growth rate overflowed; growth set to zero"
                );
                Decimal::ZERO
            })
    }
}

/// Current sales carried forward at `growth_rate` percent. Falls back to a
/// flat projection when the product overflows.
fn project_next_month(total_sales: Decimal, growth_rate: Decimal) -> Decimal {
    (growth_rate / dec!(100))
        .checked_add(Decimal::ONE)
        .and_then(|factor| total_sales.checked_mul(factor))
        .unwrap_or_else(|| {
            tracing::warn!(%total_sales, %growth_rate, "Sales projection overflowed; kept flat");
            total_sales
        })
}

/// Whole days covered by `[start, end]`, rounded up, never less than one.
fn period_length_days(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let seconds = (end - start).num_seconds();
    ((seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY).max(1)
}

fn placed_at(order: &Order) -> DateTime<Utc> {
    order.created_at.with_timezone(&Utc)
}

fn stock_level(item: &InventoryItem) -> StockLevel {
    StockLevel {
        id: item.id.clone(),
        name: item.name.clone(),
        stock_quantity: item.stock_quantity,
    }
}

struct Tally {
    key: String,
    quantity: u64,
    revenue: Decimal,
}

/// Groups `(key, quantity, revenue)` entries by key and keeps the five highest
/// earners. Equal revenue keeps first-seen order.
fn top_by_revenue<'a>(entries: impl Iterator<Item = (&'a str, u32, Decimal)>) -> Vec<Tally> {
    let mut tallies: Vec<Tally> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for (key, quantity, revenue) in entries {
        let slot = *index.entry(key).or_insert_with(|| {
            tallies.push(Tally {
                key: key.to_string(),
                quantity: 0,
                revenue: Decimal::ZERO,
            });
            tallies.len() - 1
        });
        tallies[slot].quantity += u64::from(quantity);
        tallies[slot].revenue += revenue;
    }

    tallies.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    tallies.truncate(TOP_N);
    tallies
}

fn best_day(trend: &[DailySales]) -> DaySales {
    let mut best: Option<&DailySales> = None;
    for day in trend {
        if best.is_none_or(|b| day.sales > b.sales) {
            best = Some(day);
        }
    }
    day_sales(best)
}

fn worst_day(trend: &[DailySales]) -> DaySales {
    let mut worst: Option<&DailySales> = None;
    for day in trend {
        if worst.is_none_or(|w| day.sales < w.sales) {
            worst = Some(day);
        }
    }
    day_sales(worst)
}

fn day_sales(day: Option<&DailySales>) -> DaySales {
    day.map(|d| DaySales {
        date: Some(d.date),
        sales: d.sales,
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use core_types::LineItem;

    fn order_on(id: &str, customer: &str, amount: Decimal, (y, m, d): (i32, u32, u32)) -> Order {
        Order {
            id: id.to_string(),
            customer_identifier: customer.to_string(),
            total_amount: amount,
            // East Africa Time, as the storefront records it.
            created_at: FixedOffset::east_opt(3 * 3600)
                .unwrap()
                .with_ymd_and_hms(y, m, d, 10, 0, 0)
                .unwrap(),
            line_items: Vec::new(),
        }
    }

    fn order(id: &str, customer: &str, amount: Decimal, january_day: u32) -> Order {
        order_on(id, customer, amount, (2024, 1, january_day))
    }

    fn line(name: &str, category: &str, quantity: u32, revenue: Decimal) -> LineItem {
        LineItem {
            name: name.to_string(),
            category: category.to_string(),
            quantity,
            line_revenue: revenue,
        }
    }

    fn item(id: &str, stock: u32) -> InventoryItem {
        InventoryItem {
            id: id.to_string(),
            name: format!("Item {id}"),
            stock_quantity: stock,
            unit_price: dec!(1000),
        }
    }

    #[test]
    fn empty_inputs_yield_zeroed_metrics() {
        let engine = AnalyticsEngine::new();

        let sales = engine.calculate_sales_metrics(&[]);
        assert_eq!(sales.total_orders, 0);
        assert_eq!(sales.average_order_value, Decimal::ZERO);
        assert!(sales.sales_trend.is_empty());

        let inventory = engine.calculate_inventory_metrics(&[]);
        assert_eq!(inventory.average_stock_level, Decimal::ZERO);

        let customers = engine.calculate_customer_metrics(&[]);
        assert_eq!(customers.repeat_rate, Decimal::ZERO);
        assert_eq!(customers.average_customer_value, Decimal::ZERO);
    }

    #[test]
    fn sales_metrics_group_lines_and_days() {
        let engine = AnalyticsEngine::new();
        let mut first = order("o1", "A", dec!(30000), 2);
        first.line_items = vec![
            line("Exercise Book", "Stationery", 10, dec!(10000)),
            line("Maths Textbook", "Books", 1, dec!(20000)),
        ];
        let mut second = order("o2", "B", dec!(20000), 1);
        second.line_items = vec![
            line("Exercise Book", "Stationery", 5, dec!(10000)),
            line("Pencil", "Stationery", 10, dec!(10000)),
        ];

        let metrics = engine.calculate_sales_metrics(&[first, second]);

        assert_eq!(metrics.total_sales, dec!(50000));
        assert_eq!(metrics.average_order_value, dec!(25000));
        assert_eq!(metrics.conversion_rate, CONVERSION_RATE_PLACEHOLDER);

        // Exercise Book and Maths Textbook tie at 20000; the book was seen first.
        let products: Vec<(&str, u64)> = metrics
            .top_products
            .iter()
            .map(|p| (p.name.as_str(), p.quantity))
            .collect();
        assert_eq!(products, vec![("Exercise Book", 15), ("Maths Textbook", 1), ("Pencil", 10)]);

        assert_eq!(metrics.top_categories[0].category, "Stationery");
        assert_eq!(metrics.top_categories[0].revenue, dec!(30000));

        let days: Vec<String> = metrics.sales_trend.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(days, vec!["2024-01-01", "2024-01-02"]);
        assert_eq!(metrics.sales_trend[0].sales, dec!(20000));
    }

    #[test]
    fn top_lists_are_capped_at_five() {
        let engine = AnalyticsEngine::new();
        let mut big = order("o1", "A", dec!(70000), 1);
        big.line_items = (1..=7)
            .map(|i| line(&format!("P{i}"), &format!("C{i}"), 1, Decimal::from(i * 1000)))
            .collect();

        let metrics = engine.calculate_sales_metrics(&[big]);
        assert_eq!(metrics.top_products.len(), 5);
        assert_eq!(metrics.top_products[0].name, "P7");
        assert_eq!(metrics.top_categories.len(), 5);
    }

    #[test]
    fn inventory_metrics_partition_stock() {
        let engine = AnalyticsEngine::new();
        let items = vec![item("a", 0), item("b", 5), item("c", 10), item("d", 11), item("e", 74)];

        let metrics = engine.calculate_inventory_metrics(&items);

        assert_eq!(metrics.total_items, 5);
        assert_eq!(metrics.out_of_stock_items, 1);
        assert_eq!(metrics.low_stock_items, 2);
        assert_eq!(metrics.average_stock_level, dec!(20));
        assert_eq!(metrics.total_stock_value, dec!(100000));
        assert_eq!(metrics.fast_moving_items.len(), 4);
        assert_eq!(metrics.slow_moving_items.len(), 1);
        assert_eq!(metrics.slow_moving_items[0].id, "e");
        assert!(metrics.turnover_rate.is_none());
    }

    #[test]
    fn repeat_rate_counts_customers_with_several_orders() {
        let engine = AnalyticsEngine::new();
        let orders = vec![
            order("o1", "A", dec!(10000), 1),
            order("o2", "A", dec!(10000), 2),
            order("o3", "B", dec!(40000), 2),
        ];

        let metrics = engine.calculate_customer_metrics(&orders);

        assert_eq!(metrics.total_customers, 2);
        assert_eq!(metrics.repeat_customers, 1);
        assert_eq!(metrics.repeat_rate, dec!(50));
        assert_eq!(metrics.average_customer_value, dec!(30000));
        assert_eq!(metrics.top_customers[0].customer_identifier, "B");
        assert_eq!(metrics.top_customers[1].order_count, 2);
    }

    #[test]
    fn top_customers_with_equal_spend_keep_first_seen_order() {
        let engine = AnalyticsEngine::new();
        let orders = vec![
            order("o1", "+255754000111", dec!(15000), 1),
            order("o2", "+255713000222", dec!(25000), 2),
            order("o3", "+255754000111", dec!(10000), 3),
        ];

        let metrics = engine.calculate_customer_metrics(&orders);

        let ranked: Vec<&str> = metrics
            .top_customers
            .iter()
            .map(|c| c.customer_identifier.as_str())
            .collect();
        assert_eq!(ranked, vec!["+255754000111", "+255713000222"]);
        assert_eq!(metrics.top_customers[1].total_spent, dec!(25000));
    }

    #[test]
    fn report_finds_best_and_worst_days_and_growth() {
        let engine = AnalyticsEngine::new();
        let orders = vec![
            // Previous window: 2023-12-25 .. 2024-01-01 (exclusive).
            order_on("old", "C", dec!(100000), (2023, 12, 28)),
            order("o1", "A", dec!(100000), 1),
            order("o2", "B", dec!(50000), 2),
        ];
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 7, 23, 59, 59).unwrap();

        let report = engine
            .generate_report_at(&orders, &[], start, end, end)
            .unwrap();

        assert_eq!(report.sales.total_orders, 2);
        assert_eq!(report.trends.best_day.sales, dec!(100000));
        assert_eq!(report.trends.worst_day.sales, dec!(50000));
        assert_eq!(report.trends.growth_rate, dec!(50));
        assert_eq!(report.forecast.next_month, dec!(225000));
        assert_eq!(report.forecast.confidence, SALES_FORECAST_CONFIDENCE);
    }

    #[test]
    fn empty_period_defaults_best_and_worst_day() {
        let engine = AnalyticsEngine::new();
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap();

        let report = engine.generate_report_at(&[], &[], start, end, end).unwrap();

        assert_eq!(report.trends.best_day, DaySales::default());
        assert_eq!(report.trends.worst_day.date, None);
        assert_eq!(report.trends.growth_rate, Decimal::ZERO);
        assert_eq!(report.forecast.next_month, Decimal::ZERO);
    }

    #[test]
    fn period_at_the_earliest_instant_has_zero_growth() {
        let engine = AnalyticsEngine::new();
        let start = DateTime::<Utc>::MIN_UTC;
        let end = start + Duration::days(1);

        let report = engine.generate_report_at(&[], &[], start, end, end).unwrap();

        assert_eq!(report.trends.growth_rate, Decimal::ZERO);
        assert_eq!(report.forecast.next_month, Decimal::ZERO);
    }

    #[test]
    fn overflowing_growth_falls_back_to_zero() {
        let engine = AnalyticsEngine::new();
        let orders = vec![
            order_on("old", "C", dec!(0.0000000000000001), (2023, 12, 28)),
            order("o1", "A", dec!(10000000000000000), 2),
        ];
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 7, 23, 59, 59).unwrap();

        let report = engine
            .generate_report_at(&orders, &[], start, end, end)
            .unwrap();

        assert_eq!(report.trends.growth_rate, Decimal::ZERO);
        assert_eq!(report.forecast.next_month, dec!(10000000000000000));
    }

    #[test]
    fn projection_keeps_sales_flat_when_it_would_overflow() {
        assert_eq!(project_next_month(Decimal::MAX, dec!(50)), Decimal::MAX);
        assert_eq!(project_next_month(dec!(200), dec!(-25)), dec!(150));
    }

    #[test]
    fn reversed_period_is_rejected() {
        let engine = AnalyticsEngine::new();
        let start = Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        let err = engine.generate_report(&[], &[], start, end).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidPeriod { .. }));
    }

    #[test]
    fn period_length_rounds_up_to_whole_days() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(period_length_days(start, start), 1);
        assert_eq!(period_length_days(start, start + Duration::hours(30)), 2);
        assert_eq!(period_length_days(start, start + Duration::days(30)), 30);
    }
}
