use analytics::{AnalyticsEngine, AnalyticsReport};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use configuration::{Config, ExportFormat};
use core_types::{InventoryItem, Order, SalesObservation};
use forecasting::{ForecastParams, ForecastResult, ForecastingEngine, NO_STOCKOUT_DAYS};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// The entry point for the school-supply inventory and sales insights tool.
fn main() -> Result<()> {
    // Load SUPPLY__* overrides from a .env file when one is present.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => configuration::load_config_from(path),
        None => configuration::load_config(),
    }
    .context("Failed to load configuration")?;

    // Held until exit so the file writer can flush.
    let _log_guard = configuration::init_logging(&config.logging)?;

    // Execute the appropriate command
    let result = match cli.command {
        Commands::Forecast(args) => handle_forecast(args, &config),
        Commands::Urgent(args) => handle_urgent(args, &config),
        Commands::Overstock(args) => handle_overstock(args, &config),
        Commands::Report(args) => handle_report(args, &config),
    };

    if let Err(e) = &result {
        tracing::error!(error = ?e, "Command failed");
    }
    result
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Reorder forecasts and sales reports for the school-supply storefront.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file to use instead of ./config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast demand and reorder quantities for every catalog item.
    Forecast(ForecastArgs),
    /// List items that will run out before the given number of days.
    Urgent(UrgentArgs),
    /// List items holding well over their forecasted demand.
    Overstock(CatalogInputs),
    /// Build the sales, inventory and customer report for a date range.
    Report(ReportArgs),
}

/// The catalog snapshot and sales history every forecast starts from.
#[derive(Args)]
struct CatalogInputs {
    /// JSON array of inventory items.
    #[arg(long)]
    items: PathBuf,

    /// JSON array of sales observations.
    #[arg(long)]
    sales: PathBuf,

    /// Supplier lead time in days. Defaults to `forecasting.lead_time_days`.
    #[arg(long)]
    lead_time_days: Option<u32>,

    /// Safety stock in units. Defaults to `forecasting.safety_stock`.
    #[arg(long)]
    safety_stock: Option<u32>,
}

#[derive(Args)]
struct ForecastArgs {
    #[command(flatten)]
    inputs: CatalogInputs,

    /// Output format. Defaults to `output.format`.
    #[arg(long, value_enum)]
    format: Option<ExportFormat>,

    /// Write to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct UrgentArgs {
    #[command(flatten)]
    inputs: CatalogInputs,

    /// Days-until-stockout cutoff. Defaults to `forecasting.urgent_threshold_days`.
    #[arg(long)]
    threshold_days: Option<u32>,
}

#[derive(Args)]
struct ReportArgs {
    /// JSON array of orders with their line items.
    #[arg(long)]
    orders: PathBuf,

    /// JSON array of inventory items.
    #[arg(long)]
    items: PathBuf,

    /// First day of the report (format: YYYY-MM-DD).
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the report, inclusive (format: YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Output format. Defaults to `output.format`.
    #[arg(long, value_enum)]
    format: Option<ExportFormat>,

    /// Write to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

// ==============================================================================
// Forecast Commands
// ==============================================================================

fn handle_forecast(args: ForecastArgs, config: &Config) -> Result<()> {
    let report = run_forecast(&args.inputs, config)?;

    let text = match args.format.unwrap_or(config.output.format) {
        ExportFormat::Csv => forecasting::export::to_csv(&report, &config.analytics.currency)?,
        ExportFormat::Json => forecasting::export::to_json(&report)?,
        ExportFormat::Table => {
            let results: Vec<&ForecastResult> = report.items.iter().collect();
            format!(
                "{}\nItems at risk: {}  Units to order: {}  Estimated cost: {} {}\n",
                forecast_table(&results),
                report.summary.items_at_risk,
                report.summary.total_recommended_orders,
                report.summary.estimated_cost.round_dp(2),
                config.analytics.currency,
            )
        }
    };

    emit(&text, args.output.as_deref())
}

fn handle_urgent(args: UrgentArgs, config: &Config) -> Result<()> {
    let report = run_forecast(&args.inputs, config)?;
    let threshold = args
        .threshold_days
        .unwrap_or(config.forecasting.urgent_threshold_days);

    let urgent = ForecastingEngine::new().get_urgent_reorders(&report, threshold);
    println!("{} item(s) run out within {} day(s)", urgent.len(), threshold);
    if !urgent.is_empty() {
        println!("{}", forecast_table(&urgent));
    }
    Ok(())
}

fn handle_overstock(inputs: CatalogInputs, config: &Config) -> Result<()> {
    let report = run_forecast(&inputs, config)?;

    let overstocked = ForecastingEngine::new().get_overstocked_items(&report);
    println!("{} item(s) hold more than 1.5x their 30-day demand", overstocked.len());
    if !overstocked.is_empty() {
        println!("{}", forecast_table(&overstocked));
    }
    Ok(())
}

fn run_forecast(
    inputs: &CatalogInputs,
    config: &Config,
) -> Result<forecasting::InventoryForecastReport> {
    let items: Vec<InventoryItem> = read_json(&inputs.items)?;
    let sales: Vec<SalesObservation> = read_json(&inputs.sales)?;

    let params = ForecastParams {
        lead_time_days: inputs
            .lead_time_days
            .unwrap_or(config.forecasting.lead_time_days),
        safety_stock: inputs.safety_stock.unwrap_or(config.forecasting.safety_stock),
    };
    tracing::info!(
        items = items.len(),
        observations = sales.len(),
        lead_time_days = params.lead_time_days,
        safety_stock = params.safety_stock,
        "Running inventory forecast"
    );

    Ok(ForecastingEngine::new().generate_forecast(&items, &sales, &params)?)
}

fn forecast_table(results: &[&ForecastResult]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Item",
        "Stock",
        "Avg/Day",
        "Reorder Point",
        "Order Qty",
        "Days Left",
        "Trend",
        "Confidence",
    ]);

    for r in results {
        let days_left = if r.days_until_stockout == NO_STOCKOUT_DAYS {
            "-".to_string()
        } else {
            r.days_until_stockout.round_dp(1).to_string()
        };
        table.add_row(vec![
            r.item_name.clone(),
            r.current_stock.to_string(),
            r.average_daily_sales.round_dp(2).to_string(),
            r.recommended_reorder_point.round_dp(1).to_string(),
            r.recommended_order_quantity.to_string(),
            days_left,
            r.trend.to_string(),
            format!("{}%", (r.confidence * Decimal::ONE_HUNDRED).round()),
        ]);
    }
    table
}

// ==============================================================================
// Report Command
// ==============================================================================

fn handle_report(args: ReportArgs, config: &Config) -> Result<()> {
    let orders: Vec<Order> = read_json(&args.orders)?;
    let items: Vec<InventoryItem> = read_json(&args.items)?;

    let to = args.to.unwrap_or_else(|| Utc::now().date_naive());
    let (start, end) = report_period(args.from, to, config.analytics.default_period_days);

    let report = AnalyticsEngine::new().generate_report(&orders, &items, start, end)?;
    let currency = &config.analytics.currency;

    let text = match args.format.unwrap_or(config.output.format) {
        ExportFormat::Csv => analytics::export::to_csv(&report, currency)?,
        ExportFormat::Json => analytics::export::to_json(&report)?,
        ExportFormat::Table => format!("{}\n", report_table(&report, currency)),
    };

    emit(&text, args.output.as_deref())
}

/// Turns inclusive calendar days into the UTC bounds of a report.
///
/// Without `from`, the window is the `default_days` days ending on `to`.
fn report_period(
    from: Option<NaiveDate>,
    to: NaiveDate,
    default_days: u32,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let from = from.unwrap_or(to - Duration::days(i64::from(default_days.max(1)) - 1));
    let start = from.and_time(NaiveTime::MIN).and_utc();
    let end = (to + Duration::days(1)).and_time(NaiveTime::MIN).and_utc() - Duration::seconds(1);
    (start, end)
}

fn report_table(report: &AnalyticsReport, currency: &str) -> Table {
    let day = |d: &analytics::DaySales| match d.date {
        Some(date) => format!("{} ({} {})", date, d.sales.round_dp(2), currency),
        None => "-".to_string(),
    };

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Metric", "Value"]);
    let rows = [
        (
            "Period",
            format!(
                "{} to {}",
                report.period.start.date_naive(),
                report.period.end.date_naive()
            ),
        ),
        (
            "Total sales",
            format!("{} {}", report.sales.total_sales.round_dp(2), currency),
        ),
        ("Orders", report.sales.total_orders.to_string()),
        (
            "Average order value",
            format!("{} {}", report.sales.average_order_value.round_dp(2), currency),
        ),
        ("Best day", day(&report.trends.best_day)),
        ("Worst day", day(&report.trends.worst_day)),
        ("Growth rate", format!("{}%", report.trends.growth_rate.round_dp(1))),
        (
            "Next month (projected)",
            format!("{} {}", report.forecast.next_month.round_dp(2), currency),
        ),
        ("Items in catalog", report.inventory.total_items.to_string()),
        ("Low stock", report.inventory.low_stock_items.to_string()),
        ("Out of stock", report.inventory.out_of_stock_items.to_string()),
        ("Customers", report.customers.total_customers.to_string()),
        ("Repeat rate", format!("{}%", report.customers.repeat_rate.round_dp(1))),
    ];
    for (metric, value) in rows {
        table.add_row(vec![metric.to_string(), value]);
    }
    table
}

// ==============================================================================
// I/O helpers
// ==============================================================================

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = text.len(), "Wrote export");
        }
        None => print!("{text}"),
    }
    Ok(())
}
