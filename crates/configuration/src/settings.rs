use crate::error::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section may be omitted from `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub forecasting: ForecastingSettings,
    #[serde(default)]
    pub analytics: AnalyticsSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Defaults for inventory forecast runs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForecastingSettings {
    /// Days between placing a supplier order and the stock arriving.
    pub lead_time_days: u32,
    /// Units held back on top of lead-time demand.
    pub safety_stock: u32,
    /// Items running out sooner than this are listed as urgent.
    pub urgent_threshold_days: u32,
}

/// Defaults for sales reports.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    /// Length of the report window when no start date is given.
    pub default_period_days: u32,
    /// ISO 4217 code used to label money columns.
    pub currency: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub format: ExportFormat,
}

/// How reports are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    /// A console table; falls back to CSV where a table makes no sense.
    Table,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is not set, e.g. `"info"` or `"forecasting=debug"`.
    pub level: String,
    /// Directory for daily-rolling log files. Console only when unset.
    pub directory: Option<PathBuf>,
}

// --- Default Implementations ---

impl Default for ForecastingSettings {
    fn default() -> Self {
        Self {
            lead_time_days: 7,
            safety_stock: 10,
            urgent_threshold_days: 7,
        }
    }
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            default_period_days: 30,
            currency: "TZS".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl Config {
    /// Rejects settings the engines cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.forecasting.lead_time_days == 0 {
            return Err(ConfigError::ValidationError(
                "forecasting.lead_time_days must be at least 1".to_string(),
            ));
        }
        if self.analytics.default_period_days == 0 {
            return Err(ConfigError::ValidationError(
                "analytics.default_period_days must be at least 1".to_string(),
            ));
        }
        if self.analytics.currency.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "analytics.currency must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
