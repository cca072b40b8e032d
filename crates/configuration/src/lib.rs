use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_logging;
pub use settings::{
    AnalyticsSettings, Config, ExportFormat, ForecastingSettings, LoggingSettings, OutputSettings,
};

/// Loads the application configuration from `config.toml` in the working directory.
///
/// See [`load_config_from`].
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(Path::new("config.toml"))
}

/// Loads the application configuration from `path`, then applies overrides from
/// `SUPPLY__<SECTION>__<KEY>` environment variables.
///
/// A missing file is not an error; every setting has a default. The result is
/// validated before it is returned.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("SUPPLY")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(
        path = %path.display(),
        found = path.exists(),
        lead_time_days = config.forecasting.lead_time_days,
        format = ?config.output.format,
        "Loaded configuration"
    );

    Ok(config)
}

/// Parses configuration from TOML text, without file or environment sources.
pub fn config_from_toml(toml: &str) -> Result<Config, ConfigError> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?
        .try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}
