use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Sales history for item '{item_id}' is empty; supply at least one observation")]
    EmptySalesHistory { item_id: String },

    #[error("Failed to write CSV export: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to serialize forecast report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Export error: {0}")]
    Export(String),
}
