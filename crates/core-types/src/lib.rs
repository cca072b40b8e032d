pub mod enums;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::Trend;
pub use structs::{InventoryItem, LineItem, Order, SalesObservation};
