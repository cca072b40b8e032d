use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One historical demand data point for an inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesObservation {
    pub item_id: String,
    pub quantity: u32,
    pub date: NaiveDate,
}

/// A snapshot of a catalog entry. The catalog itself is owned by the storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub stock_quantity: u32,
    pub unit_price: Decimal,
}

impl InventoryItem {
    /// Value of the units currently on hand.
    pub fn stock_value(&self) -> Decimal {
        Decimal::from(self.stock_quantity) * self.unit_price
    }
}

/// A single product line within an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub line_revenue: Decimal,
}

/// A placed order together with its line items.
///
/// `customer_identifier` is whatever the storefront uses to recognise a buyer,
/// usually a mobile-money phone number, otherwise the customer's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer_identifier: String,
    pub total_amount: Decimal,
    pub created_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl Order {
    /// The calendar day of the order, as encoded in its own timestamp offset.
    pub fn order_date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}
