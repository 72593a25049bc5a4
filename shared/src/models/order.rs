//! Order Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order lifecycle status
///
/// Wire literals are the variant names, matched case-sensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    PendingConfirmation,
    Confirmed,
    Cooking,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::PendingConfirmation,
        OrderStatus::Confirmed,
        OrderStatus::Cooking,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PendingConfirmation => "PendingConfirmation",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Cooking => "Cooking",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// All wire literals in lifecycle order
    pub fn literals() -> Vec<&'static str> {
        Self::ALL.iter().map(|s| s.as_str()).collect()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown order status literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown order status: {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Order line (one dish per order, price snapshotted when first added)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub dish_id: i64,
    /// Dish name at the time the line was created
    pub dish_name: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    /// quantity * unit_price
    #[serde(with = "rust_decimal::serde::float")]
    pub line_total: Decimal,
}

/// Order snapshot: header plus its lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    /// Human readable number, `ORD-yyMMddHHmmss`
    pub order_number: String,
    pub table_id: i64,
    pub table_label: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub customer_note: Option<String>,
    pub created_at: i64,
    pub updated_at: Option<i64>,
    pub completed_at: Option<i64>,
    #[serde(default)]
    pub lines: Vec<OrderLine>,
}

/// Requested item in an order creation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineInput {
    #[serde(alias = "monId")]
    pub dish_id: i64,
    #[serde(alias = "soLuong")]
    pub quantity: i32,
}

/// Create order payload
///
/// Admin and customer clients name fields differently; both spellings land here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    #[serde(default, alias = "banId")]
    pub table_id: Option<i64>,
    #[serde(default, alias = "soBan")]
    pub table_label: Option<String>,
    #[serde(default, alias = "ghiChuKhach")]
    pub customer_note: Option<String>,
    #[serde(default, alias = "monOrder")]
    pub items: Vec<OrderLineInput>,
}

/// Update order header payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHeaderUpdate {
    #[serde(default)]
    pub table_id: Option<i64>,
    #[serde(default)]
    pub order_number: Option<String>,
    /// Accepted only when it equals the sum of the lines
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total_amount: Option<Decimal>,
    /// Empty string clears the note
    #[serde(default)]
    pub customer_note: Option<String>,
}

/// Status change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusUpdate {
    /// Raw literal, validated against [`OrderStatus`]
    #[serde(alias = "newStatus")]
    pub status: String,
}

/// Add-or-increment line payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineAdd {
    pub dish_id: i64,
    pub quantity: i32,
}

/// Line quantity payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineQuantityUpdate {
    pub quantity: i32,
}

/// Order list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    pub status: Option<String>,
    pub table_id: Option<i64>,
}
