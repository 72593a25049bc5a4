//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Prefix the customer client's tables are stored under ("Bàn 5")
pub const TABLE_LABEL_PREFIX: &str = "Bàn ";

/// Label with the customer-client prefix removed, so "5" and "Bàn 5" meet
pub fn short_table_label(label: &str) -> &str {
    let label = label.trim();
    label
        .strip_prefix(TABLE_LABEL_PREFIX)
        .map(str::trim)
        .filter(|rest| !rest.is_empty())
        .unwrap_or(label)
}

/// Dining table entity
///
/// Orders reference tables; a table with order history cannot be removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct DiningTable {
    pub id: i64,
    /// Human chosen label, unique ("5", "Bàn 5", ...)
    pub label: String,
    /// Free/Occupied/Maintenance/Disabled by convention
    pub status: String,
    pub qr_token: Option<String>,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningTableCreate {
    pub label: String,
    pub status: Option<String>,
    pub qr_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_table_label() {
        assert_eq!(short_table_label("Bàn 7"), "7");
        assert_eq!(short_table_label(" 7 "), "7");
        assert_eq!(short_table_label("Terrace 2"), "Terrace 2");
        assert_eq!(short_table_label("Bàn "), "Bàn");
    }
}
