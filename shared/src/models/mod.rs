//! Data models
//!
//! Shared between order-server and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]` where
//! the row maps 1:1; money-carrying types are converted from minor units by the
//! repositories. All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod dining_table;
pub mod dish;
pub mod order;

// Re-exports
pub use dining_table::*;
pub use dish::*;
pub use order::*;
