//! Order core
//!
//! - [`OrderService`]: order aggregate (create, read, header edit, delete)
//! - `ledger`: line add / quantity change / removal with the total kept in step
//! - `status`: transition whitelist and compare-and-set status changes
//! - `catalog`: dish and table lookups behind a trait seam
//! - `money`: minor-unit arithmetic and rounding

pub mod catalog;
mod error;
pub mod ledger;
pub mod money;
mod service;
pub mod status;

#[cfg(test)]
mod tests;

pub use catalog::{Catalog, SqliteCatalog};
pub use error::{OrderError, OrderResult};
pub use service::{ORDER_NUMBER_PREFIX, OrderService};
