//! Order sync: best-effort replication to the secondary order service
//!
//! ```text
//! OrderService::create ──enqueue──► bounded queue ──► SyncWorker ──POST──► ORDER_SYNC_URL
//!        (never waits)                (full → drop)      (timeout, no retry)
//! ```
//!
//! Every failure on this path is logged as `SyncForwardFailed` and swallowed.

mod service;
mod worker;

pub use service::OrderSyncForwarder;
pub use worker::SyncWorker;

use crate::utils::validation::sanitize_text;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::Order;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Secondary service rejected the order: HTTP {status}")]
    Rejected { status: u16 },
}

/// Order as the secondary service expects it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
    pub table_id: i64,
    pub table_name: String,
    pub customer_note: String,
    pub items: Vec<SyncItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncItem {
    pub dish_id: i64,
    pub dish_name: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    pub dish_note: String,
}

impl SyncPayload {
    pub fn from_order(order: &Order) -> Self {
        Self {
            table_id: order.table_id,
            table_name: order.table_label.clone(),
            customer_note: order
                .customer_note
                .as_deref()
                .map(sanitize_text)
                .unwrap_or_default(),
            items: order
                .lines
                .iter()
                .map(|line| SyncItem {
                    dish_id: line.dish_id,
                    dish_name: line.dish_name.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    dish_note: String::new(),
                })
                .collect(),
        }
    }
}

/// Producer side of the sync queue
#[derive(Debug, Clone)]
pub struct SyncHandle {
    tx: mpsc::Sender<SyncPayload>,
}

impl SyncHandle {
    /// Queue a payload without waiting. Returns `false` if it was dropped.
    pub fn enqueue(&self, payload: SyncPayload) -> bool {
        match self.tx.try_send(payload) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(p)) => {
                tracing::warn!(
                    table = %p.table_name,
                    "SyncForwardFailed: sync queue full, order not forwarded"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(p)) => {
                tracing::warn!(
                    table = %p.table_name,
                    "SyncForwardFailed: sync worker stopped, order not forwarded"
                );
                false
            }
        }
    }
}
