//! OrderService - the order aggregate
//!
//! Owns creation, reads, header edits and deletion. Line mutations live in
//! `ledger.rs`, status changes in `status.rs`; all share this struct.
//!
//! Side effects (fan-out, sync forwarding) run only after the primary write
//! has committed and never fail the caller.

use super::catalog::Catalog;
use super::money::{self, MAX_QUANTITY, from_minor, money_eq, round_money, to_minor};
use super::status::parse_status;
use super::{OrderError, OrderResult};
use crate::db::repository::order::{self, HeaderChanges, NewOrder, NewOrderLine, OrderFilter};
use crate::db::repository::{RepoResult, order_line};
use crate::live::LiveOrderHub;
use crate::sync::{SyncHandle, SyncPayload};
use crate::utils::validation::{
    MAX_LABEL_LEN, MAX_ORDER_NUMBER_LEN, normalize_note, validate_required_text,
};
use chrono::Utc;
use chrono_tz::Tz;
use shared::message::{LiveEvent, OrderCreatedPayload};
use shared::models::{
    DiningTable, Dish, Order, OrderCreate, OrderHeaderUpdate, OrderLine, OrderLineInput,
    OrderQuery, TABLE_LABEL_PREFIX,
};
use sqlx::SqlitePool;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Every generated order number starts with this
pub const ORDER_NUMBER_PREFIX: &str = "ORD-";

const DEFAULT_CATALOG_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(Clone)]
pub struct OrderService {
    pub(super) pool: SqlitePool,
    catalog: Arc<dyn Catalog>,
    hub: LiveOrderHub,
    sync: Option<SyncHandle>,
    /// Business timezone for order numbers
    tz: Tz,
    catalog_timeout: Duration,
}

impl std::fmt::Debug for OrderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderService")
            .field("tz", &self.tz)
            .field("catalog_timeout", &self.catalog_timeout)
            .field("sync_enabled", &self.sync.is_some())
            .finish()
    }
}

impl OrderService {
    pub fn new(pool: SqlitePool, catalog: Arc<dyn Catalog>, hub: LiveOrderHub, tz: Tz) -> Self {
        Self {
            pool,
            catalog,
            hub,
            sync: None,
            tz,
            catalog_timeout: DEFAULT_CATALOG_TIMEOUT,
        }
    }

    /// Forward every created order through this handle
    pub fn with_sync(mut self, sync: SyncHandle) -> Self {
        self.sync = Some(sync);
        self
    }

    pub fn with_catalog_timeout(mut self, timeout: Duration) -> Self {
        self.catalog_timeout = timeout;
        self
    }

    pub fn hub(&self) -> &LiveOrderHub {
        &self.hub
    }

    // ========== Create ==========

    pub async fn create(&self, req: OrderCreate) -> OrderResult<Order> {
        let items = merge_items(&req.items)?;
        let customer_note = normalize_note(req.customer_note, "customerNote")?;
        let table = self
            .resolve_table(req.table_id, req.table_label.as_deref())
            .await?;

        let mut lines = Vec::with_capacity(items.len());
        for item in &items {
            let dish = self.resolve_dish(item.dish_id).await?;
            lines.push(NewOrderLine {
                dish_id: dish.id,
                dish_name: dish.name,
                quantity: item.quantity,
                unit_price: to_minor(dish.price),
            });
        }

        let created = order::create(
            &self.pool,
            NewOrder {
                order_number: self.next_order_number(),
                table_id: table.id,
                customer_note,
                created_at: shared::util::now_millis(),
                lines,
            },
        )
        .await?;

        tracing::info!(
            order_id = created.id,
            order_number = %created.order_number,
            table = %created.table_label,
            total = %created.total_amount,
            lines = created.lines.len(),
            "Order created"
        );

        self.forward(&created);
        self.publish(LiveEvent::OrderCreated(OrderCreatedPayload {
            order: created.clone(),
        }));

        Ok(created)
    }

    // ========== Reads ==========

    pub async fn get(&self, order_id: i64) -> OrderResult<Order> {
        order::find_by_id(&self.pool, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))
    }

    /// Newest first; the full list realtime clients reconcile against
    pub async fn list(&self, query: OrderQuery) -> OrderResult<Vec<Order>> {
        let status = query.status.as_deref().map(parse_status).transpose()?;
        let orders = order::find_all(
            &self.pool,
            OrderFilter {
                status,
                table_id: query.table_id,
            },
        )
        .await?;
        Ok(orders)
    }

    pub async fn list_lines(&self, order_id: i64) -> OrderResult<Vec<OrderLine>> {
        let mut conn = self.pool.acquire().await?;
        if order::fetch_status(&mut conn, order_id).await?.is_none() {
            return Err(OrderError::OrderNotFound(order_id));
        }
        drop(conn);
        Ok(order_line::find_by_order(&self.pool, order_id).await?)
    }

    // ========== Header ==========

    /// Admin edit of table, number, note and (checked) total
    ///
    /// The total stays owned by the ledger: a supplied `totalAmount` must
    /// equal the sum of the lines or the edit fails with `TotalMismatch`.
    pub async fn update_header(&self, order_id: i64, req: OrderHeaderUpdate) -> OrderResult<Order> {
        let order_number = match req.order_number {
            Some(number) => {
                let number = number.trim().to_string();
                validate_required_text(&number, "orderNumber", MAX_ORDER_NUMBER_LEN)?;
                if !number.starts_with(ORDER_NUMBER_PREFIX) {
                    return Err(OrderError::Validation(format!(
                        "orderNumber must start with {ORDER_NUMBER_PREFIX}"
                    )));
                }
                Some(number)
            }
            None => None,
        };

        if let Some(table_id) = req.table_id {
            self.lookup(self.catalog.get_table(table_id))
                .await?
                .ok_or_else(|| OrderError::TableNotFound(table_id.to_string()))?;
        }

        let customer_note = match req.customer_note {
            Some(note) => Some(normalize_note(Some(note), "customerNote")?),
            None => None,
        };

        let now = shared::util::now_millis();
        let mut tx = self.pool.begin().await?;

        if !order::touch(&mut *tx, order_id, now).await? {
            return Err(OrderError::OrderNotFound(order_id));
        }

        if let Some(supplied) = req.total_amount {
            let expected = from_minor(order::line_sum(&mut *tx, order_id).await?);
            let supplied = round_money(supplied);
            if !money_eq(expected, supplied) {
                return Err(OrderError::TotalMismatch { expected, supplied });
            }
        }

        let changes = HeaderChanges {
            table_id: req.table_id,
            order_number,
            customer_note,
        };
        order::update_header(&mut *tx, order_id, &changes, now).await?;

        let updated = order::fetch_order(&mut *tx, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        tx.commit().await?;

        tracing::info!(
            order_id,
            order_number = %updated.order_number,
            table = %updated.table_label,
            "Order header updated"
        );
        Ok(updated)
    }

    // ========== Delete ==========

    /// Administrative delete, allowed in any status; lines cascade
    pub async fn delete(&self, order_id: i64) -> OrderResult<()> {
        if !order::delete(&self.pool, order_id).await? {
            return Err(OrderError::OrderNotFound(order_id));
        }
        tracing::info!(order_id, "Order deleted");
        Ok(())
    }

    // ========== Collaborators ==========

    /// Table by id, then by label, then by the "Bàn {label}" convention
    pub(super) async fn resolve_table(
        &self,
        table_id: Option<i64>,
        table_label: Option<&str>,
    ) -> OrderResult<DiningTable> {
        if let Some(id) = table_id
            && let Some(table) = self.lookup(self.catalog.get_table(id)).await?
        {
            return Ok(table);
        }

        let label = table_label.map(str::trim).filter(|l| !l.is_empty());
        if let Some(label) = label {
            if label.chars().count() > MAX_LABEL_LEN {
                return Err(OrderError::Validation(format!(
                    "tableLabel is too long (max {MAX_LABEL_LEN})"
                )));
            }
            if let Some(table) = self
                .lookup(self.catalog.find_table_by_label(label))
                .await?
            {
                return Ok(table);
            }
            let prefixed = format!("{TABLE_LABEL_PREFIX}{label}");
            if let Some(table) = self
                .lookup(self.catalog.find_table_by_label(&prefixed))
                .await?
            {
                tracing::debug!(label, resolved = %table.label, "Table resolved by label convention");
                return Ok(table);
            }
        }

        let wanted = match (table_id, label) {
            (Some(id), _) => id.to_string(),
            (None, Some(label)) => label.to_string(),
            (None, None) => {
                return Err(OrderError::Validation(
                    "tableId or tableLabel is required".into(),
                ));
            }
        };
        Err(OrderError::TableNotFound(wanted))
    }

    /// Dish for a new line: must exist and be available
    pub(super) async fn resolve_dish(&self, dish_id: i64) -> OrderResult<Dish> {
        let dish = self
            .lookup(self.catalog.get_dish(dish_id))
            .await?
            .ok_or(OrderError::DishNotFound(dish_id))?;
        if !dish.is_available {
            return Err(OrderError::DishUnavailable(dish_id));
        }
        Ok(dish)
    }

    /// Run a catalog lookup under the configured timeout
    async fn lookup<T>(
        &self,
        fut: impl Future<Output = RepoResult<T>>,
    ) -> OrderResult<T> {
        match tokio::time::timeout(self.catalog_timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                let ms = self.catalog_timeout.as_millis() as u64;
                tracing::warn!(timeout_ms = ms, "Catalog lookup timed out");
                Err(OrderError::CatalogTimeout(ms))
            }
        }
    }

    /// Best-effort realtime fan-out; failures are logged only
    pub(super) fn publish(&self, event: LiveEvent) {
        let report = self.hub.publish(&event);
        if report.failed > 0 {
            tracing::warn!(
                event = event.name(),
                table = event.table_label().unwrap_or_default(),
                delivered = report.delivered,
                failed = report.failed,
                "BroadcastFailed: some subscribers did not receive the event"
            );
        } else {
            tracing::debug!(
                event = event.name(),
                delivered = report.delivered,
                "Event published"
            );
        }
    }

    /// Best-effort replication to the secondary order service
    fn forward(&self, order: &Order) {
        if let Some(sync) = &self.sync {
            sync.enqueue(SyncPayload::from_order(order));
        }
    }

    /// `ORD-yyMMddHHmmss` in the business timezone
    fn next_order_number(&self) -> String {
        let local = Utc::now().with_timezone(&self.tz);
        format!("{ORDER_NUMBER_PREFIX}{}", local.format("%y%m%d%H%M%S"))
    }
}

/// Validate requested items and merge repeated dishes into one line each,
/// keeping first-seen order.
fn merge_items(items: &[OrderLineInput]) -> OrderResult<Vec<OrderLineInput>> {
    if items.is_empty() {
        return Err(OrderError::OrderEmpty);
    }
    let mut merged: Vec<OrderLineInput> = Vec::with_capacity(items.len());
    for item in items {
        money::validate_quantity(item.quantity)?;
        match merged.iter_mut().find(|m| m.dish_id == item.dish_id) {
            Some(existing) => {
                existing.quantity += item.quantity;
                if existing.quantity > MAX_QUANTITY {
                    return Err(OrderError::InvalidQuantity(format!(
                        "quantity for dish {} exceeds maximum allowed ({})",
                        item.dish_id, MAX_QUANTITY
                    )));
                }
            }
            None => merged.push(item.clone()),
        }
    }
    Ok(merged)
}
