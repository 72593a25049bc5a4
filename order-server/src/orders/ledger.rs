//! Line-Item Ledger
//!
//! Every line mutation and its total delta commit in one SQLite transaction.
//! The first statement of each transaction writes the parent order row
//! (`order::touch`), so concurrent mutations of the same order queue on the
//! write lock instead of racing on `total_amount`. The delta itself is applied
//! with `total_amount = total_amount + ?` and never read back into memory first.
//!
//! Catalog lookups happen before the transaction opens; the write lock is
//! never held across a call that may time out.

use super::money::{MAX_QUANTITY, line_total_minor, to_minor, validate_quantity};
use super::status::ensure_modifiable;
use super::{OrderError, OrderResult, OrderService};
use crate::db::repository::{order, order_line};
use shared::models::{Dish, Order};
use sqlx::SqliteConnection;

impl OrderService {
    /// Add `quantity` of a dish, merging into the existing line for that dish
    ///
    /// An existing line keeps its snapshot price; a new line snapshots the
    /// current catalog price and must be available.
    pub async fn add_or_increment(
        &self,
        order_id: i64,
        dish_id: i64,
        quantity: i32,
    ) -> OrderResult<Order> {
        validate_quantity(quantity)?;

        let mut dish: Option<Dish> = {
            let mut conn = self.pool.acquire().await?;
            ensure_order_modifiable(&mut conn, order_id).await?;
            let existing = order_line::fetch_by_dish(&mut conn, order_id, dish_id).await?;
            drop(conn);
            match existing {
                Some(_) => None,
                None => Some(self.resolve_dish(dish_id).await?),
            }
        };

        loop {
            let now = shared::util::now_millis();
            let mut tx = self.pool.begin().await?;

            if !order::touch(&mut *tx, order_id, now).await? {
                return Err(OrderError::OrderNotFound(order_id));
            }
            ensure_order_modifiable(&mut *tx, order_id).await?;

            let existing = order_line::fetch_by_dish(&mut *tx, order_id, dish_id).await?;
            let (line_id, delta) = match existing {
                Some(line) => {
                    let new_quantity = line.quantity + quantity;
                    if new_quantity > MAX_QUANTITY {
                        return Err(OrderError::InvalidQuantity(format!(
                            "line quantity would exceed maximum allowed ({MAX_QUANTITY}), got {new_quantity}"
                        )));
                    }
                    order_line::set_quantity(&mut *tx, line.id, new_quantity).await?;
                    (line.id, line_total_minor(quantity, line.unit_price))
                }
                None => match &dish {
                    Some(dish) => {
                        let unit_price = to_minor(dish.price);
                        let line_id = order_line::insert(
                            &mut *tx, order_id, dish.id, &dish.name, quantity, unit_price,
                        )
                        .await?;
                        (line_id, line_total_minor(quantity, unit_price))
                    }
                    None => {
                        // line was removed after the pre-check; the dish is needed after all
                        drop(tx);
                        dish = Some(self.resolve_dish(dish_id).await?);
                        continue;
                    }
                },
            };

            order::apply_total_delta(&mut *tx, order_id, delta).await?;
            let updated = order::fetch_order(&mut *tx, order_id)
                .await?
                .ok_or(OrderError::OrderNotFound(order_id))?;
            tx.commit().await?;

            tracing::info!(
                order_id,
                line_id,
                dish_id,
                quantity,
                delta,
                total = %updated.total_amount,
                "Order line added"
            );
            return Ok(updated);
        }
    }

    /// Set a line's quantity; the total moves by the difference
    pub async fn update_quantity(&self, line_id: i64, new_quantity: i32) -> OrderResult<Order> {
        validate_quantity(new_quantity)?;

        let order_id = order_line::find_record(&self.pool, line_id)
            .await?
            .ok_or(OrderError::LineNotFound(line_id))?
            .order_id;

        let mut tx = self.pool.begin().await?;
        if !order::touch(&mut *tx, order_id, shared::util::now_millis()).await? {
            // order deleted in between, its lines went with it
            return Err(OrderError::LineNotFound(line_id));
        }
        let line = order_line::fetch_record(&mut *tx, line_id)
            .await?
            .ok_or(OrderError::LineNotFound(line_id))?;
        ensure_order_modifiable(&mut *tx, order_id).await?;

        let delta = line_total_minor(new_quantity, line.unit_price) - line.line_total();
        order_line::set_quantity(&mut *tx, line_id, new_quantity).await?;
        order::apply_total_delta(&mut *tx, order_id, delta).await?;

        let updated = order::fetch_order(&mut *tx, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        tx.commit().await?;

        tracing::info!(
            order_id,
            line_id,
            from = line.quantity,
            to = new_quantity,
            delta,
            total = %updated.total_amount,
            "Order line quantity updated"
        );
        Ok(updated)
    }

    /// Delete a line; the total drops by that line's contribution
    pub async fn remove_line(&self, line_id: i64) -> OrderResult<Order> {
        let order_id = order_line::find_record(&self.pool, line_id)
            .await?
            .ok_or(OrderError::LineNotFound(line_id))?
            .order_id;

        let mut tx = self.pool.begin().await?;
        if !order::touch(&mut *tx, order_id, shared::util::now_millis()).await? {
            return Err(OrderError::LineNotFound(line_id));
        }
        let line = order_line::fetch_record(&mut *tx, line_id)
            .await?
            .ok_or(OrderError::LineNotFound(line_id))?;
        ensure_order_modifiable(&mut *tx, order_id).await?;

        order_line::delete(&mut *tx, line_id).await?;
        order::apply_total_delta(&mut *tx, order_id, -line.line_total()).await?;

        let updated = order::fetch_order(&mut *tx, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        tx.commit().await?;

        tracing::info!(
            order_id,
            line_id,
            delta = -line.line_total(),
            total = %updated.total_amount,
            "Order line removed"
        );
        Ok(updated)
    }
}

async fn ensure_order_modifiable(conn: &mut SqliteConnection, order_id: i64) -> OrderResult<()> {
    let status = order::fetch_status(conn, order_id)
        .await?
        .ok_or(OrderError::OrderNotFound(order_id))?;
    ensure_modifiable(order_id, status)
}
