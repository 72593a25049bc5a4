//! Order Repository
//!
//! Header rows live in `orders`, lines in `order_line`. `total_amount` is
//! maintained in minor units and only ever changed together with the lines
//! inside one transaction.

use super::order_line::{self, OrderLineRow};
use super::{RepoError, RepoResult};
use crate::orders::money::{from_minor, line_total_minor};
use shared::models::{Order, OrderLine, OrderStatus};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_number: String,
    table_id: i64,
    table_label: String,
    total_amount: i64,
    status: String,
    customer_note: Option<String>,
    created_at: i64,
    updated_at: Option<i64>,
    completed_at: Option<i64>,
}

impl OrderRow {
    fn into_order(self, lines: Vec<OrderLine>) -> RepoResult<Order> {
        let status: OrderStatus = self
            .status
            .parse()
            .map_err(|e| RepoError::Database(format!("order {}: {e}", self.id)))?;
        Ok(Order {
            id: self.id,
            order_number: self.order_number,
            table_id: self.table_id,
            table_label: self.table_label,
            total_amount: from_minor(self.total_amount),
            status,
            customer_note: self.customer_note,
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
            lines,
        })
    }
}

const SELECT_ORDER: &str = "SELECT o.id, o.order_number, o.table_id, t.label AS table_label, \
     o.total_amount, o.status, o.customer_note, o.created_at, o.updated_at, o.completed_at \
     FROM orders o JOIN dining_table t ON t.id = o.table_id";

/// New line for [`create`]; unit price already snapshotted from the catalog
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub dish_id: i64,
    pub dish_name: String,
    pub quantity: i32,
    /// minor units
    pub unit_price: i64,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub table_id: i64,
    pub customer_note: Option<String>,
    pub created_at: i64,
    pub lines: Vec<NewOrderLine>,
}

/// Header fields changed by an admin edit; `None` leaves the column as is
#[derive(Debug, Clone, Default)]
pub struct HeaderChanges {
    pub table_id: Option<i64>,
    pub order_number: Option<String>,
    /// `Some(None)` clears the note
    pub customer_note: Option<Option<String>>,
}

/// List filter
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub table_id: Option<i64>,
}

/// Insert the order and all its lines as one unit
pub async fn create(pool: &SqlitePool, data: NewOrder) -> RepoResult<Order> {
    let total: i64 = data
        .lines
        .iter()
        .map(|l| line_total_minor(l.quantity, l.unit_price))
        .sum();

    let mut tx = pool.begin().await?;

    let order_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO orders (order_number, table_id, total_amount, status, customer_note, created_at) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.order_number)
    .bind(data.table_id)
    .bind(total)
    .bind(OrderStatus::PendingConfirmation.as_str())
    .bind(&data.customer_note)
    .bind(data.created_at)
    .fetch_one(&mut *tx)
    .await?;

    for line in &data.lines {
        order_line::insert(
            &mut *tx,
            order_id,
            line.dish_id,
            &line.dish_name,
            line.quantity,
            line.unit_price,
        )
        .await?;
    }

    let order = fetch_order(&mut *tx, order_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create order".into()))?;
    tx.commit().await?;
    Ok(order)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let mut conn = pool.acquire().await?;
    fetch_order(&mut conn, id).await
}

/// Orders newest first, each with its lines
pub async fn find_all(pool: &SqlitePool, filter: OrderFilter) -> RepoResult<Vec<Order>> {
    let status = filter.status.map(|s| s.as_str());

    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "{SELECT_ORDER} WHERE (?1 IS NULL OR o.status = ?1) AND (?2 IS NULL OR o.table_id = ?2) \
         ORDER BY o.created_at DESC, o.id DESC"
    ))
    .bind(status)
    .bind(filter.table_id)
    .fetch_all(pool)
    .await?;

    let line_rows = sqlx::query_as::<_, OrderLineRow>(&format!(
        "{} WHERE order_id IN (SELECT id FROM orders WHERE (?1 IS NULL OR status = ?1) \
         AND (?2 IS NULL OR table_id = ?2)) ORDER BY order_id, id",
        order_line::SELECT_LINE
    ))
    .bind(status)
    .bind(filter.table_id)
    .fetch_all(pool)
    .await?;

    let mut lines_by_order: HashMap<i64, Vec<OrderLine>> = HashMap::new();
    for row in line_rows {
        lines_by_order
            .entry(row.order_id)
            .or_default()
            .push(row.into());
    }

    rows.into_iter()
        .map(|row| {
            let lines = lines_by_order.remove(&row.id).unwrap_or_default();
            row.into_order(lines)
        })
        .collect()
}

/// Header plus lines, read through an open connection or transaction
pub async fn fetch_order(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Order>> {
    let Some(row) = sqlx::query_as::<_, OrderRow>(&format!("{SELECT_ORDER} WHERE o.id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
    else {
        return Ok(None);
    };
    let lines = order_line::fetch_by_order(conn, id).await?;
    row.into_order(lines).map(Some)
}

/// Current status of an order
pub async fn fetch_status(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<OrderStatus>> {
    let status: Option<String> = sqlx::query_scalar("SELECT status FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    status
        .map(|s| {
            s.parse()
                .map_err(|e| RepoError::Database(format!("order {id}: {e}")))
        })
        .transpose()
}

/// Bump `updated_at`. Run as the first statement of a ledger transaction so
/// the write lock is held before anything is read.
pub async fn touch(conn: &mut SqliteConnection, id: i64, now: i64) -> RepoResult<bool> {
    let result = sqlx::query("UPDATE orders SET updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// `total_amount = total_amount + delta` in one statement
pub async fn apply_total_delta(conn: &mut SqliteConnection, id: i64, delta: i64) -> RepoResult<()> {
    sqlx::query("UPDATE orders SET total_amount = total_amount + ? WHERE id = ?")
        .bind(delta)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Sum of `quantity * unit_price` over the order's lines (minor units)
pub async fn line_sum(conn: &mut SqliteConnection, id: i64) -> RepoResult<i64> {
    let sum: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(quantity * unit_price), 0) FROM order_line WHERE order_id = ?",
    )
    .bind(id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(sum)
}

pub async fn update_header(
    conn: &mut SqliteConnection,
    id: i64,
    changes: &HeaderChanges,
    now: i64,
) -> RepoResult<bool> {
    let (set_note, note) = match &changes.customer_note {
        Some(note) => (true, note.clone()),
        None => (false, None),
    };
    let result = sqlx::query(
        "UPDATE orders SET table_id = COALESCE(?, table_id), \
         order_number = COALESCE(?, order_number), \
         customer_note = CASE WHEN ? THEN ? ELSE customer_note END, \
         updated_at = ? WHERE id = ?",
    )
    .bind(changes.table_id)
    .bind(&changes.order_number)
    .bind(set_note)
    .bind(note)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Compare-and-set status change. Returns `false` when the order is no
/// longer in `expected` (or does not exist).
pub async fn update_status(
    conn: &mut SqliteConnection,
    id: i64,
    expected: OrderStatus,
    new_status: OrderStatus,
    now: i64,
) -> RepoResult<bool> {
    let completed_at = (new_status == OrderStatus::Completed).then_some(now);
    let result = sqlx::query(
        "UPDATE orders SET status = ?, updated_at = ?, \
         completed_at = COALESCE(?, completed_at) WHERE id = ? AND status = ?",
    )
    .bind(new_status.as_str())
    .bind(now)
    .bind(completed_at)
    .bind(id)
    .bind(expected.as_str())
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete an order; lines go with it (ON DELETE CASCADE)
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM orders WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::seeded_pool;
    use rust_decimal::Decimal;

    fn new_order(table_id: i64, created_at: i64) -> NewOrder {
        NewOrder {
            order_number: format!("ORD-{created_at}"),
            table_id,
            customer_note: Some("ít cay".into()),
            created_at,
            lines: vec![
                NewOrderLine {
                    dish_id: 1,
                    dish_name: "Phở bò".into(),
                    quantity: 2,
                    unit_price: 5_000_000,
                },
                NewOrderLine {
                    dish_id: 2,
                    dish_name: "Lẩu thái".into(),
                    quantity: 1,
                    unit_price: 15_000_000,
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_create_writes_header_and_lines() {
        let pool = seeded_pool().await;
        let order = create(&pool, new_order(1, 100)).await.unwrap();

        assert_eq!(order.total_amount, Decimal::from(250000));
        assert_eq!(order.status, OrderStatus::PendingConfirmation);
        assert_eq!(order.table_label, "5");
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.lines[0].line_total, Decimal::from(100000));

        let reread = find_by_id(&pool, order.id).await.unwrap().unwrap();
        assert_eq!(reread, order);
    }

    #[tokio::test]
    async fn test_create_is_all_or_nothing() {
        let pool = seeded_pool().await;
        let mut data = new_order(1, 100);
        // duplicate dish violates UNIQUE(order_id, dish_id) on the second insert
        data.lines[1].dish_id = 1;

        let result = create(&pool, data).await;
        assert!(matches!(result, Err(RepoError::Duplicate(_))));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_line")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_find_all_filters_and_orders_newest_first() {
        let pool = seeded_pool().await;
        let first = create(&pool, new_order(1, 100)).await.unwrap();
        let second = create(&pool, new_order(2, 200)).await.unwrap();

        let all = find_all(&pool, OrderFilter::default()).await.unwrap();
        assert_eq!(
            all.iter().map(|o| o.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );
        assert!(all.iter().all(|o| o.lines.len() == 2));

        let by_table = find_all(
            &pool,
            OrderFilter {
                table_id: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(by_table.len(), 1);
        assert_eq!(by_table[0].id, second.id);

        let mut conn = pool.acquire().await.unwrap();
        assert!(
            update_status(
                &mut conn,
                first.id,
                OrderStatus::PendingConfirmation,
                OrderStatus::Confirmed,
                300
            )
            .await
            .unwrap()
        );
        drop(conn);

        let confirmed = find_all(
            &pool,
            OrderFilter {
                status: Some(OrderStatus::Confirmed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].id, first.id);
    }

    #[tokio::test]
    async fn test_update_status_is_compare_and_set() {
        let pool = seeded_pool().await;
        let order = create(&pool, new_order(1, 100)).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        // wrong expected status
        assert!(
            !update_status(
                &mut conn,
                order.id,
                OrderStatus::Cooking,
                OrderStatus::Completed,
                200
            )
            .await
            .unwrap()
        );
        assert_eq!(
            fetch_status(&mut conn, order.id).await.unwrap(),
            Some(OrderStatus::PendingConfirmation)
        );
        assert_eq!(fetch_status(&mut conn, 999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_header_update_and_note_clear() {
        let pool = seeded_pool().await;
        let order = create(&pool, new_order(1, 100)).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let changes = HeaderChanges {
            table_id: Some(2),
            order_number: None,
            customer_note: Some(None),
        };
        assert!(update_header(&mut conn, order.id, &changes, 500).await.unwrap());

        let updated = fetch_order(&mut conn, order.id).await.unwrap().unwrap();
        assert_eq!(updated.table_id, 2);
        assert_eq!(updated.table_label, "Bàn 7");
        assert_eq!(updated.order_number, order.order_number);
        assert_eq!(updated.customer_note, None);
        assert_eq!(updated.updated_at, Some(500));
    }

    #[tokio::test]
    async fn test_delete_cascades_lines() {
        let pool = seeded_pool().await;
        let order = create(&pool, new_order(1, 100)).await.unwrap();

        assert!(delete(&pool, order.id).await.unwrap());
        assert!(!delete(&pool, order.id).await.unwrap());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_line")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_total_delta_and_line_sum() {
        let pool = seeded_pool().await;
        let order = create(&pool, new_order(1, 100)).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        assert_eq!(line_sum(&mut conn, order.id).await.unwrap(), 25_000_000);
        apply_total_delta(&mut conn, order.id, -15_000_000).await.unwrap();
        let updated = fetch_order(&mut conn, order.id).await.unwrap().unwrap();
        assert_eq!(updated.total_amount, Decimal::from(100000));
        assert!(touch(&mut conn, order.id, 1).await.unwrap());
        assert!(!touch(&mut conn, 999, 1).await.unwrap());
    }
}
