//! Order Line Repository

use super::RepoResult;
use crate::orders::money::{from_minor, line_total_minor};
use shared::models::OrderLine;
use sqlx::{SqliteConnection, SqlitePool};

#[derive(sqlx::FromRow)]
pub(crate) struct OrderLineRow {
    pub id: i64,
    pub order_id: i64,
    pub dish_id: i64,
    pub dish_name: String,
    pub quantity: i32,
    pub unit_price: i64,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        OrderLine {
            id: row.id,
            order_id: row.order_id,
            dish_id: row.dish_id,
            dish_name: row.dish_name,
            quantity: row.quantity,
            unit_price: from_minor(row.unit_price),
            line_total: from_minor(line_total_minor(row.quantity, row.unit_price)),
        }
    }
}

/// Stored line values needed for delta arithmetic (prices in minor units)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRecord {
    pub id: i64,
    pub order_id: i64,
    pub quantity: i32,
    pub unit_price: i64,
}

impl LineRecord {
    pub fn line_total(&self) -> i64 {
        line_total_minor(self.quantity, self.unit_price)
    }
}

pub(crate) const SELECT_LINE: &str =
    "SELECT id, order_id, dish_id, dish_name, quantity, unit_price FROM order_line";

pub async fn find_by_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderLine>> {
    let mut conn = pool.acquire().await?;
    fetch_by_order(&mut conn, order_id).await
}

pub async fn fetch_by_order(
    conn: &mut SqliteConnection,
    order_id: i64,
) -> RepoResult<Vec<OrderLine>> {
    let rows = sqlx::query_as::<_, OrderLineRow>(&format!(
        "{SELECT_LINE} WHERE order_id = ? ORDER BY id"
    ))
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.into_iter().map(OrderLine::from).collect())
}

pub async fn find_record(pool: &SqlitePool, line_id: i64) -> RepoResult<Option<LineRecord>> {
    let mut conn = pool.acquire().await?;
    fetch_record(&mut conn, line_id).await
}

pub async fn fetch_record(
    conn: &mut SqliteConnection,
    line_id: i64,
) -> RepoResult<Option<LineRecord>> {
    let row: Option<(i64, i64, i32, i64)> = sqlx::query_as(
        "SELECT id, order_id, quantity, unit_price FROM order_line WHERE id = ?",
    )
    .bind(line_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(|(id, order_id, quantity, unit_price)| LineRecord {
        id,
        order_id,
        quantity,
        unit_price,
    }))
}

/// The order's line for a dish, if any (one line per dish per order)
pub async fn fetch_by_dish(
    conn: &mut SqliteConnection,
    order_id: i64,
    dish_id: i64,
) -> RepoResult<Option<LineRecord>> {
    let row: Option<(i64, i64, i32, i64)> = sqlx::query_as(
        "SELECT id, order_id, quantity, unit_price FROM order_line WHERE order_id = ? AND dish_id = ?",
    )
    .bind(order_id)
    .bind(dish_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(|(id, order_id, quantity, unit_price)| LineRecord {
        id,
        order_id,
        quantity,
        unit_price,
    }))
}

pub async fn insert(
    conn: &mut SqliteConnection,
    order_id: i64,
    dish_id: i64,
    dish_name: &str,
    quantity: i32,
    unit_price: i64,
) -> RepoResult<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO order_line (order_id, dish_id, dish_name, quantity, unit_price) \
         VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(order_id)
    .bind(dish_id)
    .bind(dish_name)
    .bind(quantity)
    .bind(unit_price)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn set_quantity(
    conn: &mut SqliteConnection,
    line_id: i64,
    quantity: i32,
) -> RepoResult<()> {
    sqlx::query("UPDATE order_line SET quantity = ? WHERE id = ?")
        .bind(quantity)
        .bind(line_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn delete(conn: &mut SqliteConnection, line_id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM order_line WHERE id = ?")
        .bind(line_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
