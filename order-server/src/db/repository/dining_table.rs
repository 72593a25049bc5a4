//! Dining Table Repository

use super::{RepoError, RepoResult};
use shared::models::{DiningTable, DiningTableCreate};
use sqlx::SqlitePool;

const SELECT_TABLE: &str = "SELECT id, label, status, qr_token FROM dining_table";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<DiningTable>> {
    let rows = sqlx::query_as::<_, DiningTable>(&format!("{SELECT_TABLE} ORDER BY label"))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DiningTable>> {
    let row = sqlx::query_as::<_, DiningTable>(&format!("{SELECT_TABLE} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Exact label match
pub async fn find_by_label(pool: &SqlitePool, label: &str) -> RepoResult<Option<DiningTable>> {
    let row = sqlx::query_as::<_, DiningTable>(&format!("{SELECT_TABLE} WHERE label = ?"))
        .bind(label)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: DiningTableCreate) -> RepoResult<DiningTable> {
    let label = data.label.trim();
    if label.is_empty() {
        return Err(RepoError::Validation("table label must not be empty".into()));
    }
    let status = data.status.unwrap_or_else(|| "Free".to_string());

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO dining_table (label, status, qr_token) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(label)
    .bind(&status)
    .bind(&data.qr_token)
    .fetch_one(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Duplicate(format!("Table '{label}' already exists")),
        other => other,
    })?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create dining table".into()))
}

/// Delete a table that no order has ever referenced
///
/// Tables carry order history; once referenced they can only be retired
/// through their status.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;

    let referenced: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE table_id = ?")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    if referenced > 0 {
        return Err(RepoError::InUse(format!(
            "Table {id} is referenced by {referenced} order(s)"
        )));
    }

    let result = sqlx::query("DELETE FROM dining_table WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::seeded_pool;

    #[tokio::test]
    async fn test_find_by_label_is_exact() {
        let pool = seeded_pool().await;
        assert_eq!(find_by_label(&pool, "5").await.unwrap().unwrap().id, 1);
        assert_eq!(find_by_label(&pool, "Bàn 7").await.unwrap().unwrap().id, 2);
        assert!(find_by_label(&pool, "7").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_label() {
        let pool = seeded_pool().await;
        let created = create(
            &pool,
            DiningTableCreate {
                label: " 9 ".into(),
                status: None,
                qr_token: Some("qr-9".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(created.label, "9");
        assert_eq!(created.status, "Free");

        let dup = create(
            &pool,
            DiningTableCreate {
                label: "9".into(),
                status: None,
                qr_token: None,
            },
        )
        .await;
        assert!(matches!(dup, Err(RepoError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_delete_refuses_table_with_orders() {
        let pool = seeded_pool().await;
        sqlx::query(
            "INSERT INTO orders (order_number, table_id, created_at) VALUES ('ORD-1', 1, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let result = delete(&pool, 1).await;
        assert!(matches!(result, Err(RepoError::InUse(_))));
        assert!(find_by_id(&pool, 1).await.unwrap().is_some());

        assert!(delete(&pool, 2).await.unwrap());
        assert!(!delete(&pool, 2).await.unwrap());
    }
}
