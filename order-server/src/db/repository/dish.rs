//! Dish / Category Repository

use super::{RepoError, RepoResult};
use crate::orders::money::{from_minor, to_minor};
use shared::models::{Category, Dish, DishCreate};
use sqlx::SqlitePool;

#[derive(sqlx::FromRow)]
struct DishRow {
    id: i64,
    category_id: i64,
    name: String,
    price: i64,
    is_available: bool,
}

impl From<DishRow> for Dish {
    fn from(row: DishRow) -> Self {
        Dish {
            id: row.id,
            category_id: row.category_id,
            name: row.name,
            price: from_minor(row.price),
            is_available: row.is_available,
        }
    }
}

const SELECT_DISH: &str = "SELECT id, category_id, name, price, is_available FROM dish";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Dish>> {
    let row = sqlx::query_as::<_, DishRow>(&format!("{SELECT_DISH} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Dish::from))
}

pub async fn find_by_category(pool: &SqlitePool, category_id: i64) -> RepoResult<Vec<Dish>> {
    let rows = sqlx::query_as::<_, DishRow>(&format!(
        "{SELECT_DISH} WHERE category_id = ? ORDER BY name"
    ))
    .bind(category_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Dish::from).collect())
}

pub async fn create_category(pool: &SqlitePool, name: &str) -> RepoResult<Category> {
    let id = sqlx::query_scalar::<_, i64>("INSERT INTO category (name) VALUES (?) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await?;
    Ok(Category {
        id,
        name: name.to_string(),
    })
}

pub async fn create(pool: &SqlitePool, data: DishCreate) -> RepoResult<Dish> {
    if data.price.is_sign_negative() {
        return Err(RepoError::Validation(format!(
            "price must be non-negative, got {}",
            data.price
        )));
    }
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO dish (category_id, name, price, is_available) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(data.category_id)
    .bind(&data.name)
    .bind(to_minor(data.price))
    .bind(data.is_available.unwrap_or(true))
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create dish".into()))
}

/// Catalog price changes never touch existing order lines
pub async fn update_price(pool: &SqlitePool, id: i64, price: rust_decimal::Decimal) -> RepoResult<()> {
    let result = sqlx::query("UPDATE dish SET price = ? WHERE id = ?")
        .bind(to_minor(price))
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Dish {id} not found")));
    }
    Ok(())
}

pub async fn set_available(pool: &SqlitePool, id: i64, available: bool) -> RepoResult<()> {
    let result = sqlx::query("UPDATE dish SET is_available = ? WHERE id = ?")
        .bind(available)
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Dish {id} not found")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::seeded_pool;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_find_converts_minor_units() {
        let pool = seeded_pool().await;
        let dish = find_by_id(&pool, 1).await.unwrap().unwrap();
        assert_eq!(dish.price, Decimal::from(50000));
        assert!(dish.is_available);

        let dish = find_by_id(&pool, 3).await.unwrap().unwrap();
        assert!(!dish.is_available);

        assert!(find_by_id(&pool, 99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_and_reprice() {
        let pool = seeded_pool().await;
        let category = create_category(&pool, "Drinks").await.unwrap();
        let dish = create(
            &pool,
            DishCreate {
                category_id: category.id,
                name: "Trà đá".into(),
                price: Decimal::from_str("5000.50").unwrap(),
                is_available: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(dish.price, Decimal::from_str("5000.50").unwrap());

        update_price(&pool, dish.id, Decimal::from(6000)).await.unwrap();
        set_available(&pool, dish.id, false).await.unwrap();
        let dish = find_by_id(&pool, dish.id).await.unwrap().unwrap();
        assert_eq!(dish.price, Decimal::from(6000));
        assert!(!dish.is_available);

        assert_eq!(find_by_category(&pool, category.id).await.unwrap().len(), 1);
        assert!(matches!(
            update_price(&pool, 999, Decimal::ONE).await,
            Err(RepoError::NotFound(_))
        ));
    }
}
