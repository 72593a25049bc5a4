//! Catalog and table lookups consumed by the order core
//!
//! Dish and table records are owned elsewhere; the order core only reads
//! them through [`Catalog`] and snapshots what it needs.

use crate::db::repository::{RepoResult, dining_table, dish};
use async_trait::async_trait;
use shared::models::{DiningTable, Dish};
use sqlx::SqlitePool;

/// Read-only access to dishes and tables
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn get_dish(&self, id: i64) -> RepoResult<Option<Dish>>;

    async fn get_table(&self, id: i64) -> RepoResult<Option<DiningTable>>;

    async fn find_table_by_label(&self, label: &str) -> RepoResult<Option<DiningTable>>;
}

/// Catalog backed by the order database's own `dish` / `dining_table` tables
#[derive(Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Catalog for SqliteCatalog {
    async fn get_dish(&self, id: i64) -> RepoResult<Option<Dish>> {
        dish::find_by_id(&self.pool, id).await
    }

    async fn get_table(&self, id: i64) -> RepoResult<Option<DiningTable>> {
        dining_table::find_by_id(&self.pool, id).await
    }

    async fn find_table_by_label(&self, label: &str) -> RepoResult<Option<DiningTable>> {
        dining_table::find_by_label(&self.pool, label).await
    }
}
