//! Repository Module
//!
//! SQLite access as free functions over a pool or an open transaction.
//! Functions that take `&mut SqliteConnection` are meant to be composed
//! inside one transaction (`&mut *tx`).

// Catalog
pub mod dining_table;
pub mod dish;

// Orders
pub mod order;
pub mod order_line;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("In use: {0}")]
    InUse(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err
            && db_err.is_unique_violation()
        {
            return RepoError::Duplicate(db_err.message().to_string());
        }
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::db::DbService;
    use sqlx::SqlitePool;

    /// Migrated in-memory pool seeded with one category, three dishes and two tables
    ///
    /// Dishes: 1 = 50000.00, 2 = 150000.00, 3 = 20000.00 (unavailable).
    /// Tables: 1 = "5", 2 = "Bàn 7".
    pub async fn seeded_pool() -> SqlitePool {
        let db = DbService::in_memory().await.unwrap();
        seed(&db.pool).await;
        db.pool
    }

    pub async fn seed(pool: &SqlitePool) {
        for sql in [
            "INSERT INTO category (id, name) VALUES (1, 'Main')",
            "INSERT INTO dish (id, category_id, name, price, is_available) VALUES (1, 1, 'Phở bò', 5000000, 1)",
            "INSERT INTO dish (id, category_id, name, price, is_available) VALUES (2, 1, 'Lẩu thái', 15000000, 1)",
            "INSERT INTO dish (id, category_id, name, price, is_available) VALUES (3, 1, 'Chè', 2000000, 0)",
            "INSERT INTO dining_table (id, label, status) VALUES (1, '5', 'Free')",
            "INSERT INTO dining_table (id, label, status) VALUES (2, 'Bàn 7', 'Free')",
        ] {
            sqlx::query(sql).execute(pool).await.unwrap();
        }
    }
}
