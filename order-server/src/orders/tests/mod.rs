use super::*;
use crate::db::repository::test_support::seeded_pool;
use crate::db::repository::{RepoResult, dining_table, dish};
use crate::live::{LiveOrderHub, Subscription};
use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{DiningTable, Dish, Order, OrderCreate, OrderLine, OrderLineInput};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

fn service_for(pool: SqlitePool) -> OrderService {
    let catalog = Arc::new(SqliteCatalog::new(pool.clone()));
    OrderService::new(pool, catalog, LiveOrderHub::default(), chrono_tz::Asia::Ho_Chi_Minh)
}

async fn test_service() -> OrderService {
    service_for(seeded_pool().await)
}

fn item(dish_id: i64, quantity: i32) -> OrderLineInput {
    OrderLineInput { dish_id, quantity }
}

fn create_req(table_label: &str, items: Vec<OrderLineInput>) -> OrderCreate {
    OrderCreate {
        table_id: None,
        table_label: Some(table_label.to_string()),
        customer_note: None,
        items,
    }
}

fn money(value: i64) -> Decimal {
    Decimal::from(value)
}

fn line_for(order: &Order, dish_id: i64) -> &OrderLine {
    order
        .lines
        .iter()
        .find(|l| l.dish_id == dish_id)
        .unwrap_or_else(|| panic!("no line for dish {dish_id}"))
}

/// total == Σ quantity × unit price, recomputed from the snapshot
fn assert_total_consistent(order: &Order) {
    let sum: Decimal = order
        .lines
        .iter()
        .map(|l| Decimal::from(l.quantity) * l.unit_price)
        .sum();
    assert_eq!(order.total_amount, sum, "total drifted from lines");
}

// ========================================================================
// Order from table "5": dish 1 × 2 @ 50000, dish 2 × 1 @ 150000
// ========================================================================

async fn create_table5_order(service: &OrderService) -> Order {
    service
        .create(create_req("5", vec![item(1, 2), item(2, 1)]))
        .await
        .unwrap()
}

/// Catalog that answers after a delay, for timeout tests
struct SlowCatalog {
    pool: SqlitePool,
    delay: Duration,
}

#[async_trait]
impl Catalog for SlowCatalog {
    async fn get_dish(&self, id: i64) -> RepoResult<Option<Dish>> {
        tokio::time::sleep(self.delay).await;
        dish::find_by_id(&self.pool, id).await
    }

    async fn get_table(&self, id: i64) -> RepoResult<Option<DiningTable>> {
        dining_table::find_by_id(&self.pool, id).await
    }

    async fn find_table_by_label(&self, label: &str) -> RepoResult<Option<DiningTable>> {
        dining_table::find_by_label(&self.pool, label).await
    }
}

fn subscribe(service: &OrderService) -> Subscription {
    service.hub().register()
}
