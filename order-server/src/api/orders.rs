//! Order API
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST | /api/orders | create |
//! | GET | /api/orders?status=&tableId= | list, newest first |
//! | GET | /api/orders/statuses | status literals |
//! | GET | /api/orders/{id} | get |
//! | PUT | /api/orders/{id} | header update |
//! | DELETE | /api/orders/{id} | delete |
//! | PUT | /api/orders/{id}/status | status transition |
//! | GET | /api/orders/{id}/lines | list lines |
//! | POST | /api/orders/{id}/lines | add or increment a line |

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::get,
};
use shared::error::ApiResponse;
use shared::models::{
    Order, OrderCreate, OrderHeaderUpdate, OrderLine, OrderLineAdd, OrderQuery, OrderStatus,
    OrderStatusUpdate,
};

use super::{json_body, query_params};
use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/statuses", get(statuses))
        .route("/{id}", get(get_by_id).put(update_header).delete(delete))
        .route("/{id}/status", axum::routing::put(update_status))
        .route("/{id}/lines", get(list_lines).post(add_line))
}

async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<OrderCreate>, JsonRejection>,
) -> AppResult<ApiResponse<Order>> {
    let order = state.orders.create(json_body(payload)?).await?;
    Ok(ApiResponse::success(order))
}

async fn list(
    State(state): State<ServerState>,
    query: Result<Query<OrderQuery>, QueryRejection>,
) -> AppResult<ApiResponse<Vec<Order>>> {
    let orders = state.orders.list(query_params(query)?).await?;
    Ok(ApiResponse::success(orders))
}

async fn statuses() -> ApiResponse<Vec<&'static str>> {
    ApiResponse::success(OrderStatus::literals())
}

async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Order>> {
    Ok(ApiResponse::success(state.orders.get(id).await?))
}

async fn update_header(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    payload: Result<Json<OrderHeaderUpdate>, JsonRejection>,
) -> AppResult<ApiResponse<Order>> {
    let order = state.orders.update_header(id, json_body(payload)?).await?;
    Ok(ApiResponse::success(order))
}

async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    state.orders.delete(id).await?;
    Ok(ApiResponse::ok())
}

async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    payload: Result<Json<OrderStatusUpdate>, JsonRejection>,
) -> AppResult<ApiResponse<Order>> {
    let req = json_body(payload)?;
    let order = state.orders.apply_transition(id, &req.status).await?;
    Ok(ApiResponse::success(order))
}

async fn list_lines(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Vec<OrderLine>>> {
    Ok(ApiResponse::success(state.orders.list_lines(id).await?))
}

async fn add_line(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    payload: Result<Json<OrderLineAdd>, JsonRejection>,
) -> AppResult<ApiResponse<Order>> {
    let req = json_body(payload)?;
    let order = state
        .orders
        .add_or_increment(id, req.dish_id, req.quantity)
        .await?;
    Ok(ApiResponse::success(order))
}
