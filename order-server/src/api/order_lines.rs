//! Order line API
//!
//! Lines are addressed by their own id; both operations answer with the
//! parent order so the client sees the new total.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::put,
};
use shared::error::ApiResponse;
use shared::models::{Order, OrderLineQuantityUpdate};

use super::json_body;
use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/order-lines/{id}", put(update_quantity).delete(remove))
}

async fn update_quantity(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    payload: Result<Json<OrderLineQuantityUpdate>, JsonRejection>,
) -> AppResult<ApiResponse<Order>> {
    let req = json_body(payload)?;
    let order = state.orders.update_quantity(id, req.quantity).await?;
    Ok(ApiResponse::success(order))
}

async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Order>> {
    Ok(ApiResponse::success(state.orders.remove_line(id).await?))
}
