//! API routes
//!
//! Thin HTTP boundary over the order core; every handler converts
//! [`crate::orders::OrderError`] into [`AppError`] and answers with
//! [`shared::error::ApiResponse`].
//!
//! - [`health`] - liveness
//! - [`orders`] - order aggregate, status changes, line listing/adding
//! - [`order_lines`] - line quantity change and removal
//! - [`ws`] - realtime subscription

pub mod health;
pub mod order_lines;
pub mod orders;
pub mod ws;

use axum::Json;
use axum::Router;
use axum::extract::Query;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;
use crate::utils::AppError;

/// Routes without state
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(order_lines::router())
        .merge(ws::router())
}

/// Complete application router
pub fn router(state: ServerState) -> Router {
    build_app()
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Unwrap a JSON body, answering malformed input with `InvalidRequest`
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::invalid_request(rejection.body_text()))
}

/// Unwrap query parameters, answering malformed input with `InvalidRequest`
pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| AppError::invalid_request(rejection.body_text()))
}
