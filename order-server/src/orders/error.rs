use crate::db::repository::RepoError;
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::OrderStatus;
use thiserror::Error;

use super::status::allowed_transitions;

/// Order core errors
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    #[error("Order line not found: {0}")]
    LineNotFound(i64),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Dish not found: {0}")]
    DishNotFound(i64),

    #[error("Dish not available: {0}")]
    DishUnavailable(i64),

    #[error("Order must contain at least one item")]
    OrderEmpty,

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Cannot change status from {current} to {requested}")]
    InvalidTransition {
        current: OrderStatus,
        requested: OrderStatus,
    },

    #[error("Order {order_id} cannot be modified while {status}")]
    OrderNotModifiable { order_id: i64, status: OrderStatus },

    #[error("Total {supplied} does not match line sum {expected}")]
    TotalMismatch { expected: Decimal, supplied: Decimal },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Catalog lookup timed out after {0}ms")]
    CatalogTimeout(u64),

    #[error("Storage error: {0}")]
    Storage(#[from] RepoError),
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        OrderError::Storage(err.into())
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::OrderNotFound(id) => {
                AppError::new(ErrorCode::OrderNotFound).with_detail("orderId", id)
            }
            OrderError::LineNotFound(id) => {
                AppError::new(ErrorCode::OrderLineNotFound).with_detail("lineId", id)
            }
            OrderError::TableNotFound(table) => {
                AppError::new(ErrorCode::TableNotFound).with_detail("table", table)
            }
            OrderError::DishNotFound(id) => {
                AppError::new(ErrorCode::DishNotFound).with_detail("dishId", id)
            }
            OrderError::DishUnavailable(id) => {
                AppError::new(ErrorCode::DishUnavailable).with_detail("dishId", id)
            }
            OrderError::OrderEmpty => AppError::new(ErrorCode::OrderEmpty),
            OrderError::InvalidQuantity(msg) => {
                AppError::with_message(ErrorCode::InvalidQuantity, msg)
            }
            OrderError::InvalidStatus(value) => AppError::with_message(
                ErrorCode::InvalidStatus,
                format!("Unknown order status: {value}"),
            )
            .with_detail("allowed", OrderStatus::literals()),
            OrderError::InvalidTransition { current, requested } => {
                let allowed: Vec<&str> = allowed_transitions(current)
                    .iter()
                    .map(|s| s.as_str())
                    .collect();
                AppError::with_message(
                    ErrorCode::InvalidTransition,
                    format!("Cannot change status from {current} to {requested}"),
                )
                .with_detail("current", current.as_str())
                .with_detail("requested", requested.as_str())
                .with_detail("allowed", allowed)
            }
            OrderError::OrderNotModifiable { order_id, status } => {
                AppError::new(ErrorCode::OrderNotModifiable)
                    .with_detail("orderId", order_id)
                    .with_detail("status", status.as_str())
            }
            OrderError::TotalMismatch { expected, supplied } => {
                AppError::new(ErrorCode::TotalMismatch)
                    .with_detail("expected", expected.to_string())
                    .with_detail("supplied", supplied.to_string())
            }
            OrderError::Validation(msg) => AppError::validation(msg),
            OrderError::CatalogTimeout(ms) => {
                AppError::timeout("Catalog lookup timed out").with_detail("timeoutMs", ms)
            }
            OrderError::Storage(e) => {
                // storage text stays in the log
                tracing::error!(error = %e, "Storage error occurred");
                match e {
                    RepoError::NotFound(_) => AppError::new(ErrorCode::NotFound),
                    RepoError::Validation(msg) => AppError::validation(msg),
                    RepoError::Duplicate(_) => AppError::new(ErrorCode::AlreadyExists),
                    RepoError::InUse(_) => AppError::new(ErrorCode::TableInUse),
                    RepoError::Database(_) => AppError::new(ErrorCode::DatabaseError),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invalid_transition_lists_allowed_targets() {
        let err: AppError = OrderError::InvalidTransition {
            current: OrderStatus::PendingConfirmation,
            requested: OrderStatus::Completed,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InvalidTransition);
        let details = err.details.unwrap();
        assert_eq!(details["current"], json!("PendingConfirmation"));
        assert_eq!(details["requested"], json!("Completed"));
        assert_eq!(details["allowed"], json!(["Confirmed", "Cancelled"]));
    }

    #[test]
    fn test_invalid_status_lists_literals() {
        let err: AppError = OrderError::InvalidStatus("Done".into()).into();
        assert_eq!(err.code, ErrorCode::InvalidStatus);
        assert_eq!(
            err.details.unwrap()["allowed"],
            json!([
                "PendingConfirmation",
                "Confirmed",
                "Cooking",
                "Completed",
                "Cancelled"
            ])
        );
    }

    #[test]
    fn test_storage_error_text_is_not_returned() {
        let err: AppError =
            OrderError::Storage(RepoError::Database("disk I/O error at page 42".into())).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "Database error");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_business_errors_map_to_codes() {
        let cases: Vec<(OrderError, ErrorCode)> = vec![
            (OrderError::OrderNotFound(1), ErrorCode::OrderNotFound),
            (OrderError::LineNotFound(1), ErrorCode::OrderLineNotFound),
            (OrderError::TableNotFound("5".into()), ErrorCode::TableNotFound),
            (OrderError::DishNotFound(1), ErrorCode::DishNotFound),
            (OrderError::DishUnavailable(1), ErrorCode::DishUnavailable),
            (OrderError::OrderEmpty, ErrorCode::OrderEmpty),
            (
                OrderError::InvalidQuantity("0".into()),
                ErrorCode::InvalidQuantity,
            ),
            (
                OrderError::OrderNotModifiable {
                    order_id: 1,
                    status: OrderStatus::Completed,
                },
                ErrorCode::OrderNotModifiable,
            ),
            (OrderError::CatalogTimeout(3000), ErrorCode::TimeoutError),
        ];
        for (err, code) in cases {
            assert_eq!(AppError::from(err).code, code);
        }
    }
}
