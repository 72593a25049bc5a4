//! Status Transition Engine
//!
//! ```text
//! PendingConfirmation ──► Confirmed ──► Cooking ──► Completed
//!         │                   │
//!         └──► Cancelled ◄────┘
//! ```
//!
//! Completed and Cancelled are terminal. Lines may only change while the
//! order is PendingConfirmation or Confirmed.

use super::{OrderError, OrderResult, OrderService};
use crate::db::repository::order;
use shared::message::{LiveEvent, OrderStatusChangedPayload};
use shared::models::{Order, OrderStatus};

/// Statuses reachable from `from` in one step
pub fn allowed_transitions(from: OrderStatus) -> &'static [OrderStatus] {
    match from {
        OrderStatus::PendingConfirmation => &[OrderStatus::Confirmed, OrderStatus::Cancelled],
        OrderStatus::Confirmed => &[OrderStatus::Cooking, OrderStatus::Cancelled],
        OrderStatus::Cooking => &[OrderStatus::Completed],
        OrderStatus::Completed | OrderStatus::Cancelled => &[],
    }
}

pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

pub fn is_terminal(status: OrderStatus) -> bool {
    allowed_transitions(status).is_empty()
}

pub fn is_modifiable(status: OrderStatus) -> bool {
    matches!(
        status,
        OrderStatus::PendingConfirmation | OrderStatus::Confirmed
    )
}

pub fn ensure_modifiable(order_id: i64, status: OrderStatus) -> OrderResult<()> {
    if is_modifiable(status) {
        Ok(())
    } else {
        Err(OrderError::OrderNotModifiable { order_id, status })
    }
}

/// Parse a wire literal (case-sensitive)
pub fn parse_status(value: &str) -> OrderResult<OrderStatus> {
    value
        .parse()
        .map_err(|_| OrderError::InvalidStatus(value.to_string()))
}

impl OrderService {
    /// Apply a status change
    ///
    /// Only the whitelisted pairs succeed; requesting the current status is
    /// rejected like any other pair outside the graph.
    pub async fn apply_transition(&self, order_id: i64, requested: &str) -> OrderResult<Order> {
        let requested = parse_status(requested)?;

        let mut conn = self.pool.acquire().await?;
        let current = order::fetch_status(&mut conn, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;

        if !can_transition(current, requested) {
            return Err(OrderError::InvalidTransition { current, requested });
        }

        let now = shared::util::now_millis();
        // compare-and-set: losing to a concurrent change rejects against the new status
        if !order::update_status(&mut conn, order_id, current, requested, now).await? {
            let latest = order::fetch_status(&mut conn, order_id)
                .await?
                .ok_or(OrderError::OrderNotFound(order_id))?;
            return Err(OrderError::InvalidTransition {
                current: latest,
                requested,
            });
        }

        let snapshot = order::fetch_order(&mut conn, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        drop(conn);

        tracing::info!(
            order_id,
            order_number = %snapshot.order_number,
            from = %current,
            to = %requested,
            "Order status changed"
        );

        self.publish(LiveEvent::OrderStatusChanged(OrderStatusChangedPayload {
            order_id,
            order_number: snapshot.order_number.clone(),
            table_id: snapshot.table_id,
            table_label: snapshot.table_label.clone(),
            old_status: current,
            new_status: requested,
            updated_at: snapshot.updated_at.unwrap_or(now),
        }));

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_whitelist_is_exact() {
        let allowed = [
            (OrderStatus::PendingConfirmation, OrderStatus::Confirmed),
            (OrderStatus::PendingConfirmation, OrderStatus::Cancelled),
            (OrderStatus::Confirmed, OrderStatus::Cooking),
            (OrderStatus::Confirmed, OrderStatus::Cancelled),
            (OrderStatus::Cooking, OrderStatus::Completed),
        ];
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert_eq!(
                    can_transition(from, to),
                    allowed.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_same_status_is_never_allowed() {
        for status in OrderStatus::ALL {
            assert!(!can_transition(status, status), "{status}");
        }
    }

    #[test]
    fn test_terminal_and_modifiable() {
        assert!(is_terminal(OrderStatus::Completed));
        assert!(is_terminal(OrderStatus::Cancelled));
        assert!(!is_terminal(OrderStatus::Cooking));

        assert!(is_modifiable(OrderStatus::PendingConfirmation));
        assert!(is_modifiable(OrderStatus::Confirmed));
        assert!(!is_modifiable(OrderStatus::Cooking));
        assert!(matches!(
            ensure_modifiable(9, OrderStatus::Cancelled),
            Err(OrderError::OrderNotModifiable { order_id: 9, .. })
        ));
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("Cooking").unwrap(), OrderStatus::Cooking);
        assert!(matches!(
            parse_status("cooking"),
            Err(OrderError::InvalidStatus(s)) if s == "cooking"
        ));
    }
}
