//! Realtime order events
//!
//! Server → subscriber: [`LiveEvent`] (JSON `{"event": ..., "data": ...}`)
//! Subscriber → server: [`LiveCommand`] (JSON `{"action": ..., "table": ...}`)

use serde::{Deserialize, Serialize};

use crate::models::{Order, OrderStatus};

/// Event pushed to realtime subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum LiveEvent {
    /// Handshake finished; the subscriber should reconcile with a full list fetch
    Ready(ReadyPayload),
    OrderCreated(OrderCreatedPayload),
    OrderStatusChanged(OrderStatusChangedPayload),
}

impl LiveEvent {
    /// Routing key: the table label the event belongs to
    pub fn table_label(&self) -> Option<&str> {
        match self {
            LiveEvent::Ready(_) => None,
            LiveEvent::OrderCreated(p) => Some(&p.order.table_label),
            LiveEvent::OrderStatusChanged(p) => Some(&p.table_label),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LiveEvent::Ready(_) => "ready",
            LiveEvent::OrderCreated(_) => "order-created",
            LiveEvent::OrderStatusChanged(_) => "order-status-changed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyPayload {
    pub subscriber_id: u64,
}

/// Full snapshot of a freshly created order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCreatedPayload {
    #[serde(flatten)]
    pub order: Order,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusChangedPayload {
    pub order_id: i64,
    pub order_number: String,
    pub table_id: i64,
    pub table_label: String,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
    pub updated_at: i64,
}

/// Subscriber → server command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum LiveCommand {
    JoinTableGroup { table: String },
    LeaveTableGroup { table: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_status_changed_wire_shape() {
        let event = LiveEvent::OrderStatusChanged(OrderStatusChangedPayload {
            order_id: 7,
            order_number: "ORD-250101120000".into(),
            table_id: 5,
            table_label: "5".into(),
            old_status: OrderStatus::Confirmed,
            new_status: OrderStatus::Cooking,
            updated_at: 1_700_000_000_000,
        });
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "order-status-changed");
        assert_eq!(value["data"]["orderId"], 7);
        assert_eq!(value["data"]["oldStatus"], "Confirmed");
        assert_eq!(value["data"]["newStatus"], "Cooking");
        assert_eq!(event.table_label(), Some("5"));
    }

    #[test]
    fn test_order_created_flattens_snapshot() {
        let event = LiveEvent::OrderCreated(OrderCreatedPayload {
            order: Order {
                id: 1,
                order_number: "ORD-250101120000".into(),
                table_id: 2,
                table_label: "Bàn 2".into(),
                total_amount: Decimal::new(1500000, 2),
                status: OrderStatus::PendingConfirmation,
                customer_note: Some("no ice".into()),
                created_at: 1,
                updated_at: None,
                completed_at: None,
                lines: vec![],
            },
        });
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "order-created");
        assert_eq!(value["data"]["tableLabel"], "Bàn 2");
        assert_eq!(value["data"]["totalAmount"], serde_json::json!(15000.0));
        assert_eq!(event.name(), "order-created");
    }

    #[test]
    fn test_parse_commands() {
        let cmd: LiveCommand =
            serde_json::from_str(r#"{"action":"join-table-group","table":"5"}"#).unwrap();
        assert_eq!(cmd, LiveCommand::JoinTableGroup { table: "5".into() });

        let cmd: LiveCommand =
            serde_json::from_str(r#"{"action":"leave-table-group","table":"5"}"#).unwrap();
        assert_eq!(cmd, LiveCommand::LeaveTableGroup { table: "5".into() });

        assert!(serde_json::from_str::<LiveCommand>(r#"{"action":"subscribe"}"#).is_err());
    }
}
