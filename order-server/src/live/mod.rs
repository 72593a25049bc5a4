//! LiveOrderHub - realtime order fan-out
//!
//! ```text
//! OrderService ──publish(event)──► LiveOrderHub
//!                                     │ routing key = table label
//!                   ┌─────────────────┼──────────────────┐
//!                   ▼                 ▼                  ▼
//!            subscriber (all)   subscriber {"5"}   subscriber {"Bàn 7"}
//!              mpsc queue         mpsc queue          mpsc queue
//!                   │                 │                  │
//!                   └────────► WebSocket writers ◄───────┘
//! ```
//!
//! Group keys are short labels: joining "7" or "Bàn 7" both follow the table
//! stored as "Bàn 7".
//!
//! Each subscriber owns a bounded queue. Publishing never waits: a full or
//! closed queue is a failed delivery for that subscriber only.

use dashmap::DashMap;
use shared::message::LiveEvent;
use shared::models::short_table_label;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// Default per-subscriber queue capacity
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 64;

/// Outcome of one publish
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

/// A registered subscriber's end of the hub
#[derive(Debug)]
pub struct Subscription {
    pub id: u64,
    pub receiver: mpsc::Receiver<LiveEvent>,
}

#[derive(Debug)]
struct Subscriber {
    tx: mpsc::Sender<LiveEvent>,
    /// Short labels; empty = the unscoped "all" audience
    groups: HashSet<String>,
}

impl Subscriber {
    fn wants(&self, table: Option<&str>) -> bool {
        if self.groups.is_empty() {
            return true;
        }
        table.is_some_and(|t| self.groups.contains(short_table_label(t)))
    }
}

/// Subscriber registry with explicit register/deregister lifecycle
#[derive(Debug, Clone)]
pub struct LiveOrderHub {
    subscribers: Arc<DashMap<u64, Subscriber>>,
    next_id: Arc<AtomicU64>,
    capacity: usize,
}

impl Default for LiveOrderHub {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIBER_CAPACITY)
    }
}

impl LiveOrderHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
            capacity: capacity.max(1),
        }
    }

    /// Register a new subscriber in the "all" audience
    pub fn register(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, receiver) = mpsc::channel(self.capacity);
        self.subscribers.insert(
            id,
            Subscriber {
                tx,
                groups: HashSet::new(),
            },
        );
        tracing::debug!(subscriber_id = id, "Live subscriber registered");
        Subscription { id, receiver }
    }

    pub fn deregister(&self, id: u64) -> bool {
        let removed = self.subscribers.remove(&id).is_some();
        if removed {
            tracing::debug!(subscriber_id = id, "Live subscriber deregistered");
        }
        removed
    }

    /// Scope a subscriber to a table group. Returns `false` for unknown ids.
    pub fn join_group(&self, id: u64, table: &str) -> bool {
        let table = short_table_label(table);
        if table.is_empty() {
            return false;
        }
        match self.subscribers.get_mut(&id) {
            Some(mut sub) => {
                sub.groups.insert(table.to_string());
                tracing::debug!(subscriber_id = id, table, "Joined table group");
                true
            }
            None => false,
        }
    }

    /// Leaving the last group puts the subscriber back in the "all" audience
    pub fn leave_group(&self, id: u64, table: &str) -> bool {
        match self.subscribers.get_mut(&id) {
            Some(mut sub) => {
                sub.groups.remove(short_table_label(table));
                tracing::debug!(subscriber_id = id, table, "Left table group");
                true
            }
            None => false,
        }
    }

    pub fn groups_of(&self, id: u64) -> Option<Vec<String>> {
        self.subscribers.get(&id).map(|sub| {
            let mut groups: Vec<String> = sub.groups.iter().cloned().collect();
            groups.sort();
            groups
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver `event` to every interested subscriber
    ///
    /// Closed subscribers are pruned. Nothing here returns an error.
    pub fn publish(&self, event: &LiveEvent) -> DeliveryReport {
        let table = event.table_label();
        let mut report = DeliveryReport::default();
        let mut closed = Vec::new();

        for entry in self.subscribers.iter() {
            if !entry.wants(table) {
                continue;
            }
            match entry.tx.try_send(event.clone()) {
                Ok(()) => report.delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(
                        subscriber_id = *entry.key(),
                        event = event.name(),
                        "Live subscriber queue full, event dropped"
                    );
                    report.failed += 1;
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    closed.push(*entry.key());
                    report.failed += 1;
                }
            }
        }

        // removal must not happen while iterating (shard locks are held)
        for id in closed {
            self.deregister(id);
        }
        report
    }
}
