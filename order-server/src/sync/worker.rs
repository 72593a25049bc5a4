//! SyncWorker: drains the sync queue in the background

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{OrderSyncForwarder, SyncHandle, SyncPayload};

pub struct SyncWorker {
    forwarder: Arc<OrderSyncForwarder>,
    rx: mpsc::Receiver<SyncPayload>,
    shutdown: CancellationToken,
}

impl SyncWorker {
    /// Worker plus the handle producers enqueue through
    pub fn new(
        forwarder: Arc<OrderSyncForwarder>,
        capacity: usize,
        shutdown: CancellationToken,
    ) -> (Self, SyncHandle) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                forwarder,
                rx,
                shutdown,
            },
            SyncHandle { tx },
        )
    }

    /// Forward queued orders one at a time until shutdown, then drain what
    /// is already queued.
    pub async fn run(mut self) {
        tracing::info!(url = %self.forwarder.url(), "SyncWorker started");

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("SyncWorker shutting down");
                    break;
                }

                next = self.rx.recv() => {
                    match next {
                        Some(payload) => self.forward(payload).await,
                        None => {
                            tracing::info!("Sync queue closed, SyncWorker stopping");
                            break;
                        }
                    }
                }
            }
        }

        self.rx.close();
        while let Some(payload) = self.rx.recv().await {
            self.forward(payload).await;
        }

        tracing::info!("SyncWorker stopped");
    }

    async fn forward(&self, payload: SyncPayload) {
        match self.forwarder.forward(&payload).await {
            Ok(()) => {
                tracing::info!(
                    table_id = payload.table_id,
                    table = %payload.table_name,
                    items = payload.items.len(),
                    "Order forwarded to secondary service"
                );
            }
            Err(e) => {
                tracing::warn!(
                    table_id = payload.table_id,
                    table = %payload.table_name,
                    error = %e,
                    "SyncForwardFailed: order not replicated"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::service::tests::{payload, spawn_receiver};
    use axum::http::StatusCode;
    use std::time::Duration;

    #[tokio::test]
    async fn test_worker_forwards_queued_orders() {
        let (url, mut rx) = spawn_receiver(StatusCode::OK).await;
        let forwarder = Arc::new(OrderSyncForwarder::new(url, Duration::from_secs(2)).unwrap());
        let shutdown = CancellationToken::new();
        let (worker, handle) = SyncWorker::new(forwarder, 8, shutdown.clone());
        let task = tokio::spawn(worker.run());

        assert!(handle.enqueue(payload()));
        assert_eq!(rx.recv().await, Some(payload()));

        shutdown.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_worker_drains_queue_on_shutdown() {
        let (url, mut rx) = spawn_receiver(StatusCode::OK).await;
        let forwarder = Arc::new(OrderSyncForwarder::new(url, Duration::from_secs(2)).unwrap());
        let shutdown = CancellationToken::new();
        let (worker, handle) = SyncWorker::new(forwarder, 8, shutdown.clone());

        // queued before the worker ever runs
        assert!(handle.enqueue(payload()));
        assert!(handle.enqueue(payload()));
        shutdown.cancel();
        worker.run().await;

        assert_eq!(rx.recv().await, Some(payload()));
        assert_eq!(rx.recv().await, Some(payload()));
    }

    #[tokio::test]
    async fn test_failed_forward_is_swallowed() {
        let (url, _rx) = spawn_receiver(StatusCode::BAD_GATEWAY).await;
        let forwarder = Arc::new(OrderSyncForwarder::new(url, Duration::from_secs(2)).unwrap());
        let shutdown = CancellationToken::new();
        let (worker, handle) = SyncWorker::new(forwarder, 8, shutdown.clone());

        assert!(handle.enqueue(payload()));
        shutdown.cancel();
        // returns normally despite the 502
        worker.run().await;
    }
}
