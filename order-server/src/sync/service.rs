//! OrderSyncForwarder: HTTP client for the secondary order service

use reqwest::Client;
use std::time::Duration;

use super::{SyncError, SyncPayload};

pub struct OrderSyncForwarder {
    client: Client,
    url: String,
}

impl OrderSyncForwarder {
    /// Every request is bounded by `timeout` (connect + response)
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SyncError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST one order. Any non-2xx response is an error.
    pub async fn forward(&self, payload: &SyncPayload) -> Result<(), SyncError> {
        let response = self.client.post(&self.url).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
    use tokio::sync::mpsc;

    /// Local stand-in for the secondary service; received payloads go to the channel
    pub(crate) async fn spawn_receiver(status: StatusCode) -> (String, mpsc::Receiver<SyncPayload>) {
        let (tx, rx) = mpsc::channel(16);
        let app = Router::new()
            .route(
                "/api/orders",
                post(
                    |State((tx, status)): State<(mpsc::Sender<SyncPayload>, StatusCode)>,
                     Json(payload): Json<SyncPayload>| async move {
                        let _ = tx.send(payload).await;
                        status
                    },
                ),
            )
            .with_state((tx, status));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/api/orders"), rx)
    }

    pub(crate) fn payload() -> SyncPayload {
        SyncPayload {
            table_id: 1,
            table_name: "5".into(),
            customer_note: "ít cay".into(),
            items: vec![],
        }
    }

    #[tokio::test]
    async fn test_forward_posts_payload() {
        let (url, mut rx) = spawn_receiver(StatusCode::OK).await;
        let forwarder = OrderSyncForwarder::new(url, Duration::from_secs(2)).unwrap();

        forwarder.forward(&payload()).await.unwrap();
        assert_eq!(rx.recv().await, Some(payload()));
    }

    #[tokio::test]
    async fn test_non_success_is_rejected() {
        let (url, _rx) = spawn_receiver(StatusCode::INTERNAL_SERVER_ERROR).await;
        let forwarder = OrderSyncForwarder::new(url, Duration::from_secs(2)).unwrap();

        let err = forwarder.forward(&payload()).await.unwrap_err();
        assert!(matches!(err, SyncError::Rejected { status: 500 }));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_an_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let forwarder =
            OrderSyncForwarder::new(format!("http://{addr}/api/orders"), Duration::from_secs(1))
                .unwrap();
        assert!(matches!(
            forwarder.forward(&payload()).await,
            Err(SyncError::Http(_))
        ));
    }
}
