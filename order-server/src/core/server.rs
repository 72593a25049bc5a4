//! Server Implementation
//!
//! HTTP server startup, graceful shutdown and background task teardown

use std::net::SocketAddr;

use crate::core::{Config, Result, ServerState};

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    /// Serve until Ctrl-C, then stop realtime sessions and drain the sync queue
    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        let tasks = state.start_background_tasks();
        let app = crate::api::router(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(
            %addr,
            environment = %self.config.environment,
            "Order server listening"
        );

        let shutdown = state.shutdown_token();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
                shutdown.cancel();
            })
            .await?;

        // also covers the server stopping for reasons other than the signal
        state.shutdown_token().cancel();

        let budget = self.config.shutdown_timeout();
        for task in tasks {
            match tokio::time::timeout(budget, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(error = %e, "Background task panicked"),
                Err(_) => tracing::warn!(
                    timeout_ms = budget.as_millis() as u64,
                    "Background task did not stop in time"
                ),
            }
        }

        tracing::info!("Order server stopped");
        Ok(())
    }
}
