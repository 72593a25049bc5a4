use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::{Config, Result};
use crate::db::DbService;
use crate::live::LiveOrderHub;
use crate::orders::{OrderService, SqliteCatalog};
use crate::sync::{OrderSyncForwarder, SyncWorker};

/// Server state - shared handles to every service
///
/// Cloning is cheap; all fields are pools, `Arc`s or tokens.
///
/// | Field | Meaning |
/// |-------|---------|
/// | config | configuration (immutable) |
/// | db | SQLite pool |
/// | hub | realtime subscriber registry |
/// | orders | order core |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub hub: LiveOrderHub,
    pub orders: OrderService,
    shutdown: CancellationToken,
    /// Taken once by [`ServerState::start_background_tasks`]
    sync_worker: Arc<Mutex<Option<SyncWorker>>>,
}

impl ServerState {
    /// Open the configured database and wire every service
    pub async fn initialize(config: &Config) -> Result<Self> {
        let db = DbService::new(&config.database_path).await?;
        Self::with_db(config.clone(), db)
    }

    /// Wire services over an already opened database
    pub fn with_db(config: Config, db: DbService) -> Result<Self> {
        let tz = config.timezone()?;
        let shutdown = CancellationToken::new();
        let hub = LiveOrderHub::new(config.live_subscriber_capacity);
        let catalog = Arc::new(SqliteCatalog::new(db.pool.clone()));

        let mut orders = OrderService::new(db.pool.clone(), catalog, hub.clone(), tz)
            .with_catalog_timeout(config.catalog_timeout());

        let sync_worker = match &config.order_sync_url {
            Some(url) => {
                let forwarder = Arc::new(OrderSyncForwarder::new(url.clone(), config.sync_timeout())?);
                let (worker, handle) =
                    SyncWorker::new(forwarder, config.sync_queue_capacity, shutdown.clone());
                orders = orders.with_sync(handle);
                tracing::info!(url = %url, "Order sync forwarding enabled");
                Some(worker)
            }
            None => {
                tracing::info!("ORDER_SYNC_URL not set, order sync forwarding disabled");
                None
            }
        };

        Ok(Self {
            config,
            db,
            hub,
            orders,
            shutdown,
            sync_worker: Arc::new(Mutex::new(sync_worker)),
        })
    }

    /// Spawn background workers. Returns their handles for shutdown.
    pub fn start_background_tasks(&self) -> Vec<JoinHandle<()>> {
        let mut tasks = Vec::new();
        if let Some(worker) = self.sync_worker.lock().take() {
            tasks.push(tokio::spawn(worker.run()));
        }
        tasks
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn live_send_timeout(&self) -> Duration {
        self.config.live_send_timeout()
    }
}
