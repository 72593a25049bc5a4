//! Order Server - restaurant order lifecycle service
//!
//! # Overview
//!
//! - **Orders** (`orders`): order aggregate, line ledger, status transitions
//! - **Database** (`db`): SQLite via sqlx, embedded migrations
//! - **Live** (`live`): realtime fan-out with table-group routing
//! - **Sync** (`sync`): best-effort replication to a secondary order service
//! - **HTTP API** (`api`): REST + WebSocket boundary
//!
//! # Layout
//!
//! ```text
//! order-server/src/
//! ├── core/          # config, state, server
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # pool + repositories
//! ├── orders/        # order core
//! ├── live/          # subscriber registry
//! ├── sync/          # sync forwarder + worker
//! └── utils/         # logger, validation
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod live;
pub mod orders;
pub mod sync;
pub mod utils;

pub use core::{Config, Server, ServerState};
pub use live::LiveOrderHub;
pub use orders::{OrderError, OrderService};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env` (if present), read the configuration and install the logger
pub fn setup_environment() -> Config {
    let _ = dotenv::dotenv();
    let config = Config::from_env();
    init_logger_with_file(
        config.log_level.as_deref(),
        config.log_json,
        config.log_dir.as_deref(),
    );
    config
}
