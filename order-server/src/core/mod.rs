//! Core module - configuration, shared state, server lifecycle
//!
//! - [`Config`] - environment-driven configuration
//! - [`ServerState`] - services shared by every handler
//! - [`Server`] - HTTP server with graceful shutdown
//! - [`ServerError`] - startup errors

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
