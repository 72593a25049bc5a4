//! Shared types for the order platform
//!
//! Domain models, realtime event types, error codes and the unified
//! API response structure used by the server and its clients.

pub mod error;
pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use message::{LiveCommand, LiveEvent};
