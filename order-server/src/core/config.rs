use chrono_tz::Tz;
use std::time::Duration;

use super::ServerError;

/// Server configuration
///
/// # Environment
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | DATABASE_PATH | orders.db | SQLite file |
/// | HTTP_PORT | 5000 | HTTP port |
/// | ENVIRONMENT | development | development / staging / production |
/// | BUSINESS_TIMEZONE | Asia/Ho_Chi_Minh | IANA zone for order numbers |
/// | ORDER_SYNC_URL | (unset) | secondary order service; unset disables forwarding |
/// | SYNC_TIMEOUT_MS | 5000 | per-forward timeout |
/// | SYNC_QUEUE_CAPACITY | 256 | pending forwards before dropping |
/// | CATALOG_TIMEOUT_MS | 3000 | dish/table lookup timeout |
/// | LIVE_SEND_TIMEOUT_MS | 2000 | realtime socket write timeout |
/// | LIVE_SUBSCRIBER_CAPACITY | 64 | per-subscriber event queue |
/// | LOG_LEVEL | info | used when RUST_LOG is unset |
/// | LOG_JSON | false | JSON log lines |
/// | LOG_DIR | (unset) | daily rolling log files |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | graceful shutdown budget |
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub business_timezone: String,
    pub order_sync_url: Option<String>,
    pub sync_timeout_ms: u64,
    pub sync_queue_capacity: usize,
    pub catalog_timeout_ms: u64,
    pub live_send_timeout_ms: u64,
    pub live_subscriber_capacity: usize,
    pub log_level: Option<String>,
    pub log_json: bool,
    pub log_dir: Option<String>,
    pub shutdown_timeout_ms: u64,
}

impl Config {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            database_path: std::env::var("DATABASE_PATH").unwrap_or_else(|_| "orders.db".into()),
            http_port: env_parse("HTTP_PORT", 5000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            business_timezone: std::env::var("BUSINESS_TIMEZONE")
                .unwrap_or_else(|_| "Asia/Ho_Chi_Minh".into()),
            order_sync_url: env_opt("ORDER_SYNC_URL"),
            sync_timeout_ms: env_parse("SYNC_TIMEOUT_MS", 5000),
            sync_queue_capacity: env_parse("SYNC_QUEUE_CAPACITY", 256),
            catalog_timeout_ms: env_parse("CATALOG_TIMEOUT_MS", 3000),
            live_send_timeout_ms: env_parse("LIVE_SEND_TIMEOUT_MS", 2000),
            live_subscriber_capacity: env_parse("LIVE_SUBSCRIBER_CAPACITY", 64),
            log_level: env_opt("LOG_LEVEL"),
            log_json: env_parse("LOG_JSON", false),
            log_dir: env_opt("LOG_DIR"),
            shutdown_timeout_ms: env_parse("SHUTDOWN_TIMEOUT_MS", 10000),
        }
    }

    /// Business timezone; an unknown zone name is a startup error
    pub fn timezone(&self) -> Result<Tz, ServerError> {
        self.business_timezone.parse().map_err(|_| {
            ServerError::Config(format!(
                "BUSINESS_TIMEZONE '{}' is not a known IANA timezone",
                self.business_timezone
            ))
        })
    }

    pub fn sync_timeout(&self) -> Duration {
        Duration::from_millis(self.sync_timeout_ms)
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_millis(self.catalog_timeout_ms)
    }

    pub fn live_send_timeout(&self) -> Duration {
        Duration::from_millis(self.live_send_timeout_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            database_path: ":memory:".into(),
            http_port: 0,
            environment: "development".into(),
            business_timezone: "Asia/Ho_Chi_Minh".into(),
            order_sync_url: None,
            sync_timeout_ms: 5000,
            sync_queue_capacity: 256,
            catalog_timeout_ms: 3000,
            live_send_timeout_ms: 2000,
            live_subscriber_capacity: 64,
            log_level: None,
            log_json: false,
            log_dir: None,
            shutdown_timeout_ms: 10000,
        }
    }

    #[test]
    fn test_timezone_parsing() {
        let mut config = config();
        assert_eq!(config.timezone().unwrap(), chrono_tz::Asia::Ho_Chi_Minh);

        config.business_timezone = "Mars/Olympus".into();
        assert!(matches!(config.timezone(), Err(ServerError::Config(_))));
    }

    #[test]
    fn test_durations_and_environment() {
        let config = config();
        assert_eq!(config.catalog_timeout(), Duration::from_secs(3));
        assert_eq!(config.live_send_timeout(), Duration::from_secs(2));
        assert!(config.is_development());
        assert!(!config.is_production());
    }
}
