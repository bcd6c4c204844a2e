//! Process configuration loaded from environment variables.

use std::time::Duration;

use mediator::MediatorConfig;

const DEFAULT_PERSIST_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_NOTIFY_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_SMS_SOURCE_ADDRESS: &str = "12345";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Some(LogFormat::Text),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Server configuration.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default `0.0.0.0`)
/// - `PORT`: listen port (default `3000`)
/// - `RUST_LOG`: tracing filter directive (default `info`)
/// - `LOG_FORMAT`: `text` or `json` (default `text`)
/// - `DATABASE_URL`: Postgres connection string; in-memory store when unset
/// - `PERSIST_TIMEOUT_MS`: bound on a single save (default `5000`)
/// - `NOTIFY_TIMEOUT_MS`: bound on a single notification (default `10000`)
/// - `SMS_SOURCE_ADDRESS`: sender address for SMS notifications (default `12345`)
///
/// Unparseable values fall back to their defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub persist_timeout: Duration,
    pub notify_timeout: Duration,
    pub sms_source_address: String,
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let millis = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT")
                .and_then(|f| LogFormat::parse(&f))
                .unwrap_or_default(),
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            persist_timeout: millis("PERSIST_TIMEOUT_MS", defaults.persist_timeout),
            notify_timeout: millis("NOTIFY_TIMEOUT_MS", defaults.notify_timeout),
            sms_source_address: lookup("SMS_SOURCE_ADDRESS")
                .unwrap_or(defaults.sms_source_address),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Timeouts for the order pipeline.
    pub fn mediator_config(&self) -> MediatorConfig {
        MediatorConfig::default()
            .with_persist_timeout(self.persist_timeout)
            .with_notify_timeout(self.notify_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            database_url: None,
            persist_timeout: Duration::from_millis(DEFAULT_PERSIST_TIMEOUT_MS),
            notify_timeout: Duration::from_millis(DEFAULT_NOTIFY_TIMEOUT_MS),
            sms_source_address: DEFAULT_SMS_SOURCE_ADDRESS.to_string(),
        }
    }
}
