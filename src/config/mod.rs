//! Configuration module for the reading list server.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_DB_PATH: &str = "./data/reading_list.sqlite";
const DEFAULT_TABLE: &str = "recommendations";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
const DEFAULT_SESSION_IDLE_SECS: u64 = 1800;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Name of the recommendations table
    pub table: String,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Create the table and change triggers on startup
    pub auto_migrate: bool,
    /// How often the change watcher polls the table revision
    pub poll_interval: Duration,
    /// Mounted views untouched for this long are torn down
    pub session_idle: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.into(),
            table: DEFAULT_TABLE.to_string(),
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8080))),
            log_level: "info".to_string(),
            auto_migrate: true,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            session_idle: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let db_path = env::var("READING_LIST_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let table = match env::var("READING_LIST_TABLE") {
            Ok(name) if is_identifier(&name) => name,
            Ok(name) => {
                tracing::warn!(
                    "READING_LIST_TABLE {:?} is not a plain identifier, using {}",
                    name,
                    DEFAULT_TABLE
                );
                defaults.table
            }
            Err(_) => defaults.table,
        };

        let bind_addr = parse_or("READING_LIST_BIND_ADDR", defaults.bind_addr);
        let log_level = env::var("READING_LIST_LOG_LEVEL").unwrap_or(defaults.log_level);
        let auto_migrate = parse_or("READING_LIST_AUTO_MIGRATE", defaults.auto_migrate);
        let poll_interval = Duration::from_millis(parse_or(
            "READING_LIST_POLL_INTERVAL_MS",
            DEFAULT_POLL_INTERVAL_MS,
        ));
        let session_idle = Duration::from_secs(parse_or(
            "READING_LIST_SESSION_IDLE_SECS",
            DEFAULT_SESSION_IDLE_SECS,
        ));

        Self {
            db_path,
            table,
            bind_addr,
            log_level,
            auto_migrate,
            poll_interval,
            session_idle,
        }
    }
}

fn parse_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            tracing::warn!("Invalid {key} value {raw:?}: {e}, using default");
            default
        }),
        Err(_) => default,
    }
}

/// Table names are interpolated into SQL, so only `[A-Za-z_][A-Za-z0-9_]*` is accepted.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
