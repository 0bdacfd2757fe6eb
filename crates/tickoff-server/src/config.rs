//! Server configuration loading from file and environment variables.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use thiserror::Error;
use tickoff_db::DbRuntimeSettings;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the browser client. Served under `/static`, with
    /// its `index.html` at `/`. Skipped when the directory does not exist.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file. Created on first run.
    #[serde(default = "default_db_path")]
    pub path: String,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "tickoff_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    8080
}

fn default_static_dir() -> String {
    "www".to_string()
}

fn default_db_path() -> String {
    "todo.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    DbRuntimeSettings::default().busy_timeout_ms
}

fn default_pool_max_size() -> u32 {
    DbRuntimeSettings::default().pool_max_size
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl DatabaseConfig {
    /// Pool tunables for [`tickoff_db::create_pool`].
    pub fn runtime_settings(&self) -> DbRuntimeSettings {
        DbRuntimeSettings {
            busy_timeout_ms: self.busy_timeout_ms,
            pool_max_size: self.pool_max_size,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result of [`load_config`]: the configuration plus what happened while
/// building it.
///
/// Loading runs before the tracing subscriber exists, so nothing here is
/// logged; the caller reports it once logging is up.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: Config,

    /// `false` when the file was absent and defaults were used instead.
    pub file_found: bool,

    /// Environment overrides that did not parse, as `(key, value)`.
    pub ignored_overrides: Vec<(String, String)>,
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `TICKOFF_HOST` overrides `server.host`
/// - `TICKOFF_PORT` overrides `server.port`
/// - `TICKOFF_STATIC_DIR` overrides `server.static_dir`
/// - `TICKOFF_DB_PATH` overrides `database.path`
/// - `TICKOFF_BUSY_TIMEOUT_MS` overrides `database.busy_timeout_ms`
/// - `TICKOFF_POOL_MAX_SIZE` overrides `database.pool_max_size`
/// - `TICKOFF_LOG_LEVEL` overrides `logging.level`
/// - `TICKOFF_LOG_JSON` overrides `logging.json` (set to "true" or "1")
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<LoadedConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`], reading overrides through `env` instead of the
/// process environment.
pub fn load_config_with_env<F>(path: Option<&str>, env: F) -> Result<LoadedConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let (mut config, file_found) = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => (toml::from_str(&contents)?, true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (Config::default(), false),
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => (Config::default(), false),
    };

    let mut ignored = Vec::new();
    override_parsed(&env, "TICKOFF_HOST", &mut config.server.host, &mut ignored);
    override_parsed(&env, "TICKOFF_PORT", &mut config.server.port, &mut ignored);
    if let Some(dir) = env("TICKOFF_STATIC_DIR") {
        config.server.static_dir = dir;
    }
    if let Some(db_path) = env("TICKOFF_DB_PATH") {
        config.database.path = db_path;
    }
    override_parsed(
        &env,
        "TICKOFF_BUSY_TIMEOUT_MS",
        &mut config.database.busy_timeout_ms,
        &mut ignored,
    );
    override_parsed(
        &env,
        "TICKOFF_POOL_MAX_SIZE",
        &mut config.database.pool_max_size,
        &mut ignored,
    );
    if let Some(level) = env("TICKOFF_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = env("TICKOFF_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    Ok(LoadedConfig {
        config,
        file_found,
        ignored_overrides: ignored,
    })
}

fn override_parsed<F, T>(env: &F, key: &str, target: &mut T, ignored: &mut Vec<(String, String)>)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = env(key) {
        match raw.parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => ignored.push((key.to_string(), raw)),
        }
    }
}
