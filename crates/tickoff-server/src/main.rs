//! Tickoff server binary.
//!
//! Loads configuration, initializes structured logging, opens the todo
//! database (creating the schema if needed), and serves the HTTP API until
//! SIGTERM/SIGINT. Any startup failure exits with a non-zero status before
//! traffic is accepted.

use std::process::ExitCode;
use tickoff_server::config::{self, LoggingConfig};
use tracing_subscriber::EnvFilter;

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("TICKOFF_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().unwrap_or("config.toml");

    let loaded = match config::load_config(Some(selected_config_path)) {
        Ok(loaded) => loaded,
        Err(e) => {
            // The subscriber is configured from this file, so it is not up yet.
            eprintln!("tickoff-server: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&loaded.config.logging);

    tracing::info!(
        source = config_source,
        path = selected_config_path,
        "resolved startup configuration path"
    );
    if !loaded.file_found {
        tracing::info!(path = selected_config_path, "config file not found, using defaults");
    }
    for (key, value) in &loaded.ignored_overrides {
        tracing::warn!(key = %key, value = %value, "ignoring unparsable override");
    }

    match tickoff_server::run(loaded.config).await {
        Ok(()) => {
            tracing::info!("tickoff server shut down");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "fatal startup error");
            ExitCode::FAILURE
        }
    }
}
