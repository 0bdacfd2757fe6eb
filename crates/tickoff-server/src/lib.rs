//! Tickoff server library logic: routing, shared state, and startup.

pub mod api;
pub mod api_todos;
pub mod config;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use config::Config;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tickoff_todos::{StoreError, TodoStore};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The todo storage gateway.
    pub store: TodoStore,
    /// Browser client directory, if it should be served.
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    /// State with no static client.
    pub fn new(store: TodoStore) -> Self {
        Self {
            store,
            static_dir: None,
        }
    }
}

/// Maximum request body size (1 MiB).
const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route("/api/todos", get(api_todos::list_todos_handler))
        .route("/api/todo/create", post(api_todos::create_todo_handler))
        .route("/api/todo/view/{id}", get(api_todos::view_todo_handler))
        .route("/api/todo/update/{id}", put(api_todos::update_todo_handler))
        .route(
            "/api/todo/delete/{id}",
            delete(api_todos::delete_todo_handler),
        );

    let router = match state.static_dir.as_deref() {
        Some(dir) if dir.is_dir() => {
            tracing::info!(path = %dir.display(), "serving client static files");
            router
                .nest_service("/static", ServeDir::new(dir))
                .route_service("/", ServeFile::new(dir.join("index.html")))
        }
        Some(dir) => {
            tracing::info!(
                path = %dir.display(),
                "client directory not found, skipping static file serving"
            );
            router
        }
        None => router,
    };

    router
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}

/// Fatal errors that stop the server before or while serving.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The database could not be opened or its schema created.
    #[error("failed to initialize database: {0}")]
    Database(#[from] StoreError),

    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// The server loop failed.
    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// Opens storage, binds the listener, and serves until SIGINT/SIGTERM.
///
/// Storage is fully initialized before the listener is bound, so a schema
/// failure never results in a server accepting traffic.
pub async fn run(config: Config) -> Result<(), StartupError> {
    let store = TodoStore::open(&config.database.path, config.database.runtime_settings())?;
    tracing::info!(path = %config.database.path, "database ready");

    let state = AppState {
        store,
        static_dir: Some(PathBuf::from(&config.server.static_dir)),
    };

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;

    tracing::info!(%addr, "starting tickoff server");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
