//! Database layer for the Tickoff todo service.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization,
//! and the embedded schema migrations that create the `todos` table on first
//! start.
//!
//! # Design decisions
//!
//! - **SQLite with WAL mode**: a single file next to the binary, no external
//!   database process. WAL lets concurrent readers proceed alongside the
//!   single writer.
//! - **`r2d2` connection pool**: every in-flight request checks out its own
//!   connection, so the pool is the only shared handle.
//! - **Embedded migrations**: SQL files are compiled into the binary via
//!   `include_str!` and applied at most once.

mod migrations;
mod pool;

pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError, MEMORY_PATH};
