//! Error types for todo storage.

/// A storage failure. A missing row is never reported through this type.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A SQL statement failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No pooled connection could be checked out.
    #[error("database connection unavailable: {0}")]
    Connection(#[from] r2d2::Error),

    /// The connection pool could not be built.
    #[error(transparent)]
    Pool(#[from] tickoff_db::PoolError),

    /// The schema could not be created.
    #[error(transparent)]
    Migration(#[from] tickoff_db::MigrationError),
}
