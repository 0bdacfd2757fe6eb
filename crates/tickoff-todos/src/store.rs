//! Pool-backed storage gateway.

use crate::{
    create_todo, delete_todo, get_todo, list_todos, update_todo, StoreError, Todo, TodoFields,
    TodoId, WriteOutcome,
};
use tickoff_db::{create_pool, run_migrations, DbPool, DbRuntimeSettings};

/// Shared handle to the todo table.
///
/// Constructed once at startup and cloned into every request path. Each call
/// checks out its own pooled connection and runs exactly one statement, so
/// the store is safe to use from many blocking tasks at once. All methods
/// block on SQLite I/O.
#[derive(Clone)]
pub struct TodoStore {
    pool: DbPool,
}

impl TodoStore {
    /// Opens (creating if needed) the database at `path` and ensures the
    /// schema exists.
    ///
    /// # Errors
    ///
    /// Fails if the pool cannot be built or the schema cannot be created.
    /// Callers at startup should treat this as fatal.
    pub fn open(path: &str, settings: DbRuntimeSettings) -> Result<Self, StoreError> {
        let store = Self::new(create_pool(path, settings)?);
        let applied = store.ensure_schema()?;
        if applied > 0 {
            tracing::info!(count = applied, path, "applied database migrations");
        }
        Ok(store)
    }

    /// Wraps an existing pool. The schema is not touched.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Creates the `todos` table if it is absent. Safe to call repeatedly.
    ///
    /// Returns the number of migrations applied.
    pub fn ensure_schema(&self) -> Result<usize, StoreError> {
        let conn = self.pool.get()?;
        Ok(run_migrations(&conn)?)
    }

    pub fn create(&self, fields: &TodoFields) -> Result<Todo, StoreError> {
        let conn = self.pool.get()?;
        create_todo(&conn, fields)
    }

    pub fn list_all(&self) -> Result<Vec<Todo>, StoreError> {
        let conn = self.pool.get()?;
        list_todos(&conn)
    }

    pub fn get_by_id(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        let conn = self.pool.get()?;
        get_todo(&conn, id)
    }

    pub fn update_by_id(
        &self,
        id: TodoId,
        fields: &TodoFields,
    ) -> Result<WriteOutcome, StoreError> {
        let conn = self.pool.get()?;
        update_todo(&conn, id, fields)
    }

    pub fn delete_by_id(&self, id: TodoId) -> Result<WriteOutcome, StoreError> {
        let conn = self.pool.get()?;
        delete_todo(&conn, id)
    }
}
