//! Todo persistence for the Tickoff service.
//!
//! Owns every SQL statement that touches the `todos` table. The free
//! functions operate on a borrowed [`rusqlite::Connection`]; [`TodoStore`]
//! wraps them around a connection pool so a single instance can be shared by
//! all request handlers.
//!
//! Mutations report a missing row through [`WriteOutcome::NotFound`], derived
//! from the statement's rows-affected count, and reads report it as `None`.
//! Neither is an error: [`StoreError`] is reserved for storage failures.

mod error;
mod store;
mod todo;

pub use error::StoreError;
pub use store::TodoStore;
pub use todo::{Todo, TodoFields, TodoId};

use rusqlite::{params, Connection, OptionalExtension, Row};

/// Result of an update or delete addressed by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum WriteOutcome {
    /// Exactly one row was changed.
    Applied,
    /// No row has the requested id.
    NotFound,
}

impl WriteOutcome {
    fn from_rows_affected(count: usize) -> Self {
        if count == 0 {
            Self::NotFound
        } else {
            Self::Applied
        }
    }
}

const SELECT_COLUMNS: &str = "SELECT id, title, description, isCompleted, completedDate FROM todos";

/// Inserts a new todo and returns it with its assigned id.
pub fn create_todo(conn: &Connection, fields: &TodoFields) -> Result<Todo, StoreError> {
    let id: TodoId = conn.query_row(
        "INSERT INTO todos (title, description, isCompleted, completedDate)
         VALUES (?1, ?2, ?3, ?4)
         RETURNING id",
        params![
            fields.title,
            fields.description,
            fields.is_completed,
            fields.completed_date,
        ],
        |row| row.get(0),
    )?;

    Ok(Todo::from_fields(id, fields.clone()))
}

/// Lists every todo in ascending id order.
pub fn list_todos(conn: &Connection) -> Result<Vec<Todo>, StoreError> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id ASC"))?;

    let rows = stmt.query_map([], map_row_to_todo)?;
    let mut todos = Vec::new();
    for row in rows {
        todos.push(row?);
    }
    Ok(todos)
}

/// Retrieves a todo by id. Returns `Ok(None)` when no row matches.
pub fn get_todo(conn: &Connection, id: TodoId) -> Result<Option<Todo>, StoreError> {
    let todo = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            [id],
            map_row_to_todo,
        )
        .optional()?;
    Ok(todo)
}

/// Replaces every mutable field of a todo in a single UPDATE statement.
///
/// There is no merge: fields omitted by the caller arrive here as their
/// defaults and overwrite the stored values.
pub fn update_todo(
    conn: &Connection,
    id: TodoId,
    fields: &TodoFields,
) -> Result<WriteOutcome, StoreError> {
    let count = conn.execute(
        "UPDATE todos
         SET title = ?1, description = ?2, completedDate = ?3, isCompleted = ?4
         WHERE id = ?5",
        params![
            fields.title,
            fields.description,
            fields.completed_date,
            fields.is_completed,
            id,
        ],
    )?;
    Ok(WriteOutcome::from_rows_affected(count))
}

/// Permanently deletes a todo.
pub fn delete_todo(conn: &Connection, id: TodoId) -> Result<WriteOutcome, StoreError> {
    let count = conn.execute("DELETE FROM todos WHERE id = ?1", [id])?;
    Ok(WriteOutcome::from_rows_affected(count))
}

// Columns are nullable in the table definition, so NULLs read back as the
// same defaults a request body with missing fields would produce.
fn map_row_to_todo(row: &Row) -> rusqlite::Result<Todo> {
    let title: Option<String> = row.get(1)?;
    let description: Option<String> = row.get(2)?;
    let is_completed: Option<bool> = row.get(3)?;
    let completed_date: Option<String> = row.get(4)?;

    Ok(Todo {
        id: row.get(0)?,
        title: title.unwrap_or_default(),
        description: description.unwrap_or_default(),
        is_completed: is_completed.unwrap_or_default(),
        completed_date: completed_date.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickoff_db::run_migrations;

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().expect("failed to open in-memory db");
        run_migrations(&conn).expect("failed to run migrations");
        conn
    }

    fn fields(title: &str) -> TodoFields {
        TodoFields {
            title: title.to_string(),
            description: format!("{title} description"),
            is_completed: false,
            completed_date: String::new(),
        }
    }

    fn row_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM todos", [], |row| row.get(0))
            .expect("failed to count todos")
    }

    #[test]
    fn test_todo_crud() {
        let conn = setup_db();

        // Create
        let created = create_todo(&conn, &fields("buy milk")).expect("create failed");
        assert_eq!(created.id, 1);
        assert_eq!(created.title, "buy milk");

        // Get
        let fetched = get_todo(&conn, created.id)
            .expect("get failed")
            .expect("todo should exist");
        assert_eq!(fetched, created);

        // List
        let todos = list_todos(&conn).expect("list failed");
        assert_eq!(todos, vec![created.clone()]);

        // Update
        let replacement = TodoFields {
            title: "buy oat milk".to_string(),
            description: "1L".to_string(),
            is_completed: true,
            completed_date: "2024-05-01".to_string(),
        };
        let outcome = update_todo(&conn, created.id, &replacement).expect("update failed");
        assert_eq!(outcome, WriteOutcome::Applied);

        let updated = get_todo(&conn, created.id)
            .expect("get updated failed")
            .expect("todo should still exist");
        assert_eq!(updated, Todo::from_fields(created.id, replacement));

        // Delete
        let outcome = delete_todo(&conn, created.id).expect("delete failed");
        assert_eq!(outcome, WriteOutcome::Applied);
        assert!(get_todo(&conn, created.id).expect("get failed").is_none());
    }

    #[test]
    fn list_is_empty_on_fresh_table() {
        let conn = setup_db();
        assert!(list_todos(&conn).expect("list failed").is_empty());
    }

    #[test]
    fn list_orders_by_ascending_id() {
        let conn = setup_db();
        for title in ["c", "a", "b"] {
            create_todo(&conn, &fields(title)).expect("create failed");
        }

        let todos = list_todos(&conn).expect("list failed");
        let ids: Vec<TodoId> = todos.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(todos[0].title, "c");
    }

    #[test]
    fn get_missing_id_is_none() {
        let conn = setup_db();
        assert!(get_todo(&conn, 99_999).expect("get failed").is_none());
        assert!(get_todo(&conn, 0).expect("get failed").is_none());
    }

    #[test]
    fn update_replaces_rather_than_merges() {
        let conn = setup_db();
        let created = create_todo(
            &conn,
            &TodoFields {
                title: "write report".to_string(),
                description: "quarterly".to_string(),
                is_completed: true,
                completed_date: "2024-01-01".to_string(),
            },
        )
        .expect("create failed");

        let outcome =
            update_todo(&conn, created.id, &TodoFields::default()).expect("update failed");
        assert_eq!(outcome, WriteOutcome::Applied);

        let stored = get_todo(&conn, created.id)
            .expect("get failed")
            .expect("todo should exist");
        assert_eq!(stored, Todo::from_fields(created.id, TodoFields::default()));
    }

    #[test]
    fn update_missing_id_leaves_table_unchanged() {
        let conn = setup_db();
        let created = create_todo(&conn, &fields("keep me")).expect("create failed");

        let outcome = update_todo(&conn, 42, &fields("ghost")).expect("update failed");
        assert_eq!(outcome, WriteOutcome::NotFound);
        assert_eq!(row_count(&conn), 1);

        let stored = get_todo(&conn, created.id)
            .expect("get failed")
            .expect("todo should exist");
        assert_eq!(stored, created);
    }

    #[test]
    fn delete_twice_reports_not_found_second_time() {
        let conn = setup_db();
        let created = create_todo(&conn, &fields("once")).expect("create failed");

        assert_eq!(
            delete_todo(&conn, created.id).expect("first delete failed"),
            WriteOutcome::Applied
        );
        assert_eq!(
            delete_todo(&conn, created.id).expect("second delete failed"),
            WriteOutcome::NotFound
        );
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let conn = setup_db();
        let first = create_todo(&conn, &fields("first")).expect("create failed");
        let second = create_todo(&conn, &fields("second")).expect("create failed");
        let _ = delete_todo(&conn, second.id).expect("delete failed");

        let third = create_todo(&conn, &fields("third")).expect("create failed");
        assert_eq!(first.id, 1);
        assert_eq!(third.id, 3, "AUTOINCREMENT must not hand out a deleted id");
    }

    #[test]
    fn null_columns_read_as_defaults() {
        let conn = setup_db();
        conn.execute("INSERT INTO todos (title) VALUES (NULL)", [])
            .expect("raw insert failed");

        let todo = get_todo(&conn, 1)
            .expect("get failed")
            .expect("todo should exist");
        assert_eq!(todo, Todo::from_fields(1, TodoFields::default()));
    }

    #[test]
    fn statement_failure_is_a_store_error() {
        let conn = Connection::open_in_memory().expect("failed to open in-memory db");
        // No migrations: the table does not exist.
        let err = get_todo(&conn, 1).expect_err("missing table should fail");
        assert!(matches!(err, StoreError::Database(_)));

        let err = delete_todo(&conn, 1).expect_err("missing table should fail");
        assert!(matches!(err, StoreError::Database(_)));
    }
}
