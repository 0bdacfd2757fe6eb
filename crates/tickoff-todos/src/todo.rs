use serde::{Deserialize, Serialize};

/// Primary key of a todo, assigned by SQLite on insert.
pub type TodoId = i64;

/// A stored todo item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Server-assigned id. Never changes and is never reused.
    pub id: TodoId,
    /// Short free-form title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Whether the task is done.
    pub is_completed: bool,
    /// Caller-supplied completion date. Stored verbatim, not validated.
    pub completed_date: String,
}

/// The mutable fields of a todo, as supplied on create and update.
///
/// Missing JSON fields take their defaults. Any `id` in the body is ignored;
/// ids come from the path or from the database.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct TodoFields {
    pub title: String,
    pub description: String,
    pub is_completed: bool,
    pub completed_date: String,
}

impl Todo {
    /// Builds a todo from its id and mutable fields.
    pub fn from_fields(id: TodoId, fields: TodoFields) -> Self {
        Self {
            id,
            title: fields.title,
            description: fields.description,
            is_completed: fields.is_completed,
            completed_date: fields.completed_date,
        }
    }
}
