//! Todo CRUD handlers.

use crate::api::{decode_todo_fields, parse_todo_id, run_store_op, ApiError, MessageResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::Json,
};
use serde_json::Value;
use std::sync::Arc;
use tickoff_todos::{Todo, WriteOutcome};

const NOT_FOUND_MESSAGE: &str = "Todo not found";
const ID_NOT_FOUND_MESSAGE: &str = "Todo ID not found";

/// GET /api/todos
pub async fn list_todos_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = run_store_op(&state, "list_todos", |store| store.list_all()).await?;
    Ok(Json(todos))
}

/// POST /api/todo/create
///
/// Responds `201 Created` with the stored todo, including its new id.
pub async fn create_todo_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let fields = decode_todo_fields(payload)?;

    let todo = run_store_op(&state, "create_todo", move |store| store.create(&fields)).await?;

    tracing::info!(todo_id = todo.id, "todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

/// GET /api/todo/view/{id}
pub async fn view_todo_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_todo_id(&raw_id)?;

    match run_store_op(&state, "get_todo", move |store| store.get_by_id(id)).await? {
        Some(todo) => Ok(Json(todo)),
        None => {
            tracing::debug!(todo_id = id, "todo not found");
            Err(ApiError::NotFound(NOT_FOUND_MESSAGE.to_string()))
        }
    }
}

/// PUT /api/todo/update/{id}
///
/// Replaces every mutable field; the body is not merged with the stored row.
pub async fn update_todo_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(raw_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_todo_id(&raw_id)?;
    let fields = decode_todo_fields(payload)?;

    let outcome =
        run_store_op(&state, "update_todo", move |store| store.update_by_id(id, &fields)).await?;

    match outcome {
        WriteOutcome::Applied => {
            tracing::info!(todo_id = id, "todo updated");
            Ok(Json(MessageResponse::new("Todo updated successfully!")))
        }
        WriteOutcome::NotFound => {
            tracing::debug!(todo_id = id, "update matched no todo");
            Err(ApiError::NotFound(ID_NOT_FOUND_MESSAGE.to_string()))
        }
    }
}

/// DELETE /api/todo/delete/{id}
pub async fn delete_todo_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_todo_id(&raw_id)?;

    let outcome = run_store_op(&state, "delete_todo", move |store| store.delete_by_id(id)).await?;

    match outcome {
        WriteOutcome::Applied => {
            tracing::info!(todo_id = id, "todo deleted");
            Ok(Json(MessageResponse::new("Todo deleted successfully")))
        }
        WriteOutcome::NotFound => {
            tracing::debug!(todo_id = id, "delete matched no todo");
            Err(ApiError::NotFound(ID_NOT_FOUND_MESSAGE.to_string()))
        }
    }
}
