//! Shared pieces of the HTTP API: the error type, path id parsing, and the
//! bridge from async handlers to the blocking todo store.

use crate::AppState;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tickoff_todos::{StoreError, TodoFields, TodoId, TodoStore};

/// API error type mapping to HTTP status codes.
///
/// Serialized as `{"error": <kind>, "message": <text>}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NotFound(_) => "not_found",
            ApiError::InternalServerError(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        let message = match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::InternalServerError(msg) => msg,
        };

        let body = Json(ErrorResponse {
            error: kind.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Body of successful update and delete responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Parses the `{id}` path segment. Anything that is not an integer is
/// rejected before storage is touched.
pub fn parse_todo_id(raw: &str) -> Result<TodoId, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid todo id: {raw:?}")))
}

/// Decodes a create or update body into [`TodoFields`].
///
/// Only a JSON object is a todo. Arrays and scalars are rejected even though
/// serde would map an array onto the struct positionally.
pub fn decode_todo_fields(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<TodoFields, ApiError> {
    let Json(value) = payload?;
    if !value.is_object() {
        return Err(ApiError::BadRequest(
            "request body must be a JSON object".to_string(),
        ));
    }
    serde_json::from_value(value)
        .map_err(|e| ApiError::BadRequest(format!("invalid todo body: {}", e)))
}

/// Runs `op` against the store on the blocking thread pool.
///
/// Storage failures are logged with the operation name and become
/// [`ApiError::InternalServerError`] carrying the error's display text.
pub(crate) async fn run_store_op<T, F>(
    state: &AppState,
    operation: &'static str,
    op: F,
) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&TodoStore) -> Result<T, StoreError> + Send + 'static,
{
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || op(&store))
        .await
        .map_err(|e| {
            tracing::error!(operation, error = %e, "todo store task join error");
            ApiError::InternalServerError(format!("task join error: {}", e))
        })?
        .map_err(|e| store_err_to_api(operation, e))
}

fn store_err_to_api(operation: &'static str, err: StoreError) -> ApiError {
    tracing::error!(operation, error = %err, "todo store operation failed");
    ApiError::InternalServerError(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_todo_id_accepts_integers() {
        assert_eq!(parse_todo_id("1").unwrap(), 1);
        assert_eq!(parse_todo_id("99999").unwrap(), 99_999);
        assert_eq!(parse_todo_id("-3").unwrap(), -3);
    }

    #[test]
    fn parse_todo_id_rejects_non_numeric() {
        for raw in ["abc", "1.5", "", "12abc", "99999999999999999999"] {
            let err = parse_todo_id(raw).unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST, "input {raw:?}");
        }
    }

    #[test]
    fn decode_todo_fields_accepts_objects_only() {
        let fields = decode_todo_fields(Ok(Json(serde_json::json!({"title": "t"})))).unwrap();
        assert_eq!(fields.title, "t");

        for body in [
            serde_json::json!([]),
            serde_json::json!(["t", "d", true, "x"]),
            serde_json::json!("buy milk"),
            serde_json::json!(null),
        ] {
            let err = decode_todo_fields(Ok(Json(body.clone()))).unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST, "body {body}");
        }

        let wrong_type = serde_json::json!({"isCompleted": 1});
        let err = decode_todo_fields(Ok(Json(wrong_type))).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn error_body_carries_kind_and_message() {
        let response = ApiError::NotFound("Todo not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.error, "not_found");
        assert_eq!(parsed.message, "Todo not found");
    }

    #[test]
    fn store_errors_become_internal() {
        // A pool without the schema: every statement fails.
        let pool = tickoff_db::create_pool(
            tickoff_db::MEMORY_PATH,
            tickoff_db::DbRuntimeSettings::default(),
        )
        .unwrap();
        let store_err = TodoStore::new(pool).get_by_id(1).unwrap_err();

        let err = store_err_to_api("get", store_err);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("no such table: todos"));
    }
}
