use a2a_types::{
    INTERNAL_ERROR_CODE, INVALID_PARAMS_ERROR_CODE, INVALID_REQUEST_ERROR_CODE,
    JSON_PARSE_ERROR_CODE, METHOD_NOT_FOUND_ERROR_CODE, TASK_NOT_CANCELABLE_ERROR_CODE,
    TASK_NOT_FOUND_ERROR_CODE,
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid JSON-RPC request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Task cannot be canceled: {0}")]
    TaskNotCancelable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl Error {
    /// JSON-RPC error code reported for this error.
    pub fn code(&self) -> i32 {
        match self {
            Error::Json(_) => JSON_PARSE_ERROR_CODE,
            Error::InvalidRequest(_) => INVALID_REQUEST_ERROR_CODE,
            Error::MethodNotFound(_) => METHOD_NOT_FOUND_ERROR_CODE,
            Error::InvalidParams(_) => INVALID_PARAMS_ERROR_CODE,
            Error::TaskNotFound(_) => TASK_NOT_FOUND_ERROR_CODE,
            Error::TaskNotCancelable(_) => TASK_NOT_CANCELABLE_ERROR_CODE,
            Error::Internal(_) => INTERNAL_ERROR_CODE,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::Json(_) => (StatusCode::BAD_REQUEST, "Parse error".to_string()),
            Error::InvalidRequest(msg) | Error::InvalidParams(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            Error::MethodNotFound(_) | Error::TaskNotFound(_) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            Error::TaskNotCancelable(_) => (StatusCode::CONFLICT, self.to_string()),
            Error::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        tracing::debug!(code = self.code(), %message, "rejecting JSON-RPC request");

        let body = json!({
            "jsonrpc": "2.0",
            "error": {
                "code": self.code(),
                "message": message,
            },
            "id": null
        });

        (status, Json(body)).into_response()
    }
}
