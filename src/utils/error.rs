use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mongodb::error::{ErrorKind, WriteFailure, TRANSIENT_TRANSACTION_ERROR};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Storage was unreachable or rejected the operation; the action may be retried.
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Authorization error: {0}")]
    AuthorizationError(String),
    #[error("Missing identity: {0}")]
    MissingIdentity(String),
    #[error("Already voted: {0}")]
    AlreadyVoted(String),
    #[error("Poll closed: {0}")]
    PollClosed(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    InternalError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl AppError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::DatabaseError(_))
    }

    fn kind(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::DatabaseError(_) => (StatusCode::SERVICE_UNAVAILABLE, "DATABASE_ERROR"),
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::AuthorizationError(_) => (StatusCode::FORBIDDEN, "AUTHORIZATION_ERROR"),
            AppError::MissingIdentity(_) => (StatusCode::UNAUTHORIZED, "MISSING_IDENTITY"),
            AppError::AlreadyVoted(_) => (StatusCode::CONFLICT, "ALREADY_VOTED"),
            AppError::PollClosed(_) => (StatusCode::CONFLICT, "POLL_CLOSED"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            AppError::SerializationError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "SERIALIZATION_ERROR")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.kind();
        let retryable = self.is_retryable();

        let message = match self {
            AppError::DatabaseError(msg) => {
                error!(error = %msg, "database error");
                "Storage is temporarily unavailable, please retry".to_string()
            }
            AppError::InternalError(msg) => {
                error!(error = %msg, "internal error");
                "An internal error occurred".to_string()
            }
            AppError::SerializationError(msg) => {
                error!(error = %msg, "serialization error");
                "Data serialization failed".to_string()
            }
            AppError::ValidationError(msg)
            | AppError::AuthorizationError(msg)
            | AppError::MissingIdentity(msg)
            | AppError::AlreadyVoted(msg)
            | AppError::PollClosed(msg)
            | AppError::NotFound(msg)
            | AppError::BadRequest(msg) => msg,
        };

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message,
            retryable,
            details: None,
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// True when the server rejected a write because of a unique index.
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY,
        _ => false,
    }
}

/// True when a transaction aborted because of a conflicting concurrent transaction.
pub fn is_transient_transaction(err: &mongodb::error::Error) -> bool {
    err.contains_label(TRANSIENT_TRANSACTION_ERROR)
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for AppError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

impl From<mongodb::bson::de::Error> for AppError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}
