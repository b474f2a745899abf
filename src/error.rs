use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    dao::storage::StorageError,
    feed::FeedError,
    state::{BoardError, InvalidPoolRecord},
};

/// Failures surfaced by service-layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// External score feed failed.
    #[error("score feed unavailable")]
    Feed(#[source] FeedError),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Global pool-creation cap is exhausted.
    #[error("rate limited: {0}")]
    RateLimited(String),
    /// Unexpected server-side failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<FeedError> for ServiceError {
    fn from(err: FeedError) -> Self {
        ServiceError::Feed(err)
    }
}

impl From<BoardError> for ServiceError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::UnknownParticipant => ServiceError::NotFound(err.to_string()),
            BoardError::PoolLocked
            | BoardError::LimitReached { .. }
            | BoardError::LimitConflict { .. }
            | BoardError::NoParticipants
            | BoardError::AllClaimed => ServiceError::InvalidState(err.to_string()),
        }
    }
}

impl From<InvalidPoolRecord> for ServiceError {
    fn from(err: InvalidPoolRecord) -> Self {
        ServiceError::InvalidState(format!("stored pool record is invalid: {err}"))
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// HTTP-facing errors, mapped onto status codes by `IntoResponse`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Client sent an invalid request.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Missing or wrong admin credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Request conflicts with the pool's current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Creation cap exhausted.
    #[error("rate limited: {0}")]
    RateLimited(String),
    /// Storage or score feed unreachable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Feed(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::RateLimited(message) => AppError::RateLimited(message),
            ServiceError::Internal(message) => AppError::Internal(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
