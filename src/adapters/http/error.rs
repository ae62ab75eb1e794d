//! Mapping from use-case errors to HTTP responses.
//!
//! | Error                         | Status |
//! |-------------------------------|--------|
//! | Validation, malformed body    | 400    |
//! | Room or participant not found | 404    |
//! | Participant already exists    | 409    |
//! | Non-admin reveal/reset        | 403    |
//! | Configuration, dependency     | 500    |
//!
//! Server errors carry a generic message; the detail only goes to the log.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::ErrorCode;
use crate::domain::room::RoomError;

pub const MALFORMED_BODY_MESSAGE: &str = "failed to unmarshal body";
const SERVER_ERROR_MESSAGE: &str = "internal server error";

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Error returned by every route handler.
#[derive(Debug)]
pub enum ApiError {
    /// The request body was not the expected JSON.
    MalformedBody(JsonRejection),
    Room(RoomError),
}

impl From<RoomError> for ApiError {
    fn from(err: RoomError) -> Self {
        ApiError::Room(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection)
    }
}

fn status_for(err: &RoomError) -> StatusCode {
    match err {
        RoomError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
        RoomError::RoomNotFound(_) | RoomError::ParticipantNotFound { .. } => StatusCode::NOT_FOUND,
        RoomError::ParticipantAlreadyExists { .. } => StatusCode::CONFLICT,
        RoomError::Forbidden => StatusCode::FORBIDDEN,
        RoomError::Configuration(_) | RoomError::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::MalformedBody(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "rejected request body");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(ErrorCode::ValidationFailed.to_string(), MALFORMED_BODY_MESSAGE),
                )
            }
            ApiError::Room(err) if err.is_server_error() => {
                tracing::error!(code = %err.code(), error = %err, "request failed");
                (
                    status_for(&err),
                    ErrorResponse::new(err.code().to_string(), SERVER_ERROR_MESSAGE),
                )
            }
            ApiError::Room(err) => (
                status_for(&err),
                ErrorResponse::new(err.code().to_string(), err.message()),
            ),
        };
        (status, Json(body)).into_response()
    }
}
