//! Plain-text error responses.

use std::error::Error;
use std::fmt::{Display, Formatter};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tickerchat::{ChatError, ChatErrorKind};

pub const INTERNAL_ERROR_MESSAGE: &str = "An error occurred while processing your request";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl Error for ApiError {}

impl From<ChatError> for ApiError {
    fn from(error: ChatError) -> Self {
        match error.kind {
            ChatErrorKind::NotFound => Self::not_found(error.message),
            ChatErrorKind::Unauthorized => Self::unauthorized(),
            ChatErrorKind::InvalidRequest | ChatErrorKind::Configuration => {
                Self::bad_request(error.message)
            }
            ChatErrorKind::Provider | ChatErrorKind::Store | ChatErrorKind::Tooling => {
                tracing::error!(error_kind = ?error.kind, error = %error.message, "request failed");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}
