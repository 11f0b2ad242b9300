//! API error-handling module

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use css_inline::InlineError;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::communication::mailer::DispatchError;

/// An error response
#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorResponse {
    /// The error message
    pub error: String,
}

/// An error raised in the API
#[derive(Debug)]
pub struct ApiError {
    /// The status code
    pub status: StatusCode,

    /// The error message
    pub message: String,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            message: message.to_string(),
        }
    }

    /// Create a new gateway timeout error
    pub fn new_504(message: &str) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, message)
    }

    /// Create new internal server error
    pub fn new_500(message: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::new_500(&err.to_string())
    }
}

impl From<askama::Error> for ApiError {
    fn from(err: askama::Error) -> Self {
        error!(error = %err, "could not render email template");

        ApiError::new_500("Could not render email")
    }
}

impl From<InlineError> for ApiError {
    fn from(err: InlineError) -> Self {
        error!(error = %err, "could not inline email styles");

        ApiError::new_500("Could not render email")
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::DeadlineExceeded => {
                ApiError::new_504("Timed out waiting for the mail server")
            }
            DispatchError::Transport(err) => {
                ApiError::new_500(&format!("Could not send email: {err}"))
            }
            DispatchError::Abandoned => ApiError::new_500("Could not send email"),
        }
    }
}
