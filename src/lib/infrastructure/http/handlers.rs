//! API handler modules

use std::any::Any;

use axum::{
    body::Body,
    http::{Response, StatusCode},
    response::IntoResponse,
};
use tracing::error;

use super::errors::ApiError;

pub mod send;

/// Turns a panicking handler into a generic 500; the panic text only goes to the log.
pub fn panic_handler(panic: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let details = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");

    error!(details, "handler panicked");

    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}
