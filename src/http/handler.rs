//! Handler abstraction.
//!
//! A handler is any `Fn(&Request) -> HandlerResult` that can be shared across
//! event loops. Errors are data: they are turned into responses at the
//! dispatch boundary and never reach the protocol engines.

use std::sync::Arc;

use http::StatusCode;
use thiserror::Error;

use crate::http::request::Request;
use crate::http::response::Response;

pub type HandlerResult = Result<Response, HandlerError>;

/// Shared, type-erased handler.
pub type BoxHandler = Arc<dyn Handler>;

/// Failure raised by a handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Respond with this status and message instead of a 500.
    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("{0}")]
    Message(String),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        HandlerError::Status {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::status(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::status(StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::status(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::status(StatusCode::FORBIDDEN, message)
    }
}

/// Request handler bound to a route.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, request: &Request) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&Request) -> HandlerResult + Send + Sync + 'static,
{
    fn handle(&self, request: &Request) -> HandlerResult {
        self(request)
    }
}
