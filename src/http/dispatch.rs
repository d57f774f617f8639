//! Handler invocation boundary shared by the HTTP/1.1 and HTTP/2 dispatchers.
//!
//! Nothing a handler does, returning an error or panicking, escapes this
//! function: the caller always gets a response to write.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::http::handler::{Handler, HandlerError};
use crate::http::request::Request;
use crate::http::response::Response;

/// Run `handler`, converting errors and panics into responses.
pub fn invoke(handler: &dyn Handler, request: &Request) -> Response {
    match catch_unwind(AssertUnwindSafe(|| handler.handle(request))) {
        Ok(Ok(response)) => response,
        Ok(Err(err @ HandlerError::Status { .. })) => {
            tracing::info!(
                method = %request.method(),
                path = %request.path(),
                error = %err,
                "Handler returned error response"
            );
            err.into()
        }
        Ok(Err(err)) => {
            tracing::error!(
                method = %request.method(),
                path = %request.path(),
                error = %err,
                "Error in handling route"
            );
            Response::internal_error()
        }
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            tracing::error!(
                method = %request.method(),
                path = %request.path(),
                panic = %message,
                "Handler panicked"
            );
            Response::internal_error()
        }
    }
}
