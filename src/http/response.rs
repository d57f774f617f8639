//! Response type shared by both protocol dispatchers.
//!
//! # Responsibilities
//! - Build handler responses (text, JSON, empty)
//! - Provide the fixed responses used by admission, size, and error paths
//! - Convert to the wire representations each codec needs
//!
//! # Design Decisions
//! - Bodies are fully materialized `Bytes`; no streaming responses
//! - Fixed bodies are `'static` so every rejection writes identical bytes

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::Serialize;

use crate::http::handler::HandlerError;

/// Body written to soft rate limited requests.
pub const RATE_LIMIT_BODY: &[u8] =
    b"This response is being send due to too many requests being sent to the server";

/// Body written when a request body exceeds the payload limit.
pub const PAYLOAD_TOO_LARGE_BODY: &[u8] = b"Request payload too large";

/// Body written when a handler fails.
pub const INTERNAL_ERROR_BODY: &[u8] = b"Internal Server Error";

const TEXT_PLAIN: &str = "text/plain";
const APPLICATION_JSON: &str = "application/json";

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// Response with no headers and no body.
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// 200 with no body.
    pub fn ok() -> Self {
        Self::empty(StatusCode::OK)
    }

    /// `text/plain` response.
    pub fn text(status: StatusCode, body: impl Into<Bytes>) -> Self {
        let mut response = Self::empty(status);
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN));
        response.body = body.into();
        response
    }

    /// `application/json` response.
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Result<Self, HandlerError> {
        let body = serde_json::to_vec(value)?;
        let mut response = Self::empty(status);
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        response.body = Bytes::from(body);
        Ok(response)
    }

    pub fn too_many_requests() -> Self {
        Self::text(
            StatusCode::TOO_MANY_REQUESTS,
            Bytes::from_static(RATE_LIMIT_BODY),
        )
    }

    pub fn payload_too_large() -> Self {
        Self::text(
            StatusCode::PAYLOAD_TOO_LARGE,
            Bytes::from_static(PAYLOAD_TOO_LARGE_BODY),
        )
    }

    pub fn internal_error() -> Self {
        Self::text(
            StatusCode::INTERNAL_SERVER_ERROR,
            Bytes::from_static(INTERNAL_ERROR_BODY),
        )
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Split into a header block (with `content-length` set) and the body.
    pub fn into_head(self) -> (http::Response<()>, Bytes) {
        let mut head = http::Response::new(());
        *head.status_mut() = self.status;
        *head.headers_mut() = self.headers;
        head.headers_mut()
            .insert(CONTENT_LENGTH, HeaderValue::from(self.body.len()));
        (head, self.body)
    }
}

impl From<HandlerError> for Response {
    fn from(err: HandlerError) -> Self {
        match err {
            HandlerError::Status { status, message } => Response::text(status, message),
            _ => Response::internal_error(),
        }
    }
}
