//! CORS evaluation shared by the HTTP/1.1 and HTTP/2 dispatchers.
//!
//! # Responsibilities
//! - Answer preflight requests without touching the route table
//! - Short-circuit disallowed origins with 403 when configured to
//! - Compute the access-control headers merged into normal responses
//!
//! # Design Decisions
//! - The evaluator is stateless; the request origin is passed per call, so one
//!   instance serves every stream of every connection
//! - Evaluation happens on the request head, before any body is read

use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE,
    ACCESS_CONTROL_REQUEST_METHOD, ORIGIN, VARY,
};
use http::{HeaderMap, HeaderValue, Method, StatusCode};

use crate::config::CorsConfig;
use crate::http::response::Response;

const ANY_ORIGIN: &str = "*";
const NULL_ORIGIN: &str = "null";

/// What the dispatcher should do with a request after CORS evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum CorsDecision {
    /// Write this headers-only response and finish the request.
    Respond(Response),
    /// Dispatch normally and merge these headers into the response.
    Continue(HeaderMap),
}

#[derive(Debug, Clone)]
pub struct CorsEvaluator {
    any_origin: bool,
    origins: Vec<String>,
    allow_methods: Option<HeaderValue>,
    allow_headers: Option<HeaderValue>,
    expose_headers: Option<HeaderValue>,
    max_age: HeaderValue,
    allow_credentials: bool,
    allow_null_origin: bool,
    short_circuit: bool,
}

impl CorsEvaluator {
    /// `None` when CORS handling is disabled.
    pub fn from_config(config: &CorsConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        Some(Self {
            any_origin: config.allowed_origins.iter().any(|o| o == ANY_ORIGIN),
            origins: config.allowed_origins.clone(),
            allow_methods: join(&config.allowed_methods),
            allow_headers: join(&config.allowed_headers),
            expose_headers: join(&config.exposed_headers),
            max_age: HeaderValue::from(config.max_age_secs),
            allow_credentials: config.allow_credentials,
            allow_null_origin: config.allow_null_origin,
            short_circuit: config.short_circuit,
        })
    }

    /// Evaluate a request head.
    pub fn evaluate(&self, method: &Method, headers: &HeaderMap) -> CorsDecision {
        let origin = headers.get(ORIGIN).and_then(|v| v.to_str().ok());

        if self.short_circuit && !self.origin_allowed(origin) {
            tracing::debug!(origin = ?origin, "CORS origin rejected");
            return CorsDecision::Respond(self.preflight_response(origin, StatusCode::FORBIDDEN));
        }

        let preflight = method == Method::OPTIONS
            && origin.is_some()
            && headers.contains_key(ACCESS_CONTROL_REQUEST_METHOD);
        if preflight {
            return CorsDecision::Respond(self.preflight_response(origin, StatusCode::OK));
        }

        CorsDecision::Continue(self.outbound_headers(origin))
    }

    fn origin_allowed(&self, origin: Option<&str>) -> bool {
        match origin {
            None => true,
            Some(_) if self.any_origin => true,
            Some(NULL_ORIGIN) if self.allow_null_origin => true,
            Some(o) => self.origins.iter().any(|allowed| allowed == o),
        }
    }

    /// Set `access-control-allow-origin` (and `vary`) if the origin is
    /// acceptable. Returns whether it was set.
    fn set_allow_origin(&self, origin: Option<&str>, headers: &mut HeaderMap) -> bool {
        let Some(origin) = origin else {
            return false;
        };

        if origin == NULL_ORIGIN && self.allow_null_origin {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(NULL_ORIGIN));
            return true;
        }

        let echoed = match HeaderValue::from_str(origin) {
            Ok(v) => v,
            Err(_) => return false,
        };

        if self.any_origin {
            if self.allow_credentials {
                headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, echoed);
                headers.insert(VARY, HeaderValue::from_static("origin"));
            } else {
                headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(ANY_ORIGIN));
            }
            return true;
        }

        if self.origins.iter().any(|o| o == origin) {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, echoed);
            headers.insert(VARY, HeaderValue::from_static("origin"));
            return true;
        }

        tracing::debug!(origin = %origin, "Request origin not among configured origins");
        false
    }

    fn set_credentials_and_expose(&self, headers: &mut HeaderMap) {
        let wildcard = headers
            .get(ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_some_and(|v| v == ANY_ORIGIN);
        if self.allow_credentials && !wildcard {
            headers.insert(
                ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }
        if let Some(expose) = &self.expose_headers {
            headers.insert(ACCESS_CONTROL_EXPOSE_HEADERS, expose.clone());
        }
    }

    fn preflight_response(&self, origin: Option<&str>, status: StatusCode) -> Response {
        let mut response = Response::empty(status);
        let headers = response.headers_mut();
        if self.set_allow_origin(origin, headers) {
            if let Some(methods) = &self.allow_methods {
                headers.insert(ACCESS_CONTROL_ALLOW_METHODS, methods.clone());
            }
            if let Some(allowed) = &self.allow_headers {
                headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, allowed.clone());
            }
            headers.insert(ACCESS_CONTROL_MAX_AGE, self.max_age.clone());
            self.set_credentials_and_expose(headers);
        }
        response
    }

    fn outbound_headers(&self, origin: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if self.set_allow_origin(origin, &mut headers) {
            self.set_credentials_and_expose(&mut headers);
        }
        headers
    }
}

/// Merge access-control headers computed on the request into a response.
pub fn apply_outbound(outbound: &HeaderMap, response: &mut Response) {
    for (name, value) in outbound {
        response.headers_mut().insert(name.clone(), value.clone());
    }
}

fn join(values: &[String]) -> Option<HeaderValue> {
    if values.is_empty() {
        return None;
    }
    HeaderValue::from_str(&values.join(",")).ok()
}
