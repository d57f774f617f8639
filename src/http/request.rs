//! Protocol-neutral request view handed to handlers.
//!
//! # Responsibilities
//! - Present HTTP/1.1 and HTTP/2 requests through one type
//! - Carry path variables captured by the route table
//! - Parse the query string lazily, on first access
//!
//! # Design Decisions
//! - The body is fully buffered before a handler runs
//! - Header access is by lowercase name, as both codecs normalize names

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::OnceLock;

use bytes::Bytes;
use http::header::CONTENT_LENGTH;
use http::{HeaderMap, Method};
use serde::de::DeserializeOwned;

use crate::http::handler::HandlerError;
use crate::net::protocol::Protocol;

/// Strip query string and fragment from a request target.
pub fn path_of(uri: &str) -> &str {
    let end = uri.find(['?', '#']).unwrap_or(uri.len());
    &uri[..end]
}

/// `content-length` as a number; absent or unparsable values are ignored.
pub fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Parsed query string parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: HashMap<String, Vec<String>>,
}

impl QueryParams {
    /// Parse the query part of a request target.
    pub fn parse(uri: &str) -> Self {
        let query = match uri.split_once('?') {
            Some((_, q)) => q.split('#').next().unwrap_or(""),
            None => "",
        };

        let mut params: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        Self { params }
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Every value for `name`, in order of appearance.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.params.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// A fully received request.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: String,
    headers: HeaderMap,
    body: Bytes,
    variables: HashMap<String, String>,
    query: OnceLock<QueryParams>,
    protocol: Protocol,
    peer_addr: Option<SocketAddr>,
}

impl Request {
    pub fn new(method: Method, uri: impl Into<String>, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            uri: uri.into(),
            headers,
            body,
            variables: HashMap::new(),
            query: OnceLock::new(),
            protocol: Protocol::Http1,
            peer_addr: None,
        }
    }

    pub fn with_variables(mut self, variables: HashMap<String, String>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_peer_addr(mut self, peer_addr: SocketAddr) -> Self {
        self.peer_addr = Some(peer_addr);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request target as received, including any query string.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Request path without query string.
    pub fn path(&self) -> &str {
        path_of(&self.uri)
    }

    pub fn query(&self) -> &QueryParams {
        self.query.get_or_init(|| QueryParams::parse(&self.uri))
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query().get(name)
    }

    /// Path variable captured by the matched route.
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    pub fn variables(&self) -> &HashMap<String, String> {
        &self.variables
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as text; `None` if missing or not visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn body_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Decode a JSON body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        serde_json::from_slice(&self.body).map_err(|e| HandlerError::bad_request(e.to_string()))
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }
}
