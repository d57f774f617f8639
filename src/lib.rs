//! Embeddable HTTP server core.
//!
//! Terminates TLS (or cleartext) connections, speaks HTTP/1.1 or HTTP/2 on
//! the same port, admits connections through an ordered set of gates, and
//! dispatches requests through a compiled route table to user handlers.

// Core subsystems
pub mod config;
pub mod http;
pub mod net;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::ServerConfig;
pub use crate::http::{Handler, HandlerError, HandlerResult, HttpServer, Request, Response};
pub use lifecycle::Shutdown;
pub use routing::{RouteBuilder, RouteMethod};
