//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Admitted connection (TLS or cleartext)
//!     → server.rs (protocol selection from ALPN / cleartext_protocol)
//!     → http1.rs (one aggregated request, then close)
//!       or h2/ (stream engine, many interleaved streams)
//!     → cors.rs (preflight / forbidden short-circuit, outbound headers)
//!     → routing (CompiledRoutes::match_request)
//!     → dispatch.rs (handler call, errors and panics contained)
//!     → response.rs (status meter, wire head + body)
//! ```

pub mod cors;
pub mod dispatch;
pub mod h2;
pub mod handler;
pub mod http1;
pub mod request;
pub mod response;
pub mod server;

pub use handler::{BoxHandler, Handler, HandlerError, HandlerResult};
pub use request::Request;
pub use response::Response;
pub use server::{HttpServer, ServerError};
