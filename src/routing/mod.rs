//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (before start):
//!     (pattern, method, handler)
//!     → route.rs (compile pattern to anchored regex)
//!     → table.rs RouteBuilder (reject duplicates)
//!     → compile(): sort by pattern, wrap handlers with meters
//!     → Freeze as immutable CompiledRoutes
//!
//! Incoming Request (path, method):
//!     → CompiledRoutes::match_request
//!     → Return: Matched { handler, variables } | MethodNotAllowed | NotFound
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by pattern string)

pub mod route;
pub mod table;

use thiserror::Error;

pub use route::Route;
pub use table::{CompiledRoutes, Match, MeteredHandler, RouteBuilder, RouteMethod};

/// Route registration failure.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route pattern must not be empty")]
    EmptyPattern,

    #[error("handler already registered for {method} {pattern}")]
    Duplicate { pattern: String, method: String },

    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}
