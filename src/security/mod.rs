//! Connection admission subsystem.
//!
//! # Data Flow
//! ```text
//! Accepted connection (peer address):
//!     → connection_limit.rs (count, flag over-limit)
//!     → rate_limit.rs (classify: not / soft / hard limited)
//!     → ip_filter.rs (white or black list check)
//!     → firewall.rs (drop hard limited or IP rejected)
//!     → Admitted { slot, rate_limit } handed to the connection task
//! ```
//!
//! # Design Decisions
//! - Gates run once per connection, before TLS or any codec
//! - Rejected connections are closed without a response
//! - Soft limited connections are served, with 429 per request

pub mod admission;
pub mod connection_limit;
pub mod firewall;
pub mod ip_filter;
pub mod rate_limit;

pub use admission::{AdmissionGates, Admitted};
pub use firewall::Rejection;
pub use rate_limit::RateLimitState;
