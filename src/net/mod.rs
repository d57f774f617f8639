//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept, TCP_NODELAY)
//!     → [admission gates, see security]
//!     → idle.rs (activity tracking, idle watchdog)
//!     → tls.rs (optional TLS handshake with ALPN)
//!     → protocol.rs (negotiated protocol → codec choice)
//!     → connection.rs (context handed to the HTTP layer)
//! ```
//!
//! # Design Decisions
//! - TLS is optional; without it the configured cleartext protocol is used
//! - Connections are served as generic `AsyncRead + AsyncWrite` streams

pub mod connection;
pub mod idle;
pub mod listener;
pub mod protocol;
pub mod tls;

pub use connection::{ConnectionContext, ConnectionId, ServingState};
pub use protocol::{Protocol, ProtocolError};
