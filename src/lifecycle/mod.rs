//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → broadcast → accept loop stops → in-flight connections finish
//! ```
//!
//! # Design Decisions
//! - Shutdown stops accepting; it does not interrupt running handlers

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
