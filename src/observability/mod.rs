//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (meters, gauges, histograms via `metrics`)
//!
//! Consumers:
//!     → Log output (stdout, filtered by RUST_LOG / config)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (connection_id, stream_id, path) on every event
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
