//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define server metrics (requests, per-status responses, per-route invocations)
//! - Expose Prometheus-compatible metrics endpoint
//! - Keep local counts so the serving path can report and assert on them
//!
//! # Metrics
//! - `xrpc_requests_total` (counter): requests read, across both protocols
//! - `xrpc_responses_total` (counter): responses written, by status
//! - `xrpc_route_requests_total` (counter): handler invocations, by route and method
//! - `xrpc_route_duration_seconds` (histogram): handler latency, by route and method
//! - `xrpc_hard_rate_limits_total` (counter): connections dropped by the firewall
//! - `xrpc_active_connections` (gauge): currently open connections
//!
//! # Design Decisions
//! - Meters are created once at startup and shared via `Arc`
//! - A mark is a relaxed atomic increment plus a facade counter increment

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use http::StatusCode;
use metrics::{Counter, Gauge, Histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Statuses that get a dedicated meter. Anything else is recorded as `other`.
pub const METERED_STATUSES: [StatusCode; 12] = [
    StatusCode::OK,
    StatusCode::CREATED,
    StatusCode::ACCEPTED,
    StatusCode::NO_CONTENT,
    StatusCode::BAD_REQUEST,
    StatusCode::UNAUTHORIZED,
    StatusCode::FORBIDDEN,
    StatusCode::NOT_FOUND,
    StatusCode::METHOD_NOT_ALLOWED,
    StatusCode::PAYLOAD_TOO_LARGE,
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
];

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(metrics_address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// A monotonically increasing event count.
///
/// Every mark is mirrored to the global `metrics` recorder; the local count is
/// what the server itself reads back.
#[derive(Debug)]
pub struct Meter {
    count: AtomicU64,
    counter: Counter,
}

impl Meter {
    /// Meter backed by a recorder counter.
    pub fn new(counter: Counter) -> Self {
        Self {
            count: AtomicU64::new(0),
            counter,
        }
    }

    /// Meter that only counts locally.
    pub fn detached() -> Self {
        Self::new(Counter::noop())
    }

    pub fn mark(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.counter.increment(1);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

/// Per-(route, method) instrumentation attached to a compiled handler.
#[derive(Debug)]
pub struct RouteMetrics {
    pub invocations: Meter,
    latency: Histogram,
}

impl RouteMetrics {
    pub fn new(pattern: &str, method: &str) -> Self {
        let labels = [
            ("route", pattern.to_string()),
            ("method", method.to_string()),
        ];
        Self {
            invocations: Meter::new(metrics::counter!("xrpc_route_requests_total", &labels)),
            latency: metrics::histogram!("xrpc_route_duration_seconds", &labels),
        }
    }

    pub fn record_latency(&self, started: Instant) {
        self.latency.record(started.elapsed().as_secs_f64());
    }
}

/// Server-wide meters shared by every connection.
#[derive(Debug)]
pub struct ServerMetrics {
    requests: Meter,
    by_status: HashMap<StatusCode, Meter>,
    other_status: Meter,
    hard_rate_limits: Meter,
    active_connections: Gauge,
}

impl ServerMetrics {
    pub fn new() -> Self {
        let by_status = METERED_STATUSES
            .iter()
            .map(|status| {
                let counter = metrics::counter!(
                    "xrpc_responses_total",
                    "status" => status.as_str().to_string()
                );
                (*status, Meter::new(counter))
            })
            .collect();

        Self {
            requests: Meter::new(metrics::counter!("xrpc_requests_total")),
            by_status,
            other_status: Meter::new(metrics::counter!(
                "xrpc_responses_total",
                "status" => "other"
            )),
            hard_rate_limits: Meter::new(metrics::counter!("xrpc_hard_rate_limits_total")),
            active_connections: metrics::gauge!("xrpc_active_connections"),
        }
    }

    pub fn requests(&self) -> &Meter {
        &self.requests
    }

    pub fn hard_rate_limits(&self) -> &Meter {
        &self.hard_rate_limits
    }

    /// Mark exactly one status meter for a written response.
    pub fn mark_status(&self, status: StatusCode) {
        self.status_meter(status).mark();
    }

    pub fn status_count(&self, status: StatusCode) -> u64 {
        self.status_meter(status).count()
    }

    fn status_meter(&self, status: StatusCode) -> &Meter {
        self.by_status.get(&status).unwrap_or(&self.other_status)
    }

    pub fn connection_opened(&self) {
        self.active_connections.increment(1.0);
    }

    pub fn connection_closed(&self) {
        self.active_connections.decrement(1.0);
    }
}

impl Default for ServerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meter_counts_marks() {
        let meter = Meter::detached();
        meter.mark();
        meter.mark();
        assert_eq!(meter.count(), 2);
    }

    #[test]
    fn unknown_status_lands_in_other() {
        let metrics = ServerMetrics::new();
        metrics.mark_status(StatusCode::IM_A_TEAPOT);
        metrics.mark_status(StatusCode::OK);

        assert_eq!(metrics.status_count(StatusCode::OK), 1);
        assert_eq!(metrics.status_count(StatusCode::IM_A_TEAPOT), 1);
        assert_eq!(metrics.status_count(StatusCode::BAD_GATEWAY), 1);
        assert_eq!(metrics.status_count(StatusCode::NOT_FOUND), 0);
    }
}
