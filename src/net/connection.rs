//! Per-connection identity and shared serving state.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Carry the admission outcome and the read-only serving state to the codecs
//! - Count open connections on the active-connections gauge

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::http::cors::CorsEvaluator;
use crate::net::protocol::Protocol;
use crate::observability::metrics::ServerMetrics;
use crate::routing::CompiledRoutes;
use crate::security::RateLimitState;

/// Global atomic counter for connection IDs.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Read-only state shared by every connection of a server.
#[derive(Debug)]
pub struct ServingState {
    pub routes: Arc<CompiledRoutes>,
    pub metrics: Arc<ServerMetrics>,
    pub cors: Option<CorsEvaluator>,
    pub max_payload_bytes: usize,
}

/// Everything a codec needs to serve one connection.
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    pub id: ConnectionId,
    pub peer: SocketAddr,
    pub protocol: Protocol,
    /// Computed once at accept; never re-evaluated for this connection.
    pub rate_limit: RateLimitState,
    pub state: Arc<ServingState>,
}

impl ConnectionContext {
    pub fn new(
        peer: SocketAddr,
        protocol: Protocol,
        rate_limit: RateLimitState,
        state: Arc<ServingState>,
    ) -> Self {
        Self {
            id: ConnectionId::new(),
            peer,
            protocol,
            rate_limit,
            state,
        }
    }

    pub fn routes(&self) -> &CompiledRoutes {
        &self.state.routes
    }

    pub fn metrics(&self) -> &ServerMetrics {
        &self.state.metrics
    }

    pub fn cors(&self) -> Option<&CorsEvaluator> {
        self.state.cors.as_ref()
    }

    pub fn max_payload_bytes(&self) -> usize {
        self.state.max_payload_bytes
    }

    pub fn is_soft_limited(&self) -> bool {
        self.rate_limit == RateLimitState::SoftLimited
    }

    /// Mark the active-connections gauge until the guard drops.
    pub fn track(&self) -> ConnectionGuard {
        self.state.metrics.connection_opened();
        tracing::debug!(connection_id = %self.id, peer_addr = %self.peer, protocol = %self.protocol, "Connection opened");
        ConnectionGuard {
            id: self.id,
            metrics: Arc::clone(&self.state.metrics),
        }
    }
}

/// Guard that tracks a connection's lifetime.
#[derive(Debug)]
pub struct ConnectionGuard {
    id: ConnectionId,
    metrics: Arc<ServerMetrics>,
}

impl ConnectionGuard {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.metrics.connection_closed();
        tracing::trace!(connection_id = %self.id, "Connection closed");
    }
}
