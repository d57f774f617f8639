//! Terminal admission gate.
//!
//! Reads the flags set by the earlier gates and decides whether the
//! connection reaches a protocol codec at all. Soft rate limited connections
//! pass; they are answered with 429 per request by the dispatchers.

use std::fmt;
use std::sync::Arc;

use crate::observability::metrics::ServerMetrics;
use crate::security::ip_filter::IpListKind;
use crate::security::rate_limit::RateLimitState;

/// Why a connection was dropped. No response is written in any case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    OverConnectionLimit,
    HardRateLimited,
    IpDenied(IpListKind),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::OverConnectionLimit => f.write_str("connection limit reached"),
            Rejection::HardRateLimited => f.write_str("hard rate limit reached"),
            Rejection::IpDenied(list) => write!(f, "rejected by IP {}", list),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Firewall {
    metrics: Arc<ServerMetrics>,
}

impl Firewall {
    pub fn new(metrics: Arc<ServerMetrics>) -> Self {
        Self { metrics }
    }

    /// Drop hard limited and IP rejected connections.
    pub fn inspect(
        &self,
        rate_limit: RateLimitState,
        ip_check: Result<(), IpListKind>,
    ) -> Result<(), Rejection> {
        if rate_limit == RateLimitState::HardLimited {
            self.metrics.hard_rate_limits().mark();
            return Err(Rejection::HardRateLimited);
        }
        ip_check.map_err(Rejection::IpDenied)
    }
}
