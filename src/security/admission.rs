//! Ordered admission pipeline run once per accepted connection.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::observability::metrics::ServerMetrics;
use crate::security::connection_limit::{ConnectionLimiter, ConnectionSlot};
use crate::security::firewall::{Firewall, Rejection};
use crate::security::ip_filter::IpFilter;
use crate::security::rate_limit::{RateLimitState, ServiceRateLimiter};

/// A connection that passed every gate.
#[derive(Debug)]
pub struct Admitted {
    /// Must live as long as the connection.
    pub slot: ConnectionSlot,
    pub rate_limit: RateLimitState,
}

/// Gates in evaluation order: connection limit, rate limit, IP filter, firewall.
#[derive(Debug)]
pub struct AdmissionGates {
    connections: ConnectionLimiter,
    rate_limiter: ServiceRateLimiter,
    ip_filter: IpFilter,
    firewall: Firewall,
}

impl AdmissionGates {
    pub fn new(config: &ServerConfig, metrics: Arc<ServerMetrics>) -> Self {
        Self {
            connections: ConnectionLimiter::new(config.listener.max_connections),
            rate_limiter: ServiceRateLimiter::new(&config.rate_limit),
            ip_filter: IpFilter::from_config(&config.ip_filter),
            firewall: Firewall::new(metrics),
        }
    }

    /// Evaluate every gate for `peer`. On rejection the slot taken by the
    /// connection limiter has already been released.
    pub fn admit(&self, peer: SocketAddr) -> Result<Admitted, Rejection> {
        let slot = self.connections.acquire();
        if slot.is_over_limit() {
            tracing::info!(
                peer_addr = %peer,
                max_connections = self.connections.max_connections(),
                "Accepted connection above limit, dropping"
            );
            return Err(Rejection::OverConnectionLimit);
        }

        let rate_limit = self.rate_limiter.classify(peer.ip());
        let ip_check = self.ip_filter.check(peer.ip());
        self.firewall.inspect(rate_limit, ip_check)?;

        Ok(Admitted { slot, rate_limit })
    }

    pub fn active_connections(&self) -> i64 {
        self.connections.active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::ip_filter::IpListKind;

    fn peer() -> SocketAddr {
        "127.0.0.1:5555".parse().unwrap()
    }

    #[test]
    fn admits_by_default() {
        let gates = AdmissionGates::new(&ServerConfig::default(), Arc::new(ServerMetrics::new()));
        let admitted = gates.admit(peer()).unwrap();
        assert_eq!(admitted.rate_limit, RateLimitState::NotLimited);
        assert_eq!(gates.active_connections(), 1);
        drop(admitted);
        assert_eq!(gates.active_connections(), 0);
    }

    #[test]
    fn connection_limit_rejects_and_releases() {
        let mut config = ServerConfig::default();
        config.listener.max_connections = 1;
        let gates = AdmissionGates::new(&config, Arc::new(ServerMetrics::new()));

        let first = gates.admit(peer()).unwrap();
        assert_eq!(gates.admit(peer()).err(), Some(Rejection::OverConnectionLimit));
        assert_eq!(gates.active_connections(), 1);
        drop(first);
        assert!(gates.admit(peer()).is_ok());
    }

    #[test]
    fn blacklisted_peer_is_rejected() {
        let mut config = ServerConfig::default();
        config.ip_filter.enable_black_list = true;
        config.ip_filter.black_list = vec!["127.0.0.1".into()];
        let gates = AdmissionGates::new(&config, Arc::new(ServerMetrics::new()));

        assert_eq!(
            gates.admit(peer()).err(),
            Some(Rejection::IpDenied(IpListKind::BlackList))
        );
        assert_eq!(gates.active_connections(), 0);
    }

    #[test]
    fn hard_limited_peer_is_rejected() {
        let mut config = ServerConfig::default();
        config.rate_limit.soft_rps = 1.0;
        config.rate_limit.hard_rps = 1.0;
        let metrics = Arc::new(ServerMetrics::new());
        let gates = AdmissionGates::new(&config, Arc::clone(&metrics));

        let _first = gates.admit(peer()).unwrap();
        assert_eq!(gates.admit(peer()).err(), Some(Rejection::HardRateLimited));
        assert_eq!(metrics.hard_rate_limits().count(), 1);
    }
}
