//! Global open-connection limit.
//!
//! Every accepted connection takes a slot, including ones that end up over
//! the limit; the slot is returned when the connection task drops it.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ConnectionLimiter {
    active: Arc<AtomicI64>,
    /// 0 means unlimited.
    max_connections: usize,
}

impl ConnectionLimiter {
    pub fn new(max_connections: usize) -> Self {
        Self {
            active: Arc::new(AtomicI64::new(0)),
            max_connections,
        }
    }

    /// Count a new connection.
    pub fn acquire(&self) -> ConnectionSlot {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        let over_limit = self.max_connections > 0 && now_active > self.max_connections as i64;
        ConnectionSlot {
            active: Arc::clone(&self.active),
            over_limit,
        }
    }

    pub fn active(&self) -> i64 {
        self.active.load(Ordering::SeqCst)
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }
}

/// Guard for one counted connection. Decrements on drop.
#[derive(Debug)]
pub struct ConnectionSlot {
    active: Arc<AtomicI64>,
    over_limit: bool,
}

impl ConnectionSlot {
    /// The connection pushed the count past the configured maximum.
    pub fn is_over_limit(&self) -> bool {
        self.over_limit
    }
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        let remaining = self.active.fetch_sub(1, Ordering::SeqCst) - 1;
        if remaining < 0 {
            tracing::error!(active = remaining, "Connection count went negative");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_releases() {
        let limiter = ConnectionLimiter::new(2);
        let a = limiter.acquire();
        let b = limiter.acquire();
        assert_eq!(limiter.active(), 2);
        assert!(!a.is_over_limit());
        assert!(!b.is_over_limit());

        let c = limiter.acquire();
        assert!(c.is_over_limit());
        assert_eq!(limiter.active(), 3);

        drop(c);
        drop(a);
        assert_eq!(limiter.active(), 1);

        let d = limiter.acquire();
        assert!(!d.is_over_limit());
        drop(b);
        drop(d);
        assert_eq!(limiter.active(), 0);
    }

    #[test]
    fn zero_is_unlimited() {
        let limiter = ConnectionLimiter::new(0);
        let slots: Vec<_> = (0..100).map(|_| limiter.acquire()).collect();
        assert!(slots.iter().all(|s| !s.is_over_limit()));
        drop(slots);
        assert_eq!(limiter.active(), 0);
    }
}
