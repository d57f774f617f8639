//! Connection-granularity rate limiting with soft and hard budgets.
//!
//! # Responsibilities
//! - Classify each new connection as not limited, soft limited, or hard limited
//! - Apply a per-client budget (hashed into a fixed pool of buckets) and a global budget
//! - Give configured client addresses their own dedicated budget
//!
//! # Design Decisions
//! - Classification happens once per connection; every request on that
//!   connection inherits it
//! - Per-client buckets are pre-allocated so memory does not grow with the
//!   number of distinct peers; clients sharing a slot share a budget
//! - Override buckets are built up front, so an override client is limited
//!   from its first connection onward
//! - A hard budget is charged before the matching soft budget; a connection
//!   that fails the hard check does not consume soft capacity

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::Instant;

use crate::config::RateLimitConfig;
use crate::security::ip_filter::canonical;

/// Admission classification computed when a connection opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum RateLimitState {
    #[default]
    NotLimited,
    /// Served, but every request is answered with 429.
    SoftLimited,
    /// Dropped by the firewall before any codec runs.
    HardLimited,
}

/// A simple token bucket rate limiter.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    capacity: f64,
    refill_rate: f64,
    last_update: Instant,
}

impl TokenBucket {
    /// Bucket that refills at `rps` tokens per second and holds at most one
    /// second worth of tokens (at least one).
    fn new(rps: f64) -> Self {
        let capacity = rps.max(1.0);
        Self {
            tokens: capacity,
            capacity,
            refill_rate: rps,
            last_update: Instant::now(),
        }
    }

    fn try_acquire(&mut self) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        // Refill tokens
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// A soft/hard pair of buckets.
#[derive(Debug)]
struct BudgetPair {
    soft: Mutex<TokenBucket>,
    hard: Mutex<TokenBucket>,
}

impl BudgetPair {
    fn new(soft_rps: f64, hard_rps: f64) -> Self {
        Self {
            soft: Mutex::new(TokenBucket::new(soft_rps)),
            hard: Mutex::new(TokenBucket::new(hard_rps)),
        }
    }

    fn classify(&self) -> RateLimitState {
        let hard_ok = self
            .hard
            .lock()
            .expect("rate limiter mutex poisoned")
            .try_acquire();
        if !hard_ok {
            return RateLimitState::HardLimited;
        }

        let soft_ok = self
            .soft
            .lock()
            .expect("rate limiter mutex poisoned")
            .try_acquire();
        if soft_ok {
            RateLimitState::NotLimited
        } else {
            RateLimitState::SoftLimited
        }
    }
}

/// Rate limiter shared by every accept task.
#[derive(Debug)]
pub struct ServiceRateLimiter {
    enabled: bool,
    global: BudgetPair,
    pool: Vec<BudgetPair>,
    overrides: HashMap<IpAddr, BudgetPair>,
}

impl ServiceRateLimiter {
    /// Build the limiter. Override entries whose address does not parse are
    /// skipped here; configuration validation reports them.
    pub fn new(config: &RateLimitConfig) -> Self {
        let pool = (0..config.pool_size.max(1))
            .map(|_| BudgetPair::new(config.soft_rps, config.hard_rps))
            .collect();

        let overrides = config
            .client_overrides
            .iter()
            .filter_map(|o| match o.address.parse::<IpAddr>() {
                Ok(ip) => Some((canonical(ip), BudgetPair::new(o.soft_rps, o.hard_rps))),
                Err(e) => {
                    tracing::warn!(address = %o.address, error = %e, "Ignoring rate limit override");
                    None
                }
            })
            .collect();

        Self {
            enabled: config.enabled,
            global: BudgetPair::new(config.global_soft_rps, config.global_hard_rps),
            pool,
            overrides,
        }
    }

    /// Classify a new connection from `ip`.
    ///
    /// The result is the stricter of the client classification and the
    /// global classification.
    pub fn classify(&self, ip: IpAddr) -> RateLimitState {
        if !self.enabled {
            return RateLimitState::NotLimited;
        }
        let ip = canonical(ip);

        let client = match self.overrides.get(&ip) {
            Some(pair) => pair.classify(),
            None => self.pool_slot(ip).classify(),
        };
        let global = self.global.classify();
        let state = client.max(global);

        if state == RateLimitState::HardLimited {
            tracing::debug!(
                client = %ip,
                client_state = ?client,
                global_state = ?global,
                "Hard rate limit fired"
            );
        }
        state
    }

    fn pool_slot(&self, ip: IpAddr) -> &BudgetPair {
        let mut hasher = DefaultHasher::new();
        ip.hash(&mut hasher);
        let index = (hasher.finish() % self.pool.len() as u64) as usize;
        &self.pool[index]
    }

    pub fn has_override(&self, ip: &IpAddr) -> bool {
        self.overrides.contains_key(&canonical(*ip))
    }
}
