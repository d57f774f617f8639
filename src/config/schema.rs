//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, TLS, connection cap).
    pub listener: ListenerConfig,

    /// Request size and stream limits.
    pub limits: LimitsConfig,

    /// Idle disconnect timeouts.
    pub timeouts: TimeoutConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// IP white/black list configuration.
    pub ip_filter: IpFilterConfig,

    /// Cross-origin resource sharing.
    pub cors: CorsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration. ALPN selects the protocol when present.
    pub tls: Option<TlsConfig>,

    /// Protocol spoken on cleartext connections ("http/1.1" or "h2").
    pub cleartext_protocol: String,

    /// Maximum concurrent connections; 0 disables the limit.
    pub max_connections: usize,

    /// Number of runtime worker threads serving connections.
    pub event_loop_threads: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
            cleartext_protocol: "http/1.1".to_string(),
            max_connections: 10_000,
            event_loop_threads: 4,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate chain file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Payload and stream limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest request body accepted, in bytes.
    pub max_payload_bytes: usize,

    /// HTTP/2 SETTINGS_MAX_CONCURRENT_STREAMS advertised to clients.
    pub max_concurrent_streams: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: 1024 * 1024,
            max_concurrent_streams: 256,
        }
    }
}

/// Idle timeouts in seconds. Zero disables the corresponding check.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Close after this long without reading anything.
    pub reader_idle_secs: u64,

    /// Close after this long without writing anything.
    pub writer_idle_secs: u64,

    /// Close after this long without reading or writing.
    pub all_idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            reader_idle_secs: 0,
            writer_idle_secs: 0,
            all_idle_secs: 60,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Server-wide connections per second before soft limiting.
    pub global_soft_rps: f64,

    /// Server-wide connections per second before connections are dropped.
    pub global_hard_rps: f64,

    /// Per-client soft budget.
    pub soft_rps: f64,

    /// Per-client hard budget.
    pub hard_rps: f64,

    /// Number of per-client bucket pairs clients are hashed into.
    pub pool_size: usize,

    /// Clients with their own soft/hard budgets.
    pub client_overrides: Vec<ClientOverrideConfig>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            global_soft_rps: 700.0,
            global_hard_rps: 750.0,
            soft_rps: 500.0,
            hard_rps: 550.0,
            pool_size: 20,
            client_overrides: Vec::new(),
        }
    }
}

/// Per-client rate limit override.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientOverrideConfig {
    /// Client IP address.
    pub address: String,

    pub soft_rps: f64,

    pub hard_rps: f64,
}

/// IP white/black list configuration. At most one list may be enabled.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct IpFilterConfig {
    pub enable_white_list: bool,

    pub enable_black_list: bool,

    pub white_list: Vec<String>,

    pub black_list: Vec<String>,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Enable CORS handling.
    pub enabled: bool,

    /// Allowed origins; `"*"` allows any origin.
    pub allowed_origins: Vec<String>,

    pub allowed_methods: Vec<String>,

    pub allowed_headers: Vec<String>,

    pub exposed_headers: Vec<String>,

    pub allow_credentials: bool,

    /// Accept the literal `null` origin.
    pub allow_null_origin: bool,

    /// Reject requests from disallowed origins with 403 instead of passing them on.
    pub short_circuit: bool,

    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allowed_origins: Vec::new(),
            allowed_methods: vec!["GET".to_string(), "POST".to_string()],
            allowed_headers: Vec::new(),
            exposed_headers: Vec::new(),
            allow_credentials: false,
            allow_null_origin: false,
            short_circuit: false,
            max_age_secs: 0,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
