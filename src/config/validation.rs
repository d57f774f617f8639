//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (payload limit > 0, thread pool > 0)
//! - Validate addresses in bind, override, and IP list entries
//! - Detect conflicting options (both IP lists enabled)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::net::protocol::Protocol;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("listener.event_loop_threads must be at least 1")]
    NoEventLoops,

    #[error("listener.cleartext_protocol `{0}` is not one of http/1.1, h2")]
    CleartextProtocol(String),

    #[error("listener.tls requires both cert_path and key_path")]
    TlsPaths,

    #[error("limits.max_payload_bytes must be greater than zero")]
    ZeroPayloadLimit,

    #[error("{field}: soft limit {soft} exceeds hard limit {hard}")]
    SoftAboveHard { field: String, soft: f64, hard: f64 },

    #[error("{field}: rate must be positive, got {value}")]
    NonPositiveRate { field: String, value: f64 },

    #[error("rate_limit.pool_size must be at least 1")]
    EmptyPool,

    #[error("{field}: `{value}` is not an IP address")]
    IpAddress { field: String, value: String },

    #[error("ip_filter: white list and black list cannot both be enabled")]
    ConflictingIpLists,

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),
}

/// Check a parsed configuration, reporting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let listener = &config.listener;
    if listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(listener.bind_address.clone()));
    }
    if listener.event_loop_threads == 0 {
        errors.push(ValidationError::NoEventLoops);
    }
    if Protocol::from_name(&listener.cleartext_protocol).is_err() {
        errors.push(ValidationError::CleartextProtocol(
            listener.cleartext_protocol.clone(),
        ));
    }
    if let Some(tls) = &listener.tls {
        if tls.cert_path.is_empty() || tls.key_path.is_empty() {
            errors.push(ValidationError::TlsPaths);
        }
    }

    if config.limits.max_payload_bytes == 0 {
        errors.push(ValidationError::ZeroPayloadLimit);
    }

    let rate = &config.rate_limit;
    if rate.enabled {
        check_pair(&mut errors, "rate_limit.global", rate.global_soft_rps, rate.global_hard_rps);
        check_pair(&mut errors, "rate_limit", rate.soft_rps, rate.hard_rps);
        if rate.pool_size == 0 {
            errors.push(ValidationError::EmptyPool);
        }
        for client in &rate.client_overrides {
            let field = format!("rate_limit.client_overrides[{}]", client.address);
            check_ip(&mut errors, &field, &client.address);
            check_pair(&mut errors, &field, client.soft_rps, client.hard_rps);
        }
    }

    let ip_filter = &config.ip_filter;
    if ip_filter.enable_white_list && ip_filter.enable_black_list {
        errors.push(ValidationError::ConflictingIpLists);
    }
    for address in &ip_filter.white_list {
        check_ip(&mut errors, "ip_filter.white_list", address);
    }
    for address in &ip_filter.black_list {
        check_ip(&mut errors, "ip_filter.black_list", address);
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_pair(errors: &mut Vec<ValidationError>, field: &str, soft: f64, hard: f64) {
    for value in [soft, hard] {
        if !(value > 0.0) {
            errors.push(ValidationError::NonPositiveRate {
                field: field.to_string(),
                value,
            });
        }
    }
    if soft > hard {
        errors.push(ValidationError::SoftAboveHard {
            field: field.to_string(),
            soft,
            hard,
        });
    }
}

fn check_ip(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.parse::<IpAddr>().is_err() {
        errors.push(ValidationError::IpAddress {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ClientOverrideConfig;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&ServerConfig::default()), Ok(()));
    }

    #[test]
    fn reports_every_problem() {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.limits.max_payload_bytes = 0;
        config.ip_filter.enable_white_list = true;
        config.ip_filter.enable_black_list = true;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ZeroPayloadLimit));
        assert!(errors.contains(&ValidationError::ConflictingIpLists));
    }

    #[test]
    fn rejects_inverted_override() {
        let mut config = ServerConfig::default();
        config.rate_limit.client_overrides.push(ClientOverrideConfig {
            address: "10.1.1.1".into(),
            soft_rps: 10.0,
            hard_rps: 5.0,
        });

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::SoftAboveHard { .. }]
        ));
    }

    #[test]
    fn rejects_unknown_cleartext_protocol() {
        let mut config = ServerConfig::default();
        config.listener.cleartext_protocol = "spdy/3".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::CleartextProtocol("spdy/3".into())]
        );
    }
}
