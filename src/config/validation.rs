//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate URLs, value ranges, and addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: TransferConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::TransferConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn check_http_url(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", value, e))),
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &TransferConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let network = &config.network;

    check_http_url("network.rpc_url", &network.rpc_url, &mut errors);
    for url in &network.failover_urls {
        check_http_url("network.failover_urls", url, &mut errors);
    }
    if network.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("network.rpc_timeout_secs", "must be greater than 0"));
    }
    if network.confirm_timeout_secs == 0 {
        errors.push(ValidationError::new("network.confirm_timeout_secs", "must be greater than 0"));
    }
    if network.poll_interval_ms == 0 {
        errors.push(ValidationError::new("network.poll_interval_ms", "must be greater than 0"));
    } else if network.poll_interval_ms > network.confirm_timeout_secs.saturating_mul(1000) {
        errors.push(ValidationError::new(
            "network.poll_interval_ms",
            "must not exceed confirm_timeout_secs",
        ));
    }

    check_http_url("explorer.base_url", &config.explorer.base_url, &mut errors);

    if config.wallet.keypair_env_var.is_empty() && config.wallet.keypair_path.is_none() {
        errors.push(ValidationError::new(
            "wallet.keypair_env_var",
            "must be set when no keypair_path is given",
        ));
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.to_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", observability.log_level),
        ));
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&TransferConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = TransferConfig::default();
        config.network.rpc_url = "ws://localhost:8900".to_string();
        config.network.rpc_timeout_secs = 0;
        config.observability.log_level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].to_string().contains("unsupported scheme 'ws'"));
        assert_eq!(errors[1].field, "network.rpc_timeout_secs");
        assert_eq!(errors[2].field, "observability.log_level");
    }

    #[test]
    fn test_poll_interval_bounded_by_timeout() {
        let mut config = TransferConfig::default();
        config.network.confirm_timeout_secs = 1;
        config.network.poll_interval_ms = 5_000;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "network.poll_interval_ms");
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = TransferConfig::default();
        config.observability.metrics_address = "nowhere".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
