//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WebhookConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::WebhookConfig;

/// A single configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// An address does not parse as `ip:port`.
    #[error("{field}: invalid socket address \"{value}\"")]
    InvalidAddress { field: &'static str, value: String },

    /// A value that must be positive is zero.
    #[error("{field}: must be greater than zero")]
    Zero { field: &'static str },

    /// A path that must be given is empty.
    #[error("{field}: must not be empty")]
    EmptyPath { field: &'static str },

    /// Unknown log level.
    #[error("observability.log_level: unknown level \"{0}\"")]
    LogLevel(String),
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Check a parsed configuration.
pub fn validate_config(config: &WebhookConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.trim().is_empty() {
            errors.push(ValidationError::EmptyPath { field: "listener.tls.cert_path" });
        }
        if tls.key_path.trim().is_empty() {
            errors.push(ValidationError::EmptyPath { field: "listener.tls.key_path" });
        }
    }

    if config.admission.max_body_bytes == Some(0) {
        errors.push(ValidationError::Zero { field: "admission.max_body_bytes" });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.to_lowercase().as_str()) {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
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
    use crate::config::schema::TlsConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&WebhookConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = WebhookConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.listener.tls = Some(TlsConfig {
            cert_path: "".into(),
            key_path: "/etc/webhook/tls.key".into(),
        });
        config.admission.max_body_bytes = Some(0);
        config.timeouts.request_secs = 0;
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::EmptyPath { field: "listener.tls.cert_path" }));
        assert!(errors.contains(&ValidationError::Zero { field: "timeouts.request_secs" }));
        assert!(errors.contains(&ValidationError::LogLevel("loud".into())));
    }

    #[test]
    fn test_metrics_address_ignored_when_disabled() {
        let mut config = WebhookConfig::default();
        config.observability.metrics_enabled = false;
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());
    }
}
