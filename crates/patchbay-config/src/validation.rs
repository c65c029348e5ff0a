//! Configuration validation.
//!
//! Parsing only checks shape. These checks reject configurations that
//! would produce a server nobody can use, e.g. a port name limit too short
//! to hold any port of a maximum-length client.
//!
//! ```rust
//! use patchbay_config::{ServerConfig, validate_server_config};
//!
//! let mut config = ServerConfig::default();
//! assert!(validate_server_config(&config).is_ok());
//!
//! config.limits.max_client_name_len = 0;
//! assert!(validate_server_config(&config).is_err());
//! ```

use patchbay_core::{Limits, name};
use thiserror::Error;

use crate::server::ServerConfig;

/// Upper bound on the configured client name length.
pub const MAX_CLIENT_NAME_LEN: usize = 1024;

/// Upper bound on the configured alias count.
pub const MAX_ALIASES: usize = 16;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A numeric field is outside its allowed range.
    #[error("'{field}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted path of the field.
        field: String,
        /// The rejected value.
        value: usize,
        /// Minimum allowed value.
        min: usize,
        /// Maximum allowed value.
        max: usize,
    },

    /// A field holds a value that breaks a non-numeric rule.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Dotted path of the field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Check every constraint on a server configuration, collecting all failures.
pub fn validate_server_config(config: &ServerConfig) -> ValidationResult<()> {
    let mut errors = Vec::new();
    let limits = &config.limits;

    if let Err(e) = name::validate_client_name(&config.name, &Limits::default()) {
        errors.push(ValidationError::InvalidValue {
            field: "name".into(),
            reason: e.to_string(),
        });
    }

    if !(1..=MAX_CLIENT_NAME_LEN).contains(&limits.max_client_name_len) {
        errors.push(ValidationError::OutOfRange {
            field: "limits.max_client_name_len".into(),
            value: limits.max_client_name_len,
            min: 1,
            max: MAX_CLIENT_NAME_LEN,
        });
    }

    // A maximum-length client still needs room for ":" and one character.
    let min_port = limits.max_client_name_len.saturating_add(2);
    if limits.max_port_name_len < min_port {
        errors.push(ValidationError::OutOfRange {
            field: "limits.max_port_name_len".into(),
            value: limits.max_port_name_len,
            min: min_port,
            max: usize::MAX,
        });
    }

    if limits.max_aliases > MAX_ALIASES {
        errors.push(ValidationError::OutOfRange {
            field: "limits.max_aliases".into(),
            value: limits.max_aliases,
            min: 0,
            max: MAX_ALIASES,
        });
    }

    if limits.max_connections_per_port == Some(0) {
        errors.push(ValidationError::InvalidValue {
            field: "limits.max_connections_per_port".into(),
            reason: "must be at least 1, or omitted for no limit".into(),
        });
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_server_config(&ServerConfig::default()), Ok(()));
    }

    #[test]
    fn port_limit_must_fit_a_client_name() {
        let mut config = ServerConfig::default();
        config.limits.max_client_name_len = 63;
        config.limits.max_port_name_len = 64;
        let err = validate_server_config(&config).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange { ref field, min: 65, .. } if field == "limits.max_port_name_len"
        ));
    }

    #[test]
    fn zero_connection_limit_rejected() {
        let mut config = ServerConfig::default();
        config.limits.max_connections_per_port = Some(0);
        assert!(matches!(
            validate_server_config(&config),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn server_name_follows_client_rules() {
        let mut config = ServerConfig::default();
        config.name = "bad:name".into();
        assert!(validate_server_config(&config).is_err());
    }

    #[test]
    fn collects_every_failure() {
        let mut config = ServerConfig::default();
        config.limits.max_aliases = 99;
        config.limits.max_connections_per_port = Some(0);
        match validate_server_config(&config) {
            Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected multiple errors, got {other:?}"),
        }
    }
}
