//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check bind addresses parse
//! - Check TLS material is configured when the TLS listener is enabled
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FrontendConfig → Result<(), Vec<ValidationError>>
//! - Chain files are validated later by the trust loader, not here

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::FrontendConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.address must be set")]
    MissingAddress,

    #[error("{field} {value:?} is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("listener.{0} is required when listener.tls_address is set")]
    MissingTlsMaterial(&'static str),
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &FrontendConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let listener = &config.listener;

    if listener.address.trim().is_empty() {
        errors.push(ValidationError::MissingAddress);
    } else if listener.address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.address",
            value: listener.address.clone(),
        });
    }

    if listener.tls_enabled() {
        if listener.tls_address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidAddress {
                field: "listener.tls_address",
                value: listener.tls_address.clone(),
            });
        }
        if listener.server_certificate_path.is_none() {
            errors.push(ValidationError::MissingTlsMaterial("server_certificate_path"));
        }
        if listener.server_key_path.is_none() {
            errors.push(ValidationError::MissingTlsMaterial("server_key_path"));
        }
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
    fn default_config_is_valid() {
        assert!(validate_config(&FrontendConfig::default()).is_ok());
    }

    #[test]
    fn empty_address_rejected() {
        let mut config = FrontendConfig::default();
        config.listener.address = String::new();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MissingAddress]);
    }

    #[test]
    fn tls_listener_requires_material() {
        let mut config = FrontendConfig::default();
        config.listener.tls_address = "not-an-address".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::MissingTlsMaterial("server_key_path")));
    }

    #[test]
    fn blank_tls_address_needs_nothing() {
        let mut config = FrontendConfig::default();
        config.listener.tls_address = "   ".to_string();

        assert!(validate_config(&config).is_ok());
    }
}
