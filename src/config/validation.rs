//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation of values assembled from the command line
//! - Validate value ranges (buffer size > 0, grace period > 0)
//! - Detect both services claiming the same fixed address
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before any listener is bound

use std::net::SocketAddr;

use crate::config::schema::ServiceConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid bind address for {listener}: {address}")]
    InvalidAddress {
        listener: &'static str,
        address: String,
    },

    #[error("echo buffer size must be greater than zero")]
    ZeroBufferSize,

    #[error("grace period must be greater than zero")]
    ZeroGracePeriod,

    #[error("http and echo listeners share address {0}")]
    AddressConflict(SocketAddr),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let http = parse_address("http", &config.http.bind_address, &mut errors);
    let echo = parse_address("echo", &config.echo.listener.bind_address, &mut errors);

    // Port 0 asks the OS for an ephemeral port, so it never conflicts.
    if let (Some(http), Some(echo)) = (http, echo) {
        if http.port() != 0 && http == echo {
            errors.push(ValidationError::AddressConflict(http));
        }
    }

    if config.echo.buffer_size == 0 {
        errors.push(ValidationError::ZeroBufferSize);
    }

    if config.shutdown.grace_period_ms == 0 {
        errors.push(ValidationError::ZeroGracePeriod);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn parse_address(
    listener: &'static str,
    address: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<SocketAddr> {
    match address.parse() {
        Ok(addr) => Some(addr),
        Err(_) => {
            errors.push(ValidationError::InvalidAddress {
                listener,
                address: address.to_string(),
            });
            None
        }
    }
}
