//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! Values come from the command line; everything else has a fixed default.

use std::time::Duration;

/// Grace period between the first shutdown signal and HTTP termination.
pub const DEFAULT_GRACE_PERIOD_MS: u64 = 30_000;

/// Read chunk size for echo connections.
pub const DEFAULT_ECHO_BUFFER_SIZE: usize = 32;

/// Host every listener binds to unless overridden.
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

/// Root configuration for the service.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// HTTP health listener.
    pub http: ListenerConfig,

    /// TCP echo listener and connection settings.
    pub echo: EchoConfig,

    /// Shutdown sequencing.
    pub shutdown: ShutdownConfig,
}

impl ServiceConfig {
    /// Build a configuration for the given ports on the default host.
    pub fn from_ports(http_port: u16, echo_port: u16) -> Self {
        Self {
            http: ListenerConfig::on_port(http_port),
            echo: EchoConfig {
                listener: ListenerConfig::on_port(echo_port),
                ..EchoConfig::default()
            },
            shutdown: ShutdownConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl ListenerConfig {
    /// Listen on `port` on the default host.
    pub fn on_port(port: u16) -> Self {
        Self {
            bind_address: format!("{}:{}", DEFAULT_BIND_HOST, port),
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self::on_port(0)
    }
}

/// Echo service configuration.
#[derive(Debug, Clone)]
pub struct EchoConfig {
    pub listener: ListenerConfig,

    /// Size of the per-connection read buffer in bytes.
    pub buffer_size: usize,
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            buffer_size: DEFAULT_ECHO_BUFFER_SIZE,
        }
    }
}

/// Shutdown configuration.
#[derive(Debug, Clone)]
pub struct ShutdownConfig {
    /// Time between the first signal and HTTP termination, in milliseconds.
    pub grace_period_ms: u64,
}

impl ShutdownConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: DEFAULT_GRACE_PERIOD_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_ports_binds_all_interfaces() {
        let config = ServiceConfig::from_ports(8080, 9090);
        assert_eq!(config.http.bind_address, "0.0.0.0:8080");
        assert_eq!(config.echo.listener.bind_address, "0.0.0.0:9090");
    }

    #[test]
    fn defaults_match_fixed_constants() {
        let config = ServiceConfig::from_ports(1, 2);
        assert_eq!(config.echo.buffer_size, 32);
        assert_eq!(config.shutdown.grace_period(), Duration::from_secs(30));
    }
}
