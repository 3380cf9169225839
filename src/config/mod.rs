//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! command line (<http_port> <echo_port>)
//!     → schema.rs (ServiceConfig with fixed defaults)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → handed to startup, cloned into each service
//! ```
//!
//! # Design Decisions
//! - Config is immutable once built; there is no reload
//! - All fields have defaults; only the ports come from the user
//! - The grace period is fixed for the binary and only overridden in tests

pub mod schema;
pub mod validation;

pub use schema::EchoConfig;
pub use schema::ListenerConfig;
pub use schema::ServiceConfig;
pub use schema::ShutdownConfig;
pub use validation::{validate_config, ValidationError};
