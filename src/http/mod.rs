//! HTTP health surface.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing layer, graceful shutdown)
//!     → handlers.rs (/ping liveness, /readyz readiness)
//!     → Send to client
//! ```

pub mod handlers;
pub mod server;

pub use server::{AppState, HealthHandle, HealthServer, ServeError};
