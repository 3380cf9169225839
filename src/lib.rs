//! Echo and health service with coordinated graceful shutdown.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!   TCP client ─────▶│ net::Listener ──▶ echo (one task per conn)   │
//!                    │        ▲                                      │
//!                    │        │ close                                │
//!                    │ lifecycle::ShutdownCoordinator ◀── signals   │
//!                    │        │ prepare_shutdown / shutdown          │
//!                    │        ▼                                      │
//!   HTTP client ────▶│ http::HealthServer (/ping, /readyz)          │
//!                    │        ▲                                      │
//!                    │        └── health::ReadinessFlag              │
//!                    └──────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod echo;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod net;

pub use config::ServiceConfig;
pub use echo::EchoService;
pub use http::HealthServer;
pub use lifecycle::{ShutdownCoordinator, ShutdownState};
