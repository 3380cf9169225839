//! Health state subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown coordinator
//!     → HealthHandle::prepare_shutdown()
//!     → readiness.rs (atomic flag flips to not ready)
//!
//! GET /readyz
//!     → http handler reads readiness.rs
//!     → 200 "ready" | 503
//! ```
//!
//! # Design Decisions
//! - One flag, shared by Arc, no process-wide statics
//! - Flag is monotonic: once not ready, never ready again
//! - Liveness never consults the flag

pub mod readiness;

pub use readiness::ReadinessFlag;
