//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validate config → Bind HTTP → Bind echo → Spawn serve loops + coordinator
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop echo accept + not ready → Grace period → Stop HTTP → Exit
//!
//! Signals (signals.rs):
//!     SIGINT/SIGHUP/SIGTERM → SignalReceived event
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then listeners, then tasks
//! - Readiness drops before the HTTP listener goes away
//! - Shutdown has one deadline: the grace timer

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{GraceTimer, ShutdownCoordinator, ShutdownReport, ShutdownState};
pub use signals::{ShutdownSignal, SignalSource};
#[cfg(unix)]
pub use signals::OsSignals;
pub use startup::{launch, ServiceError, Services, StartupError};
