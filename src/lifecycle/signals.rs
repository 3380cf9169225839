//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGINT, SIGHUP, SIGTERM)
//! - Translate signals to shutdown events
//! - Let tests drive the coordinator from a channel instead of the OS
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - All three signals mean the same thing; there is no reload signal

use std::future::Future;

use tokio::sync::mpsc;

/// A signal that requests shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShutdownSignal {
    Interrupt,
    Hangup,
    Terminate,
}

impl std::fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ShutdownSignal::Interrupt => "SIGINT",
            ShutdownSignal::Hangup => "SIGHUP",
            ShutdownSignal::Terminate => "SIGTERM",
        };
        f.write_str(name)
    }
}

/// Source of shutdown signals for the coordinator.
pub trait SignalSource: Send {
    /// Wait for the next signal. `None` means no more signals will arrive.
    fn recv(&mut self) -> impl Future<Output = Option<ShutdownSignal>> + Send;
}

/// Process signals delivered by the OS.
#[cfg(unix)]
pub struct OsSignals {
    interrupt: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl OsSignals {
    /// Install handlers for SIGINT, SIGHUP and SIGTERM.
    pub fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            hangup: signal(SignalKind::hangup())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }
}

#[cfg(unix)]
impl SignalSource for OsSignals {
    async fn recv(&mut self) -> Option<ShutdownSignal> {
        tokio::select! {
            Some(()) = self.interrupt.recv() => Some(ShutdownSignal::Interrupt),
            Some(()) = self.hangup.recv() => Some(ShutdownSignal::Hangup),
            Some(()) = self.terminate.recv() => Some(ShutdownSignal::Terminate),
            else => None,
        }
    }
}

impl SignalSource for mpsc::Receiver<ShutdownSignal> {
    async fn recv(&mut self) -> Option<ShutdownSignal> {
        mpsc::Receiver::recv(self).await
    }
}
