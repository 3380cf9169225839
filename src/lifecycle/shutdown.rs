//! Shutdown coordination for the service.
//!
//! # States
//! ```text
//! Running  --signal-->  Draining  --grace timer-->  Terminated
//!                       Draining  --signal-->       Draining (no-op)
//! ```
//!
//! Entering `Draining` closes the echo listener, flips readiness to
//! not ready and arms the grace timer. Entering `Terminated` shuts the HTTP
//! server down gracefully. Events are processed one at a time by a single
//! task, so the entry actions of `Draining` run exactly once.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::echo::EchoHandle;
use crate::http::HealthHandle;
use crate::lifecycle::signals::{ShutdownSignal, SignalSource};

/// Coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShutdownState {
    #[default]
    Running,
    Draining,
    Terminated,
}

/// Input to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownEvent {
    SignalReceived(ShutdownSignal),
    GraceTimerFired,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownAction {
    /// Close the echo listener, mark not ready, arm the grace timer.
    BeginDrain,
    /// Gracefully stop the HTTP server.
    Terminate,
    /// Nothing to do.
    Ignore,
}

impl ShutdownState {
    /// Apply `event`, returning the next state and the action to perform.
    pub fn on_event(self, event: ShutdownEvent) -> (ShutdownState, ShutdownAction) {
        use ShutdownAction::*;
        use ShutdownEvent::*;
        use ShutdownState::*;

        match (self, event) {
            (Running, SignalReceived(_)) => (Draining, BeginDrain),
            (Draining, SignalReceived(_)) => (Draining, Ignore),
            (Draining, GraceTimerFired) => (Terminated, Terminate),
            // The timer is only armed on entry to Draining.
            (Running, GraceTimerFired) => (Running, Ignore),
            (Terminated, _) => (Terminated, Ignore),
        }
    }

    pub fn is_terminal(self) -> bool {
        self == ShutdownState::Terminated
    }
}

/// Single-shot deadline, armed at most once.
#[derive(Debug)]
pub struct GraceTimer {
    duration: Duration,
    deadline: Option<Instant>,
}

impl GraceTimer {
    /// An unarmed timer that will fire `duration` after [`arm`](Self::arm).
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            deadline: None,
        }
    }

    /// Arm the timer. Returns `false` if it was already armed (or fired).
    pub fn arm(&mut self) -> bool {
        if self.deadline.is_some() {
            return false;
        }
        self.deadline = Some(Instant::now() + self.duration);
        true
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Resolve at the deadline. Never resolves while unarmed.
    pub async fn expired(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }
}

/// What happened during a coordinator run.
#[derive(Debug, Clone, Default)]
pub struct ShutdownReport {
    pub final_state: ShutdownState,
    /// Every signal observed, including ignored repeats.
    pub signals_received: u32,
    /// When the first signal was processed.
    pub draining_started: Option<Instant>,
    /// When the grace timer fired.
    pub terminated_at: Option<Instant>,
}

impl ShutdownReport {
    /// Time spent between entering `Draining` and `Terminated`.
    pub fn grace_elapsed(&self) -> Option<Duration> {
        match (self.draining_started, self.terminated_at) {
            (Some(start), Some(end)) => Some(end.duration_since(start)),
            _ => None,
        }
    }
}

enum Wake {
    Signal(Option<ShutdownSignal>),
    TimerFired,
    Idle,
}

/// Drives the shutdown state machine from signals and the grace timer.
pub struct ShutdownCoordinator<S> {
    signals: S,
    echo: EchoHandle,
    health: HealthHandle,
    timer: GraceTimer,
    state: watch::Sender<ShutdownState>,
    report: ShutdownReport,
}

impl<S: SignalSource> ShutdownCoordinator<S> {
    pub fn new(
        signals: S,
        echo: EchoHandle,
        health: HealthHandle,
        grace_period: Duration,
    ) -> Self {
        let (state, _) = watch::channel(ShutdownState::Running);
        Self {
            signals,
            echo,
            health,
            timer: GraceTimer::new(grace_period),
            state,
            report: ShutdownReport::default(),
        }
    }

    /// Observe state transitions.
    pub fn subscribe(&self) -> watch::Receiver<ShutdownState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ShutdownState {
        *self.state.borrow()
    }

    /// Process events until `Terminated`.
    ///
    /// If the signal source ends before any signal arrived, returns while
    /// still `Running`.
    pub async fn run(mut self) -> ShutdownReport {
        tracing::info!("Signal handler started");
        let mut signals_open = true;

        loop {
            let armed = self.timer.is_armed();
            let wake = tokio::select! {
                signal = self.signals.recv(), if signals_open => Wake::Signal(signal),
                _ = self.timer.expired(), if armed => Wake::TimerFired,
                else => Wake::Idle,
            };

            match wake {
                Wake::Signal(Some(signal)) => {
                    self.report.signals_received += 1;
                    tracing::info!(
                        signal = %signal,
                        count = self.report.signals_received,
                        "Received signal"
                    );
                    self.apply(ShutdownEvent::SignalReceived(signal));
                }
                Wake::Signal(None) => {
                    tracing::debug!("Signal source closed");
                    signals_open = false;
                }
                Wake::TimerFired => self.apply(ShutdownEvent::GraceTimerFired),
                Wake::Idle => {
                    tracing::warn!(
                        state = ?self.state(),
                        "No signal source and no grace timer left, coordinator exiting"
                    );
                    break;
                }
            }

            if self.state().is_terminal() {
                break;
            }
        }

        tracing::info!("Signal handler stopped");
        self.report.final_state = self.state();
        self.report
    }

    fn apply(&mut self, event: ShutdownEvent) {
        let current = self.state();
        let (next, action) = current.on_event(event);

        match action {
            ShutdownAction::BeginDrain => {
                self.timer.arm();
                self.echo.close();
                self.health.prepare_shutdown();
                self.report.draining_started = Some(Instant::now());
                tracing::info!(
                    grace_period = ?self.timer.duration(),
                    open_echo_connections = self.echo.active_connections(),
                    "Graceful period started"
                );
            }
            ShutdownAction::Terminate => {
                self.health.shutdown();
                self.report.terminated_at = Some(Instant::now());
                tracing::info!(
                    open_echo_connections = self.echo.active_connections(),
                    "Graceful period ended"
                );
            }
            ShutdownAction::Ignore => {
                tracing::debug!(state = ?current, event = ?event, "Event ignored");
            }
        }

        self.state.send_replace(next);
    }
}
