//! Startup orchestration and task supervision.
//!
//! # Responsibilities
//! - Validate configuration
//! - Bind the HTTP and echo listeners (HTTP first)
//! - Spawn the serve loops and the shutdown coordinator
//! - Join every task, failing fast on the first fatal error
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners bind before any task starts, so bind errors never reach the coordinator
//! - Echo connection tasks are detached and not joined

use std::net::SocketAddr;

use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::config::{validate_config, ServiceConfig, ValidationError};
use crate::echo::{EchoExit, EchoService};
use crate::health::ReadinessFlag;
use crate::http::{HealthServer, ServeError};
use crate::lifecycle::shutdown::{ShutdownCoordinator, ShutdownReport, ShutdownState};
use crate::lifecycle::signals::SignalSource;
use crate::net::ListenerError;

/// Errors that prevent the service from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid configuration: {}", join_errors(.0))]
    Config(Vec<ValidationError>),

    #[error("init HTTP server failed: {0}")]
    Http(#[source] ListenerError),

    #[error("init echo server failed: {0}")]
    Echo(#[source] ListenerError),

    #[error("failed to register signal handlers: {0}")]
    Signals(#[source] std::io::Error),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that end a running service abnormally.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Serve(#[from] ServeError),

    #[error("service task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

enum TaskExit {
    Echo(EchoExit),
    Http,
    Coordinator(ShutdownReport),
}

/// Running services and the tasks that drive them.
pub struct Services {
    tasks: JoinSet<Result<TaskExit, ServiceError>>,
    http_addr: SocketAddr,
    echo_addr: SocketAddr,
    state: watch::Receiver<ShutdownState>,
}

/// Bind both listeners and start serving.
pub async fn launch<S>(config: &ServiceConfig, signals: S) -> Result<Services, StartupError>
where
    S: SignalSource + 'static,
{
    validate_config(config).map_err(StartupError::Config)?;

    let readiness = ReadinessFlag::new();
    let http = HealthServer::bind(&config.http, readiness)
        .await
        .map_err(StartupError::Http)?;
    let echo = EchoService::bind(&config.echo)
        .await
        .map_err(StartupError::Echo)?;

    let http_addr = http.local_addr();
    let echo_addr = echo.local_addr();

    let coordinator = ShutdownCoordinator::new(
        signals,
        echo.handle(),
        http.handle(),
        config.shutdown.grace_period(),
    );
    let state = coordinator.subscribe();

    let mut tasks: JoinSet<Result<TaskExit, ServiceError>> = JoinSet::new();
    tasks.spawn(async move {
        http.run().await?;
        Ok(TaskExit::Http)
    });
    tasks.spawn(async move { Ok(TaskExit::Echo(echo.run().await)) });
    tasks.spawn(async move { Ok(TaskExit::Coordinator(coordinator.run().await)) });

    tracing::info!(
        http_address = %http_addr,
        echo_address = %echo_addr,
        grace_period = ?config.shutdown.grace_period(),
        "Services started"
    );

    Ok(Services {
        tasks,
        http_addr,
        echo_addr,
        state,
    })
}

impl Services {
    pub fn http_addr(&self) -> SocketAddr {
        self.http_addr
    }

    pub fn echo_addr(&self) -> SocketAddr {
        self.echo_addr
    }

    /// Observe shutdown state transitions.
    pub fn state(&self) -> watch::Receiver<ShutdownState> {
        self.state.clone()
    }

    /// Wait for every task to finish.
    ///
    /// Returns as soon as any task fails; the remaining tasks are aborted.
    pub async fn wait(mut self) -> Result<ShutdownReport, ServiceError> {
        let mut report = ShutdownReport::default();

        while let Some(joined) = self.tasks.join_next().await {
            match joined?? {
                TaskExit::Coordinator(r) => report = r,
                TaskExit::Echo(EchoExit::Failed(e)) => {
                    tracing::warn!(error = %e, "Echo server ended early");
                }
                TaskExit::Echo(EchoExit::Stopped) | TaskExit::Http => {}
            }
        }

        Ok(report)
    }
}
