//! HTTP health server setup and lifecycle.
//!
//! # Responsibilities
//! - Create Axum Router with the liveness and readiness handlers
//! - Wire up middleware (request tracing)
//! - Bind server to listener
//! - Expose prepare-shutdown (readiness flip) and shutdown (graceful stop)

use axum::{routing::get, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::ListenerConfig;
use crate::health::ReadinessFlag;
use crate::http::handlers;
use crate::net::{bind_tcp, ListenerError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub readiness: ReadinessFlag,
}

/// The serve loop failed for a reason other than a requested shutdown.
#[derive(Debug, thiserror::Error)]
#[error("HTTP server exited with error: {0}")]
pub struct ServeError(#[from] std::io::Error);

/// HTTP server for liveness and readiness probes.
pub struct HealthServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    router: Router,
    handle: HealthHandle,
    shutdown_rx: watch::Receiver<bool>,
}

impl HealthServer {
    /// Bind the HTTP listener. The server does not serve until [`run`](Self::run).
    pub async fn bind(
        config: &ListenerConfig,
        readiness: ReadinessFlag,
    ) -> Result<Self, ListenerError> {
        let (listener, local_addr) = bind_tcp(&config.bind_address).await?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let router = Self::build_router(AppState {
            readiness: readiness.clone(),
        });

        Ok(Self {
            listener,
            local_addr,
            router,
            handle: HealthHandle {
                readiness,
                shutdown_tx,
            },
            shutdown_rx,
        })
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/ping", get(handlers::ping))
            .route("/readyz", get(handlers::readyz))
            .with_state(state)
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
    }

    /// Control handle for the shutdown coordinator.
    pub fn handle(&self) -> HealthHandle {
        self.handle.clone()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve until [`HealthHandle::shutdown`] is called and in-flight requests finish.
    pub async fn run(self) -> Result<(), ServeError> {
        tracing::info!(address = %self.local_addr, "HTTP server started");

        let mut shutdown_rx = self.shutdown_rx;
        let shutdown = async move {
            // All handles gone means nobody can ask for shutdown any more.
            let orphaned = shutdown_rx.wait_for(|requested| *requested).await.is_err();
            if orphaned {
                std::future::pending::<()>().await;
            }
            tracing::info!("HTTP server draining in-flight requests");
        };

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Cloneable control handle for a running [`HealthServer`].
#[derive(Debug, Clone)]
pub struct HealthHandle {
    readiness: ReadinessFlag,
    shutdown_tx: watch::Sender<bool>,
}

impl HealthHandle {
    /// Start failing readiness probes. Returns `true` on the first call.
    pub fn prepare_shutdown(&self) -> bool {
        let flipped = self.readiness.mark_not_ready();
        if flipped {
            tracing::info!("Readiness set to not ready");
        }
        flipped
    }

    /// Stop accepting HTTP connections and let in-flight requests finish.
    ///
    /// Returns immediately; the serve task completes once drained.
    /// Returns `true` on the first call.
    pub fn shutdown(&self) -> bool {
        !self.shutdown_tx.send_replace(true)
    }

    pub fn is_shutdown_requested(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    pub fn readiness(&self) -> &ReadinessFlag {
        &self.readiness
    }
}
