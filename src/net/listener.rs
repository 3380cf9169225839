//! Closable TCP listener.
//!
//! # Responsibilities
//! - Bind to configured address
//! - Accept incoming TCP connections
//! - Stop accepting when closed, failing pending accepts with a distinguished error
//! - Release the socket on close so new connection attempts are refused

use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;

/// Error type for binding a listener.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Bind address could not be parsed.
    #[error("invalid bind address {address}: {source}")]
    InvalidAddress {
        address: String,
        source: std::net::AddrParseError,
    },
    /// Failed to bind to address.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        source: std::io::Error,
    },
}

/// Error type for accepting a connection.
#[derive(Debug, thiserror::Error)]
pub enum AcceptError {
    /// The listener was closed on purpose.
    #[error("use of closed network listener")]
    Closed,
    /// The OS reported an accept failure.
    #[error("failed to accept: {0}")]
    Io(#[from] std::io::Error),
}

impl AcceptError {
    /// Whether this error only means the listener was closed intentionally.
    pub fn is_closed(&self) -> bool {
        matches!(self, AcceptError::Closed)
    }
}

/// Parse `bind_address` and bind a plain tokio listener to it.
pub async fn bind_tcp(bind_address: &str) -> Result<(TcpListener, SocketAddr), ListenerError> {
    let addr: SocketAddr = bind_address
        .parse()
        .map_err(|source| ListenerError::InvalidAddress {
            address: bind_address.to_string(),
            source,
        })?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ListenerError::Bind { address: addr, source })?;

    let local_addr = listener
        .local_addr()
        .map_err(|source| ListenerError::Bind { address: addr, source })?;

    tracing::info!(address = %local_addr, "Listener bound");

    Ok((listener, local_addr))
}

/// A TCP listener that can be closed from another task.
///
/// Closing drops the underlying socket on the next accept, so pending and
/// future accepts fail with [`AcceptError::Closed`].
pub struct Listener {
    /// The underlying TCP listener, `None` once closed.
    inner: Option<TcpListener>,
    /// Cached local address (still reported after close).
    local_addr: SocketAddr,
    /// Flips to `true` when a closer fires.
    closed: watch::Receiver<bool>,
    closer: ListenerCloser,
}

impl Listener {
    /// Bind to `bind_address`.
    pub async fn bind(bind_address: &str) -> Result<Self, ListenerError> {
        let (listener, local_addr) = bind_tcp(bind_address).await?;
        Ok(Self::from_tokio(listener, local_addr))
    }

    fn from_tokio(listener: TcpListener, local_addr: SocketAddr) -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            inner: Some(listener),
            local_addr,
            closed: rx,
            closer: ListenerCloser { tx },
        }
    }

    /// Handle that closes this listener from any task.
    pub fn closer(&self) -> ListenerCloser {
        self.closer.clone()
    }

    /// Accept a new connection.
    ///
    /// Waits until a peer connects or the listener is closed, whichever comes
    /// first. Once closed, every call returns [`AcceptError::Closed`].
    pub async fn accept(&mut self) -> Result<(TcpStream, SocketAddr), AcceptError> {
        if *self.closed.borrow() {
            self.inner = None;
        }
        let Some(listener) = self.inner.as_ref() else {
            return Err(AcceptError::Closed);
        };

        let accepted = tokio::select! {
            biased;
            _ = self.closed.wait_for(|closed| *closed) => None,
            res = listener.accept() => Some(res),
        };

        match accepted {
            Some(res) => Ok(res?),
            None => {
                // Release the socket now; the port refuses connections from here on.
                self.inner = None;
                Err(AcceptError::Closed)
            }
        }
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Whether the socket has been released.
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

/// Cloneable close handle for a [`Listener`].
#[derive(Debug, Clone)]
pub struct ListenerCloser {
    tx: watch::Sender<bool>,
}

impl ListenerCloser {
    /// Close the listener.
    ///
    /// Returns `true` on the first call and `false` if the listener was
    /// already closed.
    pub fn close(&self) -> bool {
        !self.tx.send_replace(true)
    }

    /// Whether close has been requested.
    pub fn is_closed(&self) -> bool {
        *self.tx.borrow()
    }
}
