//! TCP echo service: accept loop and connection dispatch.

use std::net::SocketAddr;

use crate::config::EchoConfig;
use crate::echo::handler::mirror;
use crate::net::{AcceptError, ConnectionTracker, Listener, ListenerCloser, ListenerError};

/// How the accept loop ended.
#[derive(Debug)]
pub enum EchoExit {
    /// The listener was closed on purpose.
    Stopped,
    /// Accept failed for another reason.
    Failed(AcceptError),
}

/// TCP echo server.
pub struct EchoService {
    listener: Listener,
    tracker: ConnectionTracker,
    buffer_size: usize,
}

impl EchoService {
    /// Bind the echo listener. Accepting starts with [`run`](Self::run).
    pub async fn bind(config: &EchoConfig) -> Result<Self, ListenerError> {
        let listener = Listener::bind(&config.listener.bind_address).await?;
        Ok(Self {
            listener,
            tracker: ConnectionTracker::new(),
            buffer_size: config.buffer_size,
        })
    }

    /// Control handle for the shutdown coordinator.
    pub fn handle(&self) -> EchoHandle {
        EchoHandle {
            closer: self.listener.closer(),
            tracker: self.tracker.clone(),
            local_addr: self.listener.local_addr(),
        }
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    /// Accept connections until the listener is closed or accept fails.
    ///
    /// Every accepted connection is served by its own task and is left
    /// running when the loop ends.
    pub async fn run(mut self) -> EchoExit {
        tracing::info!(address = %self.listener.local_addr(), "Echo server started");

        loop {
            match self.listener.accept().await {
                Ok((stream, peer_addr)) => {
                    let guard = self.tracker.track();
                    let buffer_size = self.buffer_size;
                    tracing::debug!(
                        connection_id = %guard.id(),
                        peer_addr = %peer_addr,
                        "Echo connection accepted"
                    );

                    tokio::spawn(async move {
                        match mirror(stream, buffer_size).await {
                            Ok(bytes) => tracing::debug!(
                                connection_id = %guard.id(),
                                bytes,
                                "Echo connection finished"
                            ),
                            Err(e) => tracing::debug!(
                                connection_id = %guard.id(),
                                error = %e,
                                "Echo connection ended with error"
                            ),
                        }
                    });
                }
                Err(AcceptError::Closed) => {
                    tracing::info!("Echo server stopped");
                    return EchoExit::Stopped;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Echo server exited with an error");
                    return EchoExit::Failed(e);
                }
            }
        }
    }
}

/// Cloneable control handle for a running [`EchoService`].
#[derive(Debug, Clone)]
pub struct EchoHandle {
    closer: ListenerCloser,
    tracker: ConnectionTracker,
    local_addr: SocketAddr,
}

impl EchoHandle {
    /// Stop accepting new connections. Open connections keep running.
    ///
    /// Returns `true` on the first call.
    pub fn close(&self) -> bool {
        self.closer.close()
    }

    pub fn is_closed(&self) -> bool {
        self.closer.is_closed()
    }

    /// Number of echo connections still open.
    pub fn active_connections(&self) -> u64 {
        self.tracker.active_count()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ListenerConfig;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn start() -> (EchoHandle, tokio::task::JoinHandle<EchoExit>) {
        let config = EchoConfig {
            listener: ListenerConfig {
                bind_address: "127.0.0.1:0".into(),
            },
            ..EchoConfig::default()
        };
        let service = EchoService::bind(&config).await.unwrap();
        let handle = service.handle();
        (handle, tokio::spawn(service.run()))
    }

    async fn roundtrip(stream: &mut TcpStream, payload: &[u8]) -> Vec<u8> {
        stream.write_all(payload).await.unwrap();
        let mut buf = vec![0u8; payload.len()];
        stream.read_exact(&mut buf).await.unwrap();
        buf
    }

    async fn wait_for_count(handle: &EchoHandle, expected: u64) {
        for _ in 0..100 {
            if handle.active_connections() == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("active connections never reached {}", expected);
    }

    #[tokio::test]
    async fn echoes_bytes_verbatim() {
        let (handle, _task) = start().await;
        let mut stream = TcpStream::connect(handle.local_addr()).await.unwrap();

        assert_eq!(roundtrip(&mut stream, b"hi").await, b"hi");
        let binary: Vec<u8> = (0..=255u8).collect();
        assert_eq!(roundtrip(&mut stream, &binary).await, binary);
    }

    #[tokio::test]
    async fn connections_are_independent() {
        let (handle, _task) = start().await;
        let mut a = TcpStream::connect(handle.local_addr()).await.unwrap();
        let mut b = TcpStream::connect(handle.local_addr()).await.unwrap();

        assert_eq!(roundtrip(&mut b, b"second").await, b"second");
        assert_eq!(roundtrip(&mut a, b"first").await, b"first");
        wait_for_count(&handle, 2).await;

        drop(a);
        wait_for_count(&handle, 1).await;
    }

    #[tokio::test]
    async fn close_stops_accept_loop_cleanly() {
        let (handle, task) = start().await;
        assert!(handle.close());
        assert!(!handle.close());

        assert!(matches!(task.await.unwrap(), EchoExit::Stopped));
        assert!(TcpStream::connect(handle.local_addr()).await.is_err());
    }

    #[tokio::test]
    async fn open_connections_survive_close() {
        let (handle, task) = start().await;
        let mut stream = TcpStream::connect(handle.local_addr()).await.unwrap();
        assert_eq!(roundtrip(&mut stream, b"hi").await, b"hi");

        handle.close();
        assert!(matches!(task.await.unwrap(), EchoExit::Stopped));

        assert_eq!(roundtrip(&mut stream, b"bye").await, b"bye");
        assert_eq!(handle.active_connections(), 1);

        drop(stream);
        wait_for_count(&handle, 0).await;
    }
}
