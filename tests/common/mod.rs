//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use graceful_echo::config::ServiceConfig;
use graceful_echo::lifecycle::{launch, Services, ShutdownSignal};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

/// Config bound to loopback on ephemeral ports with a short grace period.
pub fn local_config(grace: Duration) -> ServiceConfig {
    let mut config = ServiceConfig::from_ports(0, 0);
    config.http.bind_address = "127.0.0.1:0".into();
    config.echo.listener.bind_address = "127.0.0.1:0".into();
    config.shutdown.grace_period_ms = grace.as_millis() as u64;
    config
}

/// Launch the services driven by a signal channel.
pub async fn start(grace: Duration) -> (Services, mpsc::Sender<ShutdownSignal>) {
    let (tx, rx) = mpsc::channel(8);
    let services = launch(&local_config(grace), rx).await.unwrap();
    (services, tx)
}

/// A client that never reuses connections, so every request opens a new one.
///
/// Build one per test and share it; client construction is slow enough to
/// eat into short grace periods.
#[allow(dead_code)]
pub fn fresh_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// GET `path` and return status and body.
#[allow(dead_code)]
pub async fn http_get(client: &reqwest::Client, addr: SocketAddr, path: &str) -> (u16, String) {
    let res = client
        .get(format!("http://{}{}", addr, path))
        .send()
        .await
        .expect("health server unreachable");
    let status = res.status().as_u16();
    (status, res.text().await.unwrap())
}

/// Write `payload` and read back the same number of bytes.
pub async fn echo_roundtrip(stream: &mut TcpStream, payload: &[u8]) -> Vec<u8> {
    stream.write_all(payload).await.unwrap();
    let mut buf = vec![0u8; payload.len()];
    tokio::time::timeout(Duration::from_secs(5), stream.read_exact(&mut buf))
        .await
        .expect("echo timed out")
        .unwrap();
    buf
}
