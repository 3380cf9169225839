//! End-to-end shutdown sequence tests.

use std::time::Duration;

use graceful_echo::lifecycle::{ShutdownSignal, ShutdownState};
use tokio::net::TcpStream;

mod common;

const GRACE: Duration = Duration::from_secs(3);

#[tokio::test]
async fn test_full_shutdown_sequence() {
    let (services, signals) = common::start(GRACE).await;
    let client = common::fresh_client();
    let http = services.http_addr();
    let echo = services.echo_addr();
    let mut state = services.state();

    // Before any signal: live, ready, echoing.
    assert_eq!(common::http_get(&client, http, "/ping").await, (200, "pong".into()));
    assert_eq!(common::http_get(&client, http, "/readyz").await, (200, "ready".into()));

    let mut conn = TcpStream::connect(echo).await.unwrap();
    assert_eq!(common::echo_roundtrip(&mut conn, b"hi").await, b"hi");

    signals.send(ShutdownSignal::Terminate).await.unwrap();
    state
        .wait_for(|s| *s == ShutdownState::Draining)
        .await
        .unwrap();

    // Draining: not ready, still live, no new echo connections.
    assert_eq!(common::http_get(&client, http, "/readyz").await, (503, String::new()));
    assert_eq!(common::http_get(&client, http, "/ping").await, (200, "pong".into()));
    assert!(TcpStream::connect(echo).await.is_err());

    // Existing echo connection keeps working.
    assert_eq!(common::echo_roundtrip(&mut conn, b"bye").await, b"bye");

    // Further signals change nothing.
    signals.send(ShutdownSignal::Interrupt).await.unwrap();
    signals.send(ShutdownSignal::Hangup).await.unwrap();

    drop(client);
    let report = tokio::time::timeout(GRACE + Duration::from_secs(10), services.wait())
        .await
        .expect("services did not stop")
        .unwrap();

    assert_eq!(report.final_state, ShutdownState::Terminated);
    assert_eq!(report.signals_received, 3);
    assert!(report.grace_elapsed().unwrap() >= GRACE);

    // HTTP is gone; the open echo connection outlives the service tasks.
    assert!(TcpStream::connect(http).await.is_err());
    assert_eq!(common::echo_roundtrip(&mut conn, b"still").await, b"still");
}

#[tokio::test]
async fn test_http_stays_up_during_grace_period() {
    let (services, signals) = common::start(GRACE).await;
    let client = common::fresh_client();
    let http = services.http_addr();
    let mut state = services.state();

    signals.send(ShutdownSignal::Hangup).await.unwrap();
    state
        .wait_for(|s| *s == ShutdownState::Draining)
        .await
        .unwrap();

    for _ in 0..3 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(*state.borrow(), ShutdownState::Draining);
        assert_eq!(common::http_get(&client, http, "/readyz").await.0, 503);
    }

    drop(client);
    services.wait().await.unwrap();
    assert!(TcpStream::connect(http).await.is_err());
}

#[tokio::test]
async fn test_concurrent_readiness_burst_during_drain() {
    let (services, signals) = common::start(GRACE).await;
    let client = common::fresh_client();
    let http = services.http_addr();
    let mut state = services.state();

    let burst = |client: &reqwest::Client| -> Vec<_> {
        (0..20)
            .map(|_| {
                let client = client.clone();
                tokio::spawn(async move { common::http_get(&client, http, "/readyz").await })
            })
            .collect()
    };

    for res in burst(&client) {
        assert_eq!(res.await.unwrap(), (200, "ready".into()));
    }

    signals.send(ShutdownSignal::Terminate).await.unwrap();
    state
        .wait_for(|s| *s == ShutdownState::Draining)
        .await
        .unwrap();

    for res in burst(&client) {
        assert_eq!(res.await.unwrap(), (503, String::new()));
    }

    drop(client);
    services.wait().await.unwrap();
}
