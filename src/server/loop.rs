// Server loop module
// Accepts connections until shutdown, then drains in-flight ones

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::Instant;

use super::connection::{accept_connection, connection_timeout};
use crate::config::AppState;
use crate::logger;

/// How often the drain checks the active connection count
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Run the accept loop until `state.request_shutdown()` is called.
///
/// After shutdown the listener is closed and in-flight connections get up
/// to one connection timeout to finish.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
) {
    let shutdown = state.shutdown_signal.notified();
    tokio::pin!(shutdown);
    // Register before checking the flag so a concurrent notify is not lost
    shutdown.as_mut().enable();

    while !state.is_shutting_down() {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            _ = &mut shutdown => break,
        }
    }

    drop(listener);
    let remaining = drain_connections(&active_connections, connection_timeout(&state)).await;
    logger::log_shutdown_complete(remaining);
}

/// Wait for active connections to close, giving up after `deadline`.
///
/// Returns the number still open.
pub async fn drain_connections(active_connections: &AtomicUsize, deadline: Duration) -> usize {
    logger::log_shutdown_started(active_connections.load(Ordering::SeqCst));

    let give_up_at = Instant::now() + deadline;
    loop {
        let active = active_connections.load(Ordering::SeqCst);
        if active == 0 || Instant::now() >= give_up_at {
            return active;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::create_reusable_listener;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn test_state() -> Arc<AppState> {
        let mut cfg = Config::load_from("does-not-exist/relay-config").unwrap();
        cfg.logging.access_log = false;
        cfg.performance.read_timeout = 1;
        cfg.performance.write_timeout = 1;
        cfg.static_files.root = std::env::temp_dir().to_string_lossy().into_owned();
        Arc::new(AppState::new(&cfg).unwrap())
    }

    #[tokio::test]
    async fn test_drain_returns_when_idle() {
        let counter = AtomicUsize::new(0);
        assert_eq!(drain_connections(&counter, Duration::from_secs(5)).await, 0);
    }

    #[tokio::test]
    async fn test_drain_gives_up_at_deadline() {
        let counter = AtomicUsize::new(2);
        assert_eq!(drain_connections(&counter, Duration::from_millis(50)).await, 2);
    }

    #[tokio::test]
    async fn test_serves_then_shuts_down() {
        let state = test_state();
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        let server = tokio::spawn(start_server_loop(
            listener,
            Arc::clone(&state),
            Arc::clone(&counter),
        ));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"OPTIONS /api/trade HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        assert!(String::from_utf8_lossy(&response).starts_with("HTTP/1.1 204"));

        state.request_shutdown();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_before_start() {
        let state = test_state();
        state.request_shutdown();
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        tokio::time::timeout(
            Duration::from_secs(5),
            start_server_loop(listener, state, Arc::new(AtomicUsize::new(0))),
        )
        .await
        .unwrap();
    }
}
