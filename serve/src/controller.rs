//! Server Controller (§4.8): binds the first free port from a fixed
//! fallback list, runs the accept loop, and exposes idempotent
//! start/stop/restart plus a point-in-time status snapshot.

use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::connection::handle_connection;
use crate::state::AppState;

/// Ports tried in order until one binds (§4.8).
pub const PORT_FALLBACK: [u16; 5] = [11434, 11435, 11436, 11437, 8080];

/// Shared, lock-light status snapshot so `/debug/health` can read it without
/// touching the controller's own state machine.
pub struct ServerStatus {
    running: AtomicBool,
    port: AtomicU16,
    last_error: Mutex<Option<String>>,
}

impl ServerStatus {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            port: AtomicU16::new(0),
            last_error: Mutex::new(None),
        }
    }

    pub fn running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn port(&self) -> u16 {
        self.port.load(Ordering::SeqCst)
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.lock().await.clone()
    }

    fn mark_started(&self, port: u16) {
        self.port.store(port, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);
    }

    fn mark_stopped(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.port.store(0, Ordering::SeqCst);
    }

    async fn set_last_error(&self, message: Option<String>) {
        *self.last_error.lock().await = message;
    }
}

impl Default for ServerStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the listener's lifecycle. `start`/`stop` are idempotent: calling
/// `start` while already running, or `stop` while already stopped, is a
/// no-op rather than an error (§4.8).
pub struct ServerController {
    state: AppState,
    status: Arc<ServerStatus>,
    accept_task: RwLock<Option<JoinHandle<()>>>,
}

impl ServerController {
    pub fn new(state: AppState) -> Self {
        let status = Arc::new(ServerStatus::new());
        let state = state.with_status(Arc::clone(&status));
        Self {
            state,
            status,
            accept_task: RwLock::new(None),
        }
    }

    pub fn status(&self) -> Arc<ServerStatus> {
        Arc::clone(&self.status)
    }

    /// Tries each port in [`PORT_FALLBACK`] in order, binds the first one
    /// that succeeds, and spawns the accept loop. No-op if already running.
    pub async fn start(&self) -> std::io::Result<u16> {
        if self.status.running() {
            return Ok(self.status.port());
        }

        let mut bind_err = None;
        let mut bound = None;
        for &port in PORT_FALLBACK.iter() {
            match TcpListener::bind(("127.0.0.1", port)).await {
                Ok(listener) => {
                    bound = Some((listener, port));
                    break;
                }
                Err(e) => bind_err = Some(e),
            }
        }

        let Some((listener, port)) = bound else {
            let err = bind_err.unwrap_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::AddrInUse, "no fallback port available")
            });
            self.status.set_last_error(Some(err.to_string())).await;
            return Err(err);
        };

        self.status.set_last_error(None).await;
        self.status.mark_started(port);

        let state = self.state.clone();
        let status = Arc::clone(&self.status);
        let handle = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((socket, _addr)) => {
                        let conn_state = state.clone();
                        tokio::spawn(async move {
                            handle_connection(socket, conn_state).await;
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "accept failed");
                        break;
                    }
                }
            }
            status.mark_stopped();
        });

        *self.accept_task.write().await = Some(handle);
        Ok(port)
    }

    /// Aborts the accept loop. In-flight connection tasks are detached and
    /// finish on their own (no keep-alive to drain, per the one-request-per-
    /// connection model).
    pub async fn stop(&self) {
        if let Some(handle) = self.accept_task.write().await.take() {
            handle.abort();
        }
        self.status.mark_stopped();
    }

    pub async fn restart(&self) -> std::io::Result<u16> {
        self.stop().await;
        self.start().await
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::{BuiltinToolExecutor, MockGenerator, PathPolicy};
    use std::sync::Arc;

    fn test_state() -> AppState {
        let dir = tempfile::tempdir().unwrap();
        AppState::new(
            Arc::new(MockGenerator::always_replies("hi")),
            Arc::new(BuiltinToolExecutor::new(PathPolicy::for_test(dir.path()))),
        )
    }

    #[tokio::test]
    async fn start_is_idempotent_and_reports_a_port() {
        let controller = ServerController::new(test_state());
        let port1 = controller.start().await.unwrap();
        let port2 = controller.start().await.unwrap();
        assert_eq!(port1, port2);
        assert!(controller.status().running());
        controller.stop().await;
    }

    #[tokio::test]
    async fn stop_clears_running_state() {
        let controller = ServerController::new(test_state());
        controller.start().await.unwrap();
        controller.stop().await;
        assert!(!controller.status().running());
        assert_eq!(controller.status().port(), 0);
    }
}
