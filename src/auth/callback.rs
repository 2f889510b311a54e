//! Loopback HTTP listener receiving the OAuth redirect
//!
//! Each authorization gets its own listener and router. The server task lives
//! only as long as `wait_for_code` and is shut down on every exit path.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::AuthError;

/// Path the provider redirects back to
pub const CALLBACK_PATH: &str = "/oauth2callback";

/// How long a closing server may take to flush the last response
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

const SUCCESS_PAGE: &str = "<html><body><h1>Authorization Successful!</h1>\
    <p>You can close this window and return to the terminal.</p></body></html>";

const INVALID_STATE_PAGE: &str = "<html><body><h1>Invalid Token</h1>\
    <p>The authorization response did not match this request and was rejected.</p>\
    </body></html>";

const FAILURE_PAGE: &str = "<html><body><h1>Authorization Failed</h1>\
    <p>No authorization code was received. You can close this window.</p></body></html>";

type Outcome = Result<String, AuthError>;

#[derive(Debug, Deserialize)]
struct CallbackParams {
    state: Option<String>,
    code: Option<String>,
    error: Option<String>,
}

#[derive(Clone)]
struct CallbackState {
    expected_state: Arc<str>,
    sender: Arc<Mutex<Option<oneshot::Sender<Outcome>>>>,
}

impl CallbackState {
    /// Hand the outcome to the waiter. Only the first callback counts.
    fn deliver(&self, outcome: Outcome) {
        let sender = self.sender.lock().ok().and_then(|mut slot| slot.take());
        match sender {
            Some(tx) => {
                let _ = tx.send(outcome);
            }
            None => tracing::debug!("Ignoring callback, authorization already resolved"),
        }
    }
}

async fn handle_callback(
    State(state): State<CallbackState>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, Html<&'static str>) {
    let received = params.state.unwrap_or_default();
    if received.as_str() != &*state.expected_state {
        tracing::error!("Invalid authorization state: {:?}", received);
        state.deliver(Err(AuthError::StateMismatch { received }));
        return (StatusCode::BAD_REQUEST, Html(INVALID_STATE_PAGE));
    }

    if let Some(error) = params.error {
        tracing::warn!("Provider returned error: {}", error);
        state.deliver(Err(AuthError::Denied(error)));
        return (StatusCode::FORBIDDEN, Html(FAILURE_PAGE));
    }

    match params.code.filter(|c| !c.is_empty()) {
        Some(code) => {
            tracing::debug!("Received authorization code");
            state.deliver(Ok(code));
            (StatusCode::OK, Html(SUCCESS_PAGE))
        }
        None => {
            state.deliver(Err(AuthError::MissingCode));
            (StatusCode::BAD_REQUEST, Html(FAILURE_PAGE))
        }
    }
}

/// Listener bound to a loopback port, not yet serving.
pub struct CallbackServer {
    listener: TcpListener,
    port: u16,
}

impl CallbackServer {
    /// Bind `127.0.0.1:port`; port 0 picks an ephemeral one.
    pub async fn bind(port: u16) -> Result<Self, AuthError> {
        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .map_err(AuthError::Bind)?;
        let port = listener.local_addr().map_err(AuthError::Bind)?.port();
        tracing::debug!("Callback listener bound on port {}", port);
        Ok(Self { listener, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Redirect target as an IP literal, matching the bound address even
    /// where `localhost` resolves to `::1` only.
    pub fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}{}", self.port, CALLBACK_PATH)
    }

    /// Serve the callback route until a code arrives or `timeout` elapses.
    ///
    /// The listener is closed before this returns, whatever the outcome.
    pub async fn wait_for_code(self, expected_state: &str, timeout: Duration) -> Outcome {
        let (tx, rx) = oneshot::channel();
        let state = CallbackState {
            expected_state: Arc::from(expected_state),
            sender: Arc::new(Mutex::new(Some(tx))),
        };
        let app = Router::new()
            .route(CALLBACK_PATH, get(handle_callback))
            .with_state(state);

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let listener = self.listener;
        let server = ServerTask {
            stop: Some(stop_tx),
            handle: Some(tokio::spawn(async move {
                let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                    let _ = stop_rx.await;
                });
                if let Err(e) = serve.await {
                    tracing::warn!("Callback server error: {}", e);
                }
            })),
        };

        let outcome = tokio::select! {
            received = rx => received.unwrap_or_else(|_| Err(AuthError::CallbackClosed)),
            _ = tokio::time::sleep(timeout) => Err(AuthError::Timeout(timeout)),
        };

        server.shutdown().await;
        outcome
    }
}

/// Owns the spawned server. Dropping it aborts the task.
struct ServerTask {
    stop: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ServerTask {
    /// Stop accepting, let the in-flight response finish, then reap the task.
    async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(mut handle) = self.handle.take() {
            if tokio::time::timeout(SHUTDOWN_GRACE, &mut handle).await.is_err() {
                handle.abort();
                let _ = handle.await;
            }
        }
        tracing::debug!("Callback listener closed");
    }
}

impl Drop for ServerTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
