// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loopback listener for the OAuth redirect.
//!
//! `hublink connect` against an OAuth connector binds this listener, sends
//! the user to the authorization URL, and waits for the external system to
//! redirect back with `?success=...` or `?error=...`. The first request
//! wins; the server shuts down after serving it.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{RawQuery, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use tokio::sync::{oneshot, Notify};
use tracing::info;

use hublink_core::HublinkError;

struct CallbackState {
    tx: Mutex<Option<oneshot::Sender<String>>>,
    base: String,
    done: Arc<Notify>,
}

/// A bound, not-yet-serving callback listener.
pub struct CallbackServer {
    listener: tokio::net::TcpListener,
    addr: SocketAddr,
}

impl CallbackServer {
    /// Binds the listener; port 0 picks a free port.
    pub async fn bind(host: &str, port: u16) -> Result<Self, HublinkError> {
        let listener = tokio::net::TcpListener::bind(format!("{host}:{port}"))
            .await
            .map_err(|e| HublinkError::Connection {
                message: format!("failed to bind callback listener on {host}:{port}: {e}"),
                source: Some(Box::new(e)),
            })?;
        let addr = listener.local_addr().map_err(|e| HublinkError::Connection {
            message: format!("failed to read callback listener address: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(Self { listener, addr })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serves until the first `/callback` request arrives, then returns the
    /// full redirect URL (including query parameters) for the callback port
    /// to consume.
    pub async fn wait_for_redirect(self) -> Result<String, HublinkError> {
        let done = Arc::new(Notify::new());
        let (tx, rx) = oneshot::channel();
        let state = Arc::new(CallbackState {
            tx: Mutex::new(Some(tx)),
            base: format!("http://{}", self.addr),
            done: done.clone(),
        });

        let app = Router::new()
            .route("/callback", get(capture))
            .with_state(state);

        info!(addr = %self.addr, "waiting for the authorization redirect");
        let server = tokio::spawn(async move {
            axum::serve(self.listener, app)
                .with_graceful_shutdown(async move { done.notified().await })
                .await
        });

        let url = rx.await.map_err(|_| {
            HublinkError::Internal("callback listener closed before the redirect arrived".into())
        })?;

        match server.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(HublinkError::Connection {
                    message: format!("callback listener error: {e}"),
                    source: Some(Box::new(e)),
                })
            }
            Err(e) => {
                return Err(HublinkError::Internal(format!(
                    "callback listener task failed: {e}"
                )))
            }
        }

        Ok(url)
    }
}

async fn capture(
    State(state): State<Arc<CallbackState>>,
    RawQuery(query): RawQuery,
) -> Html<&'static str> {
    let sender = state.tx.lock().ok().and_then(|mut guard| guard.take());
    if let Some(tx) = sender {
        let url = match &query {
            Some(q) => format!("{}/callback?{q}", state.base),
            None => format!("{}/callback", state.base),
        };
        let _ = tx.send(url);
        state.done.notify_one();
    }
    Html("<p>Authorization complete. You can close this window and return to the terminal.</p>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_the_first_redirect_with_its_query() {
        let server = CallbackServer::bind("127.0.0.1", 0).await.unwrap();
        let addr = server.addr();

        let wait = tokio::spawn(server.wait_for_redirect());

        let response = reqwest::get(format!(
            "http://{addr}/callback?success=salesforce_connected"
        ))
        .await
        .unwrap();
        assert!(response.status().is_success());

        let url = wait.await.unwrap().unwrap();
        assert!(url.contains("success=salesforce_connected"), "got: {url}");
    }

    #[tokio::test]
    async fn bind_failure_is_a_connection_error() {
        let first = CallbackServer::bind("127.0.0.1", 0).await.unwrap();
        let taken = first.addr().port();
        let err = CallbackServer::bind("127.0.0.1", taken).await.unwrap_err();
        assert!(matches!(err, HublinkError::Connection { .. }));
    }
}
