//! The session gate itself.
//!
//! Every request goes through `send`, which attaches the bearer credential
//! and the CSRF token when one has been issued. A 401 response clears the
//! local session exactly once per failure burst: the first failing request
//! wins an atomic guard, clears state, and bumps the expiry signal; the
//! guard stays closed for a short debounce window so concurrent and
//! trailing failures coalesce instead of clearing again.
//!
//! The gate must live inside a tokio runtime; the debounce reset is a
//! spawned task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use reqwest::{header::HeaderValue, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::GateConfig;
use crate::error::GateError;

const CSRF_HEADER: &str = "x-csrf-token";

/// Shared, cloneable session gate over `reqwest::Client`
#[derive(Clone)]
pub struct SessionGate {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    config: GateConfig,
    access_token: Mutex<Option<String>>,
    csrf_token: Mutex<Option<String>>,
    clearing: AtomicBool,
    expired_tx: watch::Sender<u64>,
}

impl SessionGate {
    pub fn new(config: GateConfig) -> Self {
        let (expired_tx, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                http: reqwest::Client::new(),
                config,
                access_token: Mutex::new(None),
                csrf_token: Mutex::new(None),
                clearing: AtomicBool::new(false),
                expired_tx,
            }),
        }
    }

    /// Installs the bearer credential used for subsequent requests
    pub fn set_session(&self, access_token: impl Into<String>) {
        *self.inner.access_token.lock() = Some(access_token.into());
    }

    /// Installs the CSRF token attached to subsequent requests
    pub fn set_csrf(&self, token: impl Into<String>) {
        *self.inner.csrf_token.lock() = Some(token.into());
    }

    /// Whether a bearer credential is currently installed
    pub fn has_session(&self) -> bool {
        self.inner.access_token.lock().is_some()
    }

    /// Drops the local credential and CSRF state
    pub fn clear_session(&self) {
        *self.inner.access_token.lock() = None;
        *self.inner.csrf_token.lock() = None;
    }

    /// Receiver for the session-expired signal. The value is a counter;
    /// each observed increment is one expiry event.
    pub fn expired_signal(&self) -> watch::Receiver<u64> {
        self.inner.expired_tx.subscribe()
    }

    /// Request builder rooted at the configured base URL
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.inner
            .http
            .request(method, format!("{}{}", self.inner.config.base_url, path))
    }

    pub async fn get(&self, path: &str) -> Result<Response, GateError> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, GateError> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    /// Sends a request with the current credentials attached and
    /// intercepts session loss.
    pub async fn send(&self, mut request: RequestBuilder) -> Result<Response, GateError> {
        if let Some(token) = self.inner.access_token.lock().clone() {
            request = request.bearer_auth(token);
        }
        if let Some(csrf) = self.inner.csrf_token.lock().clone() {
            request = request.header(CSRF_HEADER, csrf);
        }

        let response = request.send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
            return Err(GateError::SessionExpired);
        }

        // The server may rotate the CSRF token on any response
        if let Some(issued) = response.headers().get(CSRF_HEADER).and_then(value_to_string) {
            self.set_csrf(issued);
        }

        Ok(response)
    }

    /// One clear-session + signal per failure burst. Losers of the guard
    /// and failures inside the debounce window are no-ops.
    fn handle_unauthorized(&self) {
        if self
            .inner
            .clearing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("coalesced concurrent session-expired event");
            return;
        }

        warn!("session rejected by server; clearing local session");
        self.clear_session();
        let generation = *self.inner.expired_tx.borrow() + 1;
        self.inner.expired_tx.send_replace(generation);

        let inner = self.inner.clone();
        tokio::spawn(async move {
            tokio::time::sleep(inner.config.failure_debounce).await;
            inner.clearing.store(false, Ordering::SeqCst);
        });
    }
}

fn value_to_string(value: &HeaderValue) -> Option<String> {
    value.to_str().ok().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn gate_with_debounce(debounce: Duration) -> SessionGate {
        SessionGate::new(GateConfig {
            base_url: "http://127.0.0.1:0".to_string(),
            failure_debounce: debounce,
        })
    }

    #[tokio::test]
    async fn test_failure_burst_signals_once() {
        let gate = gate_with_debounce(Duration::from_secs(5));
        let rx = gate.expired_signal();
        gate.set_session("token");

        gate.handle_unauthorized();
        gate.handle_unauthorized();
        gate.handle_unauthorized();

        assert_eq!(*rx.borrow(), 1);
        assert!(!gate.has_session());
    }

    #[tokio::test]
    async fn test_concurrent_failures_coalesce() {
        let gate = gate_with_debounce(Duration::from_secs(5));
        let rx = gate.expired_signal();
        gate.set_session("token");

        let mut handles = Vec::new();
        for _ in 0..8 {
            let gate = gate.clone();
            handles.push(tokio::spawn(async move {
                gate.handle_unauthorized();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*rx.borrow(), 1);
    }

    #[tokio::test]
    async fn test_new_burst_after_debounce_signals_again() {
        let gate = gate_with_debounce(Duration::from_millis(20));
        let rx = gate.expired_signal();

        gate.set_session("token");
        gate.handle_unauthorized();
        assert_eq!(*rx.borrow(), 1);

        tokio::time::sleep(Duration::from_millis(60)).await;

        gate.set_session("fresh-token");
        gate.handle_unauthorized();
        assert_eq!(*rx.borrow(), 2);
    }

    #[tokio::test]
    async fn test_signal_is_observable_by_waiters() {
        let gate = gate_with_debounce(Duration::from_secs(5));
        let mut rx = gate.expired_signal();

        gate.handle_unauthorized();

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 1);
    }

    #[test]
    fn test_csrf_slot_round_trip() {
        let gate = SessionGate::new(GateConfig::default());
        gate.set_csrf("issued-token");
        assert_eq!(
            gate.inner.csrf_token.lock().as_deref(),
            Some("issued-token")
        );
        gate.clear_session();
        assert!(gate.inner.csrf_token.lock().is_none());
    }
}
