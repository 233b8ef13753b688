// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock browser capabilities: a recording navigator and a pre-seeded
//! callback port.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use hublink_core::types::{CallbackKind, CallbackResult};
use hublink_core::{CallbackResultPort, ConnectorId, HublinkError, Navigator};

/// Navigator that records every navigation instead of leaving the app.
#[derive(Default)]
pub struct RecordingNavigator {
    urls: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `navigate` call fail.
    pub fn fail_navigation(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// All recorded navigation targets, in order.
    pub fn navigations(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) -> Result<(), HublinkError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(HublinkError::Connection {
                message: format!("navigation to {url} refused"),
                source: None,
            });
        }
        self.urls.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// Callback port seeded with a fixed result; counts how often it is asked.
pub struct StaticCallbackPort {
    pending: Option<CallbackResult>,
    consume_calls: u32,
}

impl StaticCallbackPort {
    /// A port with no pending result (the common mount).
    pub fn empty() -> Self {
        Self {
            pending: None,
            consume_calls: 0,
        }
    }

    /// A port carrying `?success=<connector>_connected`.
    pub fn success(connector: ConnectorId) -> Self {
        Self {
            pending: Some(CallbackResult {
                kind: CallbackKind::Success,
                detail: connector.callback_success_detail(),
            }),
            consume_calls: 0,
        }
    }

    /// A port carrying `?error=<message>`.
    pub fn error(message: &str) -> Self {
        Self {
            pending: Some(CallbackResult {
                kind: CallbackKind::Error,
                detail: message.to_string(),
            }),
            consume_calls: 0,
        }
    }

    /// How many times `consume` has been called.
    pub fn consume_calls(&self) -> u32 {
        self.consume_calls
    }

    /// Whether a result is still pending (i.e. never consumed).
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl CallbackResultPort for StaticCallbackPort {
    fn consume(&mut self) -> Option<CallbackResult> {
        self.consume_calls += 1;
        self.pending.take()
    }
}
