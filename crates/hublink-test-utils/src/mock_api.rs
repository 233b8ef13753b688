// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock `IntegrationApi` for deterministic testing.
//!
//! Responses are popped from per-endpoint FIFO queues; when a queue is
//! empty, a sensible default is returned. Every invocation is recorded so
//! tests can assert exact request counts and payloads (e.g. "exactly one
//! POST /sync" under overlapping triggers).

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Semaphore};

use hublink_core::types::{
    ConfigPatch, ConnectRequest, ConnectResponse, ConnectionStatus, SyncKind, SyncLog,
    SyncRunStatus, SyncRunSummary,
};
use hublink_core::{ConnectorId, HublinkError, IntegrationApi};

/// One recorded call against the mock backend.
#[derive(Debug, Clone)]
pub enum ApiCall {
    Status { connector: ConnectorId, user_id: String },
    Connect { connector: ConnectorId, request: ConnectRequest },
    Disconnect { connector: ConnectorId, user_id: String },
    Sync { connector: ConnectorId, user_id: String, kind: SyncKind },
    UpdateConfig { connector: ConnectorId, user_id: String, patch: ConfigPatch },
    History { connector: ConnectorId, user_id: String, limit: u32 },
}

impl ApiCall {
    /// True for sync-trigger calls; convenience for count assertions.
    pub fn is_sync(&self) -> bool {
        matches!(self, ApiCall::Sync { .. })
    }

    /// True for connect calls; convenience for count assertions.
    pub fn is_connect(&self) -> bool {
        matches!(self, ApiCall::Connect { .. })
    }
}

/// A mock backend with queued responses and call recording.
pub struct MockIntegrationApi {
    calls: Mutex<Vec<ApiCall>>,
    status_template: Mutex<ConnectionStatus>,
    status_queue: Mutex<VecDeque<Result<ConnectionStatus, HublinkError>>>,
    connect_queue: Mutex<VecDeque<Result<ConnectResponse, HublinkError>>>,
    disconnect_queue: Mutex<VecDeque<Result<(), HublinkError>>>,
    sync_queue: Mutex<VecDeque<Result<SyncRunSummary, HublinkError>>>,
    config_queue: Mutex<VecDeque<Result<ConnectionStatus, HublinkError>>>,
    history_queue: Mutex<VecDeque<Result<Vec<SyncLog>, HublinkError>>>,
    sync_gate: std::sync::Mutex<Option<Arc<Semaphore>>>,
}

impl MockIntegrationApi {
    /// Creates a mock whose status endpoint reports a configured,
    /// disconnected connector until told otherwise.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            status_template: Mutex::new(ConnectionStatus::disconnected()),
            status_queue: Mutex::new(VecDeque::new()),
            connect_queue: Mutex::new(VecDeque::new()),
            disconnect_queue: Mutex::new(VecDeque::new()),
            sync_queue: Mutex::new(VecDeque::new()),
            config_queue: Mutex::new(VecDeque::new()),
            history_queue: Mutex::new(VecDeque::new()),
            sync_gate: std::sync::Mutex::new(None),
        }
    }

    /// Replaces the fallback status returned when the status queue is empty.
    pub async fn set_status(&self, status: ConnectionStatus) {
        *self.status_template.lock().await = status;
    }

    pub async fn push_status(&self, result: Result<ConnectionStatus, HublinkError>) {
        self.status_queue.lock().await.push_back(result);
    }

    pub async fn push_connect(&self, result: Result<ConnectResponse, HublinkError>) {
        self.connect_queue.lock().await.push_back(result);
    }

    pub async fn push_disconnect(&self, result: Result<(), HublinkError>) {
        self.disconnect_queue.lock().await.push_back(result);
    }

    pub async fn push_sync(&self, result: Result<SyncRunSummary, HublinkError>) {
        self.sync_queue.lock().await.push_back(result);
    }

    pub async fn push_config(&self, result: Result<ConnectionStatus, HublinkError>) {
        self.config_queue.lock().await.push_back(result);
    }

    pub async fn push_history(&self, result: Result<Vec<SyncLog>, HublinkError>) {
        self.history_queue.lock().await.push_back(result);
    }

    /// Installs a gate that suspends every subsequent sync request until
    /// the returned semaphore receives permits. Lets tests hold a sync
    /// in flight while issuing overlapping triggers.
    pub fn hold_sync(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.sync_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// All recorded calls, in invocation order.
    pub async fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: ApiCall) {
        self.calls.lock().await.push(call);
    }
}

impl Default for MockIntegrationApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IntegrationApi for MockIntegrationApi {
    async fn fetch_status(
        &self,
        connector: ConnectorId,
        user_id: &str,
    ) -> Result<ConnectionStatus, HublinkError> {
        self.record(ApiCall::Status {
            connector,
            user_id: user_id.to_string(),
        })
        .await;
        match self.status_queue.lock().await.pop_front() {
            Some(result) => result,
            None => Ok(self.status_template.lock().await.clone()),
        }
    }

    async fn connect(
        &self,
        connector: ConnectorId,
        request: &ConnectRequest,
    ) -> Result<ConnectResponse, HublinkError> {
        self.record(ApiCall::Connect {
            connector,
            request: request.clone(),
        })
        .await;
        match self.connect_queue.lock().await.pop_front() {
            Some(result) => result,
            None => Ok(ConnectResponse {
                auth_url: None,
                success: true,
            }),
        }
    }

    async fn disconnect(
        &self,
        connector: ConnectorId,
        user_id: &str,
    ) -> Result<(), HublinkError> {
        self.record(ApiCall::Disconnect {
            connector,
            user_id: user_id.to_string(),
        })
        .await;
        self.disconnect_queue.lock().await.pop_front().unwrap_or(Ok(()))
    }

    async fn trigger_sync(
        &self,
        connector: ConnectorId,
        user_id: &str,
        kind: &SyncKind,
    ) -> Result<SyncRunSummary, HublinkError> {
        self.record(ApiCall::Sync {
            connector,
            user_id: user_id.to_string(),
            kind: kind.clone(),
        })
        .await;

        let gate = self.sync_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            // Held open by the test; permit is intentionally leaked so the
            // gate stays open once released.
            let permit = gate.acquire().await.map_err(|_| {
                HublinkError::Internal("sync gate closed".into())
            })?;
            permit.forget();
        }

        match self.sync_queue.lock().await.pop_front() {
            Some(result) => result,
            None => Ok(SyncRunSummary {
                status: SyncRunStatus::Completed,
                records_synced: Some(0),
                errors: Vec::new(),
            }),
        }
    }

    async fn update_config(
        &self,
        connector: ConnectorId,
        user_id: &str,
        patch: &ConfigPatch,
    ) -> Result<ConnectionStatus, HublinkError> {
        self.record(ApiCall::UpdateConfig {
            connector,
            user_id: user_id.to_string(),
            patch: patch.clone(),
        })
        .await;
        match self.config_queue.lock().await.pop_front() {
            Some(result) => result,
            None => Ok(self.status_template.lock().await.clone()),
        }
    }

    async fn fetch_history(
        &self,
        connector: ConnectorId,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<SyncLog>, HublinkError> {
        self.record(ApiCall::History {
            connector,
            user_id: user_id.to_string(),
            limit,
        })
        .await;
        match self.history_queue.lock().await.pop_front() {
            Some(result) => result,
            None => Ok(Vec::new()),
        }
    }
}
