// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The REST seam toward the integration backend.

use async_trait::async_trait;

use crate::connector::ConnectorId;
use crate::error::HublinkError;
use crate::types::{
    ConfigPatch, ConnectRequest, ConnectResponse, ConnectionStatus, SyncKind, SyncLog,
    SyncRunSummary,
};

/// The backend contract consumed by the controller, identical for every
/// connector (concrete path prefixes differ per descriptor).
///
/// The server owns all authoritative state: token exchange, sync execution,
/// field-mapping evaluation, and circuit-breaker computation happen behind
/// this seam and are observed only through the payloads it returns.
#[async_trait]
pub trait IntegrationApi: Send + Sync {
    /// `GET .../status`: the canonical per-connector snapshot.
    async fn fetch_status(
        &self,
        connector: ConnectorId,
        user_id: &str,
    ) -> Result<ConnectionStatus, HublinkError>;

    /// `POST .../connect`: requests an authorization URL (OAuth) or
    /// performs a synchronous token-based connect.
    async fn connect(
        &self,
        connector: ConnectorId,
        request: &ConnectRequest,
    ) -> Result<ConnectResponse, HublinkError>;

    /// `DELETE .../disconnect`: tears down the connection.
    async fn disconnect(
        &self,
        connector: ConnectorId,
        user_id: &str,
    ) -> Result<(), HublinkError>;

    /// `POST .../sync`: triggers one sync run and returns its summary.
    async fn trigger_sync(
        &self,
        connector: ConnectorId,
        user_id: &str,
        kind: &SyncKind,
    ) -> Result<SyncRunSummary, HublinkError>;

    /// `PUT .../config`: applies a partial config update; the response is
    /// the full refreshed status (the server normalizes derived fields).
    async fn update_config(
        &self,
        connector: ConnectorId,
        user_id: &str,
        patch: &ConfigPatch,
    ) -> Result<ConnectionStatus, HublinkError>;

    /// `GET .../history`: the most recent sync runs, newest first.
    async fn fetch_history(
        &self,
        connector: ConnectorId,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<SyncLog>, HublinkError>;
}
