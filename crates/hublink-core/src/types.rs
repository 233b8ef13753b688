// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types shared by the controller components and the REST client.
//!
//! Status payloads arrive camelCase from the backend; sync logs arrive
//! snake_case. Field names here mirror the backend exactly so serde needs
//! no manual renames beyond the container attributes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-connector snapshot returned by `GET .../status`.
///
/// `connected == true` implies `connection` is present; `connected == false`
/// means no sync or config action is permitted against this connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub configured: bool,
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_status: Option<SyncRunStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records_synced: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sync_errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuit_breaker: Option<CircuitBreaker>,
}

impl ConnectionStatus {
    /// A disconnected-but-configured snapshot, the state a connector
    /// returns to after teardown.
    pub fn disconnected() -> Self {
        Self {
            configured: true,
            connected: false,
            last_sync_at: None,
            last_sync_status: None,
            records_synced: None,
            sync_errors: Vec::new(),
            connection: None,
            circuit_breaker: None,
        }
    }
}

/// Connection details, present only while `connected == true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDetail {
    /// Instance identity at the external system (org URL, site domain, ...).
    pub endpoint_identity: String,
    pub auth_type: AuthKind,
    pub token_valid: bool,
    #[serde(default)]
    pub environment: EnvironmentFlag,
    pub config: SyncConfig,
}

/// Server-computed backpressure indicator for the external system's API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreaker {
    pub state: BreakerState,
    pub failures: u32,
}

/// Circuit breaker states as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

/// How a connector authenticates against the external system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthKind {
    /// Browser-redirect OAuth flow (authorization URL + callback).
    #[serde(rename = "oauth")]
    OAuth,
    /// Synchronous API-token exchange (no redirect).
    #[serde(rename = "api_token")]
    ApiToken,
}

/// Which environment of the external system the connection targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentFlag {
    #[default]
    Production,
    Sandbox,
    Demo,
}

/// Outcome classification of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncRunStatus {
    Completed,
    Failed,
    Running,
}

/// Per-connector sync configuration. Owned by the server; the client only
/// ever holds an edit buffer over it (see `hublink-connector::editor`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    pub sync_schedule: SyncSchedule,
    #[serde(default)]
    pub match_by_email: bool,
    #[serde(default)]
    pub match_by_name: bool,
    #[serde(default)]
    pub notify_on_failure: bool,
    #[serde(default)]
    pub auto_create_records: bool,
    /// Days of inactivity before a record is flagged. Valid range 1-30.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inactivity_threshold_days: Option<u32>,
    #[serde(default)]
    pub field_mappings: Vec<FieldMapping>,
    /// Present only where the connector supports bidirectional sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict_resolution: Option<ConflictResolution>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            sync_schedule: SyncSchedule::Manual,
            match_by_email: false,
            match_by_name: false,
            notify_on_failure: false,
            auto_create_records: false,
            inactivity_threshold_days: None,
            field_mappings: Vec::new(),
            conflict_resolution: None,
        }
    }
}

/// When syncs run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncSchedule {
    Realtime,
    Hourly,
    Daily,
    Manual,
}

/// Declared correspondence between an external field and an internal field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub source_field: String,
    pub app_field: String,
    pub direction: MappingDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
}

/// Sync direction of a field mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MappingDirection {
    SourceToApp,
    AppToSource,
    Bidirectional,
}

/// Which side wins when both systems changed the same field since the
/// last sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictResolution {
    SourceWins,
    AppWins,
    NewestWins,
}

/// Partial update for `PUT .../config`. Only populated keys serialize,
/// so the request body contains exactly the changed fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_schedule: Option<SyncSchedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_by_email: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_by_name: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_on_failure: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_create_records: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactivity_threshold_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_mappings: Option<Vec<FieldMapping>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_resolution: Option<ConflictResolution>,
}

impl ConfigPatch {
    /// True when no key is populated (nothing to send).
    pub fn is_empty(&self) -> bool {
        self.sync_schedule.is_none()
            && self.match_by_email.is_none()
            && self.match_by_name.is_none()
            && self.notify_on_failure.is_none()
            && self.auto_create_records.is_none()
            && self.inactivity_threshold_days.is_none()
            && self.field_mappings.is_none()
            && self.conflict_resolution.is_none()
    }
}

/// Immutable record of one completed or failed sync run.
/// Created server-side; the client only reads a paginated list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncLog {
    pub id: String,
    pub sync_type: String,
    pub object_type: String,
    #[serde(flatten)]
    pub counts: SyncCounts,
    pub status: SyncRunStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_details: Vec<String>,
}

/// Record counts for one sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCounts {
    pub processed: u64,
    pub created: u64,
    pub updated: u64,
    pub failed: u64,
    pub skipped: u64,
}

/// The one-shot success/error signal delivered via URL query parameters
/// when an OAuth redirect returns to the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackResult {
    pub kind: CallbackKind,
    pub detail: String,
}

/// Whether the redirect reported success or an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackKind {
    Success,
    Error,
}

/// Body of `POST .../connect`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_flag: Option<EnvironmentFlag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<AuthKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<ConnectCredentials>,
}

/// Credentials for the synchronous API-token connect path.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectCredentials {
    /// Instance to connect to (site URL, workspace domain, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub api_token: String,
}

/// Response of `POST .../connect`: either an authorization URL to navigate
/// to (OAuth) or an immediate success (token path).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectResponse {
    #[serde(default)]
    pub auth_url: Option<String>,
    #[serde(default)]
    pub success: bool,
}

/// Which records a sync run covers. Serialized into the sync request body
/// as the `kind` discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncKind {
    Full,
    Incremental,
    /// Restrict the run to the named object types.
    Objects { object_types: Vec<String> },
}

impl std::fmt::Display for SyncKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncKind::Full => write!(f, "full"),
            SyncKind::Incremental => write!(f, "incremental"),
            SyncKind::Objects { object_types } => {
                write!(f, "objects({})", object_types.join(","))
            }
        }
    }
}

/// Summary returned by `POST .../sync`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRunSummary {
    pub status: SyncRunStatus,
    #[serde(default)]
    pub records_synced: Option<u64>,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Envelope of `GET .../history`.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub logs: Vec<SyncLog>,
}
