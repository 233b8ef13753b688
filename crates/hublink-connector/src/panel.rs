// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Composition root for one connector.
//!
//! A panel wires the repository, lifecycle, coordinator, editor, and feed
//! for a single connector descriptor and exposes the tabbed views
//! (Overview / Settings / History / Alerts). Every asynchronous action
//! owns an independent, dismissible error slot; one action's failure never
//! corrupts another's affordances.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::warn;

use hublink_core::types::{
    CallbackKind, CircuitBreaker, ConnectionStatus, EnvironmentFlag, SyncConfig, SyncKind,
    SyncLog, SyncRunStatus,
};
use hublink_core::{
    BreakerState, CallbackResultPort, ConnectorDescriptor, ConnectorId, HublinkError,
    IntegrationApi, Navigator,
};

use crate::editor::{ConfigEditor, SaveDisposition};
use crate::history::HistoryFeed;
use crate::lifecycle::{ConnectOptions, ConnectionLifecycle, LifecycleState};
use crate::status::StatusRepository;
use crate::sync::{SyncCoordinator, SyncDisposition};

/// Panel tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Settings,
    History,
    Alerts,
}

/// Actions owning an error slot on the panel. History fetches keep their
/// slot inside the feed itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    Status,
    Connect,
    Disconnect,
    Sync,
    ConfigSave,
}

impl std::fmt::Display for PanelAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PanelAction::Status => write!(f, "status"),
            PanelAction::Connect => write!(f, "connect"),
            PanelAction::Disconnect => write!(f, "disconnect"),
            PanelAction::Sync => write!(f, "sync"),
            PanelAction::ConfigSave => write!(f, "config save"),
        }
    }
}

/// One dismissible banner slot per action kind.
#[derive(Debug, Default)]
struct ErrorSlots {
    status: Option<String>,
    connect: Option<String>,
    disconnect: Option<String>,
    sync: Option<String>,
    config_save: Option<String>,
}

impl ErrorSlots {
    fn slot_mut(&mut self, action: PanelAction) -> &mut Option<String> {
        match action {
            PanelAction::Status => &mut self.status,
            PanelAction::Connect => &mut self.connect,
            PanelAction::Disconnect => &mut self.disconnect,
            PanelAction::Sync => &mut self.sync,
            PanelAction::ConfigSave => &mut self.config_save,
        }
    }
}

/// Overview tab view model.
#[derive(Debug, Clone, Serialize)]
pub struct OverviewView {
    pub connector: ConnectorId,
    pub display_name: &'static str,
    pub state: LifecycleState,
    pub environment: Option<EnvironmentFlag>,
    pub endpoint_identity: Option<String>,
    /// False means the token expired: surface a reconnect prompt.
    pub token_valid: Option<bool>,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub last_sync_status: Option<SyncRunStatus>,
    pub records_synced: Option<u64>,
    pub circuit_breaker: Option<CircuitBreaker>,
    /// Whether the sync-trigger control should be enabled.
    pub sync_available: bool,
}

/// Alerts tab view model: everything currently wrong with the connector.
#[derive(Debug, Clone, Serialize)]
pub struct AlertsView {
    pub sync_errors: Vec<String>,
    pub circuit_breaker: Option<CircuitBreaker>,
    /// (action, message) pairs from the per-action error slots.
    pub action_errors: Vec<(String, String)>,
    pub history_error: Option<String>,
}

/// History tab view model.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryView {
    pub entries: Vec<SyncLog>,
    pub latest_status: Option<SyncRunStatus>,
    pub error: Option<String>,
}

/// Settings tab view model.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsView {
    pub config: Option<SyncConfig>,
    pub dirty: bool,
    pub can_save: bool,
}

/// One connector's panel: the composition of all controller components.
pub struct ConnectorPanel {
    descriptor: &'static ConnectorDescriptor,
    repo: Arc<StatusRepository>,
    lifecycle: ConnectionLifecycle,
    sync: SyncCoordinator,
    editor: ConfigEditor,
    history: HistoryFeed,
    errors: RwLock<ErrorSlots>,
    active_tab: RwLock<Tab>,
}

impl ConnectorPanel {
    pub fn new(
        api: Arc<dyn IntegrationApi>,
        navigator: Arc<dyn Navigator>,
        connector: ConnectorId,
        user_id: &str,
    ) -> Self {
        let descriptor = connector.descriptor();
        let repo = Arc::new(StatusRepository::new(api.clone(), connector, user_id));
        let lifecycle =
            ConnectionLifecycle::new(descriptor, api.clone(), repo.clone(), navigator);
        let sync = SyncCoordinator::new(api.clone(), repo.clone());
        let editor = ConfigEditor::new(api.clone(), repo.clone(), descriptor);
        let history = HistoryFeed::new(api, connector, user_id);
        Self {
            descriptor,
            repo,
            lifecycle,
            sync,
            editor,
            history,
            errors: RwLock::new(ErrorSlots::default()),
            active_tab: RwLock::new(Tab::Overview),
        }
    }

    /// Overrides the history page size (e.g. from CLI or config).
    pub fn with_history_limit(mut self, limit: u32) -> Self {
        self.history.set_limit(limit);
        self
    }

    pub fn connector(&self) -> ConnectorId {
        self.descriptor.id
    }

    pub fn descriptor(&self) -> &'static ConnectorDescriptor {
        self.descriptor
    }

    /// The config editor, for applying local edits before `save_config`.
    pub fn editor(&self) -> &ConfigEditor {
        &self.editor
    }

    pub async fn state(&self) -> LifecycleState {
        self.lifecycle.state().await
    }

    pub fn sync_in_flight(&self) -> bool {
        self.sync.is_syncing()
    }

    async fn record_error(&self, action: PanelAction, message: String) {
        *self.errors.write().await.slot_mut(action) = Some(message);
    }

    async fn clear_error(&self, action: PanelAction) {
        *self.errors.write().await.slot_mut(action) = None;
    }

    /// Dismisses the banner for one action.
    pub async fn dismiss_error(&self, action: PanelAction) {
        self.clear_error(action).await;
    }

    /// Mounts the panel: consumes the callback result exactly once,
    /// fetches the initial snapshot, and seeds the editor.
    pub async fn mount(&self, callbacks: &mut dyn CallbackResultPort) -> LifecycleState {
        match self.lifecycle.initialize(callbacks).await {
            Ok(Some(result)) if result.kind == CallbackKind::Error => {
                self.record_error(PanelAction::Connect, result.detail).await;
            }
            Ok(_) => {}
            Err(e) => {
                self.record_error(PanelAction::Status, e.to_string()).await;
            }
        }
        if let Some(status) = self.repo.snapshot().await {
            self.editor.seed_from_status(&status).await;
        }
        self.lifecycle.state().await
    }

    /// Activates a tab; the History tab lazily fetches on first activation.
    pub async fn activate_tab(&self, tab: Tab) {
        *self.active_tab.write().await = tab;
        if tab == Tab::History {
            // Failure lands in the feed's own error slot.
            let _ = self.history.ensure_loaded().await;
        }
    }

    pub async fn active_tab(&self) -> Tab {
        *self.active_tab.read().await
    }

    /// Starts a connect flow; see `ConnectionLifecycle::initiate_connect`.
    pub async fn connect(
        &self,
        options: ConnectOptions,
    ) -> Result<LifecycleState, HublinkError> {
        match self.lifecycle.initiate_connect(options).await {
            Ok(state) => {
                self.clear_error(PanelAction::Connect).await;
                if let Some(status) = self.repo.snapshot().await {
                    self.editor.seed_from_status(&status).await;
                }
                Ok(state)
            }
            Err(e) => {
                self.record_error(PanelAction::Connect, e.to_string()).await;
                Err(e)
            }
        }
    }

    /// Tears the connection down; warns when a sync is still in flight
    /// (the server arbitrates that race).
    pub async fn disconnect(&self) -> Result<LifecycleState, HublinkError> {
        if self.sync.is_syncing() {
            warn!(
                connector = %self.descriptor.id,
                "disconnect requested while a sync is in flight"
            );
        }
        match self.lifecycle.disconnect().await {
            Ok(state) => {
                self.clear_error(PanelAction::Disconnect).await;
                Ok(state)
            }
            Err(e) => {
                self.record_error(PanelAction::Disconnect, e.to_string()).await;
                Err(e)
            }
        }
    }

    /// Triggers a sync run; refreshes the history feed too when the
    /// History tab is active.
    pub async fn trigger_sync(
        &self,
        kind: SyncKind,
    ) -> Result<SyncDisposition, HublinkError> {
        let state = self.lifecycle.state().await;
        let history_active = self.active_tab().await == Tab::History;
        let history = history_active.then_some(&self.history);
        match self.sync.trigger(state, kind, history).await {
            Ok(disposition) => {
                self.clear_error(PanelAction::Sync).await;
                Ok(disposition)
            }
            Err(e) => {
                self.record_error(PanelAction::Sync, e.to_string()).await;
                Err(e)
            }
        }
    }

    /// Commits the edit buffer; see `ConfigEditor::save`.
    pub async fn save_config(&self) -> Result<SaveDisposition, HublinkError> {
        match self.editor.save().await {
            Ok(disposition) => {
                self.clear_error(PanelAction::ConfigSave).await;
                Ok(disposition)
            }
            Err(e) => {
                self.record_error(PanelAction::ConfigSave, e.to_string()).await;
                Err(e)
            }
        }
    }

    /// Explicit user-initiated history refresh.
    pub async fn refresh_history(&self) -> Result<(), HublinkError> {
        self.history.refresh().await
    }

    /// Explicit status refresh (also reconciles the lifecycle state).
    pub async fn refresh_status(&self) -> Result<ConnectionStatus, HublinkError> {
        match self.repo.refresh().await {
            Ok(status) => {
                self.clear_error(PanelAction::Status).await;
                Ok(status)
            }
            Err(e) => {
                self.record_error(PanelAction::Status, e.to_string()).await;
                Err(e)
            }
        }
    }

    /// Overview tab: connection identity, last sync, breaker, and whether
    /// the sync control is enabled.
    pub async fn overview(&self) -> OverviewView {
        let state = self.lifecycle.state().await;
        let status = self.repo.snapshot().await;
        let connection = status.as_ref().and_then(|s| s.connection.as_ref());
        let breaker = status.as_ref().and_then(|s| s.circuit_breaker);
        let breaker_open = breaker.is_some_and(|b| b.state == BreakerState::Open);

        OverviewView {
            connector: self.descriptor.id,
            display_name: self.descriptor.display_name,
            state,
            environment: connection.map(|c| c.environment),
            endpoint_identity: connection.map(|c| c.endpoint_identity.clone()),
            token_valid: connection.map(|c| c.token_valid),
            last_sync_at: status.as_ref().and_then(|s| s.last_sync_at),
            last_sync_status: status.as_ref().and_then(|s| s.last_sync_status),
            records_synced: status.as_ref().and_then(|s| s.records_synced),
            circuit_breaker: breaker,
            sync_available: state == LifecycleState::Connected
                && !self.sync.is_syncing()
                && !breaker_open,
        }
    }

    /// Settings tab: the edit buffer with its save affordance.
    pub async fn settings(&self) -> SettingsView {
        SettingsView {
            config: self.editor.buffer().await,
            dirty: self.editor.is_dirty().await,
            can_save: self.editor.can_save().await,
        }
    }

    /// History tab.
    pub async fn history_view(&self) -> HistoryView {
        HistoryView {
            entries: self.history.entries().await,
            latest_status: self.history.latest_status().await,
            error: self.history.last_error().await,
        }
    }

    /// Alerts tab: server-reported sync errors, breaker state, and every
    /// populated error slot.
    pub async fn alerts(&self) -> AlertsView {
        let status = self.repo.snapshot().await;
        let slots = self.errors.read().await;
        let mut action_errors = Vec::new();
        for action in [
            PanelAction::Status,
            PanelAction::Connect,
            PanelAction::Disconnect,
            PanelAction::Sync,
            PanelAction::ConfigSave,
        ] {
            let message = match action {
                PanelAction::Status => &slots.status,
                PanelAction::Connect => &slots.connect,
                PanelAction::Disconnect => &slots.disconnect,
                PanelAction::Sync => &slots.sync,
                PanelAction::ConfigSave => &slots.config_save,
            };
            if let Some(message) = message {
                action_errors.push((action.to_string(), message.clone()));
            }
        }

        AlertsView {
            sync_errors: status
                .as_ref()
                .map(|s| s.sync_errors.clone())
                .unwrap_or_default(),
            circuit_breaker: status.as_ref().and_then(|s| s.circuit_breaker),
            action_errors,
            history_error: self.history.last_error().await,
        }
    }

    /// The current error banner for one action, if any.
    pub async fn error_for(&self, action: PanelAction) -> Option<String> {
        let slots = self.errors.read().await;
        match action {
            PanelAction::Status => slots.status.clone(),
            PanelAction::Connect => slots.connect.clone(),
            PanelAction::Disconnect => slots.disconnect.clone(),
            PanelAction::Sync => slots.sync.clone(),
            PanelAction::ConfigSave => slots.config_save.clone(),
        }
    }
}
