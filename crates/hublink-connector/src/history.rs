// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lazily-fetched, append-only view of past sync runs.
//!
//! Fetched on first History-tab activation and on explicit user refresh,
//! never polled. An empty list is a valid state, distinct from a fetch
//! failure, which lands in this feed's own error slot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use hublink_core::types::{SyncLog, SyncRunStatus};
use hublink_core::{ConnectorId, HublinkError, IntegrationApi};

/// Default page size for history fetches.
const DEFAULT_LIMIT: u32 = 20;

/// Read-only feed of sync run records for one connector.
pub struct HistoryFeed {
    api: Arc<dyn IntegrationApi>,
    connector: ConnectorId,
    user_id: String,
    limit: u32,
    entries: RwLock<Vec<SyncLog>>,
    loaded: AtomicBool,
    error: RwLock<Option<String>>,
}

impl HistoryFeed {
    pub fn new(
        api: Arc<dyn IntegrationApi>,
        connector: ConnectorId,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            api,
            connector,
            user_id: user_id.into(),
            limit: DEFAULT_LIMIT,
            entries: RwLock::new(Vec::new()),
            loaded: AtomicBool::new(false),
            error: RwLock::new(None),
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub(crate) fn set_limit(&mut self, limit: u32) {
        self.limit = limit;
    }

    /// Whether a fetch has completed successfully at least once.
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    /// Entries newest-first; empty both before the first fetch and when the
    /// connector genuinely has no history.
    pub async fn entries(&self) -> Vec<SyncLog> {
        self.entries.read().await.clone()
    }

    /// Status of the most recent run, per the feed (not the snapshot).
    pub async fn latest_status(&self) -> Option<SyncRunStatus> {
        self.entries.read().await.first().map(|log| log.status)
    }

    /// The last fetch failure, if the most recent fetch failed.
    pub async fn last_error(&self) -> Option<String> {
        self.error.read().await.clone()
    }

    /// First-activation fetch: a no-op once the feed has loaded.
    pub async fn ensure_loaded(&self) -> Result<(), HublinkError> {
        if self.is_loaded() {
            return Ok(());
        }
        self.refresh().await
    }

    /// Explicit fetch; replaces the entries and orders them newest-first.
    pub async fn refresh(&self) -> Result<(), HublinkError> {
        match self
            .api
            .fetch_history(self.connector, &self.user_id, self.limit)
            .await
        {
            Ok(mut logs) => {
                logs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
                debug!(
                    connector = %self.connector,
                    count = logs.len(),
                    "history refreshed"
                );
                *self.entries.write().await = logs;
                self.loaded.store(true, Ordering::SeqCst);
                *self.error.write().await = None;
                Ok(())
            }
            Err(e) => {
                *self.error.write().await = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Refresh issued by the sync coordinator after a run completes while
    /// the History tab is active. Failures stay in this feed's error slot
    /// and never propagate into the sync action's outcome.
    pub(crate) async fn refresh_after_sync(&self) {
        if let Err(e) = self.refresh().await {
            warn!(
                connector = %self.connector,
                error = %e,
                "history refresh after sync failed"
            );
        }
    }
}
