// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owned store for the canonical `ConnectionStatus` snapshot.
//!
//! One repository per connector instance; every other component reads the
//! snapshot through it and must request an explicit refresh after any
//! mutation rather than trusting a local copy.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use hublink_core::types::ConnectionStatus;
use hublink_core::{ConnectorId, HublinkError, IntegrationApi};

/// Exclusive owner of the authoritative status snapshot for one connector
/// instance.
pub struct StatusRepository {
    api: Arc<dyn IntegrationApi>,
    connector: ConnectorId,
    user_id: String,
    snapshot: RwLock<Option<ConnectionStatus>>,
}

impl StatusRepository {
    pub fn new(
        api: Arc<dyn IntegrationApi>,
        connector: ConnectorId,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            api,
            connector,
            user_id: user_id.into(),
            snapshot: RwLock::new(None),
        }
    }

    pub fn connector(&self) -> ConnectorId {
        self.connector
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Fetches a fresh snapshot from the backend and replaces the stored one.
    pub async fn refresh(&self) -> Result<ConnectionStatus, HublinkError> {
        let status = self.api.fetch_status(self.connector, &self.user_id).await?;
        debug!(
            connector = %self.connector,
            connected = status.connected,
            "status snapshot refreshed"
        );
        *self.snapshot.write().await = Some(status.clone());
        Ok(status)
    }

    /// The last fetched snapshot, if any.
    pub async fn snapshot(&self) -> Option<ConnectionStatus> {
        self.snapshot.read().await.clone()
    }

    /// Replaces the snapshot with a status the server just returned from a
    /// mutating call (e.g. the config update response).
    pub async fn apply(&self, status: ConnectionStatus) {
        *self.snapshot.write().await = Some(status);
    }

    /// Optimistically flips the local snapshot to disconnected so the UI
    /// never flashes a stale "Connected" while teardown is in flight. The
    /// caller must reconcile with a `refresh` afterwards.
    pub async fn mark_disconnected_locally(&self) {
        let mut guard = self.snapshot.write().await;
        if let Some(status) = guard.as_mut() {
            status.connected = false;
            status.connection = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hublink_test_utils::{connected_status, MockIntegrationApi};

    #[tokio::test]
    async fn refresh_replaces_the_snapshot() {
        let api = Arc::new(MockIntegrationApi::new());
        api.set_status(connected_status(ConnectorId::Zendesk)).await;
        let repo = StatusRepository::new(api, ConnectorId::Zendesk, "u-1");

        assert!(repo.snapshot().await.is_none());
        let status = repo.refresh().await.unwrap();
        assert!(status.connected);
        assert_eq!(repo.snapshot().await.unwrap(), status);
    }

    #[tokio::test]
    async fn optimistic_flip_clears_connection_until_reconciled() {
        let api = Arc::new(MockIntegrationApi::new());
        api.set_status(connected_status(ConnectorId::Jira)).await;
        let repo = StatusRepository::new(api.clone(), ConnectorId::Jira, "u-1");

        repo.refresh().await.unwrap();
        repo.mark_disconnected_locally().await;

        let local = repo.snapshot().await.unwrap();
        assert!(!local.connected);
        assert!(local.connection.is_none());

        // Reconciliation restores whatever the server reports.
        let reconciled = repo.refresh().await.unwrap();
        assert!(reconciled.connected);
    }

    #[tokio::test]
    async fn refresh_failure_leaves_previous_snapshot() {
        let api = Arc::new(MockIntegrationApi::new());
        api.set_status(connected_status(ConnectorId::Salesforce)).await;
        let repo = StatusRepository::new(api.clone(), ConnectorId::Salesforce, "u-1");
        repo.refresh().await.unwrap();

        api.push_status(Err(HublinkError::Api {
            message: "backend down".into(),
            status: Some(503),
        }))
        .await;
        assert!(repo.refresh().await.is_err());
        assert!(repo.snapshot().await.unwrap().connected);
    }
}
