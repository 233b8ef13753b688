// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local edit buffer over a connector's `SyncConfig`.
//!
//! All edits stay local until `save()`, which submits only the changed keys
//! and then replaces the buffer wholesale with the server's returned config
//! (never merged client-side) so server-side normalization wins. Bounds are
//! re-checked at payload construction, so an out-of-range value cannot
//! reach the network layer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use hublink_core::types::{ConfigPatch, ConnectionStatus, SyncConfig};
use hublink_core::{ConnectorDescriptor, HublinkError, IntegrationApi};

use crate::status::StatusRepository;

/// Valid range for the inactivity threshold, in days.
const THRESHOLD_DAYS_RANGE: std::ops::RangeInclusive<u32> = 1..=30;

/// Outcome of a save attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDisposition {
    /// The patch was applied and the buffer replaced by the server config.
    Saved,
    /// The buffer matched the baseline; nothing was sent.
    NoChanges,
    /// A save was already in flight; nothing was sent.
    AlreadySaving,
}

/// Edit buffer over the last fetched `SyncConfig`.
pub struct ConfigEditor {
    api: Arc<dyn IntegrationApi>,
    repo: Arc<StatusRepository>,
    descriptor: &'static ConnectorDescriptor,
    baseline: RwLock<Option<SyncConfig>>,
    buffer: RwLock<Option<SyncConfig>>,
    saving: AtomicBool,
}

impl ConfigEditor {
    pub fn new(
        api: Arc<dyn IntegrationApi>,
        repo: Arc<StatusRepository>,
        descriptor: &'static ConnectorDescriptor,
    ) -> Self {
        Self {
            api,
            repo,
            descriptor,
            baseline: RwLock::new(None),
            buffer: RwLock::new(None),
            saving: AtomicBool::new(false),
        }
    }

    /// Re-seeds baseline and buffer from a fresh server config, discarding
    /// any local edits.
    pub async fn seed(&self, config: SyncConfig) {
        *self.baseline.write().await = Some(config.clone());
        *self.buffer.write().await = Some(config);
    }

    /// Seeds from a status snapshot when it carries connection details.
    pub async fn seed_from_status(&self, status: &ConnectionStatus) {
        if let Some(connection) = &status.connection {
            self.seed(connection.config.clone()).await;
        }
    }

    /// The current edit buffer, absent until the connector is connected.
    pub async fn buffer(&self) -> Option<SyncConfig> {
        self.buffer.read().await.clone()
    }

    /// Applies a local edit to the buffer.
    pub async fn edit<F>(&self, apply: F) -> Result<(), HublinkError>
    where
        F: FnOnce(&mut SyncConfig),
    {
        let mut guard = self.buffer.write().await;
        let Some(buffer) = guard.as_mut() else {
            return Err(HublinkError::InvalidState {
                action: "edit config",
                state: "disconnected".into(),
            });
        };
        apply(buffer);
        Ok(())
    }

    /// Whether the buffer differs from the baseline.
    pub async fn is_dirty(&self) -> bool {
        let baseline = self.baseline.read().await;
        let buffer = self.buffer.read().await;
        *baseline != *buffer
    }

    /// Validates a config against local bounds and capability flags.
    ///
    /// Advisory only: the server may still reject a value the client
    /// considered valid, and that rejection is surfaced by `save()`.
    pub fn validate(&self, config: &SyncConfig) -> Result<(), HublinkError> {
        if let Some(days) = config.inactivity_threshold_days
            && !THRESHOLD_DAYS_RANGE.contains(&days)
        {
            return Err(HublinkError::Validation(format!(
                "inactivity threshold must be between 1 and 30 days, got {days}"
            )));
        }
        for mapping in &config.field_mappings {
            if mapping.source_field.trim().is_empty() || mapping.app_field.trim().is_empty() {
                return Err(HublinkError::Validation(
                    "field mappings require both a source and an app field".into(),
                ));
            }
        }
        if config.conflict_resolution.is_some() && !self.descriptor.capabilities.bidirectional {
            return Err(HublinkError::Validation(format!(
                "{} does not support bidirectional sync, so no conflict policy applies",
                self.descriptor.display_name
            )));
        }
        Ok(())
    }

    /// Whether the save control should be enabled: dirty and locally valid.
    pub async fn can_save(&self) -> bool {
        let Some(buffer) = self.buffer().await else {
            return false;
        };
        self.is_dirty().await && self.validate(&buffer).is_ok()
    }

    /// Submits the changed keys and replaces the buffer with the server's
    /// returned config.
    pub async fn save(&self) -> Result<SaveDisposition, HublinkError> {
        let (baseline, buffer) = {
            let baseline = self.baseline.read().await;
            let buffer = self.buffer.read().await;
            match (baseline.clone(), buffer.clone()) {
                (Some(baseline), Some(buffer)) => (baseline, buffer),
                _ => {
                    return Err(HublinkError::InvalidState {
                        action: "save config",
                        state: "disconnected".into(),
                    })
                }
            }
        };

        // Bounds re-checked at payload construction time.
        self.validate(&buffer)?;

        let patch = diff(&baseline, &buffer);
        if patch.is_empty() {
            debug!(connector = %self.repo.connector(), "config unchanged, nothing to save");
            return Ok(SaveDisposition::NoChanges);
        }

        if self
            .saving
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!(connector = %self.repo.connector(), "config save already in flight");
            return Ok(SaveDisposition::AlreadySaving);
        }

        let result = self
            .api
            .update_config(self.repo.connector(), self.repo.user_id(), &patch)
            .await;
        self.saving.store(false, Ordering::SeqCst);

        let status = result?;
        // The PUT response is the refreshed canonical snapshot.
        self.repo.apply(status.clone()).await;
        match status.connection {
            Some(connection) => {
                self.seed(connection.config).await;
                info!(connector = %self.repo.connector(), "config saved");
                Ok(SaveDisposition::Saved)
            }
            None => {
                warn!(
                    connector = %self.repo.connector(),
                    "config update response carried no connection details"
                );
                Err(HublinkError::Api {
                    message: "config update response carried no connection details".into(),
                    status: None,
                })
            }
        }
    }
}

/// Computes the partial update between the baseline and the edited buffer:
/// only keys whose values changed are populated.
fn diff(baseline: &SyncConfig, buffer: &SyncConfig) -> ConfigPatch {
    ConfigPatch {
        sync_schedule: (baseline.sync_schedule != buffer.sync_schedule)
            .then_some(buffer.sync_schedule),
        match_by_email: (baseline.match_by_email != buffer.match_by_email)
            .then_some(buffer.match_by_email),
        match_by_name: (baseline.match_by_name != buffer.match_by_name)
            .then_some(buffer.match_by_name),
        notify_on_failure: (baseline.notify_on_failure != buffer.notify_on_failure)
            .then_some(buffer.notify_on_failure),
        auto_create_records: (baseline.auto_create_records != buffer.auto_create_records)
            .then_some(buffer.auto_create_records),
        inactivity_threshold_days: (baseline.inactivity_threshold_days
            != buffer.inactivity_threshold_days)
            .then(|| buffer.inactivity_threshold_days)
            .flatten(),
        field_mappings: (baseline.field_mappings != buffer.field_mappings)
            .then(|| buffer.field_mappings.clone()),
        conflict_resolution: (baseline.conflict_resolution != buffer.conflict_resolution)
            .then(|| buffer.conflict_resolution)
            .flatten(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hublink_core::types::{ConflictResolution, SyncSchedule};
    use hublink_core::ConnectorId;
    use hublink_test_utils::{connected_status, ApiCall, MockIntegrationApi};

    fn fixture(connector: ConnectorId) -> (Arc<MockIntegrationApi>, Arc<StatusRepository>, ConfigEditor) {
        let api = Arc::new(MockIntegrationApi::new());
        let repo = Arc::new(StatusRepository::new(api.clone(), connector, "u-1"));
        let editor = ConfigEditor::new(api.clone(), repo.clone(), connector.descriptor());
        (api, repo, editor)
    }

    #[tokio::test]
    async fn save_submits_only_changed_keys() {
        let (api, _repo, editor) = fixture(ConnectorId::Salesforce);
        let status = connected_status(ConnectorId::Salesforce);
        editor.seed_from_status(&status).await;
        api.push_config(Ok(status.clone())).await;

        editor
            .edit(|config| config.inactivity_threshold_days = Some(14))
            .await
            .unwrap();
        editor.save().await.unwrap();

        let calls = api.calls().await;
        let patch = calls
            .iter()
            .find_map(|c| match c {
                ApiCall::UpdateConfig { patch, .. } => Some(patch.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(patch.inactivity_threshold_days, Some(14));
        // Exactly one key serialized.
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn buffer_is_replaced_wholesale_by_the_server_config() {
        let (api, _repo, editor) = fixture(ConnectorId::Salesforce);
        let status = connected_status(ConnectorId::Salesforce);
        editor.seed_from_status(&status).await;

        // Server normalizes the save: schedule stays daily regardless of
        // what the buffer asked for, and the threshold comes back clamped.
        let mut normalized = status.clone();
        {
            let connection = normalized.connection.as_mut().unwrap();
            connection.config.sync_schedule = SyncSchedule::Daily;
            connection.config.inactivity_threshold_days = Some(30);
        }
        api.push_config(Ok(normalized.clone())).await;

        editor
            .edit(|config| {
                config.sync_schedule = SyncSchedule::Realtime;
                config.inactivity_threshold_days = Some(30);
            })
            .await
            .unwrap();
        let disposition = editor.save().await.unwrap();
        assert_eq!(disposition, SaveDisposition::Saved);

        // No client-side merge residue: the buffer equals the returned
        // config exactly.
        let buffer = editor.buffer().await.unwrap();
        assert_eq!(
            buffer,
            normalized.connection.unwrap().config
        );
        assert!(!editor.is_dirty().await);
    }

    #[tokio::test]
    async fn out_of_range_threshold_blocks_save_before_any_request() {
        let (api, _repo, editor) = fixture(ConnectorId::Zendesk);
        editor.seed_from_status(&connected_status(ConnectorId::Zendesk)).await;

        editor
            .edit(|config| config.inactivity_threshold_days = Some(45))
            .await
            .unwrap();
        assert!(!editor.can_save().await);

        let err = editor.save().await.unwrap_err();
        assert!(matches!(err, HublinkError::Validation(_)));

        // Nothing reached the network layer.
        assert!(api.calls().await.is_empty());
    }

    #[tokio::test]
    async fn server_rejection_is_surfaced_and_edits_survive() {
        let (api, _repo, editor) = fixture(ConnectorId::Jira);
        editor.seed_from_status(&connected_status(ConnectorId::Jira)).await;
        api.push_config(Err(HublinkError::Validation(
            "schedule not allowed on this plan".into(),
        )))
        .await;

        editor
            .edit(|config| config.sync_schedule = SyncSchedule::Realtime)
            .await
            .unwrap();
        let err = editor.save().await.unwrap_err();
        assert!(matches!(err, HublinkError::Validation(_)));

        // The rejected edit remains in the buffer for the user to adjust.
        assert_eq!(
            editor.buffer().await.unwrap().sync_schedule,
            SyncSchedule::Realtime
        );
        assert!(editor.is_dirty().await);
    }

    #[tokio::test]
    async fn unchanged_buffer_sends_nothing() {
        let (api, _repo, editor) = fixture(ConnectorId::Docusign);
        editor.seed_from_status(&connected_status(ConnectorId::Docusign)).await;

        let disposition = editor.save().await.unwrap();
        assert_eq!(disposition, SaveDisposition::NoChanges);
        assert!(api.calls().await.is_empty());
    }

    #[tokio::test]
    async fn conflict_policy_requires_bidirectional_capability() {
        // DocuSign does not support bidirectional sync.
        let (_api, _repo, editor) = fixture(ConnectorId::Docusign);
        editor.seed_from_status(&connected_status(ConnectorId::Docusign)).await;

        editor
            .edit(|config| config.conflict_resolution = Some(ConflictResolution::NewestWins))
            .await
            .unwrap();
        let err = editor.save().await.unwrap_err();
        assert!(matches!(err, HublinkError::Validation(_)));
    }

    #[tokio::test]
    async fn edit_without_a_connection_is_rejected() {
        let (_api, _repo, editor) = fixture(ConnectorId::Salesforce);
        let err = editor.edit(|c| c.match_by_name = true).await.unwrap_err();
        assert!(matches!(err, HublinkError::InvalidState { .. }));
        assert!(!editor.can_save().await);
    }

    #[test]
    fn diff_is_empty_for_identical_configs() {
        let config = SyncConfig::default();
        assert!(diff(&config, &config).is_empty());
    }

    #[test]
    fn diff_picks_up_every_changed_field() {
        let baseline = SyncConfig::default();
        let mut edited = baseline.clone();
        edited.sync_schedule = SyncSchedule::Hourly;
        edited.notify_on_failure = true;

        let patch = diff(&baseline, &edited);
        assert_eq!(patch.sync_schedule, Some(SyncSchedule::Hourly));
        assert_eq!(patch.notify_on_failure, Some(true));
        assert!(patch.match_by_email.is_none());
        assert!(patch.field_mappings.is_none());
    }
}
