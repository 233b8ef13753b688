// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hublink sync` command implementation.

use std::sync::Arc;

use hublink_config::HublinkConfig;
use hublink_connector::{ConnectorPanel, SyncDisposition, UrlCallbackPort};
use hublink_core::types::SyncKind;
use hublink_core::{ConnectorId, HublinkError, IntegrationApi};

use crate::connect::TerminalNavigator;
use crate::PANEL_URL;

/// Resolve the sync kind from command flags.
pub fn resolve_kind(
    connector: ConnectorId,
    full: bool,
    objects: Option<Vec<String>>,
) -> Result<SyncKind, HublinkError> {
    match objects {
        Some(object_types) => {
            if !connector.descriptor().capabilities.object_subset_sync {
                return Err(HublinkError::Validation(format!(
                    "{} does not support object-subset syncs",
                    connector.descriptor().display_name
                )));
            }
            if full {
                return Err(HublinkError::Validation(
                    "pass either --full or --objects, not both".into(),
                ));
            }
            Ok(SyncKind::Objects { object_types })
        }
        None if full => Ok(SyncKind::Full),
        None => Ok(SyncKind::Incremental),
    }
}

/// Run the `hublink sync` command.
pub async fn run_sync(
    config: &HublinkConfig,
    api: Arc<dyn IntegrationApi>,
    connector: ConnectorId,
    kind: SyncKind,
) -> Result<(), HublinkError> {
    let panel = ConnectorPanel::new(
        api,
        Arc::new(TerminalNavigator),
        connector,
        &config.user.id,
    );
    let mut port = UrlCallbackPort::from_url(PANEL_URL)?;
    panel.mount(&mut port).await;

    match panel.trigger_sync(kind).await? {
        SyncDisposition::Completed(summary) => {
            let records = summary
                .records_synced
                .map(|n| format!("{n} records"))
                .unwrap_or_else(|| "no record count reported".into());
            println!(
                "  {} sync finished: {records}.",
                connector.descriptor().display_name
            );
            Ok(())
        }
        SyncDisposition::AlreadyRunning => {
            println!(
                "  A sync for {} is already running; nothing was started.",
                connector.descriptor().display_name
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incremental_is_the_default_kind() {
        let kind = resolve_kind(ConnectorId::Jira, false, None).unwrap();
        assert_eq!(kind, SyncKind::Incremental);
    }

    #[test]
    fn objects_flag_builds_a_subset_kind() {
        let kind =
            resolve_kind(ConnectorId::Jira, false, Some(vec!["issue".into()])).unwrap();
        assert_eq!(
            kind,
            SyncKind::Objects {
                object_types: vec!["issue".into()]
            }
        );
    }

    #[test]
    fn object_subset_requires_the_capability() {
        // DocuSign syncs whole envelopes only.
        let err =
            resolve_kind(ConnectorId::Docusign, false, Some(vec!["envelope".into()]))
                .unwrap_err();
        assert!(matches!(err, HublinkError::Validation(_)));
    }

    #[test]
    fn full_and_objects_conflict() {
        let err =
            resolve_kind(ConnectorId::Salesforce, true, Some(vec!["contact".into()]))
                .unwrap_err();
        assert!(matches!(err, HublinkError::Validation(_)));
    }
}
