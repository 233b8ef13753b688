// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hublink config` command implementation: show or edit a connector's
//! sync configuration through the panel's edit buffer.

use std::sync::Arc;

use hublink_config::HublinkConfig;
use hublink_connector::{ConnectorPanel, SaveDisposition, UrlCallbackPort};
use hublink_core::types::SyncSchedule;
use hublink_core::{ConnectorId, HublinkError, IntegrationApi};

use crate::connect::TerminalNavigator;
use crate::PANEL_URL;

/// Edits collected from command flags; `None` leaves a field untouched.
#[derive(Debug, Default)]
pub struct ConfigEdits {
    pub schedule: Option<SyncSchedule>,
    pub threshold_days: Option<u32>,
    pub notify_on_failure: Option<bool>,
    pub auto_create_records: Option<bool>,
}

impl ConfigEdits {
    pub fn is_empty(&self) -> bool {
        self.schedule.is_none()
            && self.threshold_days.is_none()
            && self.notify_on_failure.is_none()
            && self.auto_create_records.is_none()
    }
}

/// Parse a schedule word from the command line.
pub fn parse_schedule(value: &str) -> Result<SyncSchedule, String> {
    match value {
        "realtime" => Ok(SyncSchedule::Realtime),
        "hourly" => Ok(SyncSchedule::Hourly),
        "daily" => Ok(SyncSchedule::Daily),
        "manual" => Ok(SyncSchedule::Manual),
        other => Err(format!(
            "unknown schedule `{other}` (expected realtime, hourly, daily, or manual)"
        )),
    }
}

/// Run the `hublink config` command.
pub async fn run_config(
    config: &HublinkConfig,
    api: Arc<dyn IntegrationApi>,
    connector: ConnectorId,
    edits: ConfigEdits,
    json: bool,
) -> Result<(), HublinkError> {
    let panel = ConnectorPanel::new(
        api,
        Arc::new(TerminalNavigator),
        connector,
        &config.user.id,
    );
    let mut port = UrlCallbackPort::from_url(PANEL_URL)?;
    panel.mount(&mut port).await;

    if !edits.is_empty() {
        panel
            .editor()
            .edit(|buffer| {
                if let Some(schedule) = edits.schedule {
                    buffer.sync_schedule = schedule;
                }
                if let Some(days) = edits.threshold_days {
                    buffer.inactivity_threshold_days = Some(days);
                }
                if let Some(notify) = edits.notify_on_failure {
                    buffer.notify_on_failure = notify;
                }
                if let Some(auto_create) = edits.auto_create_records {
                    buffer.auto_create_records = auto_create;
                }
            })
            .await?;

        match panel.save_config().await? {
            SaveDisposition::Saved => println!(
                "  {} configuration saved.",
                connector.descriptor().display_name
            ),
            SaveDisposition::NoChanges => println!("  Nothing changed."),
            SaveDisposition::AlreadySaving => println!("  A save is already in flight."),
        }
    }

    let settings = panel.settings().await;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&settings).unwrap_or_else(|_| "{}".to_string())
        );
        return Ok(());
    }

    match settings.config {
        Some(view) => {
            println!();
            println!(
                "  {} sync configuration",
                connector.descriptor().display_name
            );
            println!("  {}", "-".repeat(40));
            println!("    schedule:            {:?}", view.sync_schedule);
            println!("    match by email:      {}", view.match_by_email);
            println!("    match by name:       {}", view.match_by_name);
            println!("    notify on failure:   {}", view.notify_on_failure);
            println!("    auto-create records: {}", view.auto_create_records);
            if let Some(days) = view.inactivity_threshold_days {
                println!("    inactivity threshold: {days} days");
            }
            if !view.field_mappings.is_empty() {
                println!("    field mappings:      {}", view.field_mappings.len());
            }
            if let Some(policy) = view.conflict_resolution {
                println!("    conflict policy:     {policy:?}");
            }
            println!();
        }
        None => println!("  Not connected; no configuration to show."),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_words_parse() {
        assert_eq!(parse_schedule("hourly").unwrap(), SyncSchedule::Hourly);
        assert_eq!(parse_schedule("manual").unwrap(), SyncSchedule::Manual);
        assert!(parse_schedule("weekly").is_err());
    }

    #[test]
    fn empty_edits_detected() {
        assert!(ConfigEdits::default().is_empty());
        let edits = ConfigEdits {
            threshold_days: Some(7),
            ..ConfigEdits::default()
        };
        assert!(!edits.is_empty());
    }
}
