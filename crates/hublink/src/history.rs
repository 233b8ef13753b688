// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hublink history` command implementation.

use std::io::IsTerminal;
use std::sync::Arc;

use hublink_config::HublinkConfig;
use hublink_connector::{ConnectorPanel, Tab, UrlCallbackPort};
use hublink_core::types::{SyncLog, SyncRunStatus};
use hublink_core::{ConnectorId, HublinkError, IntegrationApi};

use crate::connect::TerminalNavigator;
use crate::PANEL_URL;

/// Run the `hublink history` command.
pub async fn run_history(
    config: &HublinkConfig,
    api: Arc<dyn IntegrationApi>,
    connector: ConnectorId,
    limit: Option<u32>,
    json: bool,
    plain: bool,
) -> Result<(), HublinkError> {
    let panel = ConnectorPanel::new(
        api,
        Arc::new(TerminalNavigator),
        connector,
        &config.user.id,
    )
    .with_history_limit(limit.unwrap_or(config.cli.history_limit));

    let mut port = UrlCallbackPort::from_url(PANEL_URL)?;
    panel.mount(&mut port).await;
    panel.activate_tab(Tab::History).await;

    let view = panel.history_view().await;
    if let Some(error) = view.error {
        return Err(HublinkError::Api {
            message: error,
            status: None,
        });
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&view.entries).unwrap_or_else(|_| "[]".to_string())
        );
        return Ok(());
    }

    if view.entries.is_empty() {
        println!(
            "  No sync runs recorded for {} yet.",
            connector.descriptor().display_name
        );
        return Ok(());
    }

    let use_color = !plain && std::io::stdout().is_terminal();
    println!();
    println!(
        "  {} sync history (newest first)",
        connector.descriptor().display_name
    );
    println!("  {}", "-".repeat(72));
    for log in &view.entries {
        println!("    {}", format_log_line(log, use_color));
        for error in &log.error_details {
            println!("        ! {error}");
        }
    }
    println!();

    Ok(())
}

fn format_log_line(log: &SyncLog, use_color: bool) -> String {
    let status = if use_color {
        use colored::Colorize;
        match log.status {
            SyncRunStatus::Completed => "completed".green().to_string(),
            SyncRunStatus::Failed => "failed".red().to_string(),
            SyncRunStatus::Running => "running".yellow().to_string(),
        }
    } else {
        match log.status {
            SyncRunStatus::Completed => "completed".to_string(),
            SyncRunStatus::Failed => "failed".to_string(),
            SyncRunStatus::Running => "running".to_string(),
        }
    };

    format!(
        "{}  {:<12}{:<10}{status}  {} processed, {} created, {} updated, {} failed",
        log.started_at.format("%Y-%m-%d %H:%M"),
        log.sync_type,
        log.object_type,
        log.counts.processed,
        log.counts.created,
        log.counts.updated,
        log.counts.failed,
    )
}
