// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hublink status` command implementation.
//!
//! Mounts a panel per connector and renders the overview rows. Falls back
//! gracefully per connector when the backend is unreachable: one
//! connector's failure never hides the others.

use std::io::IsTerminal;
use std::sync::Arc;

use strum::IntoEnumIterator;

use hublink_connector::{ConnectorPanel, LifecycleState, OverviewView, UrlCallbackPort};
use hublink_core::types::BreakerState;
use hublink_core::{ConnectorId, HublinkError, IntegrationApi, Navigator};

use crate::PANEL_URL;

/// Run the `hublink status` command for one connector or all of them.
pub async fn run_status(
    api: Arc<dyn IntegrationApi>,
    navigator: Arc<dyn Navigator>,
    user_id: &str,
    connector: Option<ConnectorId>,
    json: bool,
    plain: bool,
) -> Result<(), HublinkError> {
    let connectors: Vec<ConnectorId> = match connector {
        Some(id) => vec![id],
        None => ConnectorId::iter().collect(),
    };

    let mut views = Vec::new();
    for id in connectors {
        let panel = ConnectorPanel::new(api.clone(), navigator.clone(), id, user_id);
        let mut port = UrlCallbackPort::from_url(PANEL_URL)?;
        panel.mount(&mut port).await;
        views.push((panel.overview().await, panel.alerts().await.action_errors));
    }

    if json {
        let overviews: Vec<&OverviewView> = views.iter().map(|(view, _)| view).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&overviews)
                .unwrap_or_else(|_| "[]".to_string())
        );
        return Ok(());
    }

    let use_color = !plain && std::io::stdout().is_terminal();
    println!();
    println!("  hublink status");
    println!("  {}", "-".repeat(60));
    for (view, action_errors) in &views {
        print_overview_row(view, use_color);
        for (action, message) in action_errors {
            println!("      ! {action}: {message}");
        }
    }
    println!();

    Ok(())
}

fn print_overview_row(view: &OverviewView, use_color: bool) {
    let state_cell = state_cell(view.state, use_color);
    let mut detail = String::new();

    if let Some(at) = view.last_sync_at {
        detail.push_str(&format!("  last sync: {}", at.format("%Y-%m-%d %H:%M")));
        if let Some(status) = view.last_sync_status {
            detail.push_str(&format!(" ({})", sync_status_word(status)));
        }
        if let Some(records) = view.records_synced {
            detail.push_str(&format!(", {records} records"));
        }
    }
    if let Some(breaker) = view.circuit_breaker {
        detail.push_str(&format!("  breaker: {}", breaker_badge(breaker.state, breaker.failures)));
    }
    if view.token_valid == Some(false) {
        detail.push_str("  (token expired, reconnect required)");
    }

    println!("    {:<12}{state_cell}{detail}", view.display_name);
}

fn state_cell(state: LifecycleState, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        match state {
            LifecycleState::Connected => format!("{} {}", "✓".green(), "connected".green()),
            LifecycleState::Unconfigured => format!("{} {}", "·".dimmed(), "unconfigured".dimmed()),
            LifecycleState::Disconnected => format!("{} {}", "✗".red(), "disconnected"),
            other => format!("… {other}"),
        }
    } else {
        match state {
            LifecycleState::Connected => "[OK] connected".to_string(),
            LifecycleState::Unconfigured => "[--] unconfigured".to_string(),
            LifecycleState::Disconnected => "[XX] disconnected".to_string(),
            other => format!("[..] {other}"),
        }
    }
}

fn sync_status_word(status: hublink_core::types::SyncRunStatus) -> &'static str {
    use hublink_core::types::SyncRunStatus;
    match status {
        SyncRunStatus::Completed => "completed",
        SyncRunStatus::Failed => "failed",
        SyncRunStatus::Running => "running",
    }
}

fn breaker_badge(state: BreakerState, failures: u32) -> String {
    match state {
        BreakerState::Closed => "CLOSED".to_string(),
        BreakerState::Open => format!("OPEN ({failures} failures)"),
        BreakerState::HalfOpen => "HALF_OPEN".to_string(),
    }
}
