// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hublink - drive customer-success integration connectors from the
//! terminal.
//!
//! This is the binary entry point for the Hublink CLI.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod callback_server;
mod config;
mod connect;
mod history;
mod status;
mod sync;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hublink_api::HttpIntegrationApi;
use hublink_core::{ConnectorId, HublinkError, IntegrationApi};

/// Synthetic panel URL for CLI mounts; only its query string matters to the
/// callback port.
pub(crate) const PANEL_URL: &str = "http://hublink.local/integrations";

/// Hublink - drive customer-success integration connectors.
#[derive(Parser, Debug)]
#[command(name = "hublink", version, about, long_about = None)]
struct Cli {
    /// Emit machine-readable JSON instead of formatted output.
    #[arg(long, global = true)]
    json: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show connection status for one connector or all of them.
    Status {
        #[arg(value_parser = parse_connector)]
        connector: Option<ConnectorId>,
    },
    /// Connect a connector (OAuth redirect or API token).
    Connect {
        #[arg(value_parser = parse_connector)]
        connector: ConnectorId,
        /// Target the sandbox environment (where supported).
        #[arg(long)]
        sandbox: bool,
        /// Target the demo environment (where supported).
        #[arg(long)]
        demo: bool,
        /// Instance to connect to (site URL, workspace domain).
        #[arg(long)]
        endpoint: Option<String>,
        /// Account email for token-based connectors.
        #[arg(long)]
        email: Option<String>,
        /// API token for token-based connectors.
        #[arg(long)]
        api_token: Option<String>,
    },
    /// Tear down a connector's connection.
    Disconnect {
        #[arg(value_parser = parse_connector)]
        connector: ConnectorId,
    },
    /// Trigger a sync run.
    Sync {
        #[arg(value_parser = parse_connector)]
        connector: ConnectorId,
        /// Run a full sync instead of an incremental one.
        #[arg(long)]
        full: bool,
        /// Restrict the run to these object types (comma-separated).
        #[arg(long, value_delimiter = ',')]
        objects: Option<Vec<String>>,
    },
    /// Show or edit a connector's sync configuration.
    Config {
        #[arg(value_parser = parse_connector)]
        connector: ConnectorId,
        /// Sync schedule: realtime, hourly, daily, or manual.
        #[arg(long, value_parser = config::parse_schedule)]
        schedule: Option<hublink_core::types::SyncSchedule>,
        /// Days of inactivity before a record is flagged (1-30).
        #[arg(long)]
        threshold_days: Option<u32>,
        /// Notify on sync failure.
        #[arg(long)]
        notify_on_failure: Option<bool>,
        /// Automatically create missing records.
        #[arg(long)]
        auto_create_records: Option<bool>,
    },
    /// List recent sync runs, newest first.
    History {
        #[arg(value_parser = parse_connector)]
        connector: ConnectorId,
        /// Page size (defaults to cli.history_limit from config).
        #[arg(long)]
        limit: Option<u32>,
    },
}

fn parse_connector(value: &str) -> Result<ConnectorId, String> {
    ConnectorId::from_str(&value.to_ascii_lowercase()).map_err(|_| {
        format!("unknown connector `{value}` (expected salesforce, zendesk, docusign, or jira)")
    })
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match hublink_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            hublink_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.cli.log_level.clone())),
        )
        .with_writer(std::io::stderr)
        .init();

    let api = match HttpIntegrationApi::new(
        &config.backend.base_url,
        Duration::from_secs(config.backend.request_timeout_secs),
    ) {
        Ok(api) => Arc::new(api) as Arc<dyn IntegrationApi>,
        Err(e) => {
            report_failure(&e, cli.plain);
            std::process::exit(1);
        }
    };

    let result = run_command(cli.command, &config, api, cli.json, cli.plain).await;
    if let Err(e) = result {
        report_failure(&e, cli.plain);
        std::process::exit(1);
    }
}

async fn run_command(
    command: Commands,
    config: &hublink_config::HublinkConfig,
    api: Arc<dyn IntegrationApi>,
    json: bool,
    plain: bool,
) -> Result<(), HublinkError> {
    match command {
        Commands::Status { connector } => {
            status::run_status(
                api,
                Arc::new(connect::TerminalNavigator),
                &config.user.id,
                connector,
                json,
                plain,
            )
            .await
        }
        Commands::Connect {
            connector,
            sandbox,
            demo,
            endpoint,
            email,
            api_token,
        } => {
            connect::run_connect(
                config,
                api,
                connector,
                connect::ConnectArgs {
                    sandbox,
                    demo,
                    endpoint,
                    email,
                    api_token,
                },
            )
            .await
        }
        Commands::Disconnect { connector } => {
            connect::run_disconnect(config, api, connector).await
        }
        Commands::Sync {
            connector,
            full,
            objects,
        } => {
            let kind = sync::resolve_kind(connector, full, objects)?;
            sync::run_sync(config, api, connector, kind).await
        }
        Commands::Config {
            connector,
            schedule,
            threshold_days,
            notify_on_failure,
            auto_create_records,
        } => {
            config::run_config(
                config,
                api,
                connector,
                config::ConfigEdits {
                    schedule,
                    threshold_days,
                    notify_on_failure,
                    auto_create_records,
                },
                json,
            )
            .await
        }
        Commands::History { connector, limit } => {
            history::run_history(config, api, connector, limit, json, plain).await
        }
    }
}

fn report_failure(error: &HublinkError, plain: bool) {
    use std::io::IsTerminal;
    if !plain && std::io::stderr().is_terminal() {
        use colored::Colorize;
        eprintln!("{} {error}", "error:".red().bold());
    } else {
        eprintln!("error: {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Verify jemalloc is the global allocator by advancing the epoch.
        // Only jemalloc supports this -- the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn connector_parsing_is_case_insensitive() {
        assert_eq!(parse_connector("Salesforce").unwrap(), ConnectorId::Salesforce);
        assert_eq!(parse_connector("JIRA").unwrap(), ConnectorId::Jira);
        assert!(parse_connector("hubspot").is_err());
    }

    #[test]
    fn cli_parses_a_sync_invocation() {
        let cli = Cli::try_parse_from([
            "hublink", "sync", "salesforce", "--objects", "contact,account",
        ])
        .unwrap();
        match cli.command {
            Commands::Sync {
                connector,
                full,
                objects,
            } => {
                assert_eq!(connector, ConnectorId::Salesforce);
                assert!(!full);
                assert_eq!(
                    objects,
                    Some(vec!["contact".to_string(), "account".to_string()])
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_parses_a_config_edit() {
        let cli = Cli::try_parse_from([
            "hublink",
            "config",
            "jira",
            "--schedule",
            "daily",
            "--threshold-days",
            "14",
        ])
        .unwrap();
        match cli.command {
            Commands::Config {
                connector,
                schedule,
                threshold_days,
                ..
            } => {
                assert_eq!(connector, ConnectorId::Jira);
                assert_eq!(schedule, Some(hublink_core::types::SyncSchedule::Daily));
                assert_eq!(threshold_days, Some(14));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
