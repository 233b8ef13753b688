// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hublink connect` and `hublink disconnect` command implementations.
//!
//! The OAuth path prints the authorization URL, waits for the redirect on
//! the loopback listener, and re-mounts the panel the way a browser reload
//! would, so the callback is consumed exactly once. The token path
//! completes synchronously.

use std::sync::Arc;

use tracing::info;

use hublink_config::HublinkConfig;
use hublink_connector::{ConnectOptions, ConnectorPanel, LifecycleState, UrlCallbackPort};
use hublink_core::types::{ConnectCredentials, EnvironmentFlag};
use hublink_core::{AuthKind, ConnectorId, HublinkError, IntegrationApi, Navigator};

use crate::callback_server::CallbackServer;
use crate::PANEL_URL;

/// Navigator that hands the authorization URL to the terminal user instead
/// of driving a browser.
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, url: &str) -> Result<(), HublinkError> {
        println!();
        println!("  Open this URL in your browser to authorize:");
        println!();
        println!("    {url}");
        println!();
        info!(url, "authorization url issued");
        Ok(())
    }
}

/// Credentials and environment selection collected from command flags.
pub struct ConnectArgs {
    pub sandbox: bool,
    pub demo: bool,
    pub endpoint: Option<String>,
    pub email: Option<String>,
    pub api_token: Option<String>,
}

/// Run the `hublink connect` command.
pub async fn run_connect(
    config: &HublinkConfig,
    api: Arc<dyn IntegrationApi>,
    connector: ConnectorId,
    args: ConnectArgs,
) -> Result<(), HublinkError> {
    let descriptor = connector.descriptor();
    let options = build_options(connector, &args)?;

    let panel = ConnectorPanel::new(
        api,
        Arc::new(TerminalNavigator),
        connector,
        &config.user.id,
    );
    let mut port = UrlCallbackPort::from_url(PANEL_URL)?;
    panel.mount(&mut port).await;

    // For OAuth connectors, bind the listener before navigating away so the
    // redirect always has somewhere to land.
    let listener = if descriptor.auth == AuthKind::OAuth {
        Some(
            CallbackServer::bind(&config.oauth.callback_host, config.oauth.callback_port)
                .await?,
        )
    } else {
        None
    };

    let state = panel.connect(options).await?;

    match state {
        LifecycleState::Connecting => {
            let listener = listener.ok_or_else(|| {
                HublinkError::Internal("authorization pending without a callback listener".into())
            })?;
            let redirect_url = listener.wait_for_redirect().await?;

            // The redirect is the "reload": a fresh mount consumes the
            // callback once and refetches the canonical snapshot.
            let mut port = UrlCallbackPort::from_url(&redirect_url)?;
            let state = panel.mount(&mut port).await;
            report_outcome(&panel, connector, state).await
        }
        state => report_outcome(&panel, connector, state).await,
    }
}

fn build_options(
    connector: ConnectorId,
    args: &ConnectArgs,
) -> Result<ConnectOptions, HublinkError> {
    let descriptor = connector.descriptor();

    let environment = match (args.sandbox, args.demo) {
        (true, true) => {
            return Err(HublinkError::Validation(
                "pass at most one of --sandbox and --demo".into(),
            ))
        }
        (true, false) => Some(EnvironmentFlag::Sandbox),
        (false, true) => Some(EnvironmentFlag::Demo),
        (false, false) => None,
    };
    if environment.is_some() && !descriptor.capabilities.environment_select {
        return Err(HublinkError::Validation(format!(
            "{} does not support environment selection",
            descriptor.display_name
        )));
    }

    let credentials = match descriptor.auth {
        AuthKind::OAuth => None,
        AuthKind::ApiToken => {
            let api_token = args.api_token.clone().ok_or_else(|| {
                HublinkError::Validation(format!(
                    "{} connects with an API token: pass --api-token",
                    descriptor.display_name
                ))
            })?;
            Some(ConnectCredentials {
                endpoint: args.endpoint.clone(),
                email: args.email.clone(),
                api_token,
            })
        }
    };

    Ok(ConnectOptions {
        environment,
        credentials,
    })
}

async fn report_outcome(
    panel: &ConnectorPanel,
    connector: ConnectorId,
    state: LifecycleState,
) -> Result<(), HublinkError> {
    match state {
        LifecycleState::Connected => {
            println!("  {} connected.", connector.descriptor().display_name);
            Ok(())
        }
        other => {
            let detail = panel
                .error_for(hublink_connector::PanelAction::Connect)
                .await
                .unwrap_or_else(|| format!("connector is {other}"));
            Err(HublinkError::Connection {
                message: format!("connect did not complete: {detail}"),
                source: None,
            })
        }
    }
}

/// Run the `hublink disconnect` command.
pub async fn run_disconnect(
    config: &HublinkConfig,
    api: Arc<dyn IntegrationApi>,
    connector: ConnectorId,
) -> Result<(), HublinkError> {
    let panel = ConnectorPanel::new(
        api,
        Arc::new(TerminalNavigator),
        connector,
        &config.user.id,
    );
    let mut port = UrlCallbackPort::from_url(PANEL_URL)?;
    panel.mount(&mut port).await;

    panel.disconnect().await?;
    println!("  {} disconnected.", connector.descriptor().display_name);
    Ok(())
}
