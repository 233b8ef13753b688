// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-connector connection state machine.
//!
//! One tagged union replaces the ad hoc `connecting`/`disconnecting`
//! booleans of a hand-written panel, so illegal combinations such as
//! "connecting while connected" are unrepresentable. The machine never
//! infers `Connected` from a callback alone: the callback is a hint to
//! refetch, the server snapshot is the truth.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use hublink_core::types::{
    CallbackKind, CallbackResult, ConnectCredentials, ConnectRequest, ConnectionStatus,
    EnvironmentFlag,
};
use hublink_core::{
    CallbackResultPort, ConnectorDescriptor, HublinkError, IntegrationApi, Navigator,
};

use crate::status::StatusRepository;

/// States of the connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// Missing server-side app credentials; terminal, no actions available.
    Unconfigured,
    /// Configured but not connected.
    Disconnected,
    /// User-initiated connect awaiting the authorization redirect.
    Connecting,
    /// Holds a valid snapshot with `connected: true`.
    Connected,
    /// User-initiated teardown in flight.
    Disconnecting,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Unconfigured => write!(f, "unconfigured"),
            LifecycleState::Disconnected => write!(f, "disconnected"),
            LifecycleState::Connecting => write!(f, "connecting"),
            LifecycleState::Connected => write!(f, "connected"),
            LifecycleState::Disconnecting => write!(f, "disconnecting"),
        }
    }
}

/// Caller-supplied options for `initiate_connect`.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// Non-production target (Salesforce sandbox, DocuSign demo).
    pub environment: Option<EnvironmentFlag>,
    /// Credentials for the synchronous API-token path.
    pub credentials: Option<ConnectCredentials>,
}

/// Drives one connector's connection state machine.
pub struct ConnectionLifecycle {
    descriptor: &'static ConnectorDescriptor,
    api: Arc<dyn IntegrationApi>,
    repo: Arc<StatusRepository>,
    navigator: Arc<dyn Navigator>,
    state: RwLock<LifecycleState>,
}

impl ConnectionLifecycle {
    pub fn new(
        descriptor: &'static ConnectorDescriptor,
        api: Arc<dyn IntegrationApi>,
        repo: Arc<StatusRepository>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            descriptor,
            api,
            repo,
            navigator,
            state: RwLock::new(LifecycleState::Disconnected),
        }
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    fn derive(status: &ConnectionStatus) -> LifecycleState {
        if !status.configured {
            LifecycleState::Unconfigured
        } else if status.connected {
            LifecycleState::Connected
        } else {
            LifecycleState::Disconnected
        }
    }

    async fn set_state(&self, next: LifecycleState) {
        *self.state.write().await = next;
    }

    /// Mount-time initialization: consumes the pending callback result
    /// exactly once, then forces a status fetch and derives the state from
    /// the snapshot.
    ///
    /// Returns the consumed result when it is relevant to this connector
    /// (a success hint for another connector is consumed but not returned).
    /// The fetch happens regardless of the callback outcome.
    pub async fn initialize(
        &self,
        callbacks: &mut dyn CallbackResultPort,
    ) -> Result<Option<CallbackResult>, HublinkError> {
        let consumed = callbacks.consume();
        let relevant = match consumed {
            Some(result) => match result.kind {
                CallbackKind::Success => {
                    if result.detail == self.descriptor.id.callback_success_detail() {
                        info!(
                            connector = %self.descriptor.id,
                            "authorization callback received, refetching status"
                        );
                        Some(result)
                    } else {
                        debug!(
                            connector = %self.descriptor.id,
                            detail = %result.detail,
                            "ignoring callback addressed to another connector"
                        );
                        None
                    }
                }
                CallbackKind::Error => {
                    warn!(
                        connector = %self.descriptor.id,
                        detail = %result.detail,
                        "authorization callback reported an error"
                    );
                    Some(result)
                }
            },
            None => None,
        };

        let status = self.repo.refresh().await?;
        self.set_state(Self::derive(&status)).await;
        Ok(relevant)
    }

    /// Starts a connect: requests an authorization URL (OAuth) or performs
    /// a synchronous token connect.
    ///
    /// Valid only from `Disconnected`; a second call while one is pending
    /// is rejected, so at most one authorization attempt exists per
    /// lifecycle instance at a time. Transport failure restores the
    /// pre-action state.
    pub async fn initiate_connect(
        &self,
        options: ConnectOptions,
    ) -> Result<LifecycleState, HublinkError> {
        {
            let mut state = self.state.write().await;
            if *state != LifecycleState::Disconnected {
                return Err(HublinkError::InvalidState {
                    action: "connect",
                    state: state.to_string(),
                });
            }
            *state = LifecycleState::Connecting;
        }

        let request = ConnectRequest {
            user_id: self.repo.user_id().to_string(),
            environment_flag: options.environment,
            auth_type: Some(self.descriptor.auth),
            credentials: options.credentials,
        };

        let response = match self.api.connect(self.descriptor.id, &request).await {
            Ok(response) => response,
            Err(e) => {
                self.set_state(LifecycleState::Disconnected).await;
                return Err(e);
            }
        };

        if let Some(auth_url) = response.auth_url {
            if let Err(e) = self.navigator.navigate(&auth_url) {
                self.set_state(LifecycleState::Disconnected).await;
                return Err(e);
            }
            // The app is navigating away; we stay Connecting until a reload
            // observes the callback.
            info!(connector = %self.descriptor.id, "navigated to authorization url");
            Ok(LifecycleState::Connecting)
        } else if response.success {
            let status = match self.repo.refresh().await {
                Ok(status) => status,
                Err(e) => {
                    self.set_state(LifecycleState::Disconnected).await;
                    return Err(e);
                }
            };
            let next = Self::derive(&status);
            self.set_state(next).await;
            info!(connector = %self.descriptor.id, state = %next, "token connect completed");
            Ok(next)
        } else {
            self.set_state(LifecycleState::Disconnected).await;
            Err(HublinkError::Api {
                message: "connect response carried neither authUrl nor success".into(),
                status: None,
            })
        }
    }

    /// Tears down the connection. Valid only from `Connected`.
    ///
    /// The local snapshot flips to disconnected immediately; the outcome is
    /// reconciled against a forced refresh, so a failed disconnect lands
    /// back on `Connected` (the pre-action state) with the error surfaced.
    pub async fn disconnect(&self) -> Result<LifecycleState, HublinkError> {
        {
            let mut state = self.state.write().await;
            if *state != LifecycleState::Connected {
                return Err(HublinkError::InvalidState {
                    action: "disconnect",
                    state: state.to_string(),
                });
            }
            *state = LifecycleState::Disconnecting;
        }

        self.repo.mark_disconnected_locally().await;
        let result = self
            .api
            .disconnect(self.descriptor.id, self.repo.user_id())
            .await;

        let next = match self.repo.refresh().await {
            Ok(status) => Self::derive(&status),
            Err(e) => {
                warn!(
                    connector = %self.descriptor.id,
                    error = %e,
                    "status reconciliation after disconnect failed"
                );
                if result.is_ok() {
                    LifecycleState::Disconnected
                } else {
                    LifecycleState::Connected
                }
            }
        };
        self.set_state(next).await;

        match result {
            Ok(()) => {
                info!(connector = %self.descriptor.id, "disconnected");
                Ok(next)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hublink_core::types::ConnectResponse;
    use hublink_core::ConnectorId;
    use hublink_test_utils::{
        connected_status, unconfigured_status, ApiCall, MockIntegrationApi, RecordingNavigator,
        StaticCallbackPort,
    };

    fn fixture(
        connector: ConnectorId,
    ) -> (
        Arc<MockIntegrationApi>,
        Arc<RecordingNavigator>,
        ConnectionLifecycle,
    ) {
        let api = Arc::new(MockIntegrationApi::new());
        let nav = Arc::new(RecordingNavigator::new());
        let repo = Arc::new(StatusRepository::new(api.clone(), connector, "u-1"));
        let lifecycle =
            ConnectionLifecycle::new(connector.descriptor(), api.clone(), repo, nav.clone());
        (api, nav, lifecycle)
    }

    #[tokio::test]
    async fn initialize_derives_state_from_snapshot() {
        let (api, _nav, lifecycle) = fixture(ConnectorId::Salesforce);
        api.set_status(unconfigured_status()).await;

        let mut port = StaticCallbackPort::empty();
        let result = lifecycle.initialize(&mut port).await.unwrap();
        assert!(result.is_none());
        assert_eq!(lifecycle.state().await, LifecycleState::Unconfigured);
    }

    #[tokio::test]
    async fn success_callback_is_a_hint_not_the_truth() {
        let (api, _nav, lifecycle) = fixture(ConnectorId::Salesforce);
        // Server still reports disconnected despite the success param.
        let mut port = StaticCallbackPort::success(ConnectorId::Salesforce);
        lifecycle.initialize(&mut port).await.unwrap();
        assert_eq!(lifecycle.state().await, LifecycleState::Disconnected);

        // Once the server agrees, the same hint lands on Connected.
        api.set_status(connected_status(ConnectorId::Salesforce)).await;
        let mut port = StaticCallbackPort::success(ConnectorId::Salesforce);
        lifecycle.initialize(&mut port).await.unwrap();
        assert_eq!(lifecycle.state().await, LifecycleState::Connected);
    }

    #[tokio::test]
    async fn callback_for_another_connector_is_consumed_but_ignored() {
        let (_api, _nav, lifecycle) = fixture(ConnectorId::Jira);
        let mut port = StaticCallbackPort::success(ConnectorId::Salesforce);
        let relevant = lifecycle.initialize(&mut port).await.unwrap();
        assert!(relevant.is_none());
        assert!(!port.has_pending());
    }

    #[tokio::test]
    async fn error_callback_is_surfaced_and_lands_disconnected() {
        let (_api, _nav, lifecycle) = fixture(ConnectorId::Docusign);
        let mut port = StaticCallbackPort::error("access_denied");
        let relevant = lifecycle.initialize(&mut port).await.unwrap().unwrap();
        assert_eq!(relevant.kind, CallbackKind::Error);
        assert_eq!(relevant.detail, "access_denied");
        assert_eq!(lifecycle.state().await, LifecycleState::Disconnected);
    }

    #[tokio::test]
    async fn oauth_connect_navigates_and_stays_connecting() {
        let (api, nav, lifecycle) = fixture(ConnectorId::Salesforce);
        api.push_connect(Ok(ConnectResponse {
            auth_url: Some("https://x".into()),
            success: false,
        }))
        .await;

        let state = lifecycle
            .initiate_connect(ConnectOptions {
                environment: Some(EnvironmentFlag::Sandbox),
                credentials: None,
            })
            .await
            .unwrap();

        assert_eq!(state, LifecycleState::Connecting);
        assert_eq!(nav.navigations(), vec!["https://x"]);

        // Exactly one outbound connect, carrying the sandbox flag.
        let calls = api.calls().await;
        let connects: Vec<_> = calls.iter().filter(|c| c.is_connect()).collect();
        assert_eq!(connects.len(), 1);
        if let ApiCall::Connect { request, .. } = connects[0] {
            assert_eq!(request.environment_flag, Some(EnvironmentFlag::Sandbox));
        } else {
            unreachable!();
        }
    }

    #[tokio::test]
    async fn second_connect_while_pending_is_rejected() {
        let (api, _nav, lifecycle) = fixture(ConnectorId::Salesforce);
        api.push_connect(Ok(ConnectResponse {
            auth_url: Some("https://x".into()),
            success: false,
        }))
        .await;

        lifecycle
            .initiate_connect(ConnectOptions::default())
            .await
            .unwrap();
        let err = lifecycle
            .initiate_connect(ConnectOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HublinkError::InvalidState { action: "connect", .. }));

        // Exactly one authorization request was produced.
        let calls = api.calls().await;
        assert_eq!(calls.iter().filter(|c| c.is_connect()).count(), 1);
    }

    #[tokio::test]
    async fn token_connect_lands_connected_via_refresh() {
        let (api, nav, lifecycle) = fixture(ConnectorId::Jira);
        // Default connect response is {success: true}; the refresh after it
        // must report connected.
        api.push_status(Ok(connected_status(ConnectorId::Jira))).await;

        let state = lifecycle
            .initiate_connect(ConnectOptions {
                environment: None,
                credentials: Some(ConnectCredentials {
                    endpoint: Some("acme.atlassian.net".into()),
                    email: Some("ops@acme.test".into()),
                    api_token: "tok".into(),
                }),
            })
            .await
            .unwrap();

        assert_eq!(state, LifecycleState::Connected);
        assert!(nav.navigations().is_empty());
    }

    #[tokio::test]
    async fn connect_transport_failure_restores_disconnected() {
        let (api, _nav, lifecycle) = fixture(ConnectorId::Zendesk);
        api.push_connect(Err(HublinkError::Connection {
            message: "dns failure".into(),
            source: None,
        }))
        .await;

        let err = lifecycle
            .initiate_connect(ConnectOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HublinkError::Connection { .. }));
        assert_eq!(lifecycle.state().await, LifecycleState::Disconnected);

        // The guard released: a retry issues a fresh request.
        assert!(lifecycle.initiate_connect(ConnectOptions::default()).await.is_ok());
    }

    #[tokio::test]
    async fn navigation_failure_restores_disconnected() {
        let (api, nav, lifecycle) = fixture(ConnectorId::Docusign);
        api.push_connect(Ok(ConnectResponse {
            auth_url: Some("https://auth.docusign.test".into()),
            success: false,
        }))
        .await;
        nav.fail_navigation();

        let err = lifecycle
            .initiate_connect(ConnectOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HublinkError::Connection { .. }));
        assert_eq!(lifecycle.state().await, LifecycleState::Disconnected);
    }

    #[tokio::test]
    async fn disconnect_round_trip() {
        let (api, _nav, lifecycle) = fixture(ConnectorId::Salesforce);
        api.set_status(connected_status(ConnectorId::Salesforce)).await;
        let mut port = StaticCallbackPort::empty();
        lifecycle.initialize(&mut port).await.unwrap();
        assert_eq!(lifecycle.state().await, LifecycleState::Connected);

        // After teardown the server reports disconnected.
        api.push_status(Ok({
            let mut s = connected_status(ConnectorId::Salesforce);
            s.connected = false;
            s.connection = None;
            s
        }))
        .await;

        let state = lifecycle.disconnect().await.unwrap();
        assert_eq!(state, LifecycleState::Disconnected);
    }

    #[tokio::test]
    async fn disconnect_from_disconnected_is_rejected() {
        let (_api, _nav, lifecycle) = fixture(ConnectorId::Jira);
        let err = lifecycle.disconnect().await.unwrap_err();
        assert!(matches!(
            err,
            HublinkError::InvalidState { action: "disconnect", .. }
        ));
    }

    #[tokio::test]
    async fn failed_disconnect_reconciles_back_to_connected() {
        let (api, _nav, lifecycle) = fixture(ConnectorId::Zendesk);
        api.set_status(connected_status(ConnectorId::Zendesk)).await;
        let mut port = StaticCallbackPort::empty();
        lifecycle.initialize(&mut port).await.unwrap();

        api.push_disconnect(Err(HublinkError::Connection {
            message: "timeout".into(),
            source: None,
        }))
        .await;
        // Reconciliation refresh still reports connected.
        let err = lifecycle.disconnect().await.unwrap_err();
        assert!(matches!(err, HublinkError::Connection { .. }));
        assert_eq!(lifecycle.state().await, LifecycleState::Connected);
        // The optimistic flip was reconciled away.
        let repo_view = api.calls().await;
        assert!(repo_view.iter().any(|c| matches!(c, ApiCall::Disconnect { .. })));
    }

    #[test]
    fn lifecycle_state_display() {
        assert_eq!(LifecycleState::Unconfigured.to_string(), "unconfigured");
        assert_eq!(LifecycleState::Connecting.to_string(), "connecting");
        assert_eq!(LifecycleState::Disconnecting.to_string(), "disconnecting");
    }

    #[test]
    fn derive_prefers_unconfigured_over_connected() {
        let mut status = connected_status(ConnectorId::Salesforce);
        status.configured = false;
        assert_eq!(
            ConnectionLifecycle::derive(&status),
            LifecycleState::Unconfigured
        );
    }
}
