// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the integration backend.
//!
//! Implements [`IntegrationApi`] over reqwest. Paths are assembled from the
//! connector descriptor's prefix, so one client serves every connector.
//! Retries are never attempted here: duplicate suppression is the
//! controller's job and the next attempt is always user-initiated.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use hublink_core::types::{
    ConfigPatch, ConnectRequest, ConnectResponse, ConnectionStatus, HistoryResponse, SyncKind,
    SyncLog, SyncRunSummary,
};
use hublink_core::{ConnectorId, HublinkError, IntegrationApi};

/// Error envelope the backend uses for non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

/// reqwest-backed implementation of the integration contract.
#[derive(Debug, Clone)]
pub struct HttpIntegrationApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIntegrationApi {
    /// Creates a client rooted at the backend base URL.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, HublinkError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HublinkError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, connector: ConnectorId, leaf: &str) -> String {
        format!(
            "{}{}/{leaf}",
            self.base_url,
            connector.descriptor().path_prefix
        )
    }

    /// Maps a non-2xx response to the error taxonomy: auth statuses become
    /// `Auth`, a 404 means the integration is not configured server-side,
    /// and everything else carries the server's error text verbatim.
    async fn response_error(response: reqwest::Response) -> HublinkError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(parsed) => parsed.error,
            Err(_) if body.is_empty() => format!("backend returned {status}"),
            Err(_) => format!("backend returned {status}: {body}"),
        };
        match status.as_u16() {
            401 | 403 => HublinkError::Auth(message),
            404 => HublinkError::Configuration(message),
            _ => HublinkError::Api {
                message,
                status: Some(status.as_u16()),
            },
        }
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, HublinkError> {
        let status = response.status();
        let body = response.text().await.map_err(|e| HublinkError::Api {
            message: format!("failed to read response body: {e}"),
            status: Some(status.as_u16()),
        })?;
        serde_json::from_str(&body).map_err(|e| HublinkError::Api {
            message: format!("failed to parse backend response: {e}"),
            status: Some(status.as_u16()),
        })
    }
}

#[async_trait]
impl IntegrationApi for HttpIntegrationApi {
    async fn fetch_status(
        &self,
        connector: ConnectorId,
        user_id: &str,
    ) -> Result<ConnectionStatus, HublinkError> {
        let url = self.endpoint(connector, "status");
        let response = self
            .client
            .get(&url)
            .query(&[("userId", user_id)])
            .send()
            .await
            .map_err(|e| HublinkError::Api {
                message: format!("status request failed: {e}"),
                status: None,
            })?;
        debug!(connector = %connector, status = %response.status(), "status response received");
        if !response.status().is_success() {
            return Err(Self::response_error(response).await);
        }
        Self::parse_json(response).await
    }

    async fn connect(
        &self,
        connector: ConnectorId,
        request: &ConnectRequest,
    ) -> Result<ConnectResponse, HublinkError> {
        let url = self.endpoint(connector, "connect");
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| HublinkError::Connection {
                message: format!("connect request failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        debug!(connector = %connector, status = %response.status(), "connect response received");
        if !response.status().is_success() {
            return Err(Self::response_error(response).await);
        }
        Self::parse_json(response).await
    }

    async fn disconnect(
        &self,
        connector: ConnectorId,
        user_id: &str,
    ) -> Result<(), HublinkError> {
        let url = self.endpoint(connector, "disconnect");
        let response = self
            .client
            .delete(&url)
            .json(&serde_json::json!({ "userId": user_id }))
            .send()
            .await
            .map_err(|e| HublinkError::Connection {
                message: format!("disconnect request failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        debug!(connector = %connector, status = %response.status(), "disconnect response received");
        if !response.status().is_success() {
            return Err(Self::response_error(response).await);
        }
        Ok(())
    }

    async fn trigger_sync(
        &self,
        connector: ConnectorId,
        user_id: &str,
        kind: &SyncKind,
    ) -> Result<SyncRunSummary, HublinkError> {
        let url = self.endpoint(connector, "sync");
        let mut body = serde_json::to_value(kind)
            .map_err(|e| HublinkError::Internal(format!("unserializable sync kind: {e}")))?;
        match body.as_object_mut() {
            Some(map) => map.insert("userId".into(), user_id.into()),
            None => {
                return Err(HublinkError::Internal(
                    "sync kind did not serialize to an object".into(),
                ))
            }
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| HublinkError::Api {
                message: format!("sync request failed: {e}"),
                status: None,
            })?;
        debug!(connector = %connector, status = %response.status(), "sync response received");
        if !response.status().is_success() {
            return Err(Self::response_error(response).await);
        }
        Self::parse_json(response).await
    }

    async fn update_config(
        &self,
        connector: ConnectorId,
        user_id: &str,
        patch: &ConfigPatch,
    ) -> Result<ConnectionStatus, HublinkError> {
        let url = self.endpoint(connector, "config");
        let body = serde_json::json!({ "userId": user_id, "config": patch });
        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| HublinkError::Api {
                message: format!("config request failed: {e}"),
                status: None,
            })?;
        debug!(connector = %connector, status = %response.status(), "config response received");
        if !response.status().is_success() {
            return Err(Self::response_error(response).await);
        }
        Self::parse_json(response).await
    }

    async fn fetch_history(
        &self,
        connector: ConnectorId,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<SyncLog>, HublinkError> {
        let url = self.endpoint(connector, "history");
        let response = self
            .client
            .get(&url)
            .query(&[("userId", user_id), ("limit", &limit.to_string())])
            .send()
            .await
            .map_err(|e| HublinkError::Api {
                message: format!("history request failed: {e}"),
                status: None,
            })?;
        debug!(connector = %connector, status = %response.status(), "history response received");
        if !response.status().is_success() {
            return Err(Self::response_error(response).await);
        }
        let envelope: HistoryResponse = Self::parse_json(response).await?;
        Ok(envelope.logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> HttpIntegrationApi {
        HttpIntegrationApi::new(&server.uri(), Duration::from_secs(3)).unwrap()
    }

    fn status_body() -> serde_json::Value {
        serde_json::json!({
            "configured": true,
            "connected": true,
            "lastSyncAt": "2026-03-01T08:30:00Z",
            "lastSyncStatus": "completed",
            "recordsSynced": 42,
            "connection": {
                "endpointIdentity": "acme.my.salesforce.com",
                "authType": "oauth",
                "tokenValid": true,
                "environment": "production",
                "config": {"syncSchedule": "hourly"}
            },
            "circuitBreaker": {"state": "CLOSED", "failures": 0}
        })
    }

    #[tokio::test]
    async fn fetch_status_hits_the_connector_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/integrations/salesforce/status"))
            .and(query_param("userId", "u-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(status_body()))
            .mount(&server)
            .await;

        let status = test_client(&server)
            .fetch_status(ConnectorId::Salesforce, "u-1")
            .await
            .unwrap();
        assert!(status.connected);
        assert_eq!(status.records_synced, Some(42));
    }

    #[tokio::test]
    async fn connect_posts_the_sandbox_flag_and_reads_the_auth_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/integrations/salesforce/connect"))
            .and(body_partial_json(serde_json::json!({
                "userId": "u-1",
                "environmentFlag": "sandbox",
                "authType": "oauth"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"authUrl": "https://x"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let response = test_client(&server)
            .connect(
                ConnectorId::Salesforce,
                &ConnectRequest {
                    user_id: "u-1".into(),
                    environment_flag: Some(hublink_core::EnvironmentFlag::Sandbox),
                    auth_type: Some(hublink_core::AuthKind::OAuth),
                    credentials: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(response.auth_url.as_deref(), Some("https://x"));
        assert!(!response.success);
    }

    #[tokio::test]
    async fn unauthorized_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/integrations/jira/status"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"error": "token expired"})),
            )
            .mount(&server)
            .await;

        let err = test_client(&server)
            .fetch_status(ConnectorId::Jira, "u-1")
            .await
            .unwrap_err();
        match err {
            HublinkError::Auth(message) => assert_eq!(message, "token expired"),
            other => panic!("expected auth error, got {other}"),
        }
    }

    #[tokio::test]
    async fn missing_integration_maps_to_configuration_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/integrations/docusign/status"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"error": "docusign app not configured"})),
            )
            .mount(&server)
            .await;

        let err = test_client(&server)
            .fetch_status(ConnectorId::Docusign, "u-1")
            .await
            .unwrap_err();
        match err {
            HublinkError::Configuration(message) => {
                assert_eq!(message, "docusign app not configured");
            }
            other => panic!("expected configuration error, got {other}"),
        }
    }

    #[tokio::test]
    async fn server_error_text_is_carried_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/integrations/zendesk/sync"))
            .respond_with(
                ResponseTemplate::new(503)
                    .set_body_json(serde_json::json!({"error": "zendesk api unavailable"})),
            )
            .mount(&server)
            .await;

        let err = test_client(&server)
            .trigger_sync(ConnectorId::Zendesk, "u-1", &SyncKind::Full)
            .await
            .unwrap_err();
        match err {
            HublinkError::Api { message, status } => {
                assert_eq!(message, "zendesk api unavailable");
                assert_eq!(status, Some(503));
            }
            other => panic!("expected api error, got {other}"),
        }
    }

    #[tokio::test]
    async fn sync_body_carries_the_kind_discriminator() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/integrations/jira/sync"))
            .and(body_partial_json(serde_json::json!({
                "userId": "u-1",
                "kind": "objects",
                "object_types": ["issue", "project"]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"status": "completed"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let summary = test_client(&server)
            .trigger_sync(
                ConnectorId::Jira,
                "u-1",
                &SyncKind::Objects {
                    object_types: vec!["issue".into(), "project".into()],
                },
            )
            .await
            .unwrap();
        assert_eq!(summary.status, hublink_core::SyncRunStatus::Completed);
    }

    #[tokio::test]
    async fn update_config_sends_exactly_the_changed_keys() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/integrations/salesforce/config"))
            .respond_with(ResponseTemplate::new(200).set_body_json(status_body()))
            .mount(&server)
            .await;

        let patch = ConfigPatch {
            inactivity_threshold_days: Some(14),
            ..ConfigPatch::default()
        };
        test_client(&server)
            .update_config(ConnectorId::Salesforce, "u-1", &patch)
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let config = body["config"].as_object().unwrap();
        // A payload whose keys are exactly the changed set.
        assert_eq!(config.len(), 1);
        assert_eq!(config["inactivityThresholdDays"], 14);
    }

    #[tokio::test]
    async fn history_parses_the_log_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/integrations/docusign/history"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "logs": [{
                    "id": "log-1",
                    "sync_type": "full",
                    "object_type": "envelope",
                    "processed": 3, "created": 1, "updated": 2, "failed": 0, "skipped": 0,
                    "status": "completed",
                    "started_at": "2026-03-01T08:00:00Z",
                    "completed_at": "2026-03-01T08:01:00Z"
                }]
            })))
            .mount(&server)
            .await;

        let logs = test_client(&server)
            .fetch_history(ConnectorId::Docusign, "u-1", 5)
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].counts.processed, 3);
    }

    #[tokio::test]
    async fn disconnect_accepts_an_empty_200() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/integrations/zendesk/disconnect"))
            .and(body_partial_json(serde_json::json!({"userId": "u-1"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        test_client(&server)
            .disconnect(ConnectorId::Zendesk, "u-1")
            .await
            .unwrap();
    }
}
