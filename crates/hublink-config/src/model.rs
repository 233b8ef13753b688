// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Hublink client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Hublink configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HublinkConfig {
    /// Integration backend settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Identity of the user the connectors belong to.
    #[serde(default)]
    pub user: UserConfig,

    /// Loopback listener settings for the OAuth redirect.
    #[serde(default)]
    pub oauth: OauthConfig,

    /// CLI behavior settings.
    #[serde(default)]
    pub cli: CliConfig,
}

/// Integration backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Base URL of the integration backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// User identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    /// User id sent with every backend request.
    #[serde(default = "default_user_id")]
    pub id: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: default_user_id(),
        }
    }
}

fn default_user_id() -> String {
    "demo".to_string()
}

/// Loopback OAuth callback listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OauthConfig {
    /// Host the callback listener binds to.
    #[serde(default = "default_callback_host")]
    pub callback_host: String,

    /// Port the callback listener binds to.
    #[serde(default = "default_callback_port")]
    pub callback_port: u16,
}

impl Default for OauthConfig {
    fn default() -> Self {
        Self {
            callback_host: default_callback_host(),
            callback_port: default_callback_port(),
        }
    }
}

fn default_callback_host() -> String {
    "127.0.0.1".to_string()
}

fn default_callback_port() -> u16 {
    3978
}

/// CLI behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Default page size for history listings.
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_history_limit() -> u32 {
    20
}
