// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./hublink.toml` > `~/.config/hublink/hublink.toml` > `/etc/hublink/hublink.toml`
//! with environment variable overrides via `HUBLINK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::HublinkConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/hublink/hublink.toml` (system-wide)
/// 3. `~/.config/hublink/hublink.toml` (user XDG config)
/// 4. `./hublink.toml` (local directory)
/// 5. `HUBLINK_*` environment variables
pub fn load_config() -> Result<HublinkConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a specific TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<HublinkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HublinkConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<HublinkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HublinkConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for
/// diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(HublinkConfig::default()))
        .merge(Toml::file("/etc/hublink/hublink.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("hublink/hublink.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("hublink.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `HUBLINK_BACKEND_BASE_URL` must map to
/// `backend.base_url`, not `backend.base.url`.
fn env_provider() -> Env {
    Env::prefixed("HUBLINK_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: HUBLINK_BACKEND_BASE_URL -> "backend_base_url"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("backend_", "backend.", 1)
            .replacen("user_", "user.", 1)
            .replacen("oauth_", "oauth.", 1)
            .replacen("cli_", "cli.", 1);
        mapped.into()
    })
}
