// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as a parseable backend URL and a sane history limit.

use crate::diagnostic::ConfigError;
use crate::model::HublinkConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)`
/// with all collected validation errors (does not fail fast).
pub fn validate_config(config: &HublinkConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    match url::Url::parse(config.backend.base_url.trim()) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
        Ok(parsed) => errors.push(ConfigError::Validation {
            message: format!(
                "backend.base_url must use http or https, got `{}`",
                parsed.scheme()
            ),
        }),
        Err(e) => errors.push(ConfigError::Validation {
            message: format!(
                "backend.base_url `{}` is not a valid URL: {e}",
                config.backend.base_url
            ),
        }),
    }

    if config.backend.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "backend.request_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.user.id.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "user.id must not be empty".to_string(),
        });
    }

    // Accept valid IPv4, IPv6, or hostname patterns for the callback host.
    let host = config.oauth.callback_host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "oauth.callback_host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!(
                    "oauth.callback_host `{host}` is not a valid IP address or hostname"
                ),
            });
        }
    }

    if config.cli.history_limit == 0 || config.cli.history_limit > 100 {
        errors.push(ConfigError::Validation {
            message: format!(
                "cli.history_limit must be between 1 and 100, got {}",
                config.cli.history_limit
            ),
        });
    }

    if !LOG_LEVELS.contains(&config.cli.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "cli.log_level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.cli.log_level
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
