// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Hublink integration client.

use thiserror::Error;

/// The primary error type used across the Hublink trait seams and controller
/// components.
///
/// Variants follow the action taxonomy of the backend contract: configuration
/// and auth problems are server-declared facts, connection errors are
/// transport failures during connect/disconnect, sync errors carry the
/// server's error list verbatim, and validation errors never leave the client.
#[derive(Debug, Error)]
pub enum HublinkError {
    /// Integration not configured server-side (missing app credentials).
    /// Terminal for the affected connector; no retry affordance.
    #[error("integration not configured: {0}")]
    Configuration(String),

    /// Token invalid or expired. Surfaced with a reconnect prompt,
    /// never auto-retried.
    #[error("authorization error: {0}")]
    Auth(String),

    /// Transport failure while connecting or disconnecting.
    #[error("connection error: {message}")]
    Connection {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A sync run failed in whole or part. `errors` is the server's
    /// error list, shown verbatim.
    #[error("sync error: {message}")]
    Sync { message: String, errors: Vec<String> },

    /// Local configuration bounds violated. Raised before any request
    /// is sent.
    #[error("validation error: {0}")]
    Validation(String),

    /// Client-side refusal because the server-reported circuit breaker
    /// is open.
    #[error("circuit breaker open after {failures} failures")]
    CircuitOpen { failures: u32 },

    /// An operation was attempted from a lifecycle state that does not
    /// permit it (e.g. a second connect while one is pending).
    #[error("cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: String,
    },

    /// Unexpected HTTP status or malformed payload from the backend.
    #[error("api error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
