// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Browser-facing capabilities injected into the lifecycle.
//!
//! Abstracting the navigation URL behind [`CallbackResultPort`] makes
//! "consume exactly once" an explicit, checkable contract instead of an
//! implicit side effect of string manipulation, and keeps the lifecycle
//! testable without a real browser.

use crate::error::HublinkError;
use crate::types::CallbackResult;

/// One-shot source of the OAuth redirect result.
pub trait CallbackResultPort: Send {
    /// Returns the pending callback result and marks it consumed.
    /// Every subsequent call returns `None`, so re-navigation (back
    /// button, reload) cannot replay the transition.
    fn consume(&mut self) -> Option<CallbackResult>;
}

/// Capability to navigate the user agent to an external URL
/// (the authorization step of the OAuth flow).
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str) -> Result<(), HublinkError>;
}
