// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `CallbackResultPort` implementation over a navigation URL.
//!
//! The OAuth redirect lands on the panel URL carrying
//! `?success=<connector>_connected` or `?error=<message>`. This port parses
//! those parameters once at construction and hands the result out exactly
//! once; `sanitized_url` is the same URL with the parameters stripped, the
//! equivalent of `history.replaceState` so a reload cannot replay the
//! transition.

use tracing::debug;

use hublink_core::types::{CallbackKind, CallbackResult};
use hublink_core::{CallbackResultPort, HublinkError};

/// One-shot callback port backed by a parsed navigation URL.
pub struct UrlCallbackPort {
    pending: Option<CallbackResult>,
    sanitized: String,
}

impl UrlCallbackPort {
    /// Parses the navigation URL, extracting at most one callback result.
    ///
    /// When both parameters are somehow present, `success` wins; the
    /// sanitized URL drops both either way.
    pub fn from_url(raw: &str) -> Result<Self, HublinkError> {
        let mut url = url::Url::parse(raw).map_err(|e| {
            HublinkError::Internal(format!("unparseable navigation url {raw}: {e}"))
        })?;

        let mut success = None;
        let mut error = None;
        let mut kept: Vec<(String, String)> = Vec::new();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "success" => success = Some(value.into_owned()),
                "error" => error = Some(value.into_owned()),
                _ => kept.push((key.into_owned(), value.into_owned())),
            }
        }

        let pending = if let Some(detail) = success {
            Some(CallbackResult {
                kind: CallbackKind::Success,
                detail,
            })
        } else {
            error.map(|detail| CallbackResult {
                kind: CallbackKind::Error,
                detail,
            })
        };

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept).finish();
        }

        if pending.is_some() {
            debug!(url = %url, "callback parameters stripped from navigation url");
        }

        Ok(Self {
            pending,
            sanitized: url.to_string(),
        })
    }

    /// The navigation URL with the callback parameters removed.
    pub fn sanitized_url(&self) -> &str {
        &self.sanitized
    }
}

impl CallbackResultPort for UrlCallbackPort {
    fn consume(&mut self) -> Option<CallbackResult> {
        self.pending.take()
    }
}
