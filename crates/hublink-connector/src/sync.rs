// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sync trigger coordination.
//!
//! At most one sync per connector is in flight, enforced by a single flag
//! rather than request cancellation. A breaker reported `OPEN` by the last
//! snapshot refuses the trigger before any request is sent, mirroring the
//! server-side backpressure rule for responsiveness.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use hublink_core::types::{BreakerState, SyncKind, SyncRunStatus, SyncRunSummary};
use hublink_core::{HublinkError, IntegrationApi};

use crate::history::HistoryFeed;
use crate::lifecycle::LifecycleState;
use crate::status::StatusRepository;

/// Outcome of a trigger attempt.
#[derive(Debug)]
pub enum SyncDisposition {
    /// The run was issued and resolved with this summary.
    Completed(SyncRunSummary),
    /// A run was already in flight; nothing was issued. The caller keeps
    /// its control disabled via [`SyncCoordinator::is_syncing`].
    AlreadyRunning,
}

/// Issues sync requests against a connected lifecycle.
pub struct SyncCoordinator {
    api: Arc<dyn IntegrationApi>,
    repo: Arc<StatusRepository>,
    in_flight: AtomicBool,
}

impl SyncCoordinator {
    pub fn new(api: Arc<dyn IntegrationApi>, repo: Arc<StatusRepository>) -> Self {
        Self {
            api,
            repo,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether a sync (including its trailing status refresh) is in flight.
    pub fn is_syncing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Triggers one sync run.
    ///
    /// Preconditions, checked before any request is dispatched: the
    /// lifecycle must be `Connected`, and the last snapshot's circuit
    /// breaker must not be `OPEN`. An overlapping call while a run is in
    /// flight resolves to [`SyncDisposition::AlreadyRunning`] without
    /// touching the network.
    ///
    /// On every outcome the canonical snapshot is refreshed before the
    /// trigger is considered finished; `history` (passed when the History
    /// tab is active) is refreshed as well, with failures kept in the
    /// feed's own error slot. Failed runs are never retried automatically.
    pub async fn trigger(
        &self,
        lifecycle_state: LifecycleState,
        kind: SyncKind,
        history: Option<&HistoryFeed>,
    ) -> Result<SyncDisposition, HublinkError> {
        let connector = self.repo.connector();

        if lifecycle_state != LifecycleState::Connected {
            return Err(HublinkError::InvalidState {
                action: "sync",
                state: lifecycle_state.to_string(),
            });
        }

        if let Some(breaker) = self
            .repo
            .snapshot()
            .await
            .and_then(|status| status.circuit_breaker)
            && breaker.state == BreakerState::Open
        {
            debug!(connector = %connector, failures = breaker.failures, "sync refused, breaker open");
            return Err(HublinkError::CircuitOpen {
                failures: breaker.failures,
            });
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!(connector = %connector, "sync already in flight, trigger is a no-op");
            return Ok(SyncDisposition::AlreadyRunning);
        }

        info!(connector = %connector, kind = %kind, "sync triggered");
        let result = self
            .api
            .trigger_sync(connector, self.repo.user_id(), &kind)
            .await;

        // The canonical snapshot is refreshed unconditionally; the action
        // is not finished until this completes.
        let refresh = self.repo.refresh().await;
        if let Some(history) = history {
            history.refresh_after_sync().await;
        }
        self.in_flight.store(false, Ordering::SeqCst);

        match result {
            Ok(summary) => {
                refresh?;
                // A run the server reports as failed surfaces as a sync
                // error; partial writes already committed are not rolled
                // back here.
                if summary.status == SyncRunStatus::Failed {
                    return Err(HublinkError::Sync {
                        message: format!("sync run failed for {connector}"),
                        errors: summary.errors,
                    });
                }
                Ok(SyncDisposition::Completed(summary))
            }
            Err(e) => {
                if let Err(refresh_err) = refresh {
                    warn!(
                        connector = %connector,
                        error = %refresh_err,
                        "status refresh after failed sync also failed"
                    );
                }
                Err(e)
            }
        }
    }
}
