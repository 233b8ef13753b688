// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for the Hublink controller: recording mock adapters and
//! snapshot factories, enabling fast, CI-runnable tests without a backend
//! or a browser.

pub mod mock_api;
pub mod mock_browser;

pub use mock_api::{ApiCall, MockIntegrationApi};
pub use mock_browser::{RecordingNavigator, StaticCallbackPort};

use chrono::{TimeZone, Utc};
use hublink_core::types::{
    BreakerState, CircuitBreaker, ConnectionDetail, ConnectionStatus, EnvironmentFlag,
    SyncConfig, SyncCounts, SyncLog, SyncRunStatus, SyncSchedule,
};
use hublink_core::ConnectorId;

/// A connected snapshot with a default config, the baseline for most
/// controller tests.
pub fn connected_status(connector: ConnectorId) -> ConnectionStatus {
    let descriptor = connector.descriptor();
    ConnectionStatus {
        configured: true,
        connected: true,
        last_sync_at: Some(Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()),
        last_sync_status: Some(SyncRunStatus::Completed),
        records_synced: Some(128),
        sync_errors: Vec::new(),
        connection: Some(ConnectionDetail {
            endpoint_identity: format!("{connector}.example.test"),
            auth_type: descriptor.auth,
            token_valid: true,
            environment: EnvironmentFlag::Production,
            config: SyncConfig {
                sync_schedule: SyncSchedule::Hourly,
                match_by_email: true,
                ..SyncConfig::default()
            },
        }),
        circuit_breaker: Some(CircuitBreaker {
            state: BreakerState::Closed,
            failures: 0,
        }),
    }
}

/// A connected snapshot whose circuit breaker is open.
pub fn breaker_open_status(connector: ConnectorId, failures: u32) -> ConnectionStatus {
    let mut status = connected_status(connector);
    status.circuit_breaker = Some(CircuitBreaker {
        state: BreakerState::Open,
        failures,
    });
    status
}

/// An unconfigured snapshot (missing server-side app credentials).
pub fn unconfigured_status() -> ConnectionStatus {
    ConnectionStatus {
        configured: false,
        ..ConnectionStatus::disconnected()
    }
}

/// A sync log entry with the given status, minutes after an arbitrary epoch
/// so ordering assertions are deterministic.
pub fn sync_log(id: &str, minutes: u32, status: SyncRunStatus, failed: u64) -> SyncLog {
    let started = Utc
        .with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .unwrap()
        + chrono::Duration::minutes(i64::from(minutes));
    SyncLog {
        id: id.to_string(),
        sync_type: "incremental".into(),
        object_type: "contact".into(),
        counts: SyncCounts {
            processed: 10,
            created: 1,
            updated: 9 - failed.min(9),
            failed,
            skipped: 0,
        },
        status,
        started_at: started,
        completed_at: Some(started + chrono::Duration::minutes(1)),
        error_details: if failed > 0 {
            vec![format!("{failed} records failed")]
        } else {
            Vec::new()
        },
    }
}
