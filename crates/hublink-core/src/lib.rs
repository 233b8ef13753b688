// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Hublink integration client.
//!
//! This crate provides the data model for the connector contract, the
//! error taxonomy, the connector descriptor table, and the trait seams
//! (`IntegrationApi`, `CallbackResultPort`, `Navigator`) the controller
//! components are built against.

pub mod connector;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use connector::{ConnectorCapabilities, ConnectorDescriptor, ConnectorId};
pub use error::HublinkError;
pub use traits::{CallbackResultPort, IntegrationApi, Navigator};
pub use types::{
    AuthKind, BreakerState, CallbackKind, CallbackResult, CircuitBreaker, ConfigPatch,
    ConnectCredentials, ConnectRequest, ConnectResponse, ConnectionDetail, ConnectionStatus,
    ConflictResolution, EnvironmentFlag, FieldMapping, HistoryResponse, MappingDirection,
    SyncConfig, SyncCounts, SyncKind, SyncLog, SyncRunStatus, SyncRunSummary, SyncSchedule,
};
