// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connector lifecycle controller for the Hublink integration client.
//!
//! One parametrized implementation drives every connector: the connection
//! state machine, sync coordination, config editing, and the history feed,
//! composed per connector descriptor by [`panel::ConnectorPanel`].

pub mod callback;
pub mod editor;
pub mod history;
pub mod lifecycle;
pub mod panel;
pub mod status;
pub mod sync;

pub use callback::UrlCallbackPort;
pub use editor::{ConfigEditor, SaveDisposition};
pub use history::HistoryFeed;
pub use lifecycle::{ConnectOptions, ConnectionLifecycle, LifecycleState};
pub use panel::{
    AlertsView, ConnectorPanel, HistoryView, OverviewView, PanelAction, SettingsView, Tab,
};
pub use status::StatusRepository;
pub use sync::{SyncCoordinator, SyncDisposition};
