// SPDX-FileCopyrightText: 2026 Hublink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The connector descriptor table.
//!
//! One parametrized controller drives all four integrations; everything
//! connector-specific (path prefix, auth kind, capability flags) lives in
//! a [`ConnectorDescriptor`] looked up from this table.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::types::AuthKind;

/// One external system integration exposed through the identical
/// status/connect/sync/config/history contract.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConnectorId {
    Salesforce,
    Zendesk,
    Docusign,
    Jira,
}

impl ConnectorId {
    /// Looks up the static descriptor for this connector.
    pub fn descriptor(self) -> &'static ConnectorDescriptor {
        &DESCRIPTORS[self as usize]
    }

    /// The `success` query parameter value the OAuth redirect carries for
    /// this connector (`?success=salesforce_connected`).
    pub fn callback_success_detail(self) -> String {
        format!("{self}_connected")
    }
}

/// Static description of one connector: everything the parametrized panel
/// needs that differs between integrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorDescriptor {
    pub id: ConnectorId,
    pub display_name: &'static str,
    /// Path prefix under the backend base URL, without trailing slash.
    pub path_prefix: &'static str,
    pub auth: AuthKind,
    pub capabilities: ConnectorCapabilities,
}

/// Capability flags gating which affordances a panel offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectorCapabilities {
    /// Supports bidirectional field mappings and a conflict resolution
    /// policy.
    pub bidirectional: bool,
    /// Supports a non-production environment flag at connect time
    /// (Salesforce sandbox, DocuSign demo).
    pub environment_select: bool,
    /// Supports syncing a subset of object types.
    pub object_subset_sync: bool,
}

// Index order must match the ConnectorId discriminants.
static DESCRIPTORS: [ConnectorDescriptor; 4] = [
    ConnectorDescriptor {
        id: ConnectorId::Salesforce,
        display_name: "Salesforce",
        path_prefix: "/integrations/salesforce",
        auth: AuthKind::OAuth,
        capabilities: ConnectorCapabilities {
            bidirectional: true,
            environment_select: true,
            object_subset_sync: true,
        },
    },
    ConnectorDescriptor {
        id: ConnectorId::Zendesk,
        display_name: "Zendesk",
        path_prefix: "/integrations/zendesk",
        auth: AuthKind::ApiToken,
        capabilities: ConnectorCapabilities {
            bidirectional: true,
            environment_select: false,
            object_subset_sync: true,
        },
    },
    ConnectorDescriptor {
        id: ConnectorId::Docusign,
        display_name: "DocuSign",
        path_prefix: "/integrations/docusign",
        auth: AuthKind::OAuth,
        capabilities: ConnectorCapabilities {
            bidirectional: false,
            environment_select: true,
            object_subset_sync: false,
        },
    },
    ConnectorDescriptor {
        id: ConnectorId::Jira,
        display_name: "Jira",
        path_prefix: "/integrations/jira",
        auth: AuthKind::ApiToken,
        capabilities: ConnectorCapabilities {
            bidirectional: true,
            environment_select: false,
            object_subset_sync: true,
        },
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn every_connector_has_a_matching_descriptor() {
        for id in ConnectorId::iter() {
            let desc = id.descriptor();
            assert_eq!(desc.id, id, "descriptor table out of order for {id}");
            assert!(desc.path_prefix.starts_with("/integrations/"));
            assert!(!desc.path_prefix.ends_with('/'));
        }
    }

    #[test]
    fn connector_id_round_trips_through_display() {
        for id in ConnectorId::iter() {
            let parsed = ConnectorId::from_str(&id.to_string()).unwrap();
            assert_eq!(parsed, id);
        }
    }

    #[test]
    fn oauth_connectors_support_environment_select() {
        assert_eq!(ConnectorId::Salesforce.descriptor().auth, AuthKind::OAuth);
        assert_eq!(ConnectorId::Docusign.descriptor().auth, AuthKind::OAuth);
        assert!(ConnectorId::Salesforce.descriptor().capabilities.environment_select);
        assert!(!ConnectorId::Zendesk.descriptor().capabilities.environment_select);
    }

    #[test]
    fn token_connectors_use_api_token_auth() {
        assert_eq!(ConnectorId::Zendesk.descriptor().auth, AuthKind::ApiToken);
        assert_eq!(ConnectorId::Jira.descriptor().auth, AuthKind::ApiToken);
    }

    #[test]
    fn callback_success_detail_matches_wire_convention() {
        assert_eq!(
            ConnectorId::Salesforce.callback_success_detail(),
            "salesforce_connected"
        );
        assert_eq!(
            ConnectorId::Docusign.callback_success_detail(),
            "docusign_connected"
        );
    }

    #[test]
    fn connector_id_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ConnectorId::Docusign).unwrap(),
            "\"docusign\""
        );
    }
}
