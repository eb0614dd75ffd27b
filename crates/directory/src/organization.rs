use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use tenderflow_core::{OrganizationId, Username};

/// Legal form of an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrganizationType {
    /// Individual entrepreneur.
    #[serde(rename = "IE")]
    IndividualEntrepreneur,
    #[serde(rename = "LLC")]
    Llc,
    #[serde(rename = "JSC")]
    Jsc,
}

/// An organization and the users allowed to act on its behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub organization_type: OrganizationType,
    #[serde(default)]
    pub responsibles: BTreeSet<Username>,
}

impl Organization {
    pub fn new(name: impl Into<String>, organization_type: OrganizationType) -> Self {
        Self {
            id: OrganizationId::new(),
            name: name.into(),
            description: None,
            organization_type,
            responsibles: BTreeSet::new(),
        }
    }

    pub fn with_responsible(mut self, username: impl Into<Username>) -> Self {
        self.responsibles.insert(username.into());
        self
    }

    pub fn is_responsible(&self, username: &Username) -> bool {
        self.responsibles.contains(username)
    }
}
