use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use serde::Deserialize;
use thiserror::Error;

use tenderflow_core::{OrganizationId, Username};

use crate::{Organization, User};

/// Read-only membership lookups consumed by the authorization guard and the
/// quorum engine.
pub trait Directory: Send + Sync {
    fn user_exists(&self, username: &Username) -> bool;

    fn organization(&self, id: OrganizationId) -> Option<Organization>;

    /// Organizations the user is responsible for.
    fn responsible_orgs_of(&self, username: &Username) -> HashSet<OrganizationId>;

    /// Current responsible users of an organization (empty for unknown ids).
    fn responsibles_of(&self, id: OrganizationId) -> HashSet<Username>;

    fn is_responsible(&self, id: OrganizationId, username: &Username) -> bool {
        self.responsibles_of(id).contains(username)
    }
}

impl<D> Directory for Arc<D>
where
    D: Directory + ?Sized,
{
    fn user_exists(&self, username: &Username) -> bool {
        (**self).user_exists(username)
    }

    fn organization(&self, id: OrganizationId) -> Option<Organization> {
        (**self).organization(id)
    }

    fn responsible_orgs_of(&self, username: &Username) -> HashSet<OrganizationId> {
        (**self).responsible_orgs_of(username)
    }

    fn responsibles_of(&self, id: OrganizationId) -> HashSet<Username> {
        (**self).responsibles_of(id)
    }

    fn is_responsible(&self, id: OrganizationId, username: &Username) -> bool {
        (**self).is_responsible(id, username)
    }
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("malformed directory seed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("organization {organization} lists unknown responsible '{username}'")]
    UnknownResponsible {
        organization: OrganizationId,
        username: Username,
    },

    #[error("unknown organization {0}")]
    UnknownOrganization(OrganizationId),

    #[error("unknown user '{0}'")]
    UnknownUser(Username),
}

#[derive(Debug, Default)]
struct Entries {
    users: HashMap<Username, User>,
    organizations: HashMap<OrganizationId, Organization>,
}

#[derive(Debug, Deserialize)]
struct Seed {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    organizations: Vec<Organization>,
}

/// In-memory directory for tests/dev and for deployments that load a seed file.
///
/// Membership may change at runtime (`add_responsible` / `remove_responsible`);
/// lookups always see the latest membership.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    inner: RwLock<Entries>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from a JSON document `{ "users": [...], "organizations": [...] }`.
    pub fn from_json(json: &str) -> Result<Self, DirectoryError> {
        let seed: Seed = serde_json::from_str(json)?;
        let directory = Self::new();
        for user in seed.users {
            directory.insert_user(user);
        }
        for organization in seed.organizations {
            directory.insert_organization(organization)?;
        }
        Ok(directory)
    }

    pub fn with_user(self, user: User) -> Self {
        self.insert_user(user);
        self
    }

    /// Builder variant of [`insert_organization`](Self::insert_organization).
    pub fn with_organization(self, organization: Organization) -> Result<Self, DirectoryError> {
        self.insert_organization(organization)?;
        Ok(self)
    }

    pub fn insert_user(&self, user: User) {
        self.write().users.insert(user.username.clone(), user);
    }

    pub fn insert_organization(&self, organization: Organization) -> Result<(), DirectoryError> {
        let mut entries = self.write();
        if let Some(unknown) = organization
            .responsibles
            .iter()
            .find(|u| !entries.users.contains_key(*u))
        {
            return Err(DirectoryError::UnknownResponsible {
                organization: organization.id,
                username: unknown.clone(),
            });
        }
        entries.organizations.insert(organization.id, organization);
        Ok(())
    }

    pub fn add_responsible(
        &self,
        id: OrganizationId,
        username: &Username,
    ) -> Result<(), DirectoryError> {
        let mut entries = self.write();
        if !entries.users.contains_key(username) {
            return Err(DirectoryError::UnknownUser(username.clone()));
        }
        let organization = entries
            .organizations
            .get_mut(&id)
            .ok_or(DirectoryError::UnknownOrganization(id))?;
        organization.responsibles.insert(username.clone());
        Ok(())
    }

    pub fn remove_responsible(
        &self,
        id: OrganizationId,
        username: &Username,
    ) -> Result<(), DirectoryError> {
        let mut entries = self.write();
        let organization = entries
            .organizations
            .get_mut(&id)
            .ok_or(DirectoryError::UnknownOrganization(id))?;
        organization.responsibles.remove(username);
        Ok(())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Entries> {
        // Entries are plain maps; a panic while holding the lock cannot leave them torn.
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Entries> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Directory for InMemoryDirectory {
    fn user_exists(&self, username: &Username) -> bool {
        self.read().users.contains_key(username)
    }

    fn organization(&self, id: OrganizationId) -> Option<Organization> {
        self.read().organizations.get(&id).cloned()
    }

    fn responsible_orgs_of(&self, username: &Username) -> HashSet<OrganizationId> {
        self.read()
            .organizations
            .values()
            .filter(|o| o.is_responsible(username))
            .map(|o| o.id)
            .collect()
    }

    fn responsibles_of(&self, id: OrganizationId) -> HashSet<Username> {
        self.read()
            .organizations
            .get(&id)
            .map(|o| o.responsibles.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OrganizationType;

    const SEED: &str = r#"{
        "users": [
            { "id": "0191f3a4-0000-7000-8000-000000000001", "username": "alice" },
            { "id": "0191f3a4-0000-7000-8000-000000000002", "username": "bob", "first_name": "Bob" }
        ],
        "organizations": [
            {
                "id": "0191f3a4-0000-7000-8000-0000000000aa",
                "name": "Acme",
                "type": "LLC",
                "responsibles": ["alice", "bob"]
            }
        ]
    }"#;

    #[test]
    fn seed_json_populates_users_and_memberships() {
        let directory = InMemoryDirectory::from_json(SEED).unwrap();
        let org_id: OrganizationId = "0191f3a4-0000-7000-8000-0000000000aa".parse().unwrap();

        assert!(directory.user_exists(&"alice".into()));
        assert!(!directory.user_exists(&"mallory".into()));
        assert_eq!(directory.responsibles_of(org_id).len(), 2);
        assert!(directory.responsible_orgs_of(&"bob".into()).contains(&org_id));

        let org = directory.organization(org_id).unwrap();
        assert_eq!(org.organization_type, OrganizationType::Llc);
    }

    #[test]
    fn seed_rejects_unknown_responsible() {
        let json = r#"{
            "organizations": [
                { "id": "0191f3a4-0000-7000-8000-0000000000aa", "name": "Ghost", "type": "IE", "responsibles": ["nobody"] }
            ]
        }"#;
        match InMemoryDirectory::from_json(json) {
            Err(DirectoryError::UnknownResponsible { username, .. }) => {
                assert_eq!(username.as_str(), "nobody")
            }
            other => panic!("expected unknown responsible, got {other:?}"),
        }
    }

    #[test]
    fn membership_changes_are_visible_immediately() {
        let directory = InMemoryDirectory::new()
            .with_user(User::new("alice"))
            .with_user(User::new("carol"));
        let org = Organization::new("Acme", OrganizationType::Jsc).with_responsible("alice");
        let org_id = org.id;
        directory.insert_organization(org).unwrap();

        directory.add_responsible(org_id, &"carol".into()).unwrap();
        assert!(directory.is_responsible(org_id, &"carol".into()));

        directory.remove_responsible(org_id, &"alice".into()).unwrap();
        assert!(!directory.is_responsible(org_id, &"alice".into()));
        assert!(directory.responsible_orgs_of(&"alice".into()).is_empty());
    }

    #[test]
    fn unknown_organization_has_no_responsibles() {
        let directory = InMemoryDirectory::new();
        assert!(directory.responsibles_of(OrganizationId::new()).is_empty());
    }
}
