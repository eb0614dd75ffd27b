use thiserror::Error;

use tenderflow_core::{BidAuthor, DomainError, OrganizationId, Username};
use tenderflow_directory::Directory;

use crate::Action;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("user '{0}' does not exist")]
    UserNotExists(Username),

    #[error("user '{actor}' may not {action}")]
    NoRights { actor: Username, action: &'static str },
}

impl From<AuthzError> for DomainError {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::UserNotExists(username) => DomainError::UserNotExists(username.to_string()),
            e @ AuthzError::NoRights { .. } => DomainError::NoRights(e.to_string()),
        }
    }
}

/// Decide whether `actor` may perform `action`.
///
/// - No IO beyond directory lookups
/// - Unknown actors are rejected before any ownership rule is consulted
pub fn authorize<D>(directory: &D, actor: &Username, action: &Action<'_>) -> Result<(), AuthzError>
where
    D: Directory + ?Sized,
{
    if !directory.user_exists(actor) {
        return Err(AuthzError::UserNotExists(actor.clone()));
    }

    let allowed = match action {
        Action::View => true,
        Action::ManageTender { organization } => directory.is_responsible(*organization, actor),
        Action::ManageBid { author } => acts_for(directory, actor, author),
        Action::Decide {
            tender_organization,
            author,
        } => {
            directory.is_responsible(*tender_organization, actor)
                && !acts_for(directory, actor, author)
        }
        Action::Review {
            tender_organization,
        } => directory.is_responsible(*tender_organization, actor),
    };

    if allowed {
        Ok(())
    } else {
        Err(AuthzError::NoRights {
            actor: actor.clone(),
            action: action.name(),
        })
    }
}

/// Whether `actor` speaks for the bid author (is the user, or a responsible of the organization).
fn acts_for<D>(directory: &D, actor: &Username, author: &BidAuthor) -> bool
where
    D: Directory + ?Sized,
{
    match author {
        BidAuthor::User(user) => user == actor,
        BidAuthor::Organization(org) => directory.is_responsible(*org, actor),
    }
}

/// Authorization guard bound to a directory.
#[derive(Debug, Clone)]
pub struct Guard<D> {
    directory: D,
}

impl<D> Guard<D>
where
    D: Directory,
{
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn authorize(&self, actor: &Username, action: Action<'_>) -> Result<(), AuthzError> {
        let outcome = authorize(&self.directory, actor, &action);
        if let Err(e) = &outcome {
            tracing::debug!(actor = %actor, action = action.name(), error = %e, "authorization denied");
        }
        outcome
    }

    /// Shorthand for [`Action::View`]: the actor only has to exist.
    pub fn ensure_user(&self, actor: &Username) -> Result<(), AuthzError> {
        self.authorize(actor, Action::View)
    }

    /// Current responsible users of `organization`.
    pub fn responsibles_of(&self, organization: OrganizationId) -> std::collections::HashSet<Username> {
        self.directory.responsibles_of(organization)
    }
}
