//! Operation surface of the procurement core.
//!
//! ```text
//! actor + request
//!   ↓
//! 1. Guard: actor exists (UserNotExists)
//!   ↓
//! 2. Load target entity (NotFound)
//!   ↓
//! 3. Guard: ownership rule for the action (NoRights)
//!   ↓
//! 4. VersionStore::execute under the entity lock (Conflict / Validation / Internal)
//! ```
//!
//! Every method takes an already-authenticated actor identity and returns a
//! typed `DomainResult`; transport concerns live outside this crate.

mod bids;
mod decisions;
mod tenders;

use std::sync::Arc;

use tenderflow_auth::{Action, AuthzError, Guard};
use tenderflow_bids::Bid;
use tenderflow_core::{BidId, DomainResult, TenderId, Username};
use tenderflow_directory::Directory;
use tenderflow_tenders::Tender;

use crate::config::Settings;
use crate::decisions::{DecisionStore, InMemoryDecisionStore};
use crate::feedback::{FeedbackStore, InMemoryFeedbackStore};
use crate::version_store::{InMemoryVersionStore, VersionStore};

/// Storage backends used by [`ProcurementService`].
pub struct Stores {
    pub tenders: Arc<dyn VersionStore<Tender>>,
    pub bids: Arc<dyn VersionStore<Bid>>,
    pub decisions: Arc<dyn DecisionStore>,
    pub feedback: Arc<dyn FeedbackStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            tenders: Arc::new(InMemoryVersionStore::<Tender>::new()),
            bids: Arc::new(InMemoryVersionStore::<Bid>::new()),
            decisions: Arc::new(InMemoryDecisionStore::new()),
            feedback: Arc::new(InMemoryFeedbackStore::new()),
        }
    }
}

pub struct ProcurementService<D> {
    guard: Guard<D>,
    tenders: Arc<dyn VersionStore<Tender>>,
    bids: Arc<dyn VersionStore<Bid>>,
    decisions: Arc<dyn DecisionStore>,
    feedback: Arc<dyn FeedbackStore>,
    settings: Settings,
}

impl<D> ProcurementService<D>
where
    D: Directory,
{
    pub fn new(directory: D, stores: Stores, settings: Settings) -> Self {
        Self {
            guard: Guard::new(directory),
            tenders: stores.tenders,
            bids: stores.bids,
            decisions: stores.decisions,
            feedback: stores.feedback,
            settings,
        }
    }

    pub fn in_memory(directory: D, settings: Settings) -> Self {
        Self::new(directory, Stores::in_memory(), settings)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn directory(&self) -> &D {
        self.guard.directory()
    }

    fn ensure_user(&self, actor: &Username) -> DomainResult<()> {
        Ok(self.guard.ensure_user(actor)?)
    }

    fn authorize(&self, actor: &Username, action: Action<'_>) -> DomainResult<()> {
        Ok(self.guard.authorize(actor, action)?)
    }

    /// Passes if the actor satisfies at least one of `actions`; reports the first denial otherwise.
    fn authorize_any(&self, actor: &Username, actions: &[Action<'_>]) -> DomainResult<()> {
        let mut denied: Option<AuthzError> = None;
        for action in actions {
            match self.guard.authorize(actor, *action) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    denied.get_or_insert(e);
                }
            }
        }
        match denied {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    fn load_tender(&self, id: TenderId) -> DomainResult<Tender> {
        self.tenders.load(id)
    }

    fn load_bid(&self, id: BidId) -> DomainResult<Bid> {
        self.bids.load(id)
    }
}
