//! Append-only bid feedback storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tenderflow_bids::BidFeedback;
use tenderflow_core::{BidId, DomainError, DomainResult};

pub trait FeedbackStore: Send + Sync {
    fn add(&self, feedback: BidFeedback) -> DomainResult<()>;

    /// Feedback on `bid` in insertion order.
    fn for_bid(&self, bid: BidId) -> DomainResult<Vec<BidFeedback>>;
}

impl<S> FeedbackStore for Arc<S>
where
    S: FeedbackStore + ?Sized,
{
    fn add(&self, feedback: BidFeedback) -> DomainResult<()> {
        (**self).add(feedback)
    }

    fn for_bid(&self, bid: BidId) -> DomainResult<Vec<BidFeedback>> {
        (**self).for_bid(bid)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryFeedbackStore {
    inner: RwLock<HashMap<BidId, Vec<BidFeedback>>>,
}

impl InMemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FeedbackStore for InMemoryFeedbackStore {
    fn add(&self, feedback: BidFeedback) -> DomainResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| DomainError::internal("feedback store lock poisoned"))?;
        inner.entry(feedback.bid_id).or_default().push(feedback);
        Ok(())
    }

    fn for_bid(&self, bid: BidId) -> DomainResult<Vec<BidFeedback>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| DomainError::internal("feedback store lock poisoned"))?;
        Ok(inner.get(&bid).cloned().unwrap_or_default())
    }
}
