//! Decision storage keyed by `(bid, user)`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use tenderflow_bids::Decision;
use tenderflow_core::{BidId, DomainError, DomainResult, Username};

pub trait DecisionStore: Send + Sync {
    /// Insert or replace the decision of `decision.decided_by` on `decision.bid_id`.
    fn upsert(&self, decision: Decision) -> DomainResult<()>;

    /// Latest decision of every user on `bid`.
    fn for_bid(&self, bid: BidId) -> DomainResult<Vec<Decision>>;
}

impl<S> DecisionStore for Arc<S>
where
    S: DecisionStore + ?Sized,
{
    fn upsert(&self, decision: Decision) -> DomainResult<()> {
        (**self).upsert(decision)
    }

    fn for_bid(&self, bid: BidId) -> DomainResult<Vec<Decision>> {
        (**self).for_bid(bid)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryDecisionStore {
    inner: RwLock<HashMap<BidId, BTreeMap<Username, Decision>>>,
}

impl InMemoryDecisionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DecisionStore for InMemoryDecisionStore {
    fn upsert(&self, decision: Decision) -> DomainResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| DomainError::internal("decision store lock poisoned"))?;
        inner
            .entry(decision.bid_id)
            .or_default()
            .insert(decision.decided_by.clone(), decision);
        Ok(())
    }

    fn for_bid(&self, bid: BidId) -> DomainResult<Vec<Decision>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| DomainError::internal("decision store lock poisoned"))?;
        Ok(inner
            .get(&bid)
            .map(|by_user| by_user.values().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tenderflow_bids::Verdict;

    #[test]
    fn upsert_replaces_previous_verdict_of_same_user() {
        let store = InMemoryDecisionStore::new();
        let bid = BidId::new();
        for verdict in [Verdict::Approve, Verdict::Reject] {
            store
                .upsert(Decision {
                    bid_id: bid,
                    decided_by: "anna".into(),
                    verdict,
                    decided_at: Utc::now(),
                })
                .unwrap();
        }

        let decisions = store.for_bid(bid).unwrap();
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].verdict, Verdict::Reject);
        assert!(store.for_bid(BidId::new()).unwrap().is_empty());
    }
}
