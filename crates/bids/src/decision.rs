use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tenderflow_core::{BidId, DomainError, DomainResult, Username};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Approve,
    Reject,
}

impl core::str::FromStr for Verdict {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Approved" | "approve" | "Approve" => Ok(Verdict::Approve),
            "Rejected" | "reject" | "Reject" => Ok(Verdict::Reject),
            other => Err(DomainError::validation(format!("unknown verdict '{other}'"))),
        }
    }
}

/// One user's verdict on a bid. Keyed by `(bid_id, decided_by)`; a later
/// decision by the same user replaces the earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub bid_id: BidId,
    pub decided_by: Username,
    pub verdict: Verdict,
    pub decided_at: DateTime<Utc>,
}

/// How rejections are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RejectionRule {
    /// Rejection needs as many votes as approval.
    #[default]
    Quorum,
    /// A single eligible rejection rejects the bid.
    Veto,
}

impl core::str::FromStr for RejectionRule {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quorum" => Ok(RejectionRule::Quorum),
            "veto" => Ok(RejectionRule::Veto),
            other => Err(DomainError::validation(format!(
                "unknown rejection rule '{other}' (expected quorum|veto)"
            ))),
        }
    }
}

/// Counted verdicts of eligible users.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub approvals: usize,
    pub rejections: usize,
    pub eligible: usize,
}

impl Tally {
    /// Count the latest verdict of every eligible user.
    ///
    /// Decisions by users outside `eligible` (e.g. removed responsibles) are ignored.
    pub fn count(decisions: &[Decision], eligible: &HashSet<Username>) -> Self {
        let mut latest: BTreeMap<&Username, &Decision> = BTreeMap::new();
        for d in decisions.iter().filter(|d| eligible.contains(&d.decided_by)) {
            let newer = latest
                .get(&d.decided_by)
                .is_none_or(|prev| prev.decided_at <= d.decided_at);
            if newer {
                latest.insert(&d.decided_by, d);
            }
        }

        let approvals = latest
            .values()
            .filter(|d| d.verdict == Verdict::Approve)
            .count();
        Tally {
            approvals,
            rejections: latest.len() - approvals,
            eligible: eligible.len(),
        }
    }
}

/// Quorum policy: Q = min(max_threshold, |eligible|).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuorumPolicy {
    pub max_threshold: usize,
    pub rejection: RejectionRule,
}

impl Default for QuorumPolicy {
    fn default() -> Self {
        Self {
            max_threshold: 3,
            rejection: RejectionRule::Quorum,
        }
    }
}

impl QuorumPolicy {
    pub fn new(max_threshold: usize, rejection: RejectionRule) -> DomainResult<Self> {
        if max_threshold == 0 {
            return Err(DomainError::validation("quorum threshold must be at least 1"));
        }
        Ok(Self {
            max_threshold,
            rejection,
        })
    }

    pub fn threshold(&self, eligible: usize) -> usize {
        self.max_threshold.min(eligible)
    }

    /// Verdict reached by `tally`, if any. Approval is checked before rejection.
    pub fn verdict(&self, tally: &Tally) -> Option<Verdict> {
        let q = self.threshold(tally.eligible);
        if q == 0 {
            return None;
        }

        if tally.approvals >= q {
            return Some(Verdict::Approve);
        }

        let reject_at = match self.rejection {
            RejectionRule::Quorum => q,
            RejectionRule::Veto => 1,
        };
        (tally.rejections >= reject_at).then_some(Verdict::Reject)
    }

    pub fn resolve(&self, decisions: &[Decision], eligible: &HashSet<Username>) -> Option<Verdict> {
        self.verdict(&Tally::count(decisions, eligible))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn users(names: &[&str]) -> HashSet<Username> {
        names.iter().map(|n| Username::new(*n)).collect()
    }

    fn decision(bid: BidId, by: &str, verdict: Verdict, at: i64) -> Decision {
        Decision {
            bid_id: bid,
            decided_by: Username::new(by),
            verdict,
            decided_at: DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(at),
        }
    }

    #[test]
    fn threshold_is_capped_by_eligible_count() {
        let policy = QuorumPolicy::default();
        assert_eq!(policy.threshold(1), 1);
        assert_eq!(policy.threshold(3), 3);
        assert_eq!(policy.threshold(7), 3);
    }

    #[test]
    fn three_of_five_approvals_approve() {
        let bid = BidId::new();
        let eligible = users(&["a", "b", "c", "d", "e"]);
        let policy = QuorumPolicy::default();

        let mut decisions = vec![
            decision(bid, "a", Verdict::Approve, 1),
            decision(bid, "b", Verdict::Approve, 2),
            decision(bid, "c", Verdict::Reject, 3),
        ];
        assert_eq!(policy.resolve(&decisions, &eligible), None);

        decisions.push(decision(bid, "d", Verdict::Approve, 4));
        assert_eq!(policy.resolve(&decisions, &eligible), Some(Verdict::Approve));
    }

    #[test]
    fn only_latest_verdict_per_user_counts() {
        let bid = BidId::new();
        let eligible = users(&["a", "b"]);
        let decisions = vec![
            decision(bid, "a", Verdict::Approve, 1),
            decision(bid, "a", Verdict::Reject, 2),
        ];
        let tally = Tally::count(&decisions, &eligible);
        assert_eq!(tally.approvals, 0);
        assert_eq!(tally.rejections, 1);
    }

    #[test]
    fn decisions_of_removed_responsibles_are_ignored() {
        let bid = BidId::new();
        let decisions = vec![decision(bid, "gone", Verdict::Approve, 1)];
        let tally = Tally::count(&decisions, &users(&["a"]));
        assert_eq!(tally.approvals, 0);
        assert_eq!(QuorumPolicy::default().verdict(&tally), None);
    }

    #[test]
    fn veto_rejects_on_first_rejection() {
        let bid = BidId::new();
        let eligible = users(&["a", "b", "c"]);
        let decisions = vec![decision(bid, "b", Verdict::Reject, 1)];

        assert_eq!(QuorumPolicy::default().resolve(&decisions, &eligible), None);
        let veto = QuorumPolicy::new(3, RejectionRule::Veto).unwrap();
        assert_eq!(veto.resolve(&decisions, &eligible), Some(Verdict::Reject));
    }

    #[test]
    fn no_eligible_users_never_resolves() {
        let tally = Tally::default();
        assert_eq!(QuorumPolicy::default().verdict(&tally), None);
    }

    #[test]
    fn zero_threshold_is_rejected() {
        assert!(QuorumPolicy::new(0, RejectionRule::Quorum).is_err());
    }

    #[test]
    fn parses_rule_and_verdict() {
        assert_eq!("VETO".parse::<RejectionRule>().unwrap(), RejectionRule::Veto);
        assert_eq!("Approved".parse::<Verdict>().unwrap(), Verdict::Approve);
        assert!("maybe".parse::<Verdict>().is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

        #[test]
        fn quorum_reached_iff_enough_latest_verdicts(
            responsibles in 1usize..7,
            votes in prop::collection::vec((0usize..7, any::<bool>()), 0..24),
        ) {
            let bid = BidId::new();
            let names: Vec<String> = (0..responsibles).map(|i| format!("u{i}")).collect();
            let eligible: HashSet<Username> = names.iter().map(|n| Username::new(n.as_str())).collect();

            let decisions: Vec<Decision> = votes
                .iter()
                .enumerate()
                .map(|(t, (who, approve))| {
                    let verdict = if *approve { Verdict::Approve } else { Verdict::Reject };
                    decision(bid, &format!("u{who}"), verdict, t as i64)
                })
                .collect();

            let mut latest = std::collections::HashMap::new();
            for (who, approve) in &votes {
                if *who < responsibles {
                    latest.insert(*who, *approve);
                }
            }
            let approvals = latest.values().filter(|a| **a).count();
            let rejections = latest.len() - approvals;
            let q = responsibles.min(3);

            let expected = if approvals >= q {
                Some(Verdict::Approve)
            } else if rejections >= q {
                Some(Verdict::Reject)
            } else {
                None
            };
            prop_assert_eq!(QuorumPolicy::default().resolve(&decisions, &eligible), expected);
        }
    }
}
