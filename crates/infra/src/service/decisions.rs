use chrono::Utc;

use tenderflow_auth::Action;
use tenderflow_bids::{
    Bid, BidCommand, BidEvent, BidFeedback, BidStatus, Decision, ResolveBid, Tally, Verdict,
};
use tenderflow_core::{
    Aggregate, BidAuthor, BidId, DomainError, DomainResult, ExpectedVersion, TenderId, Username,
};
use tenderflow_directory::Directory;
use tenderflow_tenders::{ChangeTenderStatus, Tender, TenderCommand, TenderEvent, TenderStatus};

use super::ProcurementService;
use crate::listing::{Page, paginate};

impl<D> ProcurementService<D>
where
    D: Directory,
{
    /// Record `actor`'s verdict on a published bid and resolve it once quorum is reached.
    ///
    /// The upsert, the tally and the resulting status change all happen under
    /// the bid's lock, so concurrent decisions on one bid are linearizable.
    /// Returns the bid status after the decision.
    pub fn submit_decision(
        &self,
        actor: &Username,
        bid_id: BidId,
        verdict: Verdict,
    ) -> DomainResult<BidStatus> {
        self.ensure_user(actor)?;
        let bid = self.load_bid(bid_id)?;
        let tender = self.load_tender(bid.tender_id())?;
        let tender_organization = tender.organization_id();
        self.authorize(
            actor,
            Action::Decide {
                tender_organization,
                author: bid.author(),
            },
        )?;
        if tender.status() != TenderStatus::Published {
            return Err(DomainError::validation(format!(
                "tender {} no longer accepts decisions (status {:?})",
                tender.id_typed(),
                tender.status()
            )));
        }

        let policy = self.settings.quorum;
        let committed = self.bids.execute(bid_id, ExpectedVersion::Any, &mut |bid: &Bid| {
            if bid.status() != BidStatus::Published {
                return Err(DomainError::validation(format!(
                    "only published bids can be decided (bid {bid_id} is {:?})",
                    bid.status()
                )));
            }

            let decided_at = Utc::now();
            self.decisions.upsert(Decision {
                bid_id,
                decided_by: actor.clone(),
                verdict,
                decided_at,
            })?;

            let eligible = self.guard.responsibles_of(tender_organization);
            let tally = Tally::count(&self.decisions.for_bid(bid_id)?, &eligible);
            tracing::debug!(
                bid_id = %bid_id,
                approvals = tally.approvals,
                rejections = tally.rejections,
                eligible = tally.eligible,
                threshold = policy.threshold(tally.eligible),
                "decision tally"
            );

            match policy.verdict(&tally) {
                Some(verdict) => bid.handle(&BidCommand::Resolve(ResolveBid {
                    verdict,
                    occurred_at: decided_at,
                })),
                None => Ok(Vec::new()),
            }
        })?;

        let status = committed.aggregate.status();
        tracing::info!(bid_id = %bid_id, actor = %actor, verdict = ?verdict, status = ?status, "decision recorded");

        let resolved = committed
            .events
            .iter()
            .any(|e| matches!(e, BidEvent::StatusChanged(c) if c.to == BidStatus::Approved));
        // The approval is already committed; a failed close must not report it as lost.
        if resolved && self.settings.close_tender_on_approval {
            if let Err(error) = self.close_after_approval(tender.id_typed(), bid_id) {
                tracing::warn!(
                    tender_id = %tender.id_typed(),
                    bid_id = %bid_id,
                    error = %error,
                    "failed to close tender after bid approval"
                );
            }
        }

        Ok(status)
    }

    /// Close the tender of an approved bid, unless something already closed it.
    ///
    /// Runs after the bid lock is released; no operation holds two entity locks at once.
    fn close_after_approval(&self, tender_id: TenderId, bid_id: BidId) -> DomainResult<()> {
        let committed = self.tenders.execute(tender_id, ExpectedVersion::Any, &mut |tender: &Tender| {
            if tender.status() != TenderStatus::Published {
                return Ok(Vec::new());
            }
            tender.handle(&TenderCommand::ChangeStatus(ChangeTenderStatus {
                status: TenderStatus::Closed,
                occurred_at: Utc::now(),
            }))
        })?;

        if committed
            .events
            .iter()
            .any(|e| matches!(e, TenderEvent::StatusChanged(_)))
        {
            tracing::info!(tender_id = %tender_id, bid_id = %bid_id, "tender closed after bid approval");
        }
        Ok(())
    }

    /// Leave feedback on a bid (tender-side responsibles only).
    pub fn submit_feedback(
        &self,
        actor: &Username,
        bid_id: BidId,
        comment: impl Into<String>,
    ) -> DomainResult<BidFeedback> {
        self.ensure_user(actor)?;
        let bid = self.load_bid(bid_id)?;
        let tender = self.load_tender(bid.tender_id())?;
        self.authorize(
            actor,
            Action::Review {
                tender_organization: tender.organization_id(),
            },
        )?;

        let feedback = BidFeedback::new(bid_id, actor.clone(), comment, Utc::now())?;
        self.feedback.add(feedback.clone())?;

        tracing::info!(bid_id = %bid_id, feedback_id = %feedback.id, actor = %actor, "feedback submitted");
        Ok(feedback)
    }

    /// Feedback on the tender's bids, optionally only on bids by `author`, oldest first.
    pub fn list_reviews(
        &self,
        actor: &Username,
        tender_id: TenderId,
        author: Option<&BidAuthor>,
        page: Page,
    ) -> DomainResult<Vec<BidFeedback>> {
        self.authorize_review(actor, tender_id)?;

        let bids = self.bids.list()?;
        let mut reviews = Vec::new();
        for bid in bids
            .iter()
            .filter(|b| b.tender_id() == tender_id)
            .filter(|b| author.is_none_or(|a| b.author() == a))
        {
            reviews.extend(self.feedback.for_bid(bid.id_typed())?);
        }

        reviews.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(paginate(reviews, page).collect())
    }
}
