use chrono::Utc;

use tenderflow_auth::Action;
use tenderflow_bids::{
    Bid, BidCommand, BidContent, BidPatch, BidStatus, BidVersion, BidView, ChangeBidStatus,
    CreateBid, EditBid, RollbackBid,
};
use tenderflow_core::{
    AggregateRoot, BidAuthor, BidId, DomainError, DomainResult, ExpectedVersion, TenderId, Username,
};
use tenderflow_directory::Directory;
use tenderflow_tenders::{Tender, TenderStatus};

use super::ProcurementService;
use crate::listing::{Page, paginate};

impl<D> ProcurementService<D>
where
    D: Directory,
{
    /// Submit a bid against a published tender (version 1, `Created`).
    pub fn create_bid(
        &self,
        actor: &Username,
        tender_id: TenderId,
        author: BidAuthor,
        content: BidContent,
    ) -> DomainResult<BidView> {
        self.ensure_user(actor)?;
        let tender = self.load_tender(tender_id)?;
        self.authorize(actor, Action::ManageBid { author: &author })?;

        if tender.status() != TenderStatus::Published {
            return Err(DomainError::validation(format!(
                "tender {tender_id} is not accepting bids (status {:?})",
                tender.status()
            )));
        }

        let committed = self.bids.create(
            Bid::draft(BidId::new(), tender_id, author),
            &BidCommand::Create(CreateBid {
                content,
                occurred_at: Utc::now(),
            }),
        )?;

        let bid = committed.aggregate;
        tracing::info!(bid_id = %bid.id(), tender_id = %tender_id, author = %bid.author(), actor = %actor, "bid created");
        view_of(&bid)
    }

    pub fn edit_bid(
        &self,
        actor: &Username,
        id: BidId,
        patch: BidPatch,
        expected: ExpectedVersion,
    ) -> DomainResult<u64> {
        self.authorize_bid(actor, id)?;

        let committed = self.bids.handle(
            id,
            expected,
            &BidCommand::Edit(EditBid {
                patch,
                occurred_at: Utc::now(),
            }),
        )?;

        let version = committed.aggregate.version();
        tracing::info!(bid_id = %id, version, actor = %actor, "bid edited");
        Ok(version)
    }

    pub fn publish_bid(&self, actor: &Username, id: BidId) -> DomainResult<BidStatus> {
        self.set_bid_status(actor, id, BidStatus::Published)
    }

    pub fn cancel_bid(&self, actor: &Username, id: BidId) -> DomainResult<BidStatus> {
        self.set_bid_status(actor, id, BidStatus::Canceled)
    }

    /// Author-requested status change; `Approved`/`Rejected` are only reachable
    /// through [`submit_decision`](Self::submit_decision).
    pub fn set_bid_status(
        &self,
        actor: &Username,
        id: BidId,
        status: BidStatus,
    ) -> DomainResult<BidStatus> {
        let bid = self.authorize_bid(actor, id)?;
        if status == BidStatus::Published {
            let tender = self.load_tender(bid.tender_id())?;
            if tender.status() != TenderStatus::Published {
                return Err(DomainError::validation(format!(
                    "tender {} is not accepting bids (status {:?})",
                    bid.tender_id(),
                    tender.status()
                )));
            }
        }

        let committed = self.bids.handle(
            id,
            ExpectedVersion::Any,
            &BidCommand::ChangeStatus(ChangeBidStatus {
                status,
                occurred_at: Utc::now(),
            }),
        )?;

        let status = committed.aggregate.status();
        tracing::info!(bid_id = %id, status = ?status, actor = %actor, "bid status changed");
        Ok(status)
    }

    pub fn rollback_bid(
        &self,
        actor: &Username,
        id: BidId,
        target: u64,
        expected: ExpectedVersion,
    ) -> DomainResult<u64> {
        self.authorize_bid(actor, id)?;

        let committed = self.bids.handle(
            id,
            expected,
            &BidCommand::Rollback(RollbackBid {
                version: target,
                occurred_at: Utc::now(),
            }),
        )?;

        let version = committed.aggregate.version();
        tracing::info!(bid_id = %id, target, version, actor = %actor, "bid rolled back");
        Ok(version)
    }

    /// Current status, visible to the bid's author side and to the tender's reviewers.
    pub fn bid_status(&self, actor: &Username, id: BidId) -> DomainResult<BidStatus> {
        Ok(self.authorize_bid_view(actor, id)?.status())
    }

    pub fn bid_version(&self, actor: &Username, id: BidId, n: u64) -> DomainResult<BidVersion> {
        let bid = self.authorize_bid_view(actor, id)?;
        bid.get_version(n).cloned()
    }

    /// Every bid on `tender_id`, in any status (tender owners only).
    pub fn list_bids(
        &self,
        actor: &Username,
        tender_id: TenderId,
        page: Page,
    ) -> DomainResult<Vec<BidView>> {
        let tender = self.authorize_review(actor, tender_id)?;

        let bids = self.bids.list()?;
        let mut views: Vec<BidView> = bids
            .iter()
            .filter(|b| b.tender_id() == tender.id_typed())
            .filter_map(Bid::view)
            .collect();
        sort_by_name(&mut views);
        Ok(paginate(views, page).collect())
    }

    /// Bids authored by `actor` or by organizations `actor` is responsible for.
    pub fn list_my_bids(&self, actor: &Username, page: Page) -> DomainResult<Vec<BidView>> {
        self.ensure_user(actor)?;
        let organizations = self.directory().responsible_orgs_of(actor);

        let bids = self.bids.list()?;
        let mut views: Vec<BidView> = bids
            .iter()
            .filter(|b| match b.author() {
                BidAuthor::User(user) => user == actor,
                BidAuthor::Organization(org) => organizations.contains(org),
            })
            .filter_map(Bid::view)
            .collect();
        sort_by_name(&mut views);
        Ok(paginate(views, page).collect())
    }

    fn authorize_bid(&self, actor: &Username, id: BidId) -> DomainResult<Bid> {
        self.ensure_user(actor)?;
        let bid = self.load_bid(id)?;
        self.authorize(actor, Action::ManageBid { author: bid.author() })?;
        Ok(bid)
    }

    fn authorize_bid_view(&self, actor: &Username, id: BidId) -> DomainResult<Bid> {
        self.ensure_user(actor)?;
        let bid = self.load_bid(id)?;
        let tender = self.load_tender(bid.tender_id())?;
        self.authorize_any(
            actor,
            &[
                Action::ManageBid { author: bid.author() },
                Action::Review {
                    tender_organization: tender.organization_id(),
                },
            ],
        )?;
        Ok(bid)
    }

    /// Actor check, then tender existence, then tender-side responsibility.
    pub(super) fn authorize_review(&self, actor: &Username, tender_id: TenderId) -> DomainResult<Tender> {
        self.ensure_user(actor)?;
        let tender = self.load_tender(tender_id)?;
        self.authorize(
            actor,
            Action::Review {
                tender_organization: tender.organization_id(),
            },
        )?;
        Ok(tender)
    }
}

fn view_of(bid: &Bid) -> DomainResult<BidView> {
    bid.view()
        .ok_or_else(|| DomainError::internal(format!("bid {} has no versions", bid.id())))
}

fn sort_by_name(views: &mut [BidView]) {
    views.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
}
