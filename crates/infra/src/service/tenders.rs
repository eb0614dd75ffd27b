use chrono::Utc;

use tenderflow_auth::Action;
use tenderflow_core::{
    AggregateRoot, DomainError, DomainResult, ExpectedVersion, OrganizationId, TenderId, Username,
};
use tenderflow_directory::Directory;
use tenderflow_tenders::{
    ChangeTenderStatus, CreateTender, EditTender, RollbackTender, Tender, TenderCommand,
    TenderContent, TenderPatch, TenderStatus, TenderVersion, TenderView,
};

use super::ProcurementService;
use crate::listing::{Page, TenderFilter, paginate};

impl<D> ProcurementService<D>
where
    D: Directory,
{
    /// Create a tender owned by `organization_id` (version 1, `Created`).
    pub fn create_tender(
        &self,
        actor: &Username,
        organization_id: OrganizationId,
        content: TenderContent,
    ) -> DomainResult<TenderView> {
        self.authorize(
            actor,
            Action::ManageTender {
                organization: organization_id,
            },
        )?;

        let committed = self.tenders.create(
            Tender::draft(TenderId::new(), organization_id),
            &TenderCommand::Create(CreateTender {
                content,
                occurred_at: Utc::now(),
            }),
        )?;

        let tender = committed.aggregate;
        tracing::info!(tender_id = %tender.id(), organization_id = %organization_id, actor = %actor, "tender created");
        view_of(&tender)
    }

    /// Append a new version overlaying `patch`; returns the new version number.
    pub fn edit_tender(
        &self,
        actor: &Username,
        id: TenderId,
        patch: TenderPatch,
        expected: ExpectedVersion,
    ) -> DomainResult<u64> {
        self.authorize_tender(actor, id)?;

        let committed = self.tenders.handle(
            id,
            expected,
            &TenderCommand::Edit(EditTender {
                patch,
                occurred_at: Utc::now(),
            }),
        )?;

        let version = committed.aggregate.version();
        tracing::info!(tender_id = %id, version, actor = %actor, "tender edited");
        Ok(version)
    }

    pub fn publish_tender(&self, actor: &Username, id: TenderId) -> DomainResult<TenderStatus> {
        self.set_tender_status(actor, id, TenderStatus::Published)
    }

    pub fn close_tender(&self, actor: &Username, id: TenderId) -> DomainResult<TenderStatus> {
        self.set_tender_status(actor, id, TenderStatus::Closed)
    }

    /// Request a status transition; unlisted transitions are `Validation` errors.
    pub fn set_tender_status(
        &self,
        actor: &Username,
        id: TenderId,
        status: TenderStatus,
    ) -> DomainResult<TenderStatus> {
        self.authorize_tender(actor, id)?;

        let committed = self.tenders.handle(
            id,
            ExpectedVersion::Any,
            &TenderCommand::ChangeStatus(ChangeTenderStatus {
                status,
                occurred_at: Utc::now(),
            }),
        )?;

        let status = committed.aggregate.status();
        tracing::info!(tender_id = %id, status = ?status, actor = %actor, "tender status changed");
        Ok(status)
    }

    /// Append a copy of version `target`; returns the new version number.
    pub fn rollback_tender(
        &self,
        actor: &Username,
        id: TenderId,
        target: u64,
        expected: ExpectedVersion,
    ) -> DomainResult<u64> {
        self.authorize_tender(actor, id)?;

        let committed = self.tenders.handle(
            id,
            expected,
            &TenderCommand::Rollback(RollbackTender {
                version: target,
                occurred_at: Utc::now(),
            }),
        )?;

        let version = committed.aggregate.version();
        tracing::info!(tender_id = %id, target, version, actor = %actor, "tender rolled back");
        Ok(version)
    }

    /// Current status of a tender.
    ///
    /// Any existing user may look up any tender; without an actor only
    /// published tenders are visible.
    pub fn tender_status(&self, actor: Option<&Username>, id: TenderId) -> DomainResult<TenderStatus> {
        if let Some(actor) = actor {
            self.ensure_user(actor)?;
        }

        let tender = self.load_tender(id)?;
        if actor.is_none() && tender.status() != TenderStatus::Published {
            return Err(DomainError::no_rights(format!(
                "tender {id} is not public"
            )));
        }
        Ok(tender.status())
    }

    /// Snapshot `n` of a tender's history (owning organization only).
    pub fn tender_version(&self, actor: &Username, id: TenderId, n: u64) -> DomainResult<TenderVersion> {
        let tender = self.authorize_tender(actor, id)?;
        tender.get_version(n).cloned()
    }

    /// Published tenders ordered by name.
    pub fn list_tenders(&self, filter: &TenderFilter, page: Page) -> DomainResult<Vec<TenderView>> {
        let tenders = self.tenders.list()?;
        let mut views: Vec<TenderView> = tenders
            .iter()
            .filter_map(Tender::view)
            .filter(|v| filter.matches(v))
            .collect();
        sort_by_name(&mut views);
        Ok(paginate(views, page).collect())
    }

    /// Tenders of every organization `actor` is responsible for, in any status.
    pub fn list_my_tenders(&self, actor: &Username, page: Page) -> DomainResult<Vec<TenderView>> {
        self.ensure_user(actor)?;
        let organizations = self.directory().responsible_orgs_of(actor);

        let tenders = self.tenders.list()?;
        let mut views: Vec<TenderView> = tenders
            .iter()
            .filter(|t| organizations.contains(&t.organization_id()))
            .filter_map(Tender::view)
            .collect();
        sort_by_name(&mut views);
        Ok(paginate(views, page).collect())
    }

    /// Actor check, then existence, then ownership.
    fn authorize_tender(&self, actor: &Username, id: TenderId) -> DomainResult<Tender> {
        self.ensure_user(actor)?;
        let tender = self.load_tender(id)?;
        self.authorize(
            actor,
            Action::ManageTender {
                organization: tender.organization_id(),
            },
        )?;
        Ok(tender)
    }
}

fn view_of(tender: &Tender) -> DomainResult<TenderView> {
    tender
        .view()
        .ok_or_else(|| DomainError::internal(format!("tender {} has no versions", tender.id())))
}

fn sort_by_name(views: &mut [TenderView]) {
    views.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
}
