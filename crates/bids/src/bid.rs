use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tenderflow_core::{
    Aggregate, AggregateRoot, BidAuthor, BidId, DomainError, DomainResult, Event, Lifecycle,
    Snapshot, TenderId, ValueObject, VersionLog,
};

use crate::decision::Verdict;

/// Bid status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BidStatus {
    Created,
    Published,
    Canceled,
    Approved,
    Rejected,
}

impl Lifecycle for BidStatus {
    fn successors(&self) -> &'static [Self] {
        match self {
            BidStatus::Created => &[BidStatus::Published],
            BidStatus::Published => &[
                BidStatus::Canceled,
                BidStatus::Approved,
                BidStatus::Rejected,
            ],
            BidStatus::Canceled | BidStatus::Approved | BidStatus::Rejected => &[],
        }
    }
}

impl BidStatus {
    /// Whether a caller may ask for this status directly (decisions excluded).
    pub fn is_requestable(self) -> bool {
        matches!(self, BidStatus::Published | BidStatus::Canceled)
    }
}

impl From<Verdict> for BidStatus {
    fn from(value: Verdict) -> Self {
        match value {
            Verdict::Approve => BidStatus::Approved,
            Verdict::Reject => BidStatus::Rejected,
        }
    }
}

/// Editable fields of a bid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidContent {
    pub name: String,
    pub description: String,
}

impl ValueObject for BidContent {}

/// Partial edit: omitted fields keep their previous values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl BidPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }

    pub fn apply_to(&self, base: &BidContent) -> BidContent {
        BidContent {
            name: self.name.clone().unwrap_or_else(|| base.name.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| base.description.clone()),
        }
    }
}

pub type BidVersion = Snapshot<BidContent>;

/// Flattened current view of a bid, as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidView {
    pub id: BidId,
    pub tender_id: TenderId,
    #[serde(flatten)]
    pub author: BidAuthor,
    pub name: String,
    pub description: String,
    pub status: BidStatus,
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

/// Aggregate root: Bid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bid {
    id: BidId,
    tender_id: TenderId,
    author: BidAuthor,
    status: BidStatus,
    versions: VersionLog<BidContent>,
}

impl Bid {
    /// A not-yet-created bid shell; `CreateBid` turns it into version 1.
    pub fn draft(id: BidId, tender_id: TenderId, author: BidAuthor) -> Self {
        Self {
            id,
            tender_id,
            author,
            status: BidStatus::Created,
            versions: VersionLog::new(),
        }
    }

    pub fn id_typed(&self) -> BidId {
        self.id
    }

    pub fn tender_id(&self) -> TenderId {
        self.tender_id
    }

    pub fn author(&self) -> &BidAuthor {
        &self.author
    }

    pub fn status(&self) -> BidStatus {
        self.status
    }

    pub fn is_created(&self) -> bool {
        !self.versions.is_empty()
    }

    pub fn current(&self) -> Option<&BidVersion> {
        self.versions.current()
    }

    pub fn name(&self) -> &str {
        self.current().map_or("", |v| v.content.name.as_str())
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.versions.first().map(|v| v.created_at)
    }

    pub fn versions(&self) -> &[BidVersion] {
        self.versions.entries()
    }

    pub fn get_version(&self, n: u64) -> DomainResult<&BidVersion> {
        self.versions
            .get(n)
            .ok_or_else(|| DomainError::not_found(format!("bid {} version {n}", self.id)))
    }

    pub fn view(&self) -> Option<BidView> {
        let current = self.current()?;
        Some(BidView {
            id: self.id,
            tender_id: self.tender_id,
            author: self.author.clone(),
            name: current.content.name.clone(),
            description: current.content.description.clone(),
            status: self.status,
            version: current.version,
            created_at: self.created_at().unwrap_or(current.created_at),
        })
    }
}

impl AggregateRoot for Bid {
    type Id = BidId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.versions.current_version()
    }
}

/// Command: CreateBid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBid {
    pub content: BidContent,
    pub occurred_at: DateTime<Utc>,
}

/// Command: EditBid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBid {
    pub patch: BidPatch,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangeBidStatus (author-requested: publish or cancel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeBidStatus {
    pub status: BidStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RollbackBid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackBid {
    pub version: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ResolveBid (issued by the quorum engine once a verdict reaches quorum).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveBid {
    pub verdict: Verdict,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BidCommand {
    Create(CreateBid),
    Edit(EditBid),
    ChangeStatus(ChangeBidStatus),
    Rollback(RollbackBid),
    Resolve(ResolveBid),
}

/// Event: BidCreated (version 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidCreated {
    pub bid_id: BidId,
    pub tender_id: TenderId,
    pub author: BidAuthor,
    pub content: BidContent,
    pub occurred_at: DateTime<Utc>,
}

/// Event: BidVersionAppended (edit or rollback).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidVersionAppended {
    pub bid_id: BidId,
    pub version: u64,
    pub content: BidContent,
    pub rolled_back_from: Option<u64>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: BidStatusChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidStatusChanged {
    pub bid_id: BidId,
    pub from: BidStatus,
    pub to: BidStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BidEvent {
    Created(BidCreated),
    VersionAppended(BidVersionAppended),
    StatusChanged(BidStatusChanged),
}

impl Event for BidEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BidEvent::Created(_) => "bid.created",
            BidEvent::VersionAppended(e) if e.rolled_back_from.is_some() => "bid.rolled_back",
            BidEvent::VersionAppended(_) => "bid.edited",
            BidEvent::StatusChanged(_) => "bid.status_changed",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            BidEvent::Created(e) => e.occurred_at,
            BidEvent::VersionAppended(e) => e.occurred_at,
            BidEvent::StatusChanged(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Bid {
    type Command = BidCommand;
    type Event = BidEvent;

    const TYPE: &'static str = "bid";

    fn apply(&mut self, event: &Self::Event) {
        match event {
            BidEvent::Created(e) => {
                self.tender_id = e.tender_id;
                self.author = e.author.clone();
                self.status = BidStatus::Created;
                self.versions = VersionLog::new();
                self.versions.push(1, e.content.clone(), e.occurred_at);
            }
            BidEvent::VersionAppended(e) => {
                self.versions.push(e.version, e.content.clone(), e.occurred_at);
            }
            BidEvent::StatusChanged(e) => {
                self.status = e.to;
            }
        }
    }

    fn handle(&self, command: &Self::Command) -> DomainResult<Vec<Self::Event>> {
        match command {
            BidCommand::Create(cmd) => self.handle_create(cmd),
            BidCommand::Edit(cmd) => self.handle_edit(cmd),
            BidCommand::ChangeStatus(cmd) => self.handle_change_status(cmd),
            BidCommand::Rollback(cmd) => self.handle_rollback(cmd),
            BidCommand::Resolve(cmd) => self.handle_resolve(cmd),
        }
    }

    fn check_invariants(&self) -> DomainResult<()> {
        self.versions
            .check()
            .map_err(|e| DomainError::internal(format!("bid {}: {e}", self.id)))
    }
}

impl Bid {
    fn ensure_created(&self) -> DomainResult<&BidVersion> {
        self.current()
            .ok_or_else(|| DomainError::not_found(format!("bid {}", self.id)))
    }

    fn append(
        &self,
        content: BidContent,
        rolled_back_from: Option<u64>,
        occurred_at: DateTime<Utc>,
    ) -> BidEvent {
        BidEvent::VersionAppended(BidVersionAppended {
            bid_id: self.id,
            version: self.versions.next_version(),
            content,
            rolled_back_from,
            occurred_at,
        })
    }

    fn status_change(&self, to: BidStatus, occurred_at: DateTime<Utc>) -> DomainResult<BidEvent> {
        let to = self.status.transition(to)?;
        Ok(BidEvent::StatusChanged(BidStatusChanged {
            bid_id: self.id,
            from: self.status,
            to,
            occurred_at,
        }))
    }

    fn handle_create(&self, cmd: &CreateBid) -> DomainResult<Vec<BidEvent>> {
        if self.is_created() {
            return Err(DomainError::conflict(format!("bid {} already exists", self.id)));
        }

        Ok(vec![BidEvent::Created(BidCreated {
            bid_id: self.id,
            tender_id: self.tender_id,
            author: self.author.clone(),
            content: cmd.content.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_edit(&self, cmd: &EditBid) -> DomainResult<Vec<BidEvent>> {
        let current = self.ensure_created()?;

        if cmd.patch.is_empty() {
            return Err(DomainError::validation("nothing to update"));
        }

        let content = cmd.patch.apply_to(&current.content);
        Ok(vec![self.append(content, None, cmd.occurred_at)])
    }

    fn handle_change_status(&self, cmd: &ChangeBidStatus) -> DomainResult<Vec<BidEvent>> {
        self.ensure_created()?;

        if !cmd.status.is_requestable() {
            return Err(DomainError::validation(format!(
                "invalid status transition: {:?} -> {:?} (bids are approved or rejected by decision quorum)",
                self.status, cmd.status
            )));
        }

        Ok(vec![self.status_change(cmd.status, cmd.occurred_at)?])
    }

    fn handle_rollback(&self, cmd: &RollbackBid) -> DomainResult<Vec<BidEvent>> {
        self.ensure_created()?;

        let content = self.versions.rollback_source(cmd.version)?.clone();
        Ok(vec![self.append(content, Some(cmd.version), cmd.occurred_at)])
    }

    fn handle_resolve(&self, cmd: &ResolveBid) -> DomainResult<Vec<BidEvent>> {
        self.ensure_created()?;

        if self.status != BidStatus::Published {
            return Err(DomainError::validation(format!(
                "only published bids can be decided (bid {} is {:?})",
                self.id, self.status
            )));
        }

        Ok(vec![self.status_change(cmd.verdict.into(), cmd.occurred_at)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenderflow_core::{OrganizationId, Username};

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn execute(bid: &mut Bid, cmd: BidCommand) -> DomainResult<Vec<BidEvent>> {
        let events = bid.handle(&cmd)?;
        for e in &events {
            bid.apply(e);
        }
        bid.check_invariants()?;
        Ok(events)
    }

    fn created_bid(author: BidAuthor) -> Bid {
        let mut bid = Bid::draft(BidId::new(), TenderId::new(), author);
        execute(
            &mut bid,
            BidCommand::Create(CreateBid {
                content: BidContent {
                    name: "Offer".to_string(),
                    description: "We pave fast".to_string(),
                },
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        bid
    }

    fn set_status(status: BidStatus) -> BidCommand {
        BidCommand::ChangeStatus(ChangeBidStatus {
            status,
            occurred_at: test_time(),
        })
    }

    fn resolve(verdict: Verdict) -> BidCommand {
        BidCommand::Resolve(ResolveBid {
            verdict,
            occurred_at: test_time(),
        })
    }

    #[test]
    fn create_produces_version_one_in_created_status() {
        let bid = created_bid(BidAuthor::User(Username::new("ivan")));
        assert_eq!(bid.version(), 1);
        assert_eq!(bid.status(), BidStatus::Created);
    }

    #[test]
    fn author_can_publish_then_cancel() {
        let mut bid = created_bid(BidAuthor::Organization(OrganizationId::new()));
        execute(&mut bid, set_status(BidStatus::Published)).unwrap();
        execute(&mut bid, set_status(BidStatus::Canceled)).unwrap();
        assert_eq!(bid.status(), BidStatus::Canceled);
        assert!(bid.status().is_terminal());
        assert_eq!(bid.version(), 1);
    }

    #[test]
    fn cancel_requires_publication_first() {
        let bid = created_bid(BidAuthor::User(Username::new("ivan")));
        assert!(matches!(
            bid.handle(&set_status(BidStatus::Canceled)),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn approval_cannot_be_requested_directly() {
        let mut bid = created_bid(BidAuthor::User(Username::new("ivan")));
        execute(&mut bid, set_status(BidStatus::Published)).unwrap();
        for status in [BidStatus::Approved, BidStatus::Rejected] {
            match bid.handle(&set_status(status)) {
                Err(DomainError::Validation(msg)) => assert!(msg.contains("quorum")),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn resolve_only_applies_to_published_bids() {
        let mut bid = created_bid(BidAuthor::User(Username::new("ivan")));
        assert!(bid.handle(&resolve(Verdict::Approve)).is_err());

        execute(&mut bid, set_status(BidStatus::Published)).unwrap();
        execute(&mut bid, resolve(Verdict::Reject)).unwrap();
        assert_eq!(bid.status(), BidStatus::Rejected);
        assert!(bid.handle(&resolve(Verdict::Approve)).is_err());
    }

    #[test]
    fn rollback_appends_copy_and_keeps_status() {
        let mut bid = created_bid(BidAuthor::User(Username::new("ivan")));
        execute(
            &mut bid,
            BidCommand::Edit(EditBid {
                patch: BidPatch {
                    name: Some("Better offer".to_string()),
                    ..BidPatch::default()
                },
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        execute(&mut bid, set_status(BidStatus::Published)).unwrap();

        let events = execute(
            &mut bid,
            BidCommand::Rollback(RollbackBid {
                version: 1,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(events[0].event_type(), "bid.rolled_back");
        assert_eq!(bid.version(), 3);
        assert_eq!(bid.name(), "Offer");
        assert_eq!(bid.get_version(2).unwrap().content.name, "Better offer");
        assert_eq!(bid.status(), BidStatus::Published);
    }

    #[test]
    fn view_flattens_author() {
        let bid = created_bid(BidAuthor::User(Username::new("ivan")));
        let json = serde_json::to_value(bid.view().unwrap()).unwrap();
        assert_eq!(json["authorType"], "User");
        assert_eq!(json["authorId"], "ivan");
        assert_eq!(json["status"], "Created");
    }
}
