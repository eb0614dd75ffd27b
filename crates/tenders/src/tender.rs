use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tenderflow_core::{
    Aggregate, AggregateRoot, DomainError, DomainResult, Event, Lifecycle, OrganizationId,
    Snapshot, TenderId, ValueObject, VersionLog,
};

/// Kind of work a tender solicits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    Construction,
    Delivery,
    Manufacture,
}

/// Tender status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TenderStatus {
    Created,
    Published,
    Closed,
}

impl Lifecycle for TenderStatus {
    fn successors(&self) -> &'static [Self] {
        match self {
            TenderStatus::Created => &[TenderStatus::Published],
            TenderStatus::Published => &[TenderStatus::Closed],
            TenderStatus::Closed => &[],
        }
    }
}

/// Editable fields of a tender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderContent {
    pub name: String,
    pub description: String,
    pub service_type: ServiceType,
}

impl ValueObject for TenderContent {}

/// Partial edit: omitted fields keep their previous values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub service_type: Option<ServiceType>,
}

impl TenderPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.service_type.is_none()
    }

    /// Overlay this patch on `base`.
    pub fn apply_to(&self, base: &TenderContent) -> TenderContent {
        TenderContent {
            name: self.name.clone().unwrap_or_else(|| base.name.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| base.description.clone()),
            service_type: self.service_type.unwrap_or(base.service_type),
        }
    }
}

/// Immutable snapshot of a tender's content.
pub type TenderVersion = Snapshot<TenderContent>;

/// Flattened current view of a tender, as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderView {
    pub id: TenderId,
    pub organization_id: OrganizationId,
    pub name: String,
    pub description: String,
    pub service_type: ServiceType,
    pub status: TenderStatus,
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

/// Aggregate root: Tender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tender {
    id: TenderId,
    organization_id: OrganizationId,
    status: TenderStatus,
    versions: VersionLog<TenderContent>,
}

impl Tender {
    /// A not-yet-created tender shell; `CreateTender` turns it into version 1.
    pub fn draft(id: TenderId, organization_id: OrganizationId) -> Self {
        Self {
            id,
            organization_id,
            status: TenderStatus::Created,
            versions: VersionLog::new(),
        }
    }

    pub fn id_typed(&self) -> TenderId {
        self.id
    }

    pub fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    pub fn status(&self) -> TenderStatus {
        self.status
    }

    pub fn is_created(&self) -> bool {
        !self.versions.is_empty()
    }

    /// Snapshot at the current version.
    pub fn current(&self) -> Option<&TenderVersion> {
        self.versions.current()
    }

    pub fn name(&self) -> &str {
        self.current().map_or("", |v| v.content.name.as_str())
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.versions.first().map(|v| v.created_at)
    }

    pub fn versions(&self) -> &[TenderVersion] {
        self.versions.entries()
    }

    /// Snapshot at version `n` (1-based).
    pub fn get_version(&self, n: u64) -> DomainResult<&TenderVersion> {
        self.versions
            .get(n)
            .ok_or_else(|| DomainError::not_found(format!("tender {} version {n}", self.id)))
    }

    pub fn view(&self) -> Option<TenderView> {
        let current = self.current()?;
        Some(TenderView {
            id: self.id,
            organization_id: self.organization_id,
            name: current.content.name.clone(),
            description: current.content.description.clone(),
            service_type: current.content.service_type,
            status: self.status,
            version: current.version,
            created_at: self.created_at().unwrap_or(current.created_at),
        })
    }
}

impl AggregateRoot for Tender {
    type Id = TenderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.versions.current_version()
    }
}

/// Command: CreateTender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTender {
    pub content: TenderContent,
    pub occurred_at: DateTime<Utc>,
}

/// Command: EditTender (appends a version, status unchanged).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTender {
    pub patch: TenderPatch,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangeTenderStatus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeTenderStatus {
    pub status: TenderStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RollbackTender (appends a copy of an earlier version).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackTender {
    pub version: u64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenderCommand {
    Create(CreateTender),
    Edit(EditTender),
    ChangeStatus(ChangeTenderStatus),
    Rollback(RollbackTender),
}

/// Event: TenderCreated (version 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenderCreated {
    pub tender_id: TenderId,
    pub organization_id: OrganizationId,
    pub content: TenderContent,
    pub occurred_at: DateTime<Utc>,
}

/// Event: TenderVersionAppended (edit or rollback).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenderVersionAppended {
    pub tender_id: TenderId,
    pub version: u64,
    pub content: TenderContent,
    /// Set when the content was copied from an earlier version.
    pub rolled_back_from: Option<u64>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: TenderStatusChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenderStatusChanged {
    pub tender_id: TenderId,
    pub from: TenderStatus,
    pub to: TenderStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TenderEvent {
    Created(TenderCreated),
    VersionAppended(TenderVersionAppended),
    StatusChanged(TenderStatusChanged),
}

impl Event for TenderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TenderEvent::Created(_) => "tender.created",
            TenderEvent::VersionAppended(e) if e.rolled_back_from.is_some() => "tender.rolled_back",
            TenderEvent::VersionAppended(_) => "tender.edited",
            TenderEvent::StatusChanged(_) => "tender.status_changed",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            TenderEvent::Created(e) => e.occurred_at,
            TenderEvent::VersionAppended(e) => e.occurred_at,
            TenderEvent::StatusChanged(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Tender {
    type Command = TenderCommand;
    type Event = TenderEvent;

    const TYPE: &'static str = "tender";

    fn apply(&mut self, event: &Self::Event) {
        match event {
            TenderEvent::Created(e) => {
                self.organization_id = e.organization_id;
                self.status = TenderStatus::Created;
                self.versions = VersionLog::new();
                self.versions.push(1, e.content.clone(), e.occurred_at);
            }
            TenderEvent::VersionAppended(e) => {
                self.versions.push(e.version, e.content.clone(), e.occurred_at);
            }
            TenderEvent::StatusChanged(e) => {
                self.status = e.to;
            }
        }
    }

    fn handle(&self, command: &Self::Command) -> DomainResult<Vec<Self::Event>> {
        match command {
            TenderCommand::Create(cmd) => self.handle_create(cmd),
            TenderCommand::Edit(cmd) => self.handle_edit(cmd),
            TenderCommand::ChangeStatus(cmd) => self.handle_change_status(cmd),
            TenderCommand::Rollback(cmd) => self.handle_rollback(cmd),
        }
    }

    fn check_invariants(&self) -> DomainResult<()> {
        self.versions
            .check()
            .map_err(|e| DomainError::internal(format!("tender {}: {e}", self.id)))
    }
}

impl Tender {
    fn ensure_created(&self) -> DomainResult<&TenderVersion> {
        self.current()
            .ok_or_else(|| DomainError::not_found(format!("tender {}", self.id)))
    }

    fn append(
        &self,
        content: TenderContent,
        rolled_back_from: Option<u64>,
        occurred_at: DateTime<Utc>,
    ) -> TenderEvent {
        TenderEvent::VersionAppended(TenderVersionAppended {
            tender_id: self.id,
            version: self.versions.next_version(),
            content,
            rolled_back_from,
            occurred_at,
        })
    }

    fn handle_create(&self, cmd: &CreateTender) -> DomainResult<Vec<TenderEvent>> {
        if self.is_created() {
            return Err(DomainError::conflict(format!("tender {} already exists", self.id)));
        }

        Ok(vec![TenderEvent::Created(TenderCreated {
            tender_id: self.id,
            organization_id: self.organization_id,
            content: cmd.content.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_edit(&self, cmd: &EditTender) -> DomainResult<Vec<TenderEvent>> {
        let current = self.ensure_created()?;

        if cmd.patch.is_empty() {
            return Err(DomainError::validation("nothing to update"));
        }

        let content = cmd.patch.apply_to(&current.content);
        Ok(vec![self.append(content, None, cmd.occurred_at)])
    }

    fn handle_change_status(&self, cmd: &ChangeTenderStatus) -> DomainResult<Vec<TenderEvent>> {
        self.ensure_created()?;

        let to = self.status.transition(cmd.status)?;
        Ok(vec![TenderEvent::StatusChanged(TenderStatusChanged {
            tender_id: self.id,
            from: self.status,
            to,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_rollback(&self, cmd: &RollbackTender) -> DomainResult<Vec<TenderEvent>> {
        self.ensure_created()?;

        let content = self.versions.rollback_source(cmd.version)?.clone();
        Ok(vec![self.append(content, Some(cmd.version), cmd.occurred_at)])
    }
}
