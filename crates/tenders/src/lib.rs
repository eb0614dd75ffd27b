//! Tenders domain module.
//!
//! A tender is an append-only log of content versions plus a mutable status,
//! implemented purely as deterministic domain logic (no IO, no storage).

pub mod tender;

pub use tender::{
    ChangeTenderStatus, CreateTender, EditTender, RollbackTender, ServiceType, Tender,
    TenderCommand, TenderContent, TenderCreated, TenderEvent, TenderPatch, TenderStatus,
    TenderStatusChanged, TenderVersion, TenderVersionAppended, TenderView,
};
