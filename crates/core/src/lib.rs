//! `tenderflow-core`: domain foundation for tenders and bids.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod author;
pub mod error;
pub mod event;
pub mod history;
pub mod id;
pub mod lifecycle;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use author::BidAuthor;
pub use error::{DomainError, DomainResult};
pub use event::Event;
pub use history::{Snapshot, VersionLog};
pub use id::{BidId, OrganizationId, TenderId, Username};
pub use lifecycle::Lifecycle;
pub use value_object::ValueObject;
