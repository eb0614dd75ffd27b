//! Per-entity linearizable storage for versioned aggregates.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryVersionStore;
pub use r#trait::{Committed, Mutation, VersionStore};
