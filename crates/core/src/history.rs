//! Append-only content history shared by versioned aggregates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Immutable snapshot of an aggregate's editable content at one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<C> {
    pub version: u64,
    pub content: C,
    pub created_at: DateTime<Utc>,
}

/// Ordered, append-only log of snapshots numbered `1..=n`.
///
/// Nothing here ever rewrites or removes an entry; a rollback is recorded by
/// pushing a copy of an earlier entry's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionLog<C> {
    entries: Vec<Snapshot<C>>,
}

impl<C> Default for VersionLog<C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<C: ValueObject> VersionLog<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_version(&self) -> u64 {
        self.entries.len() as u64
    }

    pub fn next_version(&self) -> u64 {
        self.current_version() + 1
    }

    pub fn current(&self) -> Option<&Snapshot<C>> {
        self.entries.last()
    }

    pub fn first(&self) -> Option<&Snapshot<C>> {
        self.entries.first()
    }

    pub fn entries(&self) -> &[Snapshot<C>] {
        &self.entries
    }

    /// Snapshot at version `n` (1-based), if it exists.
    pub fn get(&self, n: u64) -> Option<&Snapshot<C>> {
        let idx = usize::try_from(n.checked_sub(1)?).ok()?;
        self.entries.get(idx)
    }

    /// Content to copy when rolling back to version `n`.
    pub fn rollback_source(&self, n: u64) -> DomainResult<&C> {
        self.get(n).map(|s| &s.content).ok_or_else(|| {
            DomainError::validation(format!(
                "rollback target version {n} out of range 1..={}",
                self.current_version()
            ))
        })
    }

    /// Record a snapshot exactly as decided; numbering is verified by [`check`](Self::check).
    pub fn push(&mut self, version: u64, content: C, created_at: DateTime<Utc>) {
        self.entries.push(Snapshot {
            version,
            content,
            created_at,
        });
    }

    /// Verify that versions form the contiguous sequence `1..=n`.
    pub fn check(&self) -> DomainResult<()> {
        for (idx, s) in self.entries.iter().enumerate() {
            let expected = idx as u64 + 1;
            if s.version != expected {
                return Err(DomainError::internal(format!(
                    "version history out of order: found {} at position {expected}",
                    s.version
                )));
            }
        }
        Ok(())
    }
}
