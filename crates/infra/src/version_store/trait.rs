use std::sync::Arc;

use tenderflow_core::{Aggregate, DomainResult, ExpectedVersion};

/// Decision step run against the locked current state of one entity.
pub type Mutation<'a, A> = dyn FnMut(&A) -> DomainResult<Vec<<A as Aggregate>::Event>> + 'a;

/// Result of a committed write: the entity after the events were applied.
#[derive(Debug, Clone)]
pub struct Committed<A: Aggregate> {
    pub aggregate: A,
    pub events: Vec<A::Event>,
}

impl<A: Aggregate> Committed<A> {
    pub fn is_noop(&self) -> bool {
        self.events.is_empty()
    }
}

/// Linearizable per-entity storage for versioned aggregates.
///
/// ## Write semantics
///
/// `execute()`:
/// - Serializes all writers of the same entity (writers of different entities run in parallel)
/// - Checks `ExpectedVersion` against the current version (mismatch → `Conflict`)
/// - Runs the mutation on the current state; its events are applied to a copy
/// - Verifies `check_invariants()` on the copy and only then replaces the stored state
///
/// A failing mutation or invariant leaves the stored entity untouched.
///
/// ## Read semantics
///
/// `load()` and `list()` return clones taken under each entity's own lock, so a
/// reader never observes a half-applied write.
pub trait VersionStore<A: Aggregate>: Send + Sync {
    /// Run `command` against `draft` and insert the result (`Conflict` if the id is taken).
    fn create(&self, draft: A, command: &A::Command) -> DomainResult<Committed<A>>;

    /// Atomically read-decide-apply against one existing entity (`NotFound` if absent).
    fn execute(
        &self,
        id: A::Id,
        expected: ExpectedVersion,
        mutation: &mut Mutation<'_, A>,
    ) -> DomainResult<Committed<A>>;

    fn load(&self, id: A::Id) -> DomainResult<A>;

    fn list(&self) -> DomainResult<Vec<A>>;

    /// Shorthand for `execute` with the aggregate's own command handler.
    fn handle(
        &self,
        id: A::Id,
        expected: ExpectedVersion,
        command: &A::Command,
    ) -> DomainResult<Committed<A>> {
        self.execute(id, expected, &mut |aggregate: &A| aggregate.handle(command))
    }
}

impl<A, S> VersionStore<A> for Arc<S>
where
    A: Aggregate,
    S: VersionStore<A> + ?Sized,
{
    fn create(&self, draft: A, command: &A::Command) -> DomainResult<Committed<A>> {
        (**self).create(draft, command)
    }

    fn execute(
        &self,
        id: A::Id,
        expected: ExpectedVersion,
        mutation: &mut Mutation<'_, A>,
    ) -> DomainResult<Committed<A>> {
        (**self).execute(id, expected, mutation)
    }

    fn load(&self, id: A::Id) -> DomainResult<A> {
        (**self).load(id)
    }

    fn list(&self) -> DomainResult<Vec<A>> {
        (**self).list()
    }
}
