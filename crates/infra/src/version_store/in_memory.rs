use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tenderflow_core::{
    Aggregate, AggregateRoot, DomainError, DomainResult, Event as _, ExpectedVersion,
};

use super::r#trait::{Committed, Mutation, VersionStore};

type Slot<A> = Arc<Mutex<A>>;

/// In-memory version store with one mutex per entity.
///
/// The map-wide `RwLock` is held only to look up or insert an entity slot;
/// all work on an entity happens under that entity's own mutex.
pub struct InMemoryVersionStore<A: Aggregate> {
    entities: RwLock<HashMap<A::Id, Slot<A>>>,
}

impl<A: Aggregate> Default for InMemoryVersionStore<A> {
    fn default() -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
        }
    }
}

impl<A: Aggregate> InMemoryVersionStore<A> {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> DomainError {
        DomainError::internal(format!("{} store lock poisoned", A::TYPE))
    }

    fn slot(&self, id: A::Id) -> DomainResult<Slot<A>> {
        let entities = self.entities.read().map_err(|_| Self::poisoned())?;
        entities
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("{} {id}", A::TYPE)))
    }

    fn lock(slot: &Slot<A>) -> DomainResult<MutexGuard<'_, A>> {
        slot.lock().map_err(|_| Self::poisoned())
    }

    /// Apply `events` to a copy of `current` and verify the result.
    fn replay(current: &A, events: &[A::Event]) -> DomainResult<A> {
        let mut next = current.clone();
        for e in events {
            next.apply(e);
        }
        next.check_invariants()?;
        Ok(next)
    }

    fn log_commit(id: A::Id, version: u64, events: &[A::Event]) {
        for e in events {
            tracing::debug!(
                aggregate = A::TYPE,
                id = %id,
                version,
                event = e.event_type(),
                occurred_at = %e.occurred_at(),
                "event committed"
            );
        }
    }
}

impl<A> VersionStore<A> for InMemoryVersionStore<A>
where
    A: Aggregate,
{
    fn create(&self, draft: A, command: &A::Command) -> DomainResult<Committed<A>> {
        let id = *draft.id();
        let events = draft.handle(command)?;
        let created = Self::replay(&draft, &events)?;

        let mut entities = self.entities.write().map_err(|_| Self::poisoned())?;
        if entities.contains_key(&id) {
            return Err(DomainError::conflict(format!("{} {id} already exists", A::TYPE)));
        }
        entities.insert(id, Arc::new(Mutex::new(created.clone())));
        drop(entities);

        Self::log_commit(id, created.version(), &events);
        Ok(Committed {
            aggregate: created,
            events,
        })
    }

    fn execute(
        &self,
        id: A::Id,
        expected: ExpectedVersion,
        mutation: &mut Mutation<'_, A>,
    ) -> DomainResult<Committed<A>> {
        let slot = self.slot(id)?;
        let mut current = Self::lock(&slot)?;

        expected.check(current.version())?;

        let events = mutation(&*current)?;
        if events.is_empty() {
            return Ok(Committed {
                aggregate: current.clone(),
                events,
            });
        }

        let next = Self::replay(&current, &events)?;
        *current = next.clone();
        drop(current);

        Self::log_commit(id, next.version(), &events);
        Ok(Committed {
            aggregate: next,
            events,
        })
    }

    fn load(&self, id: A::Id) -> DomainResult<A> {
        let slot = self.slot(id)?;
        let current = Self::lock(&slot)?;
        Ok(current.clone())
    }

    fn list(&self) -> DomainResult<Vec<A>> {
        let slots: Vec<Slot<A>> = {
            let entities = self.entities.read().map_err(|_| Self::poisoned())?;
            entities.values().cloned().collect()
        };

        slots
            .iter()
            .map(|slot| Self::lock(slot).map(|current| current.clone()))
            .collect()
    }
}
