//! Ordered collection of the enemies that take part in the enemy phase.

use std::collections::BTreeSet;

use crawl_core::ActorId;

/// Live enemies keyed by identifier.
///
/// Callers never iterate the registry directly; they take a [`snapshot`]
/// so that enemies destroyed mid-iteration do not invalidate the walk.
///
/// [`snapshot`]: ActorRegistry::snapshot
#[derive(Clone, Debug, Default)]
pub struct ActorRegistry {
    members: BTreeSet<ActorId>,
}

impl ActorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an enemy, reporting whether it was newly registered.
    pub fn register(&mut self, enemy: ActorId) -> bool {
        self.members.insert(enemy)
    }

    /// Removes an enemy, reporting whether it was registered.
    pub fn deregister(&mut self, enemy: ActorId) -> bool {
        self.members.remove(&enemy)
    }

    /// Whether the enemy is registered.
    #[must_use]
    pub fn contains(&self, enemy: ActorId) -> bool {
        self.members.contains(&enemy)
    }

    /// Copies the registered identifiers in ascending order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ActorId> {
        self.members.iter().copied().collect()
    }

    /// Whether no enemy is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Forgets every registered enemy.
    pub fn clear(&mut self) {
        self.members.clear();
    }
}
