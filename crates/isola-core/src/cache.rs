//! Memoized substitution for one instantiation.
//!
//! Parallel analyses of the same instantiation share a [`SubstCache`]. Keys
//! are isolation values, so two values that differ only in provenance share
//! an entry; the caller's provenance is stamped back onto the cached result.

use std::collections::HashMap;

use isola_types::Substitution;
use parking_lot::RwLock;
use tracing::trace;

use crate::{ActorIsolation, Isolation};

#[derive(Debug)]
pub struct SubstCache {
    subs: Substitution,
    entries: RwLock<HashMap<ActorIsolation, ActorIsolation>>,
}

impl SubstCache {
    pub fn new(subs: Substitution) -> Self {
        Self {
            subs,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn substitution(&self) -> &Substitution {
        &self.subs
    }

    /// Same result as [`ActorIsolation::subst`] with this cache's substitution.
    pub fn subst(&self, isolation: &ActorIsolation) -> ActorIsolation {
        match isolation.isolation() {
            Isolation::GlobalActor { actor: Some(_) } => {}
            Isolation::GlobalActor { actor: None }
            | Isolation::Unspecified
            | Isolation::ActorInstance { .. }
            | Isolation::Nonisolated
            | Isolation::NonisolatedUnsafe => return isolation.clone(),
        }

        if let Some(hit) = self.entries.read().get(isolation) {
            trace!(%isolation, "substitution cache hit");
            return hit.with_preconcurrency(isolation.preconcurrency());
        }

        let result = isolation.subst(&self.subs);
        self.entries
            .write()
            .entry(isolation.clone())
            .or_insert_with(|| result.clone());
        result
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
