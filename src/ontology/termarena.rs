use std::collections::hash_map::Values;
use std::collections::HashMap;

use crate::term::internal::HpoTermInternal;
use crate::HpoTermId;

/// Owns all terms of the [`crate::Ontology`], indexed by their ID
pub(crate) struct Arena {
    terms: HashMap<HpoTermId, HpoTermInternal>,
}

impl Arena {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn insert(&mut self, term: HpoTermInternal) {
        let id = *term.id();
        self.terms.insert(id, term);
    }

    pub fn get(&self, id: HpoTermId) -> Option<&HpoTermInternal> {
        self.terms.get(&id)
    }

    pub fn get_mut(&mut self, id: HpoTermId) -> Option<&mut HpoTermInternal> {
        self.terms.get_mut(&id)
    }

    pub fn values(&self) -> Values<'_, HpoTermId, HpoTermInternal> {
        self.terms.values()
    }

    pub fn keys(&self) -> Vec<HpoTermId> {
        self.terms.keys().copied().collect()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            terms: HashMap::with_capacity(20_000),
        }
    }
}
