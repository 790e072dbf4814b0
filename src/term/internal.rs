use crate::term::{HpoChildren, HpoGroup, HpoParents, HpoTermId};
use crate::DEFAULT_NUM_ALL_PARENTS;
use crate::DEFAULT_NUM_PARENTS;

/// The stored representation of a term inside the [`crate::Ontology`]
#[derive(Debug)]
pub(crate) struct HpoTermInternal {
    id: HpoTermId,
    name: String,
    parents: HpoParents,
    all_parents: HpoParents,
    children: HpoChildren,
    obsolete: bool,
    replacement: Option<HpoTermId>,
}

impl HpoTermInternal {
    pub fn new(name: String, id: HpoTermId) -> HpoTermInternal {
        HpoTermInternal {
            id,
            name,
            parents: HpoGroup::with_capacity(DEFAULT_NUM_PARENTS),
            all_parents: HpoGroup::with_capacity(DEFAULT_NUM_ALL_PARENTS),
            children: HpoChildren::with_capacity(DEFAULT_NUM_PARENTS),
            obsolete: false,
            replacement: None,
        }
    }

    pub fn id(&self) -> &HpoTermId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parents(&self) -> &HpoParents {
        &self.parents
    }

    pub fn children(&self) -> &HpoChildren {
        &self.children
    }

    pub fn all_parents(&self) -> &HpoParents {
        &self.all_parents
    }

    pub fn all_parents_mut(&mut self) -> &mut HpoParents {
        &mut self.all_parents
    }

    /// A term without parents has nothing to cache, every other
    /// term is cached once `all_parents` is populated
    pub fn parents_cached(&self) -> bool {
        if self.parents.is_empty() {
            true
        } else {
            !self.all_parents.is_empty()
        }
    }

    pub fn add_parent<I: Into<HpoTermId>>(&mut self, parent_id: I) {
        self.parents.insert(parent_id);
    }

    pub fn add_child<I: Into<HpoTermId>>(&mut self, child_id: I) {
        self.children.insert(child_id);
    }

    pub fn obsolete(&self) -> bool {
        self.obsolete
    }

    pub fn obsolete_mut(&mut self) -> &mut bool {
        &mut self.obsolete
    }

    pub fn replacement(&self) -> Option<HpoTermId> {
        self.replacement
    }

    pub fn replacement_mut(&mut self) -> &mut Option<HpoTermId> {
        &mut self.replacement
    }
}

impl PartialEq for HpoTermInternal {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for HpoTermInternal {}
