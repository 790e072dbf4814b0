//! The ontology graph consumed by the scoring engine
//!
//! [`OntologyGraph`] is the contract the core relies on. [`Ontology`] is the
//! bundled in-memory implementation that can be loaded from an `hp.obo` file
//! or built term by term.
use core::fmt::Debug;
use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::parser;
use crate::term::internal::HpoTermInternal;
use crate::term::HpoGroup;
use crate::{BoqaError, BoqaResult, HpoTermId, ROOT_ID};

mod termarena;
use termarena::Arena;

/// Directed acyclic graph of ontology terms with `is_a` edges
///
/// The graph must be immutable once it is handed to the scoring engine.
/// It is shared across threads, hence the `Sync` bound.
pub trait OntologyGraph: Sync {
    /// Returns the direct parents of the term, or `None` for unknown terms
    fn parents_of(&self, id: HpoTermId) -> Option<&HpoGroup>;

    /// Returns the direct children of the term, or `None` for unknown terms
    fn children_of(&self, id: HpoTermId) -> Option<&HpoGroup>;

    /// Returns the single root term of the graph
    fn root(&self) -> HpoTermId;

    /// Maps a term to its primary (non-obsolete) identifier
    ///
    /// Returns `None` if the term is unknown or cannot be mapped to a
    /// current term.
    fn resolve_primary(&self, id: HpoTermId) -> Option<HpoTermId>;

    /// Returns all direct and indirect parents of the term, excluding the term itself
    ///
    /// The default implementation walks the graph upwards.
    fn ancestors_of(&self, id: HpoTermId) -> HpoGroup {
        let mut ancestors = HpoGroup::new();
        let mut stack: Vec<HpoTermId> = Vec::new();
        if let Some(parents) = self.parents_of(id) {
            stack.extend(parents);
        }
        while let Some(current) = stack.pop() {
            if ancestors.insert(current) {
                if let Some(parents) = self.parents_of(current) {
                    stack.extend(parents.iter().filter(|p| !ancestors.contains(p)));
                }
            }
        }
        ancestors
    }

    /// Returns `true` if `ancestor` is a direct or indirect parent of `node`
    fn is_descendant_of(&self, node: HpoTermId, ancestor: HpoTermId) -> bool {
        self.ancestors_of(node).contains(&ancestor)
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// In-memory ontology, holding all terms and their relationships
///
/// Every term (except the root) has at least one parent term in an `is_a`
/// relationship. Obsolete terms are kept so that they can be redirected to
/// their replacement, secondary IDs (`alt_id`) are redirected to their
/// primary term.
///
/// # Construction
///
/// 1. Load an `hp.obo` file with [`Ontology::from_obo`]
/// 2. Build it yourself:
///     - construct an empty Ontology [`Ontology::default`]
///     - add all terms [`Ontology::insert_term`]
///     - connect terms to their parents [`Ontology::add_parent`]
///     - cache all grandparent connections [`Ontology::create_cache`]
///
/// # Example ontology
///
/// Tests and examples use the small ontology from `tests/example.obo`:
///
/// ```mermaid
/// graph TD
/// HP:0000001["All"] --> HP:0000005["Mode of inheritance"]
/// HP:0000001 --> HP:0000118["Phenotypic abnormality"]
/// HP:0000005 --> HP:0000006["Autosomal dominant inheritance"]
/// HP:0000005 --> HP:0000007["Autosomal recessive inheritance"]
/// HP:0000118 --> HP:0000707["Abnormality of the nervous system"]
/// HP:0000118 --> HP:0000152["Abnormality of head or neck"]
/// HP:0000118 --> HP:0001626["Abnormality of the cardiovascular system"]
/// HP:0000707 --> HP:0012638["Abnormal nervous system physiology"]
/// HP:0000707 --> HP:0012639["Abnormal nervous system morphology"]
/// HP:0012638 --> HP:0001250["Seizure"]
/// HP:0001250 --> HP:0002069["Bilateral tonic-clonic seizure"]
/// HP:0012639 --> HP:0002011["Morphological central nervous system abnormality"]
/// HP:0000152 --> HP:0000234["Abnormality of the head"]
/// HP:0000234 --> HP:0000252["Microcephaly"]
/// HP:0002011 --> HP:0000252
/// HP:0001626 --> HP:0001627["Abnormal heart morphology"]
/// HP:0001627 --> HP:0001631["Atrial septal defect"]
/// ```
///
/// # Examples
///
/// ```
/// use boqa::{Ontology, OntologyGraph, HpoTermId};
///
/// let ontology = Ontology::from_obo("tests/example.obo").unwrap();
/// assert_eq!(ontology.len(), 18);
/// assert_eq!(ontology.name(118u32).unwrap(), "Phenotypic abnormality");
/// assert_eq!(ontology.hpo_version(), "2024-04-26");
///
/// let microcephaly = HpoTermId::from(252u32);
/// assert_eq!(ontology.parents_of(microcephaly).unwrap().len(), 2);
/// assert!(ontology.is_descendant_of(microcephaly, 118u32.into()));
/// ```
pub struct Ontology {
    hpo_terms: Arena,
    alt_ids: HashMap<HpoTermId, HpoTermId>,
    root: HpoTermId,
    hpo_version: String,
}

impl Default for Ontology {
    fn default() -> Self {
        Self {
            hpo_terms: Arena::default(),
            alt_ids: HashMap::new(),
            root: ROOT_ID,
            hpo_version: String::new(),
        }
    }
}

impl Debug for Ontology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ontology with {} terms", self.hpo_terms.len())
    }
}

/// Public API of the Ontology
impl Ontology {
    /// Loads the ontology from an `hp.obo` file
    ///
    /// # Errors
    ///
    /// - [`BoqaError::CannotOpenFile`]: the file is missing or unreadable
    /// - [`BoqaError::InvalidInput`]: a term stanza is malformed
    pub fn from_obo<P: AsRef<Path>>(filename: P) -> BoqaResult<Self> {
        let mut ont = Ontology::default();
        parser::hp_obo::read_obo_file(filename, &mut ont)?;
        ont.create_cache();
        info!(
            "Loaded ontology {} with {} terms",
            ont.hpo_version(),
            ont.len()
        );
        Ok(ont)
    }

    /// Returns the number of terms in the Ontology, including obsolete terms
    pub fn len(&self) -> usize {
        self.hpo_terms.len()
    }

    /// Returns `true` if the Ontology does not contain any terms
    ///
    /// # Examples
    ///
    /// ```
    /// use boqa::Ontology;
    /// let ontology = Ontology::default();
    /// assert!(ontology.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the term is present (obsolete or not)
    pub fn contains<I: Into<HpoTermId>>(&self, term_id: I) -> bool {
        self.hpo_terms.get(term_id.into()).is_some()
    }

    /// Returns the name of the term
    pub fn name<I: Into<HpoTermId>>(&self, term_id: I) -> Option<&str> {
        self.hpo_terms.get(term_id.into()).map(HpoTermInternal::name)
    }

    /// Returns `true` if the term is present and marked as obsolete
    pub fn is_obsolete<I: Into<HpoTermId>>(&self, term_id: I) -> bool {
        self.hpo_terms
            .get(term_id.into())
            .map_or(false, HpoTermInternal::obsolete)
    }

    /// Returns an iterator of all non-obsolete [`HpoTermId`]s
    pub fn term_ids(&self) -> impl Iterator<Item = HpoTermId> + '_ {
        self.hpo_terms
            .values()
            .filter(|term| !term.obsolete())
            .map(|term| *term.id())
    }

    /// Returns the ontology release version
    ///
    /// e.g. `2024-04-26`. The string is empty if no version was specified.
    pub fn hpo_version(&self) -> &str {
        &self.hpo_version
    }

    /// Sets the ontology release version
    pub fn set_hpo_version(&mut self, version: &str) {
        self.hpo_version = version.to_string();
    }

    /// Declares the root term of the ontology
    ///
    /// The default root is `HP:0000001 | All`
    pub fn set_root<I: Into<HpoTermId>>(&mut self, root: I) {
        self.root = root.into();
    }
}

/// Methods to build the ontology
///
/// These are used by the parsers and for tests. The ontology
/// must not be modified after [`Ontology::create_cache`] was called.
impl Ontology {
    /// Creates and inserts a new term
    ///
    /// This method does not link the term to its parents
    ///
    /// # Examples
    ///
    /// ```
    /// use boqa::Ontology;
    ///
    /// let mut ontology = Ontology::default();
    /// ontology.insert_term("FooBar".into(), 1u32);
    ///
    /// assert_eq!(ontology.len(), 1);
    /// ```
    pub fn insert_term<I: Into<HpoTermId>>(&mut self, name: String, id: I) {
        let term = HpoTermInternal::new(name, id.into());
        self.hpo_terms.insert(term);
    }

    /// Adds a connection from a term to its parent
    ///
    /// # Errors
    ///
    /// [`BoqaError::DoesNotExist`] if the parent or the child is missing
    ///
    /// # Examples
    ///
    /// ```
    /// use boqa::{Ontology, OntologyGraph};
    ///
    /// let mut ontology = Ontology::default();
    /// ontology.insert_term("Foo".into(), 1u32);
    /// ontology.insert_term("Bar".into(), 2u32);
    ///
    /// ontology.add_parent(1u32, 2u32).unwrap();
    ///
    /// assert!(ontology.parents_of(2u32.into()).unwrap().contains(&1u32.into()));
    /// assert!(ontology.add_parent(1u32, 3u32).is_err());
    /// ```
    pub fn add_parent<I: Into<HpoTermId> + Copy, J: Into<HpoTermId> + Copy>(
        &mut self,
        parent_id: I,
        child_id: J,
    ) -> BoqaResult<()> {
        if !self.contains(child_id) {
            return Err(BoqaError::DoesNotExist);
        }
        self.hpo_terms
            .get_mut(parent_id.into())
            .ok_or(BoqaError::DoesNotExist)?
            .add_child(child_id);

        self.hpo_terms
            .get_mut(child_id.into())
            .ok_or(BoqaError::DoesNotExist)?
            .add_parent(parent_id);
        Ok(())
    }

    /// Marks a term as obsolete, optionally with its replacement term
    ///
    /// # Errors
    ///
    /// [`BoqaError::DoesNotExist`] if the term is missing
    pub fn set_obsolete<I: Into<HpoTermId>>(
        &mut self,
        term_id: I,
        replacement: Option<HpoTermId>,
    ) -> BoqaResult<()> {
        let term = self
            .hpo_terms
            .get_mut(term_id.into())
            .ok_or(BoqaError::DoesNotExist)?;
        *term.obsolete_mut() = true;
        *term.replacement_mut() = replacement;
        Ok(())
    }

    /// Registers a secondary ID (`alt_id`) of a primary term
    pub fn add_alt_id<I: Into<HpoTermId>, J: Into<HpoTermId>>(&mut self, alt_id: I, primary: J) {
        self.alt_ids.insert(alt_id.into(), primary.into());
    }

    /// Creates and caches the `all_parents` values for every term
    ///
    /// This method must be called once all terms and parent connections
    /// are added. Rerunning it recalculates the whole cache.
    ///
    /// # Examples
    ///
    /// ```
    /// use boqa::{Ontology, OntologyGraph};
    ///
    /// let mut ontology = Ontology::default();
    /// ontology.insert_term("Root".into(), 1u32);
    /// ontology.insert_term("Foo".into(), 2u32);
    /// ontology.insert_term("Bar".into(), 3u32);
    ///
    /// ontology.add_parent(1u32, 2u32).unwrap();
    /// ontology.add_parent(2u32, 3u32).unwrap();
    ///
    /// ontology.create_cache();
    /// assert!(ontology.ancestors_of(3u32.into()).contains(&1u32.into()));
    /// ```
    pub fn create_cache(&mut self) {
        let term_ids: Vec<HpoTermId> = self.hpo_terms.keys();

        for id in term_ids {
            self.create_cache_of_grandparents(id);
        }
        debug!("Cached all parents of {} terms", self.len());
    }

    /// Recursively collects the parents of all parents
    ///
    /// The recursion bubbles up to the top of the ontology and caches the
    /// list of direct and indirect parents for every term on the way back
    /// down. It stops at terms with an already populated cache.
    fn create_cache_of_grandparents(&mut self, term_id: HpoTermId) {
        let Some(term) = self.hpo_terms.get(term_id) else {
            return;
        };
        let parents = term.parents().clone();
        let mut res = parents.clone();
        for parent in &parents {
            let grandparents = self.all_grandparents(parent);
            res.extend(&grandparents);
        }
        if let Some(term) = self.hpo_terms.get_mut(term_id) {
            *term.all_parents_mut() = res;
        }
    }

    fn all_grandparents(&mut self, term_id: HpoTermId) -> HpoGroup {
        let cached = self
            .hpo_terms
            .get(term_id)
            .map_or(true, HpoTermInternal::parents_cached);
        if !cached {
            self.create_cache_of_grandparents(term_id);
        }
        self.hpo_terms
            .get(term_id)
            .map(|term| term.all_parents().clone())
            .unwrap_or_default()
    }
}

impl OntologyGraph for Ontology {
    fn parents_of(&self, id: HpoTermId) -> Option<&HpoGroup> {
        self.hpo_terms.get(id).map(HpoTermInternal::parents)
    }

    fn children_of(&self, id: HpoTermId) -> Option<&HpoGroup> {
        self.hpo_terms.get(id).map(HpoTermInternal::children)
    }

    fn root(&self) -> HpoTermId {
        self.root
    }

    /// Live terms map to themselves, obsolete terms to their live
    /// replacement and secondary IDs to their live primary term.
    /// The redirection is applied only once.
    fn resolve_primary(&self, id: HpoTermId) -> Option<HpoTermId> {
        let live = |id: HpoTermId| {
            self.hpo_terms
                .get(id)
                .filter(|term| !term.obsolete())
                .map(|term| *term.id())
        };
        match self.hpo_terms.get(id) {
            Some(term) if !term.obsolete() => Some(id),
            Some(term) => term.replacement().and_then(live),
            None => self.alt_ids.get(&id).copied().and_then(live),
        }
    }

    /// Uses the cached parents, see [`Ontology::create_cache`]
    fn ancestors_of(&self, id: HpoTermId) -> HpoGroup {
        match self.hpo_terms.get(id) {
            Some(term) if term.parents_cached() => term.all_parents().clone(),
            Some(_) => self.walk_ancestors(id),
            None => HpoGroup::new(),
        }
    }

    fn is_descendant_of(&self, node: HpoTermId, ancestor: HpoTermId) -> bool {
        match self.hpo_terms.get(node) {
            Some(term) if term.parents_cached() => term.all_parents().contains(&ancestor),
            Some(_) => self.walk_ancestors(node).contains(&ancestor),
            None => false,
        }
    }
}

impl Ontology {
    /// Uncached graph walk, used before [`Ontology::create_cache`] was called
    fn walk_ancestors(&self, id: HpoTermId) -> HpoGroup {
        struct Uncached<'a>(&'a Ontology);
        impl OntologyGraph for Uncached<'_> {
            fn parents_of(&self, id: HpoTermId) -> Option<&HpoGroup> {
                self.0.parents_of(id)
            }
            fn children_of(&self, id: HpoTermId) -> Option<&HpoGroup> {
                self.0.children_of(id)
            }
            fn root(&self) -> HpoTermId {
                self.0.root()
            }
            fn resolve_primary(&self, id: HpoTermId) -> Option<HpoTermId> {
                self.0.resolve_primary(id)
            }
        }
        Uncached(self).ancestors_of(id)
    }
}
