//! Expansion of observed terms into their ancestor closure
//!
//! An annotation to a term implies an annotation to all of its ancestors.
//! A [`Layer`] is the set of observed terms together with all of their
//! ancestors, without the root of the ontology. The [`LayerExpander`]
//! creates layers for diseases and patients.
use std::sync::Arc;

use tracing::trace;

use crate::term::Iter;
use crate::{HpoGroup, HpoTermId, OntologyGraph};

mod ancestor_cache;
mod reporter;

use ancestor_cache::AncestorCache;
pub use ancestor_cache::DEFAULT_CAPACITY;
pub use reporter::TermReporter;

/// A set of terms that is closed under the "ancestor of" relation
///
/// The root term of the ontology is never part of a layer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Layer {
    terms: HpoGroup,
}

impl Layer {
    /// Returns the number of terms in the layer
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns `true` if the layer does not contain any term
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns `true` if the term is part of the layer
    pub fn contains(&self, id: &HpoTermId) -> bool {
        self.terms.contains(id)
    }

    /// Returns an iterator of all terms, ascending by ID
    pub fn iter(&self) -> Iter<'_> {
        self.terms.iter()
    }

    /// Returns the terms of the layer
    pub fn terms(&self) -> &HpoGroup {
        &self.terms
    }

    /// Returns a new layer that contains only `subtree_root` and its descendants
    pub fn restrict_to_subtree<G: OntologyGraph + ?Sized>(
        &self,
        graph: &G,
        subtree_root: HpoTermId,
    ) -> Layer {
        let mut terms = self.terms.clone();
        terms.retain(|id| *id == subtree_root || graph.is_descendant_of(*id, subtree_root));
        Layer { terms }
    }
}

/// Builds a layer from arbitrary terms
///
/// The terms are taken as they are, it is the caller's responsibility
/// that they form a closure. Use [`LayerExpander::expand`] otherwise.
impl From<HpoGroup> for Layer {
    fn from(terms: HpoGroup) -> Self {
        Self { terms }
    }
}

impl FromIterator<HpoTermId> for Layer {
    fn from_iter<T: IntoIterator<Item = HpoTermId>>(iter: T) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Layer {
    type Item = HpoTermId;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.terms.iter()
    }
}

/// Expands sets of terms into [`Layer`]s
///
/// Obsolete and secondary IDs are mapped to their primary term, unknown IDs
/// are dropped. Both cases are reported once per term through the
/// [`TermReporter`]. The inclusive ancestors of each term are cached
/// in a bounded cache that is shared by all threads using the expander.
///
/// # Examples
///
/// ```
/// use boqa::{HpoTermId, LayerExpander, Ontology};
///
/// let ontology = Ontology::from_obo("tests/example.obo").unwrap();
/// let expander = LayerExpander::new(&ontology);
///
/// // Microcephaly has two paths to `Phenotypic abnormality`
/// let layer = expander.expand([HpoTermId::from(252u32)]);
/// assert_eq!(layer.len(), 7);
/// assert!(layer.contains(&118u32.into()));
/// assert!(!layer.contains(&1u32.into()));
///
/// // The obsolete term HP:0002122 is replaced by `Seizure`
/// let layer = expander.expand([HpoTermId::from(2122u32)]);
/// assert!(layer.contains(&1250u32.into()));
/// assert_eq!(expander.reporter().replaced_count(), 1);
/// ```
pub struct LayerExpander<'a, G: OntologyGraph + ?Sized> {
    graph: &'a G,
    cache: AncestorCache,
    reporter: Arc<TermReporter>,
}

impl<'a, G: OntologyGraph + ?Sized> LayerExpander<'a, G> {
    /// Constructs a new expander with its own [`TermReporter`]
    pub fn new(graph: &'a G) -> Self {
        Self::with_reporter(graph, Arc::new(TermReporter::new()))
    }

    /// Constructs a new expander that reports to the given [`TermReporter`]
    pub fn with_reporter(graph: &'a G, reporter: Arc<TermReporter>) -> Self {
        Self {
            graph,
            cache: AncestorCache::default(),
            reporter,
        }
    }

    /// Sets the number of terms whose ancestors are cached
    ///
    /// The default is [`DEFAULT_CAPACITY`]. A capacity of `0` disables the cache.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.cache = AncestorCache::new(capacity);
        self
    }

    /// Returns the ontology graph
    pub fn graph(&self) -> &'a G {
        self.graph
    }

    /// Returns the [`TermReporter`]
    pub fn reporter(&self) -> &TermReporter {
        &self.reporter
    }

    /// Returns the number of terms in the ancestor cache
    pub fn cached_terms(&self) -> usize {
        self.cache.len()
    }

    /// Returns the maximum number of terms in the ancestor cache
    pub fn cache_capacity(&self) -> usize {
        self.cache.capacity()
    }

    /// Expands the terms into their ancestor closure
    ///
    /// Each term is mapped to its primary ID first. The root
    /// of the ontology is removed from the result.
    pub fn expand<I: IntoIterator<Item = HpoTermId>>(&self, terms: I) -> Layer {
        let mut layer = HpoGroup::new();
        for term in terms {
            let Some(primary) = self.graph.resolve_primary(term) else {
                self.reporter.unresolved(term);
                continue;
            };
            if primary != term {
                self.reporter.replaced(term, primary);
            }
            if layer.contains(&primary) {
                // all ancestors are present already
                continue;
            }
            layer = &layer | self.ancestors(primary).as_ref();
        }
        layer.remove(&self.graph.root());
        Layer { terms: layer }
    }

    /// Returns the term and all of its ancestors
    fn ancestors(&self, term: HpoTermId) -> Arc<HpoGroup> {
        if let Some(ancestors) = self.cache.get(&term) {
            return ancestors;
        }
        trace!("Expanding ancestors of {}", term);
        let mut ancestors = self.graph.ancestors_of(term);
        ancestors.insert(term);
        let ancestors = Arc::new(ancestors);
        self.cache.insert(term, Arc::clone(&ancestors));
        ancestors
    }
}
