use std::collections::HashSet;
use std::fmt::Display;

use crate::layer::Layer;
use crate::{HpoTermId, OntologyGraph};

/// The sufficient statistics of one disease for one patient
///
/// - `tp`: terms of the disease that are observed in the patient
/// - `fp`: terms observed in the patient that are not part of the disease
/// - `tn`: terms neither part of the disease nor observed in the patient
/// - `fn`: terms of the disease that are not observed in the patient
///
/// Which terms are counted depends on the [`CountingRules`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Counts {
    tp: u32,
    fp: u32,
    tn: u32,
    fn_: u32,
}

impl Counts {
    /// Constructs new [`Counts`] in the order `tp, fp, tn, fn`
    pub fn new(tp: u32, fp: u32, tn: u32, fn_: u32) -> Self {
        Self { tp, fp, tn, fn_ }
    }

    /// Returns the number of true positive terms
    pub fn true_positives(&self) -> u32 {
        self.tp
    }

    /// Returns the number of false positive terms
    pub fn false_positives(&self) -> u32 {
        self.fp
    }

    /// Returns the number of true negative terms
    pub fn true_negatives(&self) -> u32 {
        self.tn
    }

    /// Returns the number of false negative terms
    pub fn false_negatives(&self) -> u32 {
        self.fn_
    }
}

impl Display for Counts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "tp={} fp={} tn={} fn={}",
            self.tp, self.fp, self.tn, self.fn_
        )
    }
}

/// Selects how each of the four [`Counts`] is derived
///
/// Both layers contain all ancestors of the observed terms, so a single
/// difference at a specific term shows up again at every one of its
/// ancestors. The boundary rules count only the most specific terms:
///
/// - `boundary_true_positives`: shared terms without a child in the query layer
/// - `boundary_false_positives`: query-only terms without a child in the query layer
/// - `boundary_false_negatives`: disease-only terms whose parents are all in the query layer
///
/// A disabled boundary rule counts every term of the respective set instead.
/// True negatives are only counted if `true_negatives` is enabled: children
/// of query terms that are absent from both layers and whose parents are all
/// in the query layer. Each of them is counted once.
///
/// The default enables all boundary rules and disables true negatives.
///
/// # Examples
///
/// ```
/// use boqa::{CountingRules, HpoTermId, Layer, Ontology};
///
/// let mut ontology = Ontology::default();
/// ontology.insert_term("Root".into(), 1u32);
/// ontology.insert_term("B".into(), 2u32);
/// ontology.insert_term("A".into(), 3u32);
/// ontology.add_parent(1u32, 2u32).unwrap();
/// ontology.add_parent(2u32, 3u32).unwrap();
/// ontology.create_cache();
///
/// let layer: Layer = [HpoTermId::from(2u32), HpoTermId::from(3u32)].into_iter().collect();
///
/// let canonical = CountingRules::default().count(&layer, &layer, &ontology);
/// assert_eq!(canonical.true_positives(), 1);
///
/// let naive = CountingRules::naive().count(&layer, &layer, &ontology);
/// assert_eq!(naive.true_positives(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountingRules {
    /// Count only true positives without an active child
    pub boundary_true_positives: bool,
    /// Count only false positives without an active child
    pub boundary_false_positives: bool,
    /// Count only false negatives whose parents are all active
    pub boundary_false_negatives: bool,
    /// Count true negatives
    pub true_negatives: bool,
}

impl Default for CountingRules {
    fn default() -> Self {
        Self {
            boundary_true_positives: true,
            boundary_false_positives: true,
            boundary_false_negatives: true,
            true_negatives: false,
        }
    }
}

impl CountingRules {
    /// Counts every term of the intersection and of both differences
    ///
    /// This is the legacy behaviour and overcounts redundant ancestors.
    pub fn naive() -> Self {
        Self {
            boundary_true_positives: false,
            boundary_false_positives: false,
            boundary_false_negatives: false,
            true_negatives: false,
        }
    }

    /// Enables or disables counting of true negatives
    #[must_use]
    pub fn with_true_negatives(mut self, enabled: bool) -> Self {
        self.true_negatives = enabled;
        self
    }

    /// Derives the [`Counts`] of a disease layer and a query layer
    ///
    /// Terms that are unknown to the graph are treated as terms
    /// without parents and children.
    pub fn count<G: OntologyGraph + ?Sized>(
        &self,
        disease: &Layer,
        query: &Layer,
        graph: &G,
    ) -> Counts {
        let mut counts = Counts::default();

        for term in disease {
            if query.contains(&term) {
                if !self.boundary_true_positives || !has_active_child(term, query, graph) {
                    counts.tp += 1;
                }
            } else if !self.boundary_false_negatives || all_parents_active(term, query, graph) {
                counts.fn_ += 1;
            }
        }

        for term in query {
            if !disease.contains(&term)
                && (!self.boundary_false_positives || !has_active_child(term, query, graph))
            {
                counts.fp += 1;
            }
        }

        if self.true_negatives {
            counts.tn = true_negatives(disease, query, graph);
        }
        counts
    }
}

/// Counts with the default [`CountingRules`]
pub fn count<G: OntologyGraph + ?Sized>(disease: &Layer, query: &Layer, graph: &G) -> Counts {
    CountingRules::default().count(disease, query, graph)
}

fn has_active_child<G: OntologyGraph + ?Sized>(term: HpoTermId, query: &Layer, graph: &G) -> bool {
    graph
        .children_of(term)
        .map_or(false, |children| children.iter().any(|child| query.contains(&child)))
}

fn all_parents_active<G: OntologyGraph + ?Sized>(
    term: HpoTermId,
    query: &Layer,
    graph: &G,
) -> bool {
    graph
        .parents_of(term)
        .map_or(true, |parents| parents.iter().all(|parent| query.contains(&parent)))
}

fn true_negatives<G: OntologyGraph + ?Sized>(disease: &Layer, query: &Layer, graph: &G) -> u32 {
    let mut seen: HashSet<HpoTermId> = HashSet::new();
    for term in query {
        let Some(children) = graph.children_of(term) else {
            continue;
        };
        for child in children {
            if !query.contains(&child)
                && !disease.contains(&child)
                && all_parents_active(child, query, graph)
            {
                seen.insert(child);
            }
        }
    }
    // a layer can never exceed the number of HPO IDs
    u32::try_from(seen.len()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::ontology::test::build;
    use crate::{LayerExpander, Ontology};

    fn layer(ids: &[u32]) -> Layer {
        ids.iter().map(|id| HpoTermId::from(*id)).collect()
    }

    // 1 -> 2 -> 3
    fn chain() -> Ontology {
        build(&[1, 2, 3], &[(2, 1), (3, 2)])
    }

    // 1 -> 2 -> 4
    // 1 -> 3 -> 4
    // 2 -> 5
    fn diamond() -> Ontology {
        build(&[1, 2, 3, 4, 5], &[(2, 1), (3, 1), (4, 2), (4, 3), (5, 2)])
    }

    #[test]
    fn boundary_true_positive() {
        let ont = chain();
        let counts = count(&layer(&[2, 3]), &layer(&[2, 3]), &ont);
        assert_eq!(counts, Counts::new(1, 0, 0, 0));
    }

    #[test]
    fn naive_true_positive() {
        let ont = chain();
        let counts = CountingRules::naive().count(&layer(&[2, 3]), &layer(&[2, 3]), &ont);
        assert_eq!(counts, Counts::new(2, 0, 0, 0));
    }

    #[test]
    fn false_negative_needs_all_parents() {
        let ont = diamond();
        let disease = layer(&[2, 3, 4]);

        // only one parent of 4 is active
        let counts = count(&disease, &layer(&[2]), &ont);
        assert_eq!(counts.false_negatives(), 0);

        // both parents of 4 are active
        let counts = count(&disease, &layer(&[2, 3]), &ont);
        assert_eq!(counts.false_negatives(), 1);
    }

    #[test]
    fn root_children_are_no_boundary_false_negatives() {
        let ont = diamond();
        let counts = count(&layer(&[2, 3, 4]), &layer(&[]), &ont);
        assert_eq!(counts, Counts::new(0, 0, 0, 0));

        let counts = CountingRules::naive().count(&layer(&[2, 3, 4]), &layer(&[]), &ont);
        assert_eq!(counts, Counts::new(0, 0, 0, 3));
    }

    #[test]
    fn boundary_false_positive() {
        let ont = diamond();
        // 2 has the active child 5, only 5 is counted
        let counts = count(&layer(&[3]), &layer(&[2, 5]), &ont);
        assert_eq!(counts.false_positives(), 1);
        let counts = CountingRules::naive().count(&layer(&[3]), &layer(&[2, 5]), &ont);
        assert_eq!(counts.false_positives(), 2);
    }

    #[test]
    fn true_negatives_are_counted_once() {
        let ont = diamond();
        let rules = CountingRules::default().with_true_negatives(true);

        // 4 is a child of both active terms 2 and 3, 5 is a child of 2
        let counts = rules.count(&layer(&[]), &layer(&[2, 3]), &ont);
        assert_eq!(counts.true_negatives(), 2);

        // 5 is part of the disease, 4 has an inactive parent
        let counts = rules.count(&layer(&[2, 5]), &layer(&[2]), &ont);
        assert_eq!(counts.true_negatives(), 0);

        assert_eq!(count(&layer(&[]), &layer(&[2, 3]), &ont).true_negatives(), 0);
    }

    #[test]
    fn mixed_example() {
        let ont = Ontology::from_obo("tests/example.obo").unwrap();
        let expander = LayerExpander::new(&ont);
        // Microcephaly + Autosomal recessive inheritance
        let disease = expander.expand([252u32.into(), 7u32.into()]);
        // Bilateral tonic-clonic seizure + Microcephaly
        let query = expander.expand([2069u32.into(), 252u32.into()]);

        let counts = count(&disease, &query, &ont);
        // Microcephaly
        assert_eq!(counts.true_positives(), 1);
        // Bilateral tonic-clonic seizure
        assert_eq!(counts.false_positives(), 1);
        // Autosomal recessive inheritance, its parent is not active
        assert_eq!(counts.false_negatives(), 0);
        assert_eq!(counts.true_negatives(), 0);
    }

    #[test]
    fn random_layers_are_deterministic() {
        let ont = Ontology::from_obo("tests/example.obo").unwrap();
        let expander = LayerExpander::new(&ont);
        let mut terms: Vec<HpoTermId> = ont.term_ids().collect();
        terms.sort_unstable();
        let mut rng = StdRng::seed_from_u64(42);
        let rules = [
            CountingRules::default(),
            CountingRules::naive(),
            CountingRules::default().with_true_negatives(true),
        ];

        for _ in 0..200 {
            let pick = |rng: &mut StdRng| {
                let n = rng.gen_range(0..4);
                (0..n)
                    .map(|_| terms[rng.gen_range(0..terms.len())])
                    .collect::<Vec<_>>()
            };
            let disease = expander.expand(pick(&mut rng));
            let query = expander.expand(pick(&mut rng));
            for rule in &rules {
                let counts = rule.count(&disease, &query, &ont);
                assert_eq!(counts, rule.count(&disease, &query, &ont));

                let shared = (disease.terms() & query.terms()).len() as u32;
                assert!(counts.true_positives() <= shared);
                assert!(counts.false_positives() <= query.len() as u32 - shared);
                assert!(counts.false_negatives() <= disease.len() as u32 - shared);
            }
        }
    }

    #[test]
    fn display() {
        assert_eq!(Counts::new(1, 2, 3, 4).to_string(), "tp=1 fp=2 tn=3 fn=4");
    }
}
