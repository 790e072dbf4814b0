use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::annotations::DiseaseData;
use crate::layer::{Layer, LayerExpander};
use crate::{BoqaError, BoqaResult, HpoTermId, OntologyGraph, PHENOTYPE_ID};

/// Options for building the [`DiseaseLayerCache`]
///
/// By default, disease layers contain only `HP:0000118 | Phenotypic abnormality`
/// and its descendants. Other branches of the ontology, e.g. the mode of
/// inheritance, are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    /// Restricts the disease layers to `subtree_root` and its descendants
    pub phenotypic_abnormality_only: bool,
    /// The root of the phenotypic subtree
    pub subtree_root: HpoTermId,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            phenotypic_abnormality_only: true,
            subtree_root: PHENOTYPE_ID,
        }
    }
}

impl CacheOptions {
    /// Options that keep all terms of the disease layers
    pub fn keep_all_terms() -> Self {
        Self {
            phenotypic_abnormality_only: false,
            ..Default::default()
        }
    }
}

#[derive(Debug)]
struct CachedDisease {
    id: String,
    label: String,
    layer: Layer,
}

/// The precomputed [`Layer`]s of all diseases
///
/// The cache is built once per run and is read-only afterwards.
///
/// # Examples
///
/// ```
/// use boqa::{CacheOptions, DiseaseCatalog, DiseaseLayerCache, LayerExpander, Ontology};
///
/// let ontology = Ontology::from_obo("tests/example.obo").unwrap();
/// let catalog = DiseaseCatalog::from_hpoa("tests/example.hpoa").unwrap();
/// let expander = LayerExpander::new(&ontology);
///
/// let cache = DiseaseLayerCache::new(&catalog, &expander, &CacheOptions::default());
/// assert_eq!(cache.len(), 4);
///
/// let layer = cache.layer_of("OMIM:100100").unwrap();
/// assert!(layer.contains(&118u32.into()));
/// // Autosomal recessive inheritance is not a phenotypic abnormality
/// assert!(!layer.contains(&7u32.into()));
///
/// assert!(cache.layer_of("OMIM:999999").is_err());
/// ```
#[derive(Debug, Default)]
pub struct DiseaseLayerCache {
    diseases: Vec<CachedDisease>,
    index: HashMap<String, usize>,
}

impl DiseaseLayerCache {
    /// Expands the observed features of every disease
    ///
    /// The diseases are processed in parallel.
    pub fn new<D, G>(diseases: &D, expander: &LayerExpander<'_, G>, options: &CacheOptions) -> Self
    where
        D: DiseaseData + ?Sized,
        G: OntologyGraph + ?Sized,
    {
        let graph = expander.graph();
        let mut cached: Vec<CachedDisease> = diseases
            .disease_ids()
            .into_par_iter()
            .map(|id| {
                let layer = match diseases.observed_features(id) {
                    Some(features) => expander.expand(features),
                    None => Layer::default(),
                };
                let layer = if options.phenotypic_abnormality_only {
                    layer.restrict_to_subtree(graph, options.subtree_root)
                } else {
                    layer
                };
                debug!("Cached layer of {} with {} terms", id, layer.len());
                CachedDisease {
                    id: id.to_string(),
                    label: diseases.label(id).unwrap_or_default().to_string(),
                    layer,
                }
            })
            .collect();
        cached.sort_unstable_by(|a, b| a.id.cmp(&b.id));
        cached.dedup_by(|a, b| a.id == b.id);

        let index = cached
            .iter()
            .enumerate()
            .map(|(idx, disease)| (disease.id.clone(), idx))
            .collect();
        info!("Cached the layers of {} diseases", cached.len());
        Self {
            diseases: cached,
            index,
        }
    }

    /// Returns the [`Layer`] of the disease
    ///
    /// # Errors
    ///
    /// [`BoqaError::DiseaseNotFound`] if the disease is not in the cache
    pub fn layer_of(&self, disease_id: &str) -> BoqaResult<&Layer> {
        self.get(disease_id).map(|disease| &disease.layer)
    }

    /// Returns the name of the disease
    ///
    /// # Errors
    ///
    /// [`BoqaError::DiseaseNotFound`] if the disease is not in the cache
    pub fn label_of(&self, disease_id: &str) -> BoqaResult<&str> {
        self.get(disease_id).map(|disease| disease.label.as_str())
    }

    /// Returns an iterator of all disease IDs, in ascending order
    pub fn disease_ids(&self) -> impl Iterator<Item = &str> {
        self.diseases.iter().map(|disease| disease.id.as_str())
    }

    /// Returns the number of diseases
    pub fn len(&self) -> usize {
        self.diseases.len()
    }

    /// Returns `true` if the cache does not contain any disease
    pub fn is_empty(&self) -> bool {
        self.diseases.is_empty()
    }

    /// Returns a parallel iterator of `(id, label, layer)` of all diseases
    pub(crate) fn par_iter(&self) -> impl IndexedParallelIterator<Item = (&str, &str, &Layer)> {
        self.diseases
            .par_iter()
            .map(|disease| (disease.id.as_str(), disease.label.as_str(), &disease.layer))
    }

    fn get(&self, disease_id: &str) -> BoqaResult<&CachedDisease> {
        self.index
            .get(disease_id)
            .and_then(|idx| self.diseases.get(*idx))
            .ok_or_else(|| BoqaError::DiseaseNotFound(disease_id.to_string()))
    }
}
