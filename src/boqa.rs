//! The BOQA scoring engine
//!
//! BOQA (Bayesian Ontology Query Algorithm) ranks diseases by the likelihood
//! that a patient's observed terms are a noisy observation of the disease's
//! annotated terms. Observation noise is modelled by two probabilities:
//!
//! - `alpha`: the rate of false positive observations
//! - `beta`: the rate of false negative observations
//!
//! The engine works in four steps:
//!
//! 1. The [`DiseaseLayerCache`] expands the annotations of every disease into
//!    their ancestor closure, once per run.
//! 2. The [`AnalysisOrchestrator`] expands the patient's terms into the query
//!    [`Layer`](crate::Layer).
//! 3. [`CountingRules::count`] derives the [`Counts`] of true and false
//!    positives and negatives from both layers.
//! 4. [`AlgorithmParameters`] turn the counts into log-scores, which are
//!    normalized across all diseases.
//!
//! # Examples
//!
//! ```
//! use boqa::{
//!     AlgorithmParameters, AnalysisOrchestrator, CacheOptions, DiseaseCatalog,
//!     DiseaseLayerCache, LayerExpander, Ontology, Patient,
//! };
//!
//! let ontology = Ontology::from_obo("tests/example.obo").unwrap();
//! let catalog = DiseaseCatalog::from_hpoa("tests/example.hpoa").unwrap();
//! let expander = LayerExpander::new(&ontology);
//! let cache = DiseaseLayerCache::new(&catalog, &expander, &CacheOptions::default());
//!
//! let orchestrator = AnalysisOrchestrator::new(&expander, &cache, AlgorithmParameters::default());
//! let patient = Patient::from_file("tests/patient.txt").unwrap();
//! let result = orchestrator.analyze(&patient).unwrap();
//!
//! assert_eq!(result.len(), 4);
//! assert_eq!(result.results()[0].disease_id(), "OMIM:100100");
//! ```

mod analysis;
mod cache;
mod counter;
mod model;

pub use analysis::{AnalysisOrchestrator, AnalysisResult, ScoredResult};
pub use cache::{CacheOptions, DiseaseLayerCache};
pub use counter::{count, CountingRules, Counts};
pub use model::{AlgorithmParameters, DEFAULT_ALPHA, DEFAULT_BETA, DEFAULT_TEMPERATURE};
