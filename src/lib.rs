#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
use std::num::ParseIntError;
use thiserror::Error;

pub mod annotations;
pub mod boqa;
pub mod layer;
pub mod ontology;
mod parser;
pub mod term;

pub use annotations::{DiseaseCatalog, DiseaseData, Patient, PatientData};
pub use boqa::{
    AlgorithmParameters, AnalysisOrchestrator, AnalysisResult, CacheOptions, CountingRules,
    Counts, DiseaseLayerCache, ScoredResult,
};
pub use layer::{Layer, LayerExpander, TermReporter};
pub use ontology::{Ontology, OntologyGraph};
pub use term::{HpoGroup, HpoTermId};

const DEFAULT_NUM_PARENTS: usize = 10;
const DEFAULT_NUM_ALL_PARENTS: usize = 30;
const MAX_HPO_ID_INTEGER: usize = 10_000_000;

/// The root term `HP:0000001 | All`
///
/// Every term of the ontology is a descendant of the root. The root
/// itself is never part of a [`Layer`].
pub const ROOT_ID: HpoTermId = HpoTermId::from_u32(1);

/// The term `HP:0000118 | Phenotypic abnormality`
///
/// Disease layers can be restricted to this subtree, see [`CacheOptions`].
pub const PHENOTYPE_ID: HpoTermId = HpoTermId::from_u32(118);

/// Main Error type for this crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BoqaError {
    /// The term or item does not exist
    #[error("term does not exist")]
    DoesNotExist,
    /// Failed to parse an integer, most likely the numerical part of an ID
    #[error("unable to parse Integer")]
    ParseIntError,
    /// Input data could not be parsed
    #[error("invalid input data: {0}")]
    InvalidInput(String),
    /// A data source file is missing or cannot be read
    #[error("cannot open file {0}")]
    CannotOpenFile(String),
    /// The algorithm parameters are out of their valid range
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// The disease is not present in the [`DiseaseLayerCache`]
    #[error("disease not found: {0}")]
    DiseaseNotFound(String),
    /// The analysis was cancelled through its interrupt flag
    #[error("analysis was interrupted")]
    Interrupted,
    /// The worker pool for batch analyses could not be created
    #[error("unable to create thread pool: {0}")]
    ThreadPool(String),
}

impl From<ParseIntError> for BoqaError {
    fn from(_: ParseIntError) -> Self {
        BoqaError::ParseIntError
    }
}

/// Shortcut for `Result<T, BoqaError>`
pub type BoqaResult<T> = Result<T, BoqaError>;
