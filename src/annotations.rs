//! Diseases and patients are annotated with HPO terms
//!
//! The scoring engine only depends on the [`DiseaseData`] and [`PatientData`]
//! traits. [`DiseaseCatalog`] and [`Patient`] are the bundled implementations,
//! filled from `phenotype.hpoa` and plain-text term lists. Other input formats
//! can be supported by implementing the traits for their own records.

mod disease;
mod patient;

pub use disease::{Disease, DiseaseCatalog, DiseaseData};
pub use patient::{Patient, PatientData};
