use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use crate::parser;
use crate::{BoqaResult, HpoGroup, HpoTermId};

/// Source of disease annotations for the scoring engine
///
/// Diseases are identified by their CURIE, e.g. `OMIM:154700`.
pub trait DiseaseData: Sync {
    /// Returns the IDs of all diseases
    fn disease_ids(&self) -> Vec<&str>;

    /// Returns the HPO terms the disease is annotated with
    ///
    /// Returns `None` if the disease is unknown
    fn observed_features(&self, disease_id: &str) -> Option<&HpoGroup>;

    /// Returns the name of the disease
    ///
    /// Returns `None` if the disease is unknown
    fn label(&self, disease_id: &str) -> Option<&str>;
}

/// A disease with its directly annotated HPO terms
///
/// The terms are the raw annotations, their ancestors are not
/// part of the disease. See [`crate::Layer`] for the closure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disease {
    id: String,
    name: String,
    hpo_terms: HpoGroup,
}

impl Disease {
    /// Initializes a new disease without any annotations
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            hpo_terms: HpoGroup::default(),
        }
    }

    /// Returns the ID of the disease
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the name of the disease
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Connect another HPO term to the disease
    ///
    /// Returns `false` if the term was already connected
    pub fn add_term<I: Into<HpoTermId>>(&mut self, term_id: I) -> bool {
        self.hpo_terms.insert(term_id)
    }

    /// Returns a reference to the associated [group of HPO terms](`HpoGroup`)
    pub fn hpo_terms(&self) -> &HpoGroup {
        &self.hpo_terms
    }
}

/// All diseases of a run, indexed by their ID
///
/// # Examples
///
/// ```
/// use boqa::{DiseaseCatalog, DiseaseData};
///
/// let catalog = DiseaseCatalog::from_hpoa("tests/example.hpoa").unwrap();
/// assert_eq!(catalog.len(), 4);
/// assert_eq!(catalog.label("OMIM:100100"), Some("Seizure microcephaly syndrome"));
/// assert_eq!(catalog.observed_features("OMIM:100100").unwrap().len(), 3);
/// assert!(catalog.observed_features("OMIM:999999").is_none());
/// ```
#[derive(Debug, Default)]
pub struct DiseaseCatalog {
    diseases: HashMap<String, Disease>,
}

impl DiseaseCatalog {
    /// Loads all diseases from a `phenotype.hpoa` file
    ///
    /// # Errors
    ///
    /// - [`crate::BoqaError::CannotOpenFile`]: the file is missing or unreadable
    /// - [`crate::BoqaError::InvalidInput`]: a line is malformed
    pub fn from_hpoa<P: AsRef<Path>>(filename: P) -> BoqaResult<Self> {
        let mut catalog = DiseaseCatalog::default();
        parser::phenotype_hpoa::parse(filename, &mut catalog)?;
        info!("Loaded {} diseases", catalog.len());
        Ok(catalog)
    }

    /// Returns the disease with the given ID, adding it first if missing
    pub fn add_disease(&mut self, id: &str, name: &str) -> &mut Disease {
        match self.diseases.entry(id.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(Disease::new(id, name)),
        }
    }

    /// Returns a reference to the [`Disease`]
    pub fn get(&self, id: &str) -> Option<&Disease> {
        self.diseases.get(id)
    }

    /// Returns the number of diseases
    pub fn len(&self) -> usize {
        self.diseases.len()
    }

    /// Returns `true` if the catalog does not contain any disease
    pub fn is_empty(&self) -> bool {
        self.diseases.is_empty()
    }

    /// Returns an iterator of all diseases, in arbitrary order
    pub fn iter(&self) -> std::collections::hash_map::Values<'_, String, Disease> {
        self.diseases.values()
    }
}

impl DiseaseData for DiseaseCatalog {
    fn disease_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.diseases.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    fn observed_features(&self, disease_id: &str) -> Option<&HpoGroup> {
        self.get(disease_id).map(Disease::hpo_terms)
    }

    fn label(&self, disease_id: &str) -> Option<&str> {
        self.get(disease_id).map(Disease::name)
    }
}

impl FromIterator<Disease> for DiseaseCatalog {
    fn from_iter<T: IntoIterator<Item = Disease>>(iter: T) -> Self {
        Self {
            diseases: iter
                .into_iter()
                .map(|disease| (disease.id.clone(), disease))
                .collect(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn add_disease_twice() {
        let mut catalog = DiseaseCatalog::default();
        catalog.add_disease("OMIM:1", "Foo").add_term(1u32);
        catalog.add_disease("OMIM:1", "Ignored").add_term(2u32);

        assert_eq!(catalog.len(), 1);
        let disease = catalog.get("OMIM:1").unwrap();
        assert_eq!(disease.name(), "Foo");
        assert_eq!(disease.hpo_terms().len(), 2);
    }

    #[test]
    fn disease_ids_are_sorted() {
        let catalog: DiseaseCatalog = ["OMIM:3", "ORPHA:1", "OMIM:1"]
            .iter()
            .map(|id| Disease::new(id, "x"))
            .collect();
        assert_eq!(catalog.disease_ids(), vec!["OMIM:1", "OMIM:3", "ORPHA:1"]);
    }

    #[test]
    fn load_example_file() {
        let catalog = DiseaseCatalog::from_hpoa("tests/example.hpoa").unwrap();
        // the NOT annotation is skipped
        let disease = catalog.get("OMIM:100200").unwrap();
        assert!(!disease.hpo_terms().contains(&1250u32.into()));
        assert_eq!(disease.hpo_terms().len(), 2);
    }
}
