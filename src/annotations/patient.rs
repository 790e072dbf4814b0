use std::path::Path;

use crate::parser;
use crate::{BoqaResult, HpoGroup};

/// The clinical information of one patient for the scoring engine
pub trait PatientData {
    /// Returns the ID of the patient
    fn id(&self) -> &str;

    /// Returns the HPO terms observed in the patient
    fn observed_terms(&self) -> &HpoGroup;
}

/// A patient with the directly observed HPO terms
///
/// # Examples
///
/// ```
/// use boqa::{Patient, PatientData};
///
/// let patient = Patient::from_file("tests/patient.txt").unwrap();
/// assert_eq!(patient.id(), "patient");
/// assert_eq!(patient.observed_terms().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    id: String,
    terms: HpoGroup,
}

impl Patient {
    /// Constructs a new [`Patient`]
    pub fn new(id: &str, terms: HpoGroup) -> Self {
        Self {
            id: id.to_string(),
            terms,
        }
    }

    /// Reads a patient from a plain-text term list
    ///
    /// The file stem is used as the patient ID.
    ///
    /// # Errors
    ///
    /// - [`crate::BoqaError::CannotOpenFile`]: the file is missing or unreadable
    /// - [`crate::BoqaError::InvalidInput`]: a line does not start with an HPO term
    pub fn from_file<P: AsRef<Path>>(filename: P) -> BoqaResult<Self> {
        let id = filename
            .as_ref()
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        let terms = parser::patient::parse(filename)?;
        Ok(Self { id, terms })
    }
}

impl PatientData for Patient {
    fn id(&self) -> &str {
        &self.id
    }

    fn observed_terms(&self) -> &HpoGroup {
        &self.terms
    }
}
