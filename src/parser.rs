//! Parsing the HPO master data and patient term lists
//!
//! All parsers run before the scoring starts. They translate the input files
//! into an [`Ontology`](crate::Ontology), a [`DiseaseCatalog`](crate::DiseaseCatalog)
//! and [`Patient`](crate::Patient)s.

/// Module to parse `hp.obo` file
pub(crate) mod hp_obo;

/// Module to parse disease - HPO associations from `phenotype.hpoa` file
///
/// # Example line
///
/// ```text
/// OMIM:619340  Developmental and epileptic encephalopathy 96      HP:0011097  PMID:31675180  PCS  1/2  P  HPO:probinson[2021-06-21]
/// OMIM:609153  Pseudohyperkalemia                             NOT HP:0001878  PMID:2766660   PCS       P  HPO:lccarmody[2018-10-03]
/// ```
///
/// Negated annotations (`NOT`) are skipped. Diseases from every source
/// database (`OMIM`, `ORPHA`, `DECIPHER`) are kept, identified by their full CURIE.
pub(crate) mod phenotype_hpoa {
    use std::fs::File;
    use std::io::BufRead;
    use std::io::BufReader;
    use std::path::Path;

    use tracing::trace;

    use crate::annotations::DiseaseCatalog;
    use crate::BoqaError;
    use crate::BoqaResult;
    use crate::HpoTermId;

    #[derive(Debug)]
    struct Annotation<'a> {
        id: &'a str,
        name: &'a str,
        hpo_id: HpoTermId,
    }

    fn parse_line(line: &str) -> BoqaResult<Option<Annotation<'_>>> {
        if line.starts_with('#') || line.starts_with("database_id") || line.trim().is_empty() {
            return Ok(None);
        }

        let mut cols = line.trim_end_matches(|c| c == '\r' || c == '\n').splitn(5, '\t');

        let Some(id) = cols.next() else {
            return Err(BoqaError::InvalidInput(line.to_string()));
        };
        if !id.contains(':') {
            return Err(BoqaError::InvalidInput(line.to_string()));
        }

        let Some(name) = cols.next() else {
            return Err(BoqaError::InvalidInput(line.to_string()));
        };

        match cols.next() {
            Some("NOT") => return Ok(None),
            Some(_) => {}
            None => return Err(BoqaError::InvalidInput(line.to_string())),
        }

        let hpo_id = if let Some(hpo) = cols.next() {
            HpoTermId::try_from(hpo)?
        } else {
            return Err(BoqaError::InvalidInput(line.to_string()));
        };

        Ok(Some(Annotation { id, name, hpo_id }))
    }

    /// Parses all annotations into the catalog
    ///
    /// # Errors
    ///
    /// - [`BoqaError::CannotOpenFile`]: Source file not present or can't be opened
    /// - [`BoqaError::InvalidInput`]: A line has too few columns or an invalid disease ID
    /// - [`BoqaError::ParseIntError`]: A line contains an invalid [`HpoTermId`]
    pub fn parse<P: AsRef<Path>>(file: P, catalog: &mut DiseaseCatalog) -> BoqaResult<()> {
        let filename = file.as_ref().display().to_string();
        let file = File::open(file).map_err(|_| BoqaError::CannotOpenFile(filename.clone()))?;
        parse_reader(BufReader::new(file), catalog)
            .map_err(|err| match err {
                BoqaError::InvalidInput(line) => {
                    BoqaError::InvalidInput(format!("{filename}: {line}"))
                }
                err => err,
            })
    }

    pub(crate) fn parse_reader<R: BufRead>(reader: R, catalog: &mut DiseaseCatalog) -> BoqaResult<()> {
        for line in reader.lines() {
            let line = line.map_err(|_| {
                BoqaError::InvalidInput("Invalid data in phenotype.hpoa".to_string())
            })?;
            match parse_line(&line)? {
                Some(annotation) => {
                    catalog
                        .add_disease(annotation.id, annotation.name)
                        .add_term(annotation.hpo_id);
                }
                None => trace!("Skipping line: {}", line),
            }
        }
        Ok(())
    }

    #[cfg(test)]
    mod test_hpoa_parsing {
        use super::*;
        use crate::DiseaseData;

        #[test]
        fn skip_comment() {
            let s = "#OMIM:600171\tGonadal agenesis\t\tHP:0000055\tOMIM:600171\tTAS\tP\tHPO:skoehler[2014-11-27]";
            assert!(parse_line(s)
                .expect("This line has the correct format")
                .is_none());
        }

        #[test]
        fn skip_header() {
            let s = "database_id\tdisease_name\tqualifier\thpo_id\treference\tevidence";
            assert!(parse_line(s)
                .expect("The header is skipped")
                .is_none());
        }

        #[test]
        fn skip_not() {
            let s = "OMIM:600171\tGonadal agenesis\tNOT\tHP:0000055\tOMIM:600171\tTAS\tP\tHPO:skoehler[2014-11-27]";
            assert!(parse_line(s)
                .expect("This line has the correct format")
                .is_none());
        }

        #[test]
        fn keep_orpha() {
            let s = "ORPHA:600171\tGonadal agenesis\t\tHP:0000055\tOMIM:600171\tTAS\tP\tHPO:skoehler[2014-11-27]";
            let annotation = parse_line(s)
                .expect("This line has the correct format")
                .expect("Line describes a disease");
            assert_eq!(annotation.id, "ORPHA:600171");
        }

        #[test]
        fn correct_omim() {
            let s = "OMIM:600171\tGonadal agenesis\t\tHP:0000055\tOMIM:600171\tTAS\tP\tHPO:skoehler[2014-11-27]";
            let annotation = parse_line(s)
                .expect("This line has the correct format")
                .expect("Line describes a disease");
            assert_eq!(annotation.name, "Gonadal agenesis");
            assert_eq!(annotation.id, "OMIM:600171");
            assert_eq!(annotation.hpo_id, "HP:0000055");
        }

        #[test]
        fn invalid_disease_id() {
            let s = "OMIM_600171\tGonadal agenesis\t\tHP:0000055\tOMIM:600171\tTAS\tP\tHPO:skoehler[2014-11-27]";
            assert!(parse_line(s).is_err());
        }

        #[test]
        fn invalid_hpo_id() {
            let s = "OMIM:600171\tGonadal agenesis\t\tH55\tOMIM:600171\tTAS\tP\tHPO:skoehler[2014-11-27]";
            assert!(parse_line(s).is_err());
        }

        #[test]
        fn invalid_input() {
            let s = "OMIM:600171 Gonadal agenesis  HP:0000055 OMIM:600171 TAS P HPO:skoehler[2014-11-27]";
            assert!(parse_line(s).is_err());
        }

        #[test]
        fn merge_lines_of_one_disease() {
            let data = "OMIM:1\tFoo\t\tHP:0000001\nOMIM:1\tFoo\t\tHP:0000002\nOMIM:1\tFoo\tNOT\tHP:0000003\nOMIM:2\tBar\t\tHP:0000001\n";
            let mut catalog = DiseaseCatalog::default();
            parse_reader(data.as_bytes(), &mut catalog).unwrap();
            assert_eq!(catalog.len(), 2);
            assert_eq!(catalog.observed_features("OMIM:1").unwrap().len(), 2);
            assert_eq!(catalog.label("OMIM:2"), Some("Bar"));
        }
    }
}

/// Module to parse plain-text patient term lists
///
/// One HPO term per line, optionally followed by whitespace and a label.
/// Empty lines and lines starting with `#` are ignored.
///
/// ```text
/// # patient-1
/// HP:0002069  Bilateral tonic-clonic seizure
/// HP:0000252  Microcephaly
/// ```
pub(crate) mod patient {
    use std::fs::File;
    use std::io::{BufRead, BufReader};
    use std::path::Path;

    use crate::{BoqaError, BoqaResult, HpoGroup, HpoTermId};

    fn parse_line(line: &str) -> BoqaResult<Option<HpoTermId>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let Some(term) = line.split_whitespace().next() else {
            return Ok(None);
        };
        HpoTermId::try_from(term).map(Some)
    }

    /// Reads all terms from the file
    ///
    /// # Errors
    ///
    /// - [`BoqaError::CannotOpenFile`]: Source file not present or can't be opened
    /// - [`BoqaError::InvalidInput`] or [`BoqaError::ParseIntError`]: A line does not start with a valid term
    pub fn parse<P: AsRef<Path>>(file: P) -> BoqaResult<HpoGroup> {
        let filename = file.as_ref().display().to_string();
        let file = File::open(file).map_err(|_| BoqaError::CannotOpenFile(filename))?;
        parse_reader(BufReader::new(file))
    }

    pub(crate) fn parse_reader<R: BufRead>(reader: R) -> BoqaResult<HpoGroup> {
        let mut terms = HpoGroup::new();
        for line in reader.lines() {
            let line = line
                .map_err(|_| BoqaError::InvalidInput("Invalid data in patient file".to_string()))?;
            if let Some(term) = parse_line(&line)? {
                terms.insert(term);
            }
        }
        Ok(terms)
    }

}
