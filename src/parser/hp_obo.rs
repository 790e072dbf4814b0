use std::fs;
use std::path::Path;

use tracing::{trace, warn};

use crate::{BoqaError, BoqaResult, HpoTermId, Ontology};

/// Tuples of (child, parent)
type Connections = Vec<(HpoTermId, HpoTermId)>;

/// The relevant content of one `[Term]` stanza
#[derive(Debug, Default, PartialEq)]
struct RawTerm<'a> {
    id: Option<&'a str>,
    name: Option<&'a str>,
    parents: Vec<&'a str>,
    alt_ids: Vec<&'a str>,
    obsolete: bool,
    replaced_by: Option<&'a str>,
}

/// Reads an `hp.obo` file and adds all terms and connections to the ontology
///
/// The all-parents cache is not created here, the caller must call
/// [`Ontology::create_cache`] afterwards.
pub(crate) fn read_obo_file<P: AsRef<Path>>(filename: P, ontology: &mut Ontology) -> BoqaResult<()> {
    let file_content = fs::read_to_string(&filename)
        .map_err(|_| BoqaError::CannotOpenFile(filename.as_ref().display().to_string()))?;
    read_obo(&file_content, ontology)
}

pub(crate) fn read_obo(content: &str, ontology: &mut Ontology) -> BoqaResult<()> {
    let mut connections: Connections = Vec::new();
    let mut obsoletes: Vec<(HpoTermId, Option<HpoTermId>)> = Vec::new();

    for stanza in content.split("\n\n") {
        let stanza = stanza.trim();
        if let Some(term) = stanza.strip_prefix("[Term]") {
            let raw = term_from_obo(term);
            let (Some(id), Some(name)) = (raw.id, raw.name) else {
                return Err(BoqaError::InvalidInput(format!(
                    "Term without id or name: {stanza}"
                )));
            };
            let id = HpoTermId::try_from(id)?;
            ontology.insert_term(name.to_string(), id);

            for parent in raw.parents {
                connections.push((id, HpoTermId::try_from(parent)?));
            }
            for alt_id in raw.alt_ids {
                ontology.add_alt_id(HpoTermId::try_from(alt_id)?, id);
            }
            if raw.obsolete {
                let replacement = raw.replaced_by.map(HpoTermId::try_from).transpose()?;
                obsoletes.push((id, replacement));
            }
        } else if stanza.starts_with("format-version") {
            if let Some(version) = version_from_header(stanza) {
                ontology.set_hpo_version(version);
            }
        } else {
            trace!("Ignoring: {}", stanza);
        }
    }

    for (child, parent) in connections {
        if ontology.add_parent(parent, child).is_err() {
            warn!("Unable to connect {} to unknown parent {}", child, parent);
        }
    }
    for (id, replacement) in obsoletes {
        ontology.set_obsolete(id, replacement)?;
    }
    Ok(())
}

fn term_from_obo(term: &str) -> RawTerm<'_> {
    let mut raw = RawTerm::default();
    for line in term.lines() {
        match line.split_once(": ") {
            Some(("id", value)) => raw.id = Some(value.trim()),
            Some(("name", value)) => raw.name = Some(value.trim()),
            Some(("is_a", value)) => raw.parents.push(strip_comment(value)),
            Some(("alt_id", value)) => raw.alt_ids.push(strip_comment(value)),
            Some(("is_obsolete", value)) => raw.obsolete = value.trim() == "true",
            Some(("replaced_by", value)) => raw.replaced_by = Some(strip_comment(value)),
            _ => (),
        }
    }
    raw
}

/// `is_a: HP:0000001 ! All` => `HP:0000001`
fn strip_comment(value: &str) -> &str {
    value
        .split_once('!')
        .map_or(value, |(id, _)| id)
        .trim()
}

/// `data-version: hp/releases/2024-04-26` => `2024-04-26`
fn version_from_header(header: &str) -> Option<&str> {
    header
        .lines()
        .find_map(|line| line.strip_prefix("data-version: "))
        .map(|version| version.rsplit('/').next().unwrap_or(version).trim())
}
