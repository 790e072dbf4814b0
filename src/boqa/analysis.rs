use std::cmp::Ordering;
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use rayon::prelude::*;
use tracing::debug;

use crate::annotations::PatientData;
use crate::boqa::{AlgorithmParameters, CountingRules, Counts, DiseaseLayerCache};
use crate::layer::LayerExpander;
use crate::{BoqaError, BoqaResult, OntologyGraph};

/// The score of one disease for one patient
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredResult {
    disease_id: String,
    label: String,
    counts: Counts,
    log_score: f64,
    score: f64,
}

impl ScoredResult {
    /// Returns the ID of the disease
    pub fn disease_id(&self) -> &str {
        &self.disease_id
    }

    /// Returns the name of the disease
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the [`Counts`] of the disease
    pub fn counts(&self) -> &Counts {
        &self.counts
    }

    /// Returns the unnormalized log-score
    pub fn log_score(&self) -> f64 {
        self.log_score
    }

    /// Returns the normalized score
    ///
    /// See [`AlgorithmParameters::normalize`]
    pub fn score(&self) -> f64 {
        self.score
    }
}

/// The ranked diseases for one patient
///
/// The results are sorted by descending score, `NaN` scores last,
/// ties by ascending disease ID.
///
/// The `Display` implementation renders a tab-separated table
/// with a header line.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    patient_id: String,
    results: Vec<ScoredResult>,
}

impl AnalysisResult {
    /// Returns the ID of the patient
    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    /// Returns all ranked results
    pub fn results(&self) -> &[ScoredResult] {
        &self.results
    }

    /// Returns the best scoring disease
    pub fn top(&self) -> Option<&ScoredResult> {
        self.results.first()
    }

    /// Returns the number of ranked diseases
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns `true` if no disease was ranked
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Returns an iterator of the ranked results
    pub fn iter(&self) -> std::slice::Iter<'_, ScoredResult> {
        self.results.iter()
    }
}

impl<'a> IntoIterator for &'a AnalysisResult {
    type Item = &'a ScoredResult;
    type IntoIter = std::slice::Iter<'a, ScoredResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl Display for AnalysisResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "#patient\t{}", self.patient_id)?;
        writeln!(f, "rank\tdisease_id\tlabel\ttp\tfp\ttn\tfn\tlog_score\tscore")?;
        for (idx, res) in self.results.iter().enumerate() {
            writeln!(
                f,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.6}\t{:.6e}",
                idx + 1,
                res.disease_id,
                res.label,
                res.counts.true_positives(),
                res.counts.false_positives(),
                res.counts.true_negatives(),
                res.counts.false_negatives(),
                res.log_score,
                res.score
            )?;
        }
        Ok(())
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Ranks all diseases of the [`DiseaseLayerCache`] for patients
///
/// The orchestrator holds everything that is shared across patients of
/// one run. Each analysis creates a new query layer and discards it
/// afterwards.
///
/// ```mermaid
/// graph LR
/// P[Patient terms] -->|LayerExpander| Q[Query layer]
/// C[(DiseaseLayerCache)] -->|per disease, parallel| N[CountingRules::count]
/// Q --> N
/// N --> S[log_score]
/// S --> Z[normalize]
/// Z --> R[sort & truncate]
/// ```
///
/// # Examples
///
/// ```
/// use boqa::{
///     AlgorithmParameters, AnalysisOrchestrator, CacheOptions, DiseaseCatalog,
///     DiseaseLayerCache, LayerExpander, Ontology, Patient,
/// };
///
/// let ontology = Ontology::from_obo("tests/example.obo").unwrap();
/// let catalog = DiseaseCatalog::from_hpoa("tests/example.hpoa").unwrap();
/// let expander = LayerExpander::new(&ontology);
/// let cache = DiseaseLayerCache::new(&catalog, &expander, &CacheOptions::default());
///
/// let orchestrator = AnalysisOrchestrator::new(&expander, &cache, AlgorithmParameters::default())
///     .with_results_limit(2);
///
/// let patient = Patient::from_file("tests/patient.txt").unwrap();
/// let result = orchestrator.analyze(&patient).unwrap();
///
/// assert_eq!(result.patient_id(), "patient");
/// assert_eq!(result.len(), 2);
/// assert_eq!(result.top().unwrap().label(), "Seizure microcephaly syndrome");
/// ```
pub struct AnalysisOrchestrator<'a, G: OntologyGraph + ?Sized> {
    expander: &'a LayerExpander<'a, G>,
    cache: &'a DiseaseLayerCache,
    params: AlgorithmParameters,
    rules: CountingRules,
    results_limit: Option<usize>,
}

impl<'a, G: OntologyGraph + ?Sized> AnalysisOrchestrator<'a, G> {
    /// Constructs a new orchestrator with the default [`CountingRules`]
    /// and without a limit on the number of results
    pub fn new(
        expander: &'a LayerExpander<'a, G>,
        cache: &'a DiseaseLayerCache,
        params: AlgorithmParameters,
    ) -> Self {
        Self {
            expander,
            cache,
            params,
            rules: CountingRules::default(),
            results_limit: None,
        }
    }

    /// Sets the [`CountingRules`]
    #[must_use]
    pub fn with_rules(mut self, rules: CountingRules) -> Self {
        self.rules = rules;
        self
    }

    /// Keeps only the `limit` best scoring diseases
    ///
    /// The scores are normalized across all diseases before truncation.
    #[must_use]
    pub fn with_results_limit(mut self, limit: usize) -> Self {
        self.results_limit = Some(limit);
        self
    }

    /// Returns the [`AlgorithmParameters`]
    pub fn params(&self) -> &AlgorithmParameters {
        &self.params
    }

    /// Returns the [`CountingRules`]
    pub fn rules(&self) -> &CountingRules {
        &self.rules
    }

    /// Ranks all diseases for the patient
    ///
    /// # Errors
    ///
    /// This method returns an error only if
    /// [`AnalysisOrchestrator::analyze_with_interrupt`] does
    pub fn analyze<P: PatientData + ?Sized>(&self, patient: &P) -> BoqaResult<AnalysisResult> {
        self.analyze_with_interrupt(patient, &AtomicBool::new(false))
    }

    /// Ranks all diseases for the patient, stopping early once `interrupt` is set
    ///
    /// # Errors
    ///
    /// [`BoqaError::Interrupted`] if `interrupt` was set before all diseases were scored
    pub fn analyze_with_interrupt<P: PatientData + ?Sized>(
        &self,
        patient: &P,
        interrupt: &AtomicBool,
    ) -> BoqaResult<AnalysisResult> {
        if interrupt.load(AtomicOrdering::Relaxed) {
            return Err(BoqaError::Interrupted);
        }
        let graph = self.expander.graph();
        let query = self.expander.expand(patient.observed_terms());
        debug!(
            "Analysing patient {} with {} terms in the query layer",
            patient.id(),
            query.len()
        );

        let scored: Option<Vec<(&str, &str, Counts, f64)>> = self
            .cache
            .par_iter()
            .map(|(id, label, layer)| {
                if interrupt.load(AtomicOrdering::Relaxed) {
                    return None;
                }
                let counts = self.rules.count(layer, &query, graph);
                Some((id, label, counts, self.params.log_score(&counts)))
            })
            .collect();
        let scored = scored.ok_or(BoqaError::Interrupted)?;

        let log_scores: Vec<f64> = scored.iter().map(|entry| entry.3).collect();
        let scores = self.params.normalize(&log_scores);

        let mut results: Vec<ScoredResult> = scored
            .into_iter()
            .zip(scores)
            .map(|((id, label, counts, log_score), score)| ScoredResult {
                disease_id: id.to_string(),
                label: label.to_string(),
                counts,
                log_score,
                score,
            })
            .collect();
        results.sort_unstable_by(rank_order);
        if let Some(limit) = self.results_limit {
            results.truncate(limit);
        }

        Ok(AnalysisResult {
            patient_id: patient.id().to_string(),
            results,
        })
    }

    /// Ranks all diseases for many patients
    ///
    /// The patients are processed on a dedicated thread pool with `threads`
    /// threads, or the rayon default if `None`. The results are in
    /// the same order as the patients.
    ///
    /// # Errors
    ///
    /// [`BoqaError::ThreadPool`] if the thread pool cannot be created
    pub fn analyze_batch<P: PatientData + Sync>(
        &self,
        patients: &[P],
        threads: Option<usize>,
    ) -> BoqaResult<Vec<BoqaResult<AnalysisResult>>> {
        self.analyze_batch_with_interrupt(patients, threads, &AtomicBool::new(false))
    }

    /// Ranks all diseases for many patients, stopping early once `interrupt` is set
    ///
    /// Patients that were not analysed before the interrupt
    /// return [`BoqaError::Interrupted`].
    ///
    /// # Errors
    ///
    /// [`BoqaError::ThreadPool`] if the thread pool cannot be created
    pub fn analyze_batch_with_interrupt<P: PatientData + Sync>(
        &self,
        patients: &[P],
        threads: Option<usize>,
        interrupt: &AtomicBool,
    ) -> BoqaResult<Vec<BoqaResult<AnalysisResult>>> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(threads) = threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder
            .build()
            .map_err(|err| BoqaError::ThreadPool(err.to_string()))?;
        debug!(
            "Analysing {} patients on {} threads",
            patients.len(),
            pool.current_num_threads()
        );
        Ok(pool.install(|| {
            patients
                .par_iter()
                .map(|patient| self.analyze_with_interrupt(patient, interrupt))
                .collect()
        }))
    }
}

/// Descending by score, `NaN` last, then ascending by disease ID
fn rank_order(a: &ScoredResult, b: &ScoredResult) -> Ordering {
    match (a.score.is_nan(), b.score.is_nan()) {
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => a.disease_id.cmp(&b.disease_id),
        (false, false) => b
            .score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.disease_id.cmp(&b.disease_id)),
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::annotations::Disease;
    use crate::ontology::test::build;
    use crate::{CacheOptions, DiseaseCatalog, HpoGroup, HpoTermId, Ontology, Patient};

    fn group(ids: &[u32]) -> HpoGroup {
        ids.iter().map(|id| HpoTermId::from(*id)).collect()
    }

    fn catalog(diseases: &[(&str, Vec<u32>)]) -> DiseaseCatalog {
        diseases
            .iter()
            .map(|(id, terms)| {
                let mut disease = Disease::new(id, &format!("Disease {id}"));
                for term in terms {
                    disease.add_term(*term);
                }
                disease
            })
            .collect()
    }

    fn scored(id: &str, score: f64) -> ScoredResult {
        ScoredResult {
            disease_id: id.to_string(),
            label: String::new(),
            counts: Counts::default(),
            log_score: score,
            score,
        }
    }

    #[test]
    fn single_disease_chain() {
        // R -> B -> A
        let ont = build(&[1, 2, 3], &[(2, 1), (3, 2)]);
        let expander = LayerExpander::new(&ont);
        let cache = DiseaseLayerCache::new(
            &catalog(&[("D:1", vec![3])]),
            &expander,
            &CacheOptions::keep_all_terms(),
        );
        let params = AlgorithmParameters::new(0.01, 0.1, 1.0).unwrap();
        let orchestrator = AnalysisOrchestrator::new(&expander, &cache, params);

        let result = orchestrator
            .analyze(&Patient::new("p", group(&[3])))
            .unwrap();
        let top = result.top().unwrap();
        assert_eq!(top.counts(), &Counts::new(1, 0, 0, 0));
        // a single true positive contributes ln(1 - beta)
        assert!((top.log_score() - 0.9f64.ln()).abs() < 1e-12);
        assert!((top.score() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ranking_of_example_diseases() {
        let ont = Ontology::from_obo("tests/example.obo").unwrap();
        let catalog = DiseaseCatalog::from_hpoa("tests/example.hpoa").unwrap();
        let expander = LayerExpander::new(&ont);
        let cache = DiseaseLayerCache::new(&catalog, &expander, &CacheOptions::default());
        let orchestrator =
            AnalysisOrchestrator::new(&expander, &cache, AlgorithmParameters::default());

        let patient = Patient::from_file("tests/patient.txt").unwrap();
        let result = orchestrator.analyze(&patient).unwrap();

        assert_eq!(result.len(), 4);
        let top = result.top().unwrap();
        assert_eq!(top.disease_id(), "OMIM:100100");
        assert_eq!(top.counts(), &Counts::new(2, 0, 0, 0));
        assert!((result.iter().map(ScoredResult::score).sum::<f64>() - 1.0).abs() < 1e-9);
        for pair in result.results().windows(2) {
            assert!(pair[0].score() >= pair[1].score());
        }
    }

    #[test]
    fn results_limit() {
        let ont = Ontology::from_obo("tests/example.obo").unwrap();
        let catalog = DiseaseCatalog::from_hpoa("tests/example.hpoa").unwrap();
        let expander = LayerExpander::new(&ont);
        let cache = DiseaseLayerCache::new(&catalog, &expander, &CacheOptions::default());
        let patient = Patient::from_file("tests/patient.txt").unwrap();

        let full = AnalysisOrchestrator::new(&expander, &cache, AlgorithmParameters::default())
            .analyze(&patient)
            .unwrap();
        let limited = AnalysisOrchestrator::new(&expander, &cache, AlgorithmParameters::default())
            .with_results_limit(1)
            .analyze(&patient)
            .unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited.top(), full.top());
    }

    #[test]
    fn ties_are_sorted_by_id() {
        let ont = build(&[1, 2, 3], &[(2, 1), (3, 1)]);
        let expander = LayerExpander::new(&ont);
        let cache = DiseaseLayerCache::new(
            &catalog(&[("D:3", vec![2]), ("D:1", vec![2]), ("D:2", vec![2])]),
            &expander,
            &CacheOptions::keep_all_terms(),
        );
        let orchestrator =
            AnalysisOrchestrator::new(&expander, &cache, AlgorithmParameters::default());
        let result = orchestrator
            .analyze(&Patient::new("p", group(&[3])))
            .unwrap();
        let ids: Vec<&str> = result.iter().map(ScoredResult::disease_id).collect();
        assert_eq!(ids, vec!["D:1", "D:2", "D:3"]);
    }

    #[test]
    fn nan_sorts_last() {
        let mut results = vec![
            scored("D:1", f64::NAN),
            scored("D:2", 0.1),
            scored("D:0", f64::NAN),
            scored("D:3", 0.7),
            scored("D:4", 0.0),
        ];
        results.sort_unstable_by(rank_order);
        let ids: Vec<&str> = results.iter().map(ScoredResult::disease_id).collect();
        assert_eq!(ids, vec!["D:3", "D:2", "D:4", "D:0", "D:1"]);
    }

    #[test]
    fn empty_query() {
        let ont = build(&[1, 2, 3, 4], &[(2, 1), (3, 2), (4, 3)]);
        let expander = LayerExpander::new(&ont);
        let cache = DiseaseLayerCache::new(
            &catalog(&[("D:1", vec![4])]),
            &expander,
            &CacheOptions::keep_all_terms(),
        );
        let patient = Patient::new("p", HpoGroup::new());

        let canonical = AnalysisOrchestrator::new(&expander, &cache, AlgorithmParameters::default())
            .analyze(&patient)
            .unwrap();
        assert_eq!(canonical.top().unwrap().counts(), &Counts::new(0, 0, 0, 0));

        let naive = AnalysisOrchestrator::new(&expander, &cache, AlgorithmParameters::default())
            .with_rules(CountingRules::naive())
            .analyze(&patient)
            .unwrap();
        assert_eq!(naive.top().unwrap().counts(), &Counts::new(0, 0, 0, 3));
    }

    #[test]
    fn unknown_patient_terms_are_dropped() {
        let ont = build(&[1, 2, 3], &[(2, 1), (3, 2)]);
        let expander = LayerExpander::new(&ont);
        let cache = DiseaseLayerCache::new(
            &catalog(&[("D:1", vec![3])]),
            &expander,
            &CacheOptions::keep_all_terms(),
        );
        let orchestrator =
            AnalysisOrchestrator::new(&expander, &cache, AlgorithmParameters::default());
        let with_unknown = orchestrator
            .analyze(&Patient::new("p", group(&[3, 99])))
            .unwrap();
        let without = orchestrator
            .analyze(&Patient::new("p", group(&[3])))
            .unwrap();
        assert_eq!(with_unknown, without);
        assert_eq!(expander.reporter().unresolved_count(), 1);
    }

    #[test]
    fn interrupted_analysis() {
        let ont = build(&[1, 2], &[(2, 1)]);
        let expander = LayerExpander::new(&ont);
        let cache = DiseaseLayerCache::new(
            &catalog(&[("D:1", vec![2])]),
            &expander,
            &CacheOptions::keep_all_terms(),
        );
        let orchestrator =
            AnalysisOrchestrator::new(&expander, &cache, AlgorithmParameters::default());
        let interrupt = AtomicBool::new(true);
        let patient = Patient::new("p", group(&[2]));
        assert!(matches!(
            orchestrator.analyze_with_interrupt(&patient, &interrupt),
            Err(BoqaError::Interrupted)
        ));

        let batch = orchestrator
            .analyze_batch_with_interrupt(&[patient], Some(1), &interrupt)
            .unwrap();
        assert!(matches!(batch[0], Err(BoqaError::Interrupted)));
    }

    #[test]
    fn batch_matches_single_analysis() {
        let ont = Ontology::from_obo("tests/example.obo").unwrap();
        let catalog = DiseaseCatalog::from_hpoa("tests/example.hpoa").unwrap();
        let expander = LayerExpander::new(&ont);
        let cache = DiseaseLayerCache::new(&catalog, &expander, &CacheOptions::default());
        let orchestrator =
            AnalysisOrchestrator::new(&expander, &cache, AlgorithmParameters::default());

        let mut terms: Vec<HpoTermId> = ont.term_ids().collect();
        terms.sort_unstable();
        let mut rng = StdRng::seed_from_u64(7);
        let patients: Vec<Patient> = (0..20)
            .map(|idx| {
                let observed = (0..rng.gen_range(0..5))
                    .map(|_| terms[rng.gen_range(0..terms.len())])
                    .collect();
                Patient::new(&format!("patient-{idx}"), observed)
            })
            .collect();

        let batch = orchestrator.analyze_batch(&patients, Some(2)).unwrap();
        assert_eq!(batch.len(), patients.len());
        for (patient, result) in patients.iter().zip(batch) {
            let result = result.unwrap();
            assert_eq!(result, orchestrator.analyze(patient).unwrap());
            assert_eq!(result.patient_id(), patient.id());
            for res in &result {
                assert!(res.score() >= 0.0);
                assert!(res.score() <= 1.0);
            }
        }
    }

    #[test]
    fn high_temperature_keeps_best_at_one() {
        let ont = Ontology::from_obo("tests/example.obo").unwrap();
        let catalog = DiseaseCatalog::from_hpoa("tests/example.hpoa").unwrap();
        let expander = LayerExpander::new(&ont);
        let cache = DiseaseLayerCache::new(&catalog, &expander, &CacheOptions::default());
        let params = AlgorithmParameters::new(crate::boqa::DEFAULT_ALPHA, 0.9, 3.0).unwrap();
        let orchestrator = AnalysisOrchestrator::new(&expander, &cache, params);

        let patient = Patient::from_file("tests/patient.txt").unwrap();
        let result = orchestrator.analyze(&patient).unwrap();
        assert_eq!(result.top().unwrap().score(), 1.0);
        assert!(result.iter().map(ScoredResult::score).sum::<f64>() > 1.0);
    }

    #[test]
    fn display_table() {
        let result = AnalysisResult {
            patient_id: "p1".to_string(),
            results: vec![ScoredResult {
                disease_id: "OMIM:1".to_string(),
                label: "Foo".to_string(),
                counts: Counts::new(1, 0, 0, 2),
                log_score: -0.5,
                score: 1.0,
            }],
        };
        let table = result.to_string();
        let mut lines = table.lines();
        assert_eq!(lines.next(), Some("#patient\tp1"));
        assert!(lines.next().unwrap().starts_with("rank\tdisease_id"));
        assert_eq!(
            lines.next(),
            Some("1\tOMIM:1\tFoo\t1\t0\t0\t2\t-0.500000\t1.000000e0")
        );
        assert!(lines.next().is_none());
    }
}
