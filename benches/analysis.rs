use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use boqa::annotations::Disease;
use boqa::{
    AlgorithmParameters, AnalysisOrchestrator, CacheOptions, CountingRules, DiseaseCatalog,
    DiseaseLayerCache, HpoGroup, HpoTermId, LayerExpander, Ontology, Patient,
};

fn synthetic_ontology(size: u32, rng: &mut StdRng) -> Ontology {
    let mut ontology = Ontology::default();
    ontology.insert_term("All".into(), 1u32);
    ontology.insert_term("Phenotypic abnormality".into(), 118u32);
    ontology.add_parent(1u32, 118u32).unwrap();

    let first = 1000u32;
    for id in first..first + size {
        ontology.insert_term(format!("Term {id}"), id);
        ontology.add_parent(118u32, id).unwrap();
        if id > first {
            for _ in 0..rng.gen_range(1..=3) {
                let parent = rng.gen_range(first..id);
                ontology.add_parent(parent, id).unwrap();
            }
        }
    }
    ontology.create_cache();
    ontology
}

fn random_group(size: u32, count: usize, rng: &mut StdRng) -> HpoGroup {
    (0..count)
        .map(|_| HpoTermId::from(rng.gen_range(1000..1000 + size)))
        .collect()
}

fn analysis_benchmark(c: &mut Criterion) {
    let size = 5000;
    let mut rng = StdRng::seed_from_u64(23);
    let ontology = synthetic_ontology(size, &mut rng);

    let catalog: DiseaseCatalog = (0..2000)
        .map(|idx| {
            let mut disease = Disease::new(&format!("OMIM:{idx}"), "Synthetic disease");
            for term in &random_group(size, 15, &mut rng) {
                disease.add_term(term);
            }
            disease
        })
        .collect();
    let patients: Vec<Patient> = (0..20)
        .map(|idx| Patient::new(&format!("patient-{idx}"), random_group(size, 8, &mut rng)))
        .collect();

    let expander = LayerExpander::new(&ontology);
    let cache = DiseaseLayerCache::new(&catalog, &expander, &CacheOptions::default());

    let canonical = AnalysisOrchestrator::new(&expander, &cache, AlgorithmParameters::default());
    c.bench_function("analyze 2000 diseases", |b| {
        b.iter(|| canonical.analyze(black_box(&patients[0])).unwrap())
    });

    let with_tn = AnalysisOrchestrator::new(&expander, &cache, AlgorithmParameters::default())
        .with_rules(CountingRules::default().with_true_negatives(true));
    c.bench_function("analyze 2000 diseases with tn", |b| {
        b.iter(|| with_tn.analyze(black_box(&patients[0])).unwrap())
    });

    c.bench_function("batch 20 patients", |b| {
        b.iter(|| canonical.analyze_batch(black_box(&patients), None).unwrap())
    });
}

criterion_group!(analysis, analysis_benchmark);
criterion_main!(analysis);
