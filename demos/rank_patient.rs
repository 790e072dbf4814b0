//! Ranks all diseases for one or more patients
//!
//! Usage: `rank_patient <hp.obo> <phenotype.hpoa> <patient.txt>...`
use std::env::args;
use std::process;

use boqa::{
    AlgorithmParameters, AnalysisOrchestrator, CacheOptions, DiseaseCatalog, DiseaseLayerCache,
    LayerExpander, Ontology, Patient,
};

fn main() {
    // log level is read from `RUST_LOG`
    simple_logger::SimpleLogger::new().env().init().unwrap();

    let args: Vec<String> = args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <hp.obo> <phenotype.hpoa> <patient.txt>...", args[0]);
        process::exit(1);
    }

    let ontology = Ontology::from_obo(&args[1]).unwrap();
    let catalog = DiseaseCatalog::from_hpoa(&args[2]).unwrap();
    let patients: Vec<Patient> = args[3..]
        .iter()
        .map(|path| Patient::from_file(path).unwrap())
        .collect();

    let expander = LayerExpander::new(&ontology);
    let cache = DiseaseLayerCache::new(&catalog, &expander, &CacheOptions::default());
    let orchestrator = AnalysisOrchestrator::new(&expander, &cache, AlgorithmParameters::default())
        .with_results_limit(10);

    for result in orchestrator.analyze_batch(&patients, None).unwrap() {
        match result {
            Ok(result) => println!("{result}"),
            Err(err) => eprintln!("{err}"),
        }
    }
    println!(
        "# {} replaced and {} unknown terms",
        expander.reporter().replaced_count(),
        expander.reporter().unresolved_count()
    );
}
