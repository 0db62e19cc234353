use std::path::Path;

use miette::{IntoDiagnostic, WrapErr};

use loris_engine::generator::{generate_candidates, GeneratorOptions};
use loris_model::oracles::{load_constraints_csv, load_patterns_csv, save_oracles_csv};

use crate::commands::helpers::{
    build_model, load_catalog, load_store, open_log, prepare_output_dir,
};

pub(crate) struct GenOraclesArgs<'a> {
    pub graph: &'a Path,
    pub model_id: &'a str,
    pub patterns: &'a Path,
    pub constraints: Option<&'a Path>,
    pub catalog: Option<&'a Path>,
    pub per_pattern: usize,
    pub seed: u64,
    pub out: &'a Path,
    pub run_subfolder: bool,
}

pub(crate) fn run(args: GenOraclesArgs<'_>) -> miette::Result<()> {
    let out_dir = prepare_output_dir(args.out, args.run_subfolder)?;
    let mut log = open_log(&out_dir)?;
    log.append("oracle candidate generation started");

    let store = load_store(args.graph)?;
    let catalog = load_catalog(args.catalog)?;
    // Candidate formulas routinely quantify over the terminal proposition,
    // so generation always builds the instrumented model.
    let model = build_model(&store, args.model_id, catalog, true, &mut log)?;

    let patterns = load_patterns_csv(args.patterns)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot load pattern table {}", args.patterns.display()))?;
    let constraints = match args.constraints {
        Some(path) => load_constraints_csv(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("cannot load constraint table {}", path.display()))?,
        None => Vec::new(),
    };

    let options = GeneratorOptions {
        candidates_per_pattern: args.per_pattern,
        seed: args.seed,
    };
    let oracles = generate_candidates(&model, &patterns, &constraints, &options, &mut log);

    let out_file = out_dir.join("TemporalPotentialOracles.csv");
    save_oracles_csv(&out_file, &oracles)
        .into_diagnostic()
        .wrap_err("cannot save generated oracles")?;
    log.append(format!("generated oracle file: {}", out_file.display()));

    println!(
        "generated {} oracles from {} patterns -> {}",
        oracles.len(),
        patterns.len(),
        out_file.display()
    );
    Ok(())
}
