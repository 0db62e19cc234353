use std::path::Path;

use miette::{IntoDiagnostic, WrapErr};

use crate::commands::helpers::{
    build_model, load_catalog, load_store, open_log, prepare_output_dir,
};

pub(crate) struct EncodeArgs<'a> {
    pub graph: &'a Path,
    pub model_id: &'a str,
    pub catalog: Option<&'a Path>,
    pub instrument_terminal: bool,
    pub out: &'a Path,
    pub run_subfolder: bool,
}

pub(crate) fn run(args: EncodeArgs<'_>) -> miette::Result<()> {
    let out_dir = prepare_output_dir(args.out, args.run_subfolder)?;
    let mut log = open_log(&out_dir)?;
    let store = load_store(args.graph)?;
    let catalog = load_catalog(args.catalog)?;

    // Keep a copy of the applied configuration next to the model so the
    // encoding is reproducible later.
    let applied = out_dir.join("PropositionCatalog_applied.json");
    catalog
        .save(&applied)
        .into_diagnostic()
        .wrap_err("cannot save applied catalog copy")?;

    let model = build_model(
        &store,
        args.model_id,
        catalog,
        args.instrument_terminal,
        &mut log,
    )?;

    let model_path = out_dir.join("PropositionEncodedModel.json");
    model
        .save_json(&model_path)
        .into_diagnostic()
        .wrap_err("cannot save encoded model")?;
    log.append(format!("generated model file: {}", model_path.display()));

    println!(
        "encoded {} states, {} propositions -> {}",
        model.state_count(),
        model.propositions().len(),
        model_path.display()
    );
    Ok(())
}
