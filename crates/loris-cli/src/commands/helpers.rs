//! Shared plumbing for the subcommands: output folders, catalog and graph
//! loading, model building.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use miette::{IntoDiagnostic, WrapErr};

use loris_engine::builder::ModelBuilder;
use loris_engine::logging::RunLog;
use loris_engine::store::MemoryGraphStore;
use loris_model::attributes::AttributeCatalog;
use loris_model::model::TemporalModel;
use loris_model::propositions::PropositionCatalog;

/// Create (and return) the directory all artifacts of this run go into.
pub(crate) fn prepare_output_dir(base: &Path, run_subfolder: bool) -> miette::Result<PathBuf> {
    let dir = if run_subfolder {
        base.join(Local::now().format("%Y%m%d_%H%M%S").to_string())
    } else {
        base.to_path_buf()
    };
    fs::create_dir_all(&dir)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot create output directory {}", dir.display()))?;
    Ok(dir)
}

pub(crate) fn open_log(dir: &Path) -> miette::Result<RunLog> {
    RunLog::with_file(&dir.join("log.txt"))
        .into_diagnostic()
        .wrap_err("cannot open run log")
}

pub(crate) fn load_store(graph: &Path) -> miette::Result<MemoryGraphStore> {
    MemoryGraphStore::from_json_file(graph)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot load graph file {}", graph.display()))
}

/// Load the catalog the user pointed at, or fall back to the minimal one.
pub(crate) fn load_catalog(path: Option<&Path>) -> miette::Result<PropositionCatalog> {
    match path {
        Some(path) => PropositionCatalog::load(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("cannot load proposition catalog {}", path.display())),
        None => Ok(PropositionCatalog::minimal()),
    }
}

pub(crate) fn build_model(
    store: &MemoryGraphStore,
    model_id: &str,
    catalog: PropositionCatalog,
    instrument_terminal: bool,
    log: &mut RunLog,
) -> miette::Result<TemporalModel> {
    let mut builder = ModelBuilder::new(
        catalog,
        AttributeCatalog::default_gui(),
        instrument_terminal,
    );
    builder
        .build(store, model_id, log)
        .into_diagnostic()
        .wrap_err("temporal model build failed")
}

/// Strip the extension off a table filename for derived artifact names.
pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "oracles".to_string())
}
