use std::path::Path;

use indexmap::IndexMap;
use miette::{IntoDiagnostic, WrapErr};

use loris_engine::dispatch::{dispatch_oracles, DispatchOptions};
use loris_mc::backends::ctl::CtlChecker;
use loris_mc::backends::ltl::LtlChecker;
use loris_mc::checker::{CheckerConfig, CheckerRegistry};
use loris_model::oracles::{
    load_oracles_csv, save_oracles_csv, TemporalFormalism, TemporalOracle,
};

use crate::commands::helpers::{
    build_model, file_stem, load_catalog, load_store, open_log, prepare_output_dir,
};

pub(crate) struct CheckArgs<'a> {
    pub graph: &'a Path,
    pub model_id: &'a str,
    pub oracles: &'a Path,
    pub catalog: Option<&'a Path>,
    pub instrument_terminal: bool,
    pub ltl_command: Option<&'a str>,
    pub ctl_command: Option<&'a str>,
    pub via_shell: bool,
    pub verbose: bool,
    pub counterexamples: bool,
    pub out: &'a Path,
    pub run_subfolder: bool,
}

pub(crate) fn run(args: CheckArgs<'_>) -> miette::Result<()> {
    let out_dir = prepare_output_dir(args.out, args.run_subfolder)?;
    let mut log = open_log(&out_dir)?;
    log.append("temporal model-checking started");

    let oracles = load_oracles_csv(args.oracles)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot load oracle table {}", args.oracles.display()))?;

    let store = load_store(args.graph)?;
    let catalog = load_catalog(args.catalog)?;
    let model = build_model(
        &store,
        args.model_id,
        catalog,
        args.instrument_terminal,
        &mut log,
    )?;

    let stem = file_stem(args.oracles);
    let validated_path = out_dir.join(format!("{stem}_inputvalidation.csv"));
    save_oracles_csv(&validated_path, &grouped_for_validation(&oracles))
        .into_diagnostic()
        .wrap_err("cannot save input-validation table")?;

    let mut registry = build_registry(args.ltl_command, args.ctl_command, args.via_shell);
    let checked = dispatch_oracles(
        &model,
        oracles,
        &mut registry,
        &out_dir,
        DispatchOptions {
            verbose: args.verbose,
            want_counterexamples: args.counterexamples,
        },
        &mut log,
    );

    let checked_path = out_dir.join(format!("{stem}_modelchecked.csv"));
    save_oracles_csv(&checked_path, &checked)
        .into_diagnostic()
        .wrap_err("cannot save model-checked table")?;
    log.append("temporal model-checking completed");

    println!(
        "checked {} oracles -> {}",
        checked.len(),
        checked_path.display()
    );
    Ok(())
}

fn build_registry(
    ltl_command: Option<&str>,
    ctl_command: Option<&str>,
    via_shell: bool,
) -> CheckerRegistry {
    let mut registry = CheckerRegistry::new();
    if let Some(command) = ltl_command {
        let mut config = CheckerConfig::ltl_defaults(command);
        config.via_shell = via_shell;
        registry.register(TemporalFormalism::Ltl, config, Box::new(LtlChecker::new()));
    }
    if let Some(command) = ctl_command {
        let mut config = CheckerConfig::ctl_defaults(command);
        config.via_shell = via_shell;
        registry.register(TemporalFormalism::Ctl, config, Box::new(CtlChecker::new()));
    }
    registry
}

/// The pre-dispatch snapshot: same grouping as the dispatcher will use,
/// checkable oracles ahead of the rest within each group.
fn grouped_for_validation(oracles: &[TemporalOracle]) -> Vec<TemporalOracle> {
    let mut groups: IndexMap<TemporalFormalism, (Vec<TemporalOracle>, Vec<TemporalOracle>)> =
        IndexMap::new();
    for oracle in oracles {
        let slot = groups.entry(oracle.pattern.formalism).or_default();
        if oracle.status.is_checkable() {
            slot.0.push(oracle.clone());
        } else {
            slot.1.push(oracle.clone());
        }
    }
    let mut ordered = Vec::with_capacity(oracles.len());
    for (_, (accepted, rejected)) in groups {
        ordered.extend(accepted);
        ordered.extend(rejected);
    }
    ordered
}
