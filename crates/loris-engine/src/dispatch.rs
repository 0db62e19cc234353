use std::path::Path;

use indexmap::IndexMap;

use loris_mc::checker::CheckerRegistry;
use loris_model::model::TemporalModel;
use loris_model::oracles::{TemporalFormalism, TemporalOracle};

use crate::logging::RunLog;

/// Controls shared by every backend invocation of one dispatch run.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchOptions {
    pub verbose: bool,
    pub want_counterexamples: bool,
}

/// Route oracles to their formalism's backend checker.
///
/// Oracles are grouped by formalism in first-seen order. Within a group,
/// CANDIDATE/ACCEPTED oracles go to the registered backend — if one exists,
/// is enabled, and the model passes its complexity guard — and everything
/// else passes through untouched. A backend failure degrades to pass-through
/// with a warning; only the log tells the difference. The result preserves
/// grouping order and is reconciled against the input count.
pub fn dispatch_oracles(
    model: &TemporalModel,
    oracles: Vec<TemporalOracle>,
    registry: &mut CheckerRegistry,
    output_dir: &Path,
    options: DispatchOptions,
    log: &mut RunLog,
) -> Vec<TemporalOracle> {
    let input_count = oracles.len();
    let mut groups: IndexMap<TemporalFormalism, Vec<TemporalOracle>> = IndexMap::new();
    for oracle in oracles {
        groups.entry(oracle.pattern.formalism).or_default().push(oracle);
    }

    let mut results = Vec::with_capacity(input_count);
    for (formalism, group) in groups {
        let (accepted, rejected): (Vec<_>, Vec<_>) = group
            .into_iter()
            .partition(|o| o.status.is_checkable());

        log.append(format!(
            "{formalism}: dispatching {} oracles ({} pass through unchecked)",
            accepted.len(),
            rejected.len()
        ));

        let checked = match registry.entry_mut(formalism) {
            None => {
                log.warn(format!(
                    "{formalism}: this oracle type is not implemented or disabled"
                ));
                accepted
            }
            Some(entry) if !entry.config.enabled => {
                log.warn(format!(
                    "{formalism}: this oracle type is not implemented or disabled"
                ));
                accepted
            }
            Some(entry) if !entry.config.within_limits(model) => {
                log.warn(format!(
                    "{formalism}: model check not executed, explicit model too complex \
                     (propositions>{} or states>{})",
                    entry.config.max_propositions, entry.config.max_states
                ));
                accepted
            }
            Some(entry) => {
                entry.checker.configure(
                    output_dir,
                    model,
                    accepted.clone(),
                    options.verbose,
                    options.want_counterexamples,
                );
                entry
                    .checker
                    .set_executable(&entry.config.command, entry.config.via_shell);
                match entry.checker.run_check() {
                    Ok(annotated) => {
                        log.append(format!("{formalism}: model-checking completed"));
                        annotated
                    }
                    Err(err) => {
                        log.warn(format!(
                            "{formalism}: no results from the model checker: {err}"
                        ));
                        accepted
                    }
                }
            }
        };

        results.extend(checked);
        results.extend(rejected);
    }

    if results.len() != input_count {
        log.warn(format!(
            "fewer oracle verdicts received than requested: {} of {input_count}",
            results.len()
        ));
    }
    results
}
