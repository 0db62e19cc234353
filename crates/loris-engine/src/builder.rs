use std::time::Instant;

use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

use loris_model::attributes::AttributeCatalog;
use loris_model::encoding::{StateEncoding, TransitionEncoding};
use loris_model::model::{ModelError, TemporalModel};
use loris_model::propositions::{
    PropositionCatalog, RuleSet, TERMINAL_PROPOSITION, TERMINAL_STATE_KEY,
};

use crate::logging::RunLog;
use crate::store::{GraphStore, StoreError};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("model `{0}` was not found in the graph store")]
    ModelNotFound(String),
    #[error(transparent)]
    Store(StoreError),
    #[error("trace {index} is empty; the exploration engine recorded a defective run")]
    EmptyTrace { index: usize },
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl From<StoreError> for BuildError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ModelNotFound(id) => BuildError::ModelNotFound(id),
            other => BuildError::Store(other),
        }
    }
}

/// Builds a proposition-encoded temporal model from a recorded state graph.
///
/// One builder performs one streaming pass per call; states are consumed
/// from the store cursor one at a time and never revisited. The produced
/// model replaces any previous one, it is never updated in place.
pub struct ModelBuilder {
    rules: RuleSet,
    instrument_terminal: bool,
}

impl ModelBuilder {
    pub fn new(
        catalog: PropositionCatalog,
        attributes: AttributeCatalog,
        instrument_terminal: bool,
    ) -> Self {
        ModelBuilder {
            rules: RuleSet::new(catalog, attributes),
            instrument_terminal,
        }
    }

    pub fn build(
        &mut self,
        store: &dyn GraphStore,
        model_id: &str,
        log: &mut RunLog,
    ) -> Result<TemporalModel, BuildError> {
        let started = Instant::now();
        log.append(format!("temporal model build started for `{model_id}`"));

        let info = store.find_model(model_id)?;
        let mut model = TemporalModel::new();
        model.application_name = info.application_name;
        model.application_version = info.application_version;
        model.model_identifier = info.identifier;
        model.abstraction_attributes = info.abstraction_attributes;

        let total = store.state_count(model_id)?;
        let chunk = (total / 10).max(1);

        let mut terminal_keys: Vec<String> = Vec::new();
        let mut first_terminal = true;
        let mut ap_distribution: IndexMap<String, usize> = IndexMap::new();
        let mut processed = 0usize;

        for record in store.stream_states(model_id)? {
            let record = record?;
            let terminal = record.transitions.is_empty();
            if terminal {
                terminal_keys.push(record.key.clone());
                if self.instrument_terminal && first_terminal {
                    model.add_state(self.synthetic_terminal_state())?;
                    first_terminal = false;
                }
            }

            let mut encoding = StateEncoding::new(record.key.clone());
            for (name, value) in &record.attributes {
                encoding
                    .propositions
                    .extend(self.rules.infer(&record.key, name, value));
            }
            encoding
                .propositions
                .insert(self.rules.baseline_state_proposition(&record.key));

            if terminal && self.instrument_terminal {
                // Route the deadlock into the shared sink instead of
                // flagging it locally, so `terminal` is reachable and
                // loopable in liveness formulas.
                let mut into_sink = TransitionEncoding::new(
                    format!("{TERMINAL_STATE_KEY}_{}", record.key),
                    TERMINAL_STATE_KEY,
                );
                into_sink
                    .propositions
                    .insert(TERMINAL_PROPOSITION.to_string());
                encoding.transitions.push(into_sink);
            } else {
                encoding.terminal = terminal;
                for transition in &record.transitions {
                    let mut enc =
                        TransitionEncoding::new(transition.label.clone(), transition.target.clone());
                    for (name, value) in &transition.attributes {
                        enc.propositions
                            .extend(self.rules.infer(&transition.label, name, value));
                    }
                    enc.propositions
                        .insert(self.rules.baseline_transition_proposition(&transition.label));
                    encoding.transitions.push(enc);
                }
            }

            ap_distribution.insert(encoding.key.clone(), encoding.propositions.len());
            model.add_state(encoding)?;
            processed += 1;
            if total > 0 && processed % chunk == 0 {
                log.append(format!("states processed: {}%", (100 * processed) / total));
            }
        }

        self.finalize_transitions(&mut model);
        model.rebuild_universe();

        let traces = store.fetch_traces(model_id)?;
        let mut initial = IndexSet::new();
        for (index, trace) in traces.iter().enumerate() {
            match trace.first_state() {
                Some(state) => {
                    initial.insert(state.to_string());
                }
                None => return Err(BuildError::EmptyTrace { index }),
            }
        }
        model.set_initial_states(initial);
        model.set_traces(traces);

        model.add_log(format!("terminal states: [{}]", terminal_keys.join(", ")));
        let distribution = ap_distribution
            .iter()
            .map(|(key, count)| format!("{key}->{count}"))
            .collect::<Vec<_>>()
            .join(", ");
        model.add_comment(format!("propositions per state: {{{distribution}}}"));
        model.add_comment(format!("total states: {}", model.state_count()));
        model.add_comment(format!(
            "distinct propositions: {}",
            model.propositions().len()
        ));
        model.add_comment(format!("terminal states: {}", terminal_keys.len()));
        model.add_comment(format!("initial states: {}", model.initial_states().len()));
        model.add_comment(format!("build duration: {}s", started.elapsed().as_secs()));

        log.append(format!("total states: {}", model.state_count()));
        log.append(format!(
            "distinct atomic propositions: {}",
            model.propositions().len()
        ));
        log.append(format!(
            "model has {} terminal states",
            if terminal_keys.is_empty() {
                "no".to_string()
            } else {
                terminal_keys.len().to_string()
            }
        ));
        log.append(format!(
            "model has {} initial states",
            model.initial_states().len()
        ));
        log.append("temporal model build completed");
        Ok(model)
    }

    /// One pass over all transitions per state to compute canonical
    /// conjuncts and surface duplicates. Non-determinism is a modeling
    /// fact, logged into the model, never an error.
    fn finalize_transitions(&self, model: &mut TemporalModel) {
        let mut non_deterministic: Vec<(String, Vec<String>)> = Vec::new();
        for state in model.states() {
            let mut seen: IndexSet<String> = IndexSet::new();
            let mut duplicates: Vec<String> = Vec::new();
            for transition in &state.transitions {
                if !seen.insert(transition.encoded_conjunct()) {
                    duplicates.push(transition.label.clone());
                }
            }
            if !duplicates.is_empty() {
                non_deterministic.push((state.key.clone(), duplicates));
            }
        }
        for (key, labels) in non_deterministic {
            model.add_log(format!(
                "state `{key}` has non-deterministic transitions: [{}]",
                labels.join(", ")
            ));
        }
    }

    fn synthetic_terminal_state(&self) -> StateEncoding {
        let mut state = StateEncoding::new(TERMINAL_STATE_KEY);
        state.propositions.insert(TERMINAL_PROPOSITION.to_string());
        let mut selfloop = TransitionEncoding::new(
            format!("{TERMINAL_PROPOSITION}_selfloop"),
            TERMINAL_STATE_KEY,
        );
        selfloop
            .propositions
            .insert(TERMINAL_PROPOSITION.to_string());
        state.transitions.push(selfloop);
        state
    }
}
