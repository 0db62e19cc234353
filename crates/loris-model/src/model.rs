use std::fs;
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encoding::StateEncoding;
use crate::traces::TemporalTrace;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("duplicate state key `{0}`")]
    DuplicateState(String),
    #[error("model I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("model is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The finished symbolic model of one recorded state graph.
///
/// Created empty, populated by exactly one build pass, then read-only.
/// A new build replaces the model wholesale; there is no incremental
/// update path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TemporalModel {
    pub application_name: String,
    pub application_version: String,
    /// Identifier of the source model in the graph store.
    pub model_identifier: String,
    /// Attribute names the store used to abstract concrete states.
    pub abstraction_attributes: Vec<String>,
    /// All state encodings, keyed by state key in insertion order.
    states: IndexMap<String, StateEncoding>,
    /// Union of every state and transition proposition set.
    propositions: IndexSet<String>,
    initial_states: IndexSet<String>,
    traces: Vec<TemporalTrace>,
    /// Diagnostic log lines collected during the build.
    log: Vec<String>,
    /// Human-readable summary comments.
    comments: Vec<String>,
}

impl TemporalModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a state encoding, enforcing key uniqueness.
    pub fn add_state(&mut self, state: StateEncoding) -> Result<(), ModelError> {
        if self.states.contains_key(&state.key) {
            return Err(ModelError::DuplicateState(state.key));
        }
        self.states.insert(state.key.clone(), state);
        Ok(())
    }

    pub fn state(&self, key: &str) -> Option<&StateEncoding> {
        self.states.get(key)
    }

    pub fn states(&self) -> impl Iterator<Item = &StateEncoding> {
        self.states.values()
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Recompute the proposition universe as the union over all collected
    /// sets. Run once after the build pass.
    pub fn rebuild_universe(&mut self) {
        let mut universe = IndexSet::new();
        for state in self.states.values() {
            universe.extend(state.propositions.iter().cloned());
            for transition in &state.transitions {
                universe.extend(transition.propositions.iter().cloned());
            }
        }
        self.propositions = universe;
    }

    pub fn propositions(&self) -> &IndexSet<String> {
        &self.propositions
    }

    pub fn set_initial_states(&mut self, initial: IndexSet<String>) {
        self.initial_states = initial;
    }

    pub fn initial_states(&self) -> &IndexSet<String> {
        &self.initial_states
    }

    pub fn set_traces(&mut self, traces: Vec<TemporalTrace>) {
        self.traces = traces;
    }

    pub fn traces(&self) -> &[TemporalTrace] {
        &self.traces
    }

    pub fn add_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn add_comment(&mut self, line: impl Into<String>) {
        self.comments.push(line.into());
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn save_json(&self, path: &Path) -> Result<(), ModelError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load_json(path: &Path) -> Result<Self, ModelError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::TransitionEncoding;

    fn sample_model() -> TemporalModel {
        let mut model = TemporalModel {
            application_name: "calc".into(),
            application_version: "1.0".into(),
            model_identifier: "m1".into(),
            abstraction_attributes: vec!["Role".into()],
            ..TemporalModel::default()
        };
        let mut s1 = StateEncoding::new("s1");
        s1.propositions.insert("s1_Role_exists".to_string());
        let mut t = TransitionEncoding::new("a1", "s2");
        t.propositions.insert("a1_Desc_exists".to_string());
        s1.transitions.push(t);
        model.add_state(s1).unwrap();

        let mut s2 = StateEncoding::new("s2");
        s2.propositions.insert("s2_Role_exists".to_string());
        s2.terminal = true;
        model.add_state(s2).unwrap();

        model.rebuild_universe();
        let mut initial = IndexSet::new();
        initial.insert("s1".to_string());
        model.set_initial_states(initial);
        model
    }

    #[test]
    fn duplicate_state_keys_are_rejected() {
        let mut model = TemporalModel::new();
        model.add_state(StateEncoding::new("s1")).unwrap();
        let err = model.add_state(StateEncoding::new("s1")).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateState(k) if k == "s1"));
    }

    #[test]
    fn universe_unions_state_and_transition_sets() {
        let model = sample_model();
        assert_eq!(model.propositions().len(), 3);
        assert!(model.propositions().contains("a1_Desc_exists"));
    }

    #[test]
    fn model_round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let model = sample_model();
        model.save_json(&path).unwrap();
        let loaded = TemporalModel::load_json(&path).unwrap();
        assert_eq!(loaded, model);
    }
}
