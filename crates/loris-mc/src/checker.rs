use std::path::Path;

use indexmap::IndexMap;
use thiserror::Error;

use loris_model::model::TemporalModel;
use loris_model::oracles::{TemporalFormalism, TemporalOracle};

#[derive(Debug, Error)]
pub enum CheckerError {
    #[error("model checker executable not found: {0}")]
    NotFound(String),
    #[error("model checker I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("model checker failed: {0}")]
    Failed(String),
    #[error("run_check() called before configure()")]
    NotConfigured,
}

/// One external model-checker collaborator.
///
/// Invocation is a black box: a function from (model, oracle list) to an
/// annotated oracle list. `run_check` consumes the configuration, so every
/// run is preceded by its own `configure` call.
pub trait ModelChecker {
    fn configure(
        &mut self,
        output_dir: &Path,
        model: &TemporalModel,
        oracles: Vec<TemporalOracle>,
        verbose: bool,
        want_counterexamples: bool,
    );

    /// Point the collaborator at its executable. `via_shell` runs the
    /// command through `sh -c` for environments where the checker is only
    /// reachable through a compatibility shell.
    fn set_executable(&mut self, command: &str, via_shell: bool);

    fn run_check(&mut self) -> Result<Vec<TemporalOracle>, CheckerError>;
}

/// Static configuration for one registered formalism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerConfig {
    pub command: String,
    pub via_shell: bool,
    pub enabled: bool,
    /// Complexity guard: skip invocation when the model's proposition
    /// universe exceeds this ceiling. Some backends are known not to scale.
    pub max_propositions: usize,
    /// Complexity guard over the state count.
    pub max_states: usize,
}

impl CheckerConfig {
    pub fn ltl_defaults(command: impl Into<String>) -> Self {
        CheckerConfig {
            command: command.into(),
            via_shell: false,
            enabled: true,
            max_propositions: 450,
            max_states: 25_000,
        }
    }

    pub fn ctl_defaults(command: impl Into<String>) -> Self {
        CheckerConfig {
            command: command.into(),
            via_shell: false,
            enabled: true,
            max_propositions: 200,
            max_states: 25_000,
        }
    }

    /// Whether the guard allows invoking the backend for this model.
    pub fn within_limits(&self, model: &TemporalModel) -> bool {
        model.propositions().len() <= self.max_propositions
            && model.state_count() <= self.max_states
    }
}

pub struct CheckerEntry {
    pub config: CheckerConfig,
    pub checker: Box<dyn ModelChecker>,
}

/// The set of available backends, keyed by formalism.
#[derive(Default)]
pub struct CheckerRegistry {
    entries: IndexMap<TemporalFormalism, CheckerEntry>,
}

impl CheckerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        formalism: TemporalFormalism,
        config: CheckerConfig,
        checker: Box<dyn ModelChecker>,
    ) {
        self.entries
            .insert(formalism, CheckerEntry { config, checker });
    }

    pub fn entry_mut(&mut self, formalism: TemporalFormalism) -> Option<&mut CheckerEntry> {
        self.entries.get_mut(&formalism)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loris_model::encoding::StateEncoding;

    struct NoopChecker;

    impl ModelChecker for NoopChecker {
        fn configure(
            &mut self,
            _output_dir: &Path,
            _model: &TemporalModel,
            _oracles: Vec<TemporalOracle>,
            _verbose: bool,
            _want_counterexamples: bool,
        ) {
        }

        fn set_executable(&mut self, _command: &str, _via_shell: bool) {}

        fn run_check(&mut self) -> Result<Vec<TemporalOracle>, CheckerError> {
            Err(CheckerError::NotConfigured)
        }
    }

    fn model_with_states(n: usize) -> TemporalModel {
        let mut model = TemporalModel::new();
        for i in 0..n {
            let mut state = StateEncoding::new(format!("s{i}"));
            state.propositions.insert(format!("s{i}_Role_exists"));
            model.add_state(state).unwrap();
        }
        model.rebuild_universe();
        model
    }

    #[test]
    fn guard_rejects_oversized_models() {
        let mut config = CheckerConfig::ltl_defaults("checker");
        config.max_states = 2;
        assert!(config.within_limits(&model_with_states(2)));
        assert!(!config.within_limits(&model_with_states(3)));

        config.max_states = 25_000;
        config.max_propositions = 1;
        assert!(!config.within_limits(&model_with_states(2)));
    }

    #[test]
    fn registry_lookup_by_formalism() {
        let mut registry = CheckerRegistry::new();
        assert!(registry.is_empty());
        registry.register(
            TemporalFormalism::Ltl,
            CheckerConfig::ltl_defaults("checker"),
            Box::new(NoopChecker),
        );
        assert_eq!(registry.len(), 1);
        assert!(registry.entry_mut(TemporalFormalism::Ltl).is_some());
        assert!(registry.entry_mut(TemporalFormalism::Ctl).is_none());
    }
}
