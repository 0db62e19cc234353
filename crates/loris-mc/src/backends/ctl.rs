use std::fs;
use std::path::{Path, PathBuf};

use loris_model::model::TemporalModel;
use loris_model::oracles::TemporalOracle;

use crate::backends::{apply_verdicts, spawn_checker, write_formula_lines};
use crate::checker::{CheckerError, ModelChecker};
use crate::export;

/// Subprocess backend for a CTL checker executable.
///
/// Same invocation contract as the LTL backend, but the model travels as a
/// flat transition-system listing rather than an automaton.
#[derive(Debug, Default)]
pub struct CtlChecker {
    command: String,
    via_shell: bool,
    verbose: bool,
    want_counterexamples: bool,
    output_dir: PathBuf,
    model_text: Option<String>,
    oracles: Vec<TemporalOracle>,
}

impl CtlChecker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelChecker for CtlChecker {
    fn configure(
        &mut self,
        output_dir: &Path,
        model: &TemporalModel,
        oracles: Vec<TemporalOracle>,
        verbose: bool,
        want_counterexamples: bool,
    ) {
        self.output_dir = output_dir.to_path_buf();
        self.model_text = Some(export::write_flat_ts(model));
        self.oracles = oracles;
        self.verbose = verbose;
        self.want_counterexamples = want_counterexamples;
    }

    fn set_executable(&mut self, command: &str, via_shell: bool) {
        self.command = command.to_string();
        self.via_shell = via_shell;
    }

    fn run_check(&mut self) -> Result<Vec<TemporalOracle>, CheckerError> {
        let model_text = self.model_text.take().ok_or(CheckerError::NotConfigured)?;
        let model_path = self.output_dir.join("model.ts");
        let formulas_path = self.output_dir.join("oracles.ctl");
        fs::write(&model_path, model_text)?;
        fs::write(&formulas_path, write_formula_lines(&self.oracles))?;

        let output = spawn_checker(
            &self.command,
            self.via_shell,
            &model_path,
            &formulas_path,
            self.want_counterexamples,
        )?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut oracles = std::mem::take(&mut self.oracles);
        let applied = apply_verdicts(&mut oracles, &stdout, self.want_counterexamples);
        if applied == 0 && !output.status.success() {
            return Err(CheckerError::Failed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        if !self.verbose {
            let _ = fs::remove_file(&model_path);
            let _ = fs::remove_file(&formulas_path);
        }
        Ok(oracles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loris_model::oracles::{TemporalFormalism, TemporalPattern};

    #[test]
    fn run_before_configure_is_rejected() {
        let mut checker = CtlChecker::new();
        checker.set_executable("true", false);
        assert!(matches!(
            checker.run_check(),
            Err(CheckerError::NotConfigured)
        ));
    }

    #[test]
    fn missing_executable_surfaces_as_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut checker = CtlChecker::new();
        let oracle = TemporalOracle::candidate(TemporalPattern {
            formula: "AG(p)".into(),
            formalism: TemporalFormalism::Ctl,
            parameters: vec![],
        });
        checker.configure(
            dir.path(),
            &TemporalModel::new(),
            vec![oracle],
            false,
            false,
        );
        checker.set_executable("definitely-not-a-real-checker-binary", false);
        assert!(matches!(
            checker.run_check(),
            Err(CheckerError::NotFound(_))
        ));
    }
}
