use std::fs;
use std::path::{Path, PathBuf};

use loris_model::model::TemporalModel;
use loris_model::oracles::TemporalOracle;

use crate::backends::{apply_verdicts, spawn_checker, write_formula_lines};
use crate::checker::{CheckerError, ModelChecker};
use crate::export;

/// Subprocess backend for an LTL checker executable.
///
/// The model travels as a HOA-style automaton file, the oracles as an
/// indexed formula file; the executable answers with one verdict line per
/// formula on stdout.
#[derive(Debug, Default)]
pub struct LtlChecker {
    command: String,
    via_shell: bool,
    verbose: bool,
    want_counterexamples: bool,
    output_dir: PathBuf,
    model_text: Option<String>,
    oracles: Vec<TemporalOracle>,
}

impl LtlChecker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelChecker for LtlChecker {
    fn configure(
        &mut self,
        output_dir: &Path,
        model: &TemporalModel,
        oracles: Vec<TemporalOracle>,
        verbose: bool,
        want_counterexamples: bool,
    ) {
        self.output_dir = output_dir.to_path_buf();
        self.model_text = Some(export::write_hoa(model));
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
        let model_path = self.output_dir.join("model.hoa");
        let formulas_path = self.output_dir.join("oracles.ltl");
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
    use indexmap::IndexSet;
    use loris_model::encoding::StateEncoding;
    use loris_model::oracles::{TemporalFormalism, TemporalPattern, Verdict};

    fn model() -> TemporalModel {
        let mut model = TemporalModel::new();
        let mut s1 = StateEncoding::new("s1");
        s1.propositions.insert("p".to_string());
        model.add_state(s1).unwrap();
        model.rebuild_universe();
        let mut initial = IndexSet::new();
        initial.insert("s1".to_string());
        model.set_initial_states(initial);
        model
    }

    fn oracle() -> TemporalOracle {
        TemporalOracle::candidate(TemporalPattern {
            formula: "G(p)".into(),
            formalism: TemporalFormalism::Ltl,
            parameters: vec![],
        })
    }

    #[test]
    fn run_before_configure_is_rejected() {
        let mut checker = LtlChecker::new();
        checker.set_executable("true", false);
        assert!(matches!(
            checker.run_check(),
            Err(CheckerError::NotConfigured)
        ));
    }

    #[test]
    fn missing_executable_surfaces_as_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut checker = LtlChecker::new();
        checker.configure(dir.path(), &model(), vec![oracle()], false, false);
        checker.set_executable("definitely-not-a-real-checker-binary", false);
        assert!(matches!(
            checker.run_check(),
            Err(CheckerError::NotFound(_))
        ));
    }

    #[test]
    fn verdicts_come_back_from_a_scripted_checker() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-checker.sh");
        fs::write(&script, "#!/bin/sh\necho \"0 PASS\"\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        }

        let mut checker = LtlChecker::new();
        checker.configure(dir.path(), &model(), vec![oracle()], true, false);
        checker.set_executable(&script.display().to_string(), false);
        let checked = checker.run_check().unwrap();
        assert_eq!(checked.len(), 1);
        assert_eq!(checked[0].verdict, Some(Verdict::Pass));
        // verbose run keeps the exchanged files around
        assert!(dir.path().join("model.hoa").exists());
        assert!(dir.path().join("oracles.ltl").exists());
    }
}
