//! Subprocess backends for the external checker executables.

pub mod ctl;
pub mod ltl;

use std::path::Path;
use std::process::{Command, Output, Stdio};

use loris_model::oracles::{TemporalOracle, Verdict};

use crate::checker::CheckerError;

/// One formula line per oracle: `<index> <instantiated formula>`.
pub(crate) fn write_formula_lines(oracles: &[TemporalOracle]) -> String {
    let mut out = String::new();
    for (i, oracle) in oracles.iter().enumerate() {
        out.push_str(&format!("{i} {}\n", oracle.instantiated_formula()));
    }
    out
}

/// Run the checker over a model file and a formula file.
///
/// With `via_shell` the whole command line goes through `sh -c`, for
/// checkers that are only reachable through a compatibility shell.
pub(crate) fn spawn_checker(
    command: &str,
    via_shell: bool,
    model_path: &Path,
    formulas_path: &Path,
    want_counterexamples: bool,
) -> Result<Output, CheckerError> {
    let mut invocation = if via_shell {
        let mut line = format!(
            "{command} --model {} --formulas {}",
            model_path.display(),
            formulas_path.display()
        );
        if want_counterexamples {
            line.push_str(" --counterexamples");
        }
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(line);
        cmd
    } else {
        let mut cmd = Command::new(command);
        cmd.arg("--model")
            .arg(model_path)
            .arg("--formulas")
            .arg(formulas_path);
        if want_counterexamples {
            cmd.arg("--counterexamples");
        }
        cmd
    };
    invocation
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    invocation.output().map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            CheckerError::NotFound(command.to_string())
        } else {
            CheckerError::Io(err)
        }
    })
}

/// Parse one verdict line: `<index> PASS|FAIL|UNKNOWN [counterexample…]`.
///
/// Lines that do not follow the contract (progress chatter, banners) are
/// skipped by the caller.
pub(crate) fn parse_verdict_line(line: &str) -> Option<(usize, Verdict, Option<String>)> {
    let mut parts = line.trim().splitn(3, char::is_whitespace);
    let index = parts.next()?.parse::<usize>().ok()?;
    let verdict = match parts.next()? {
        "PASS" | "TRUE" => Verdict::Pass,
        "FAIL" | "FALSE" => Verdict::Fail,
        "UNKNOWN" => Verdict::Inconclusive,
        _ => return None,
    };
    let detail = parts
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    Some((index, verdict, detail))
}

/// Attach parsed verdicts to the oracle list by index. Returns how many
/// verdicts were applied.
pub(crate) fn apply_verdicts(
    oracles: &mut [TemporalOracle],
    stdout: &str,
    want_counterexamples: bool,
) -> usize {
    let mut applied = 0;
    for line in stdout.lines() {
        let Some((index, verdict, detail)) = parse_verdict_line(line) else {
            continue;
        };
        let Some(oracle) = oracles.get_mut(index) else {
            tracing::warn!("checker verdict for out-of-range oracle index {index}");
            continue;
        };
        oracle.verdict = Some(verdict);
        if want_counterexamples {
            if let Some(detail) = detail {
                oracle.add_log(format!("counterexample: {detail}"));
            }
        }
        applied += 1;
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use loris_model::oracles::{TemporalFormalism, TemporalPattern};

    fn oracle(formula: &str) -> TemporalOracle {
        TemporalOracle::candidate(TemporalPattern {
            formula: formula.into(),
            formalism: TemporalFormalism::Ltl,
            parameters: vec![],
        })
    }

    #[test]
    fn verdict_lines_parse_with_and_without_detail() {
        assert_eq!(
            parse_verdict_line("0 PASS"),
            Some((0, Verdict::Pass, None))
        );
        assert_eq!(
            parse_verdict_line("3 FAIL s1 -> s2 -> s1"),
            Some((3, Verdict::Fail, Some("s1 -> s2 -> s1".to_string())))
        );
        assert_eq!(
            parse_verdict_line("1 UNKNOWN"),
            Some((1, Verdict::Inconclusive, None))
        );
    }

    #[test]
    fn chatter_lines_are_ignored() {
        assert_eq!(parse_verdict_line("checking model..."), None);
        assert_eq!(parse_verdict_line(""), None);
        assert_eq!(parse_verdict_line("0 MAYBE"), None);
    }

    #[test]
    fn verdicts_attach_by_index() {
        let mut oracles = vec![oracle("G(a)"), oracle("F(b)")];
        let applied = apply_verdicts(&mut oracles, "1 FAIL cex\n0 PASS\n9 PASS\n", true);
        assert_eq!(applied, 2);
        assert_eq!(oracles[0].verdict, Some(Verdict::Pass));
        assert_eq!(oracles[1].verdict, Some(Verdict::Fail));
        assert_eq!(oracles[1].log, vec!["counterexample: cex".to_string()]);
    }

    #[test]
    fn counterexamples_are_dropped_when_not_requested() {
        let mut oracles = vec![oracle("G(a)")];
        apply_verdicts(&mut oracles, "0 FAIL cex\n", false);
        assert_eq!(oracles[0].verdict, Some(Verdict::Fail));
        assert!(oracles[0].log.is_empty());
    }

    #[test]
    fn formula_lines_are_indexed() {
        let lines = write_formula_lines(&[oracle("G(a)"), oracle("F(b)")]);
        assert_eq!(lines, "0 G(a)\n1 F(b)\n");
    }

    #[test]
    fn missing_executable_is_reported_as_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model.hoa");
        let formulas = dir.path().join("oracles.ltl");
        std::fs::write(&model, "").unwrap();
        std::fs::write(&formulas, "").unwrap();
        let err = spawn_checker(
            "definitely-not-a-real-checker-binary",
            false,
            &model,
            &formulas,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, CheckerError::NotFound(_)));
    }
}
