use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("table I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed table: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed constraint sets: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed table field: {0}")]
    Field(String),
}

/// Temporal logic family a pattern (and its oracles) belongs to. Each
/// formalism is served by its own backend checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalFormalism {
    Ltl,
    Ctl,
}

impl fmt::Display for TemporalFormalism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemporalFormalism::Ltl => write!(f, "ltl"),
            TemporalFormalism::Ctl => write!(f, "ctl"),
        }
    }
}

impl FromStr for TemporalFormalism {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ltl" => Ok(TemporalFormalism::Ltl),
            "ctl" => Ok(TemporalFormalism::Ctl),
            other => Err(format!("unknown formalism `{other}`")),
        }
    }
}

/// Review status of an oracle. This pipeline creates oracles as CANDIDATE
/// or ERROR; promotion to ACCEPTED happens in human review, never here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationStatus {
    Candidate,
    Accepted,
    Rejected,
    Error,
}

impl ValidationStatus {
    /// Whether dispatch forwards this oracle to a backend checker.
    pub fn is_checkable(self) -> bool {
        matches!(self, ValidationStatus::Candidate | ValidationStatus::Accepted)
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationStatus::Candidate => write!(f, "CANDIDATE"),
            ValidationStatus::Accepted => write!(f, "ACCEPTED"),
            ValidationStatus::Rejected => write!(f, "REJECTED"),
            ValidationStatus::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for ValidationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CANDIDATE" => Ok(ValidationStatus::Candidate),
            "ACCEPTED" => Ok(ValidationStatus::Accepted),
            "REJECTED" => Ok(ValidationStatus::Rejected),
            "ERROR" => Ok(ValidationStatus::Error),
            other => Err(format!("unknown validation status `{other}`")),
        }
    }
}

/// Model-check outcome attached by a backend checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
    Inconclusive,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Fail => write!(f, "FAIL"),
            Verdict::Inconclusive => write!(f, "INCONCLUSIVE"),
        }
    }
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PASS" => Ok(Verdict::Pass),
            "FAIL" => Ok(Verdict::Fail),
            "INCONCLUSIVE" => Ok(Verdict::Inconclusive),
            other => Err(format!("unknown verdict `{other}`")),
        }
    }
}

/// A parameterized temporal formula template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalPattern {
    /// Formula text with free parameters appearing as bare names.
    pub formula: String,
    pub formalism: TemporalFormalism,
    pub parameters: Vec<String>,
}

/// Optional per-pattern constraint sets.
///
/// Each numbered set maps parameter names to a regex that an assigned
/// proposition must fully match. A pattern without a constraint entry is
/// substituted unconstrained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalPatternConstraint {
    pub formula: String,
    pub constraint_sets: BTreeMap<usize, BTreeMap<String, String>>,
}

/// A concrete, fully-substituted (or failed) instance of a pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalOracle {
    pub pattern: TemporalPattern,
    /// Index of the constraint set the generator started from, when the
    /// pattern had constraints at all.
    pub constraint_set: Option<usize>,
    pub substitutions: BTreeMap<String, String>,
    pub status: ValidationStatus,
    pub verdict: Option<Verdict>,
    pub log: Vec<String>,
}

impl TemporalOracle {
    pub fn candidate(pattern: TemporalPattern) -> Self {
        TemporalOracle {
            pattern,
            constraint_set: None,
            substitutions: BTreeMap::new(),
            status: ValidationStatus::Candidate,
            verdict: None,
            log: Vec::new(),
        }
    }

    pub fn add_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    /// The formula with every substituted parameter replaced by its
    /// proposition. Parameters are matched as whole words; an oracle in
    /// ERROR state may leave parameters unsubstituted.
    pub fn instantiated_formula(&self) -> String {
        let mut formula = self.pattern.formula.clone();
        for (param, proposition) in &self.substitutions {
            // Parameter names are identifiers, so the escaped form is the
            // literal name and the word boundary keeps `x` out of `x2`.
            if let Ok(re) = Regex::new(&format!(r"\b{}\b", regex::escape(param))) {
                formula = re.replace_all(&formula, proposition.as_str()).into_owned();
            }
        }
        formula
    }
}

// ---------------------------------------------------------------------
// Tabular sinks. Oracle and pattern collections travel as CSV so a later
// generation or checking run can resume without rebuilding the model.
// ---------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct PatternRow {
    formula: String,
    formalism: String,
    parameters: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ConstraintRow {
    formula: String,
    constraint_sets: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct OracleRow {
    formula: String,
    formalism: String,
    parameters: String,
    constraint_set: Option<usize>,
    substitutions: String,
    status: String,
    verdict: String,
    log: String,
}

fn join_list(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join("|")
}

fn split_list(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        Vec::new()
    } else {
        raw.split('|').map(str::to_string).collect()
    }
}

pub fn save_patterns_csv(path: &Path, patterns: &[TemporalPattern]) -> Result<(), TableError> {
    let mut writer = csv::Writer::from_path(path)?;
    for pattern in patterns {
        writer.serialize(PatternRow {
            formula: pattern.formula.clone(),
            formalism: pattern.formalism.to_string(),
            parameters: join_list(pattern.parameters.iter().cloned()),
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_patterns_csv(path: &Path) -> Result<Vec<TemporalPattern>, TableError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut patterns = Vec::new();
    for row in reader.deserialize::<PatternRow>() {
        let row = row?;
        patterns.push(TemporalPattern {
            formula: row.formula,
            formalism: row.formalism.parse().map_err(TableError::Field)?,
            parameters: split_list(&row.parameters),
        });
    }
    Ok(patterns)
}

pub fn save_constraints_csv(
    path: &Path,
    constraints: &[TemporalPatternConstraint],
) -> Result<(), TableError> {
    let mut writer = csv::Writer::from_path(path)?;
    for constraint in constraints {
        writer.serialize(ConstraintRow {
            formula: constraint.formula.clone(),
            constraint_sets: serde_json::to_string(&constraint.constraint_sets)?,
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_constraints_csv(path: &Path) -> Result<Vec<TemporalPatternConstraint>, TableError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut constraints = Vec::new();
    for row in reader.deserialize::<ConstraintRow>() {
        let row = row?;
        constraints.push(TemporalPatternConstraint {
            formula: row.formula,
            constraint_sets: serde_json::from_str(&row.constraint_sets)?,
        });
    }
    Ok(constraints)
}

pub fn save_oracles_csv(path: &Path, oracles: &[TemporalOracle]) -> Result<(), TableError> {
    let mut writer = csv::Writer::from_path(path)?;
    for oracle in oracles {
        writer.serialize(OracleRow {
            formula: oracle.pattern.formula.clone(),
            formalism: oracle.pattern.formalism.to_string(),
            parameters: join_list(oracle.pattern.parameters.iter().cloned()),
            constraint_set: oracle.constraint_set,
            substitutions: join_list(
                oracle
                    .substitutions
                    .iter()
                    .map(|(param, ap)| format!("{param}={ap}")),
            ),
            status: oracle.status.to_string(),
            verdict: oracle.verdict.map(|v| v.to_string()).unwrap_or_default(),
            log: oracle.log.join(" ~ "),
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_oracles_csv(path: &Path) -> Result<Vec<TemporalOracle>, TableError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut oracles = Vec::new();
    for row in reader.deserialize::<OracleRow>() {
        let row = row?;
        let mut substitutions = BTreeMap::new();
        for entry in split_list(&row.substitutions) {
            let (param, ap) = entry
                .split_once('=')
                .ok_or_else(|| TableError::Field(format!("bad substitution `{entry}`")))?;
            substitutions.insert(param.to_string(), ap.to_string());
        }
        oracles.push(TemporalOracle {
            pattern: TemporalPattern {
                formula: row.formula,
                formalism: row.formalism.parse().map_err(TableError::Field)?,
                parameters: split_list(&row.parameters),
            },
            constraint_set: row.constraint_set,
            substitutions,
            status: row.status.parse().map_err(TableError::Field)?,
            verdict: if row.verdict.is_empty() {
                None
            } else {
                Some(row.verdict.parse().map_err(TableError::Field)?)
            },
            log: if row.log.is_empty() {
                Vec::new()
            } else {
                row.log.split(" ~ ").map(str::to_string).collect()
            },
        });
    }
    Ok(oracles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pattern() -> TemporalPattern {
        TemporalPattern {
            formula: "G(x -> F y)".into(),
            formalism: TemporalFormalism::Ltl,
            parameters: vec!["x".into(), "y".into()],
        }
    }

    #[test]
    fn instantiation_substitutes_whole_words_only() {
        let mut oracle = TemporalOracle::candidate(TemporalPattern {
            formula: "G(x -> F xx)".into(),
            formalism: TemporalFormalism::Ltl,
            parameters: vec!["x".into(), "xx".into()],
        });
        oracle.substitutions.insert("x".into(), "ap_a".into());
        oracle.substitutions.insert("xx".into(), "ap_b".into());
        assert_eq!(oracle.instantiated_formula(), "G(ap_a -> F ap_b)");
    }

    #[test]
    fn oracles_round_trip_through_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oracles.csv");

        let mut with_subs = TemporalOracle::candidate(sample_pattern());
        with_subs.constraint_set = Some(2);
        with_subs.substitutions.insert("x".into(), "s1_Role_exists".into());
        with_subs.substitutions.insert("y".into(), "s2_Role_exists".into());
        with_subs.verdict = Some(Verdict::Fail);

        let mut failed = TemporalOracle::candidate(sample_pattern());
        failed.status = ValidationStatus::Error;
        failed.add_log("no valid assignment of substitutions found");

        let oracles = vec![with_subs, failed];
        save_oracles_csv(&path, &oracles).unwrap();
        let loaded = load_oracles_csv(&path).unwrap();
        assert_eq!(loaded, oracles);
    }

    #[test]
    fn patterns_round_trip_through_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patterns.csv");
        let patterns = vec![
            sample_pattern(),
            TemporalPattern {
                formula: "AG(p)".into(),
                formalism: TemporalFormalism::Ctl,
                parameters: vec!["p".into()],
            },
        ];
        save_patterns_csv(&path, &patterns).unwrap();
        assert_eq!(load_patterns_csv(&path).unwrap(), patterns);
    }

    #[test]
    fn constraints_round_trip_through_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("constraints.csv");
        let mut sets = BTreeMap::new();
        let mut first = BTreeMap::new();
        first.insert("x".to_string(), "^never$".to_string());
        sets.insert(1, first);
        let constraints = vec![TemporalPatternConstraint {
            formula: "G(x)".into(),
            constraint_sets: sets,
        }];
        save_constraints_csv(&path, &constraints).unwrap();
        assert_eq!(load_constraints_csv(&path).unwrap(), constraints);
    }

    #[test]
    fn status_and_verdict_parse_case_insensitively() {
        assert_eq!(
            "candidate".parse::<ValidationStatus>().unwrap(),
            ValidationStatus::Candidate
        );
        assert_eq!("pass".parse::<Verdict>().unwrap(), Verdict::Pass);
        assert!("bogus".parse::<Verdict>().is_err());
    }
}
