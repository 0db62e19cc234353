use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use loris_model::model::TemporalModel;
use loris_model::oracles::{
    TemporalOracle, TemporalPattern, TemporalPatternConstraint, ValidationStatus,
};
use loris_model::propositions::RegexCache;

use crate::logging::RunLog;

/// Hard cap on substitution attempts per parameter, independent of the
/// universe size.
const RETRY_CAP: usize = 250;

#[derive(Debug, Clone, Copy)]
pub struct GeneratorOptions {
    pub candidates_per_pattern: usize,
    /// Seed for the draw RNG. Fixed seed, fixed output — generation must be
    /// reproducible across runs.
    pub seed: u64,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions {
            candidates_per_pattern: 3,
            seed: 5_000_000,
        }
    }
}

/// Substitute atomic propositions from the model into pattern parameters.
///
/// Every pattern yields exactly `candidates_per_pattern` oracles, each
/// either CANDIDATE (all parameters assigned) or ERROR (some parameter
/// unassignable within the retry bound). Duplicate assignments across draws
/// are accepted: the likelihood is low and the cost is one redundant
/// verification.
pub fn generate_candidates(
    model: &TemporalModel,
    patterns: &[TemporalPattern],
    constraints: &[TemporalPatternConstraint],
    options: &GeneratorOptions,
    log: &mut RunLog,
) -> Vec<TemporalOracle> {
    let universe: Vec<&str> = model.propositions().iter().map(String::as_str).collect();
    let try_limit = RETRY_CAP.min(2 * universe.len());
    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut cache = RegexCache::new();

    log.append(format!(
        "oracle generation started: {} patterns, {} candidates per pattern, universe of {}",
        patterns.len(),
        options.candidates_per_pattern,
        universe.len()
    ));

    let mut oracles = Vec::with_capacity(patterns.len() * options.candidates_per_pattern);
    for pattern in patterns {
        let constraint_sets = constraints
            .iter()
            .find(|c| c.formula == pattern.formula)
            .map(|c| &c.constraint_sets)
            .filter(|sets| !sets.is_empty());

        for _ in 0..options.candidates_per_pattern {
            oracles.push(draw_oracle(
                pattern,
                constraint_sets,
                &universe,
                try_limit,
                &mut rng,
                &mut cache,
            ));
        }
    }

    let failed = oracles
        .iter()
        .filter(|o| o.status == ValidationStatus::Error)
        .count();
    log.append(format!(
        "oracle generation completed: {} candidates, {} unassignable",
        oracles.len() - failed,
        failed
    ));
    oracles
}

fn draw_oracle(
    pattern: &TemporalPattern,
    constraint_sets: Option<&BTreeMap<usize, BTreeMap<String, String>>>,
    universe: &[&str],
    try_limit: usize,
    rng: &mut StdRng,
    cache: &mut RegexCache,
) -> TemporalOracle {
    let mut oracle = TemporalOracle::candidate(pattern.clone());
    let mut assigned = BTreeMap::new();
    let mut all_assigned = true;

    let set_keys: Vec<usize> = constraint_sets
        .map(|sets| sets.keys().copied().collect())
        .unwrap_or_default();
    let start = if set_keys.is_empty() {
        0
    } else {
        let index = rng.gen_range(0..set_keys.len());
        oracle.constraint_set = Some(set_keys[index]);
        index
    };

    for param in &pattern.parameters {
        let substitution = match constraint_sets {
            None => draw_unconstrained(universe, rng),
            Some(sets) => {
                draw_constrained(sets, &set_keys, start, param, universe, try_limit, rng, cache)
            }
        };
        match substitution {
            Some(ap) => {
                assigned.insert(param.clone(), ap);
            }
            None => all_assigned = false,
        }
    }

    if all_assigned {
        oracle.substitutions = assigned;
    } else {
        oracle.status = ValidationStatus::Error;
        oracle.add_log(format!(
            "no valid assignment of substitutions found for `{}`; review the constraint sets",
            pattern.formula
        ));
    }
    oracle
}

fn draw_unconstrained(universe: &[&str], rng: &mut StdRng) -> Option<String> {
    if universe.is_empty() {
        return None;
    }
    Some(universe[rng.gen_range(0..universe.len())].to_string())
}

/// Walk the constraint sets in cyclic order from the starting pick. The
/// first set that says nothing about the parameter short-circuits into an
/// unconstrained draw; the first set with a valid regex for it decides
/// success or failure within the retry bound.
#[allow(clippy::too_many_arguments)]
fn draw_constrained(
    sets: &BTreeMap<usize, BTreeMap<String, String>>,
    set_keys: &[usize],
    start: usize,
    param: &str,
    universe: &[&str],
    try_limit: usize,
    rng: &mut StdRng,
    cache: &mut RegexCache,
) -> Option<String> {
    for offset in 0..set_keys.len() {
        let key = set_keys[(start + offset) % set_keys.len()];
        let set = &sets[&key];
        let Some(pattern) = set.get(param) else {
            return draw_unconstrained(universe, rng);
        };
        if !cache.is_valid(pattern) {
            // Invalid regex: this set cannot constrain the parameter,
            // consult the next one.
            continue;
        }
        for _ in 0..try_limit {
            let candidate = draw_unconstrained(universe, rng)?;
            if cache.full_match(pattern, &candidate) {
                return Some(candidate);
            }
        }
        return None;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexSet;
    use loris_model::encoding::StateEncoding;
    use loris_model::oracles::TemporalFormalism;

    fn model_with_universe(aps: &[&str]) -> TemporalModel {
        let mut model = TemporalModel::new();
        let mut state = StateEncoding::new("s1");
        for ap in aps {
            state.propositions.insert(ap.to_string());
        }
        model.add_state(state).unwrap();
        model.rebuild_universe();
        model
    }

    fn pattern(formula: &str, parameters: &[&str]) -> TemporalPattern {
        TemporalPattern {
            formula: formula.into(),
            formalism: TemporalFormalism::Ltl,
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn constraint(formula: &str, sets: &[&[(&str, &str)]]) -> TemporalPatternConstraint {
        let mut constraint_sets = BTreeMap::new();
        for (i, set) in sets.iter().enumerate() {
            let mut m = BTreeMap::new();
            for (param, regex) in set.iter() {
                m.insert(param.to_string(), regex.to_string());
            }
            constraint_sets.insert(i + 1, m);
        }
        TemporalPatternConstraint {
            formula: formula.into(),
            constraint_sets,
        }
    }

    #[test]
    fn unconstrained_patterns_always_yield_candidates() {
        let model = model_with_universe(&["a", "b", "c"]);
        let patterns = vec![pattern("G(x -> F y)", &["x", "y"])];
        let options = GeneratorOptions {
            candidates_per_pattern: 5,
            seed: 42,
        };
        let mut log = RunLog::new();
        let oracles = generate_candidates(&model, &patterns, &[], &options, &mut log);
        assert_eq!(oracles.len(), 5);
        for oracle in &oracles {
            assert_eq!(oracle.status, ValidationStatus::Candidate);
            for param in ["x", "y"] {
                let ap = oracle.substitutions.get(param).unwrap();
                assert!(["a", "b", "c"].contains(&ap.as_str()));
            }
        }
    }

    #[test]
    fn unsatisfiable_constraint_yields_error_with_diagnostic() {
        let model = model_with_universe(&["a", "b", "c"]);
        let patterns = vec![pattern("G(x)", &["x"])];
        let constraints = vec![constraint("G(x)", &[&[("x", "^never$")]])];
        let mut log = RunLog::new();
        let oracles = generate_candidates(
            &model,
            &patterns,
            &constraints,
            &GeneratorOptions::default(),
            &mut log,
        );
        assert_eq!(oracles.len(), 3);
        for oracle in &oracles {
            assert_eq!(oracle.status, ValidationStatus::Error);
            assert!(!oracle.log.is_empty());
            assert!(oracle.substitutions.is_empty());
        }
    }

    #[test]
    fn satisfiable_constraint_assigns_a_matching_proposition() {
        let model = model_with_universe(&["s1_Role_exists", "s2_Role_exists"]);
        let patterns = vec![pattern("G(x)", &["x"])];
        let constraints = vec![constraint("G(x)", &[&[("x", ".*Role.*")]])];
        let mut log = RunLog::new();
        let oracles = generate_candidates(
            &model,
            &patterns,
            &constraints,
            &GeneratorOptions::default(),
            &mut log,
        );
        for oracle in &oracles {
            assert_eq!(oracle.status, ValidationStatus::Candidate);
            assert!(oracle.substitutions["x"].contains("Role"));
            assert_eq!(oracle.constraint_set, Some(1));
        }
    }

    #[test]
    fn set_without_the_parameter_short_circuits_to_unconstrained() {
        let model = model_with_universe(&["a", "b"]);
        let patterns = vec![pattern("G(x -> y)", &["x", "y"])];
        // Only `x` is constrained; `y` must still be assigned.
        let constraints = vec![constraint("G(x -> y)", &[&[("x", "a|b")]])];
        let mut log = RunLog::new();
        let oracles = generate_candidates(
            &model,
            &patterns,
            &constraints,
            &GeneratorOptions::default(),
            &mut log,
        );
        for oracle in &oracles {
            assert_eq!(oracle.status, ValidationStatus::Candidate);
            assert!(oracle.substitutions.contains_key("y"));
        }
    }

    #[test]
    fn invalid_regex_set_defers_to_the_next_set() {
        let model = model_with_universe(&["a"]);
        let patterns = vec![pattern("G(x)", &["x"])];
        let constraints = vec![constraint(
            "G(x)",
            &[&[("x", "(unclosed")], &[("x", "a")]],
        )];
        let mut log = RunLog::new();
        let oracles = generate_candidates(
            &model,
            &patterns,
            &constraints,
            &GeneratorOptions {
                candidates_per_pattern: 8,
                seed: 7,
            },
            &mut log,
        );
        for oracle in &oracles {
            assert_eq!(oracle.status, ValidationStatus::Candidate);
            assert_eq!(oracle.substitutions["x"], "a");
        }
    }

    #[test]
    fn empty_universe_marks_everything_error() {
        let model = TemporalModel::new();
        let patterns = vec![pattern("G(x)", &["x"])];
        let mut log = RunLog::new();
        let oracles = generate_candidates(
            &model,
            &patterns,
            &[],
            &GeneratorOptions::default(),
            &mut log,
        );
        assert_eq!(oracles.len(), 3);
        assert!(oracles
            .iter()
            .all(|o| o.status == ValidationStatus::Error));
    }

    #[test]
    fn fixed_seed_reproduces_the_same_draws() {
        let model = model_with_universe(&["a", "b", "c", "d"]);
        let patterns = vec![pattern("G(x -> F y)", &["x", "y"])];
        let options = GeneratorOptions {
            candidates_per_pattern: 10,
            seed: 1234,
        };
        let mut log = RunLog::new();
        let first = generate_candidates(&model, &patterns, &[], &options, &mut log);
        let second = generate_candidates(&model, &patterns, &[], &options, &mut log);
        assert_eq!(first, second);
    }

    #[test]
    fn parameterless_pattern_is_a_trivial_candidate() {
        let model = model_with_universe(&["a"]);
        let patterns = vec![pattern("G(true)", &[])];
        let mut log = RunLog::new();
        let oracles = generate_candidates(
            &model,
            &patterns,
            &[],
            &GeneratorOptions::default(),
            &mut log,
        );
        assert!(oracles
            .iter()
            .all(|o| o.status == ValidationStatus::Candidate && o.substitutions.is_empty()));
    }
}
