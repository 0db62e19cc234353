//! Render a `TemporalModel` into the explicit-model text formats the
//! external checker executables consume.

use std::collections::HashMap;

use loris_model::model::TemporalModel;

/// HOA-style transition-labelled automaton for the LTL backend.
///
/// Transition labels are positive conjunctions of proposition indices;
/// absent propositions are false by construction, so no negations are
/// emitted.
pub fn write_hoa(model: &TemporalModel) -> String {
    let index_of: HashMap<&str, usize> = model
        .states()
        .enumerate()
        .map(|(i, s)| (s.key.as_str(), i))
        .collect();
    let ap_index: HashMap<&str, usize> = model
        .propositions()
        .iter()
        .enumerate()
        .map(|(i, ap)| (ap.as_str(), i))
        .collect();

    let mut out = String::new();
    out.push_str("HOA: v1\n");
    out.push_str(&format!("name: \"{}\"\n", model.model_identifier));
    out.push_str(&format!("States: {}\n", model.state_count()));
    for initial in model.initial_states() {
        if let Some(idx) = index_of.get(initial.as_str()) {
            out.push_str(&format!("Start: {idx}\n"));
        }
    }
    out.push_str(&format!("AP: {}", model.propositions().len()));
    for ap in model.propositions() {
        out.push_str(&format!(" \"{ap}\""));
    }
    out.push('\n');
    out.push_str("acc-name: all\n");
    out.push_str("Acceptance: 0 t\n");
    out.push_str("properties: trans-labels explicit-labels state-acc\n");
    out.push_str("--BODY--\n");
    for (i, state) in model.states().enumerate() {
        out.push_str(&format!("State: {i} \"{}\"\n", state.key));
        for transition in &state.transitions {
            let Some(target) = index_of.get(transition.target.as_str()) else {
                tracing::warn!(
                    "transition `{}` of state `{}` points at unknown state `{}`",
                    transition.label,
                    state.key,
                    transition.target
                );
                continue;
            };
            let label = if transition.propositions.is_empty() {
                "t".to_string()
            } else {
                transition
                    .propositions
                    .iter()
                    .filter_map(|ap| ap_index.get(ap.as_str()))
                    .map(|idx| idx.to_string())
                    .collect::<Vec<_>>()
                    .join("&")
            };
            out.push_str(&format!("[{label}] {target}\n"));
        }
    }
    out.push_str("--END--\n");
    out
}

/// Flat transition-system listing for the CTL backend.
pub fn write_flat_ts(model: &TemporalModel) -> String {
    let mut out = String::new();
    out.push_str(&format!("model {}\n", model.model_identifier));
    out.push_str("propositions:");
    for ap in model.propositions() {
        out.push(' ');
        out.push_str(ap);
    }
    out.push('\n');
    out.push_str("init:");
    for initial in model.initial_states() {
        out.push(' ');
        out.push_str(initial);
    }
    out.push('\n');
    for state in model.states() {
        let terminal = if state.terminal { " terminal" } else { "" };
        out.push_str(&format!("state {}{terminal} {{", state.key));
        for ap in &state.propositions {
            out.push(' ');
            out.push_str(ap);
        }
        out.push_str(" }\n");
        for transition in &state.transitions {
            out.push_str(&format!("  -> {} {} {{", transition.target, transition.label));
            for ap in &transition.propositions {
                out.push(' ');
                out.push_str(ap);
            }
            out.push_str(" }\n");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexSet;
    use loris_model::encoding::{StateEncoding, TransitionEncoding};

    fn two_state_model() -> TemporalModel {
        let mut model = TemporalModel::new();
        model.model_identifier = "m1".into();
        let mut s1 = StateEncoding::new("s1");
        s1.propositions.insert("p".to_string());
        let mut t = TransitionEncoding::new("a1", "s2");
        t.propositions.insert("q".to_string());
        s1.transitions.push(t);
        s1.transitions.push(TransitionEncoding::new("dangling", "nowhere"));
        model.add_state(s1).unwrap();

        let mut s2 = StateEncoding::new("s2");
        s2.propositions.insert("p".to_string());
        s2.terminal = true;
        model.add_state(s2).unwrap();

        model.rebuild_universe();
        let mut initial = IndexSet::new();
        initial.insert("s1".to_string());
        model.set_initial_states(initial);
        model
    }

    #[test]
    fn hoa_header_lists_states_start_and_aps() {
        let hoa = write_hoa(&two_state_model());
        assert!(hoa.starts_with("HOA: v1\n"));
        assert!(hoa.contains("States: 2\n"));
        assert!(hoa.contains("Start: 0\n"));
        assert!(hoa.contains("AP: 2 \"p\" \"q\"\n"));
        assert!(hoa.ends_with("--END--\n"));
    }

    #[test]
    fn hoa_labels_transitions_with_ap_indices() {
        let hoa = write_hoa(&two_state_model());
        // q is AP index 1; the a1 transition targets state index 1.
        assert!(hoa.contains("[1] 1\n"));
    }

    #[test]
    fn hoa_skips_dangling_transitions() {
        let hoa = write_hoa(&two_state_model());
        assert!(!hoa.contains("nowhere"));
    }

    #[test]
    fn flat_ts_lists_states_transitions_and_terminal_flag() {
        let ts = write_flat_ts(&two_state_model());
        assert!(ts.contains("model m1\n"));
        assert!(ts.contains("init: s1\n"));
        assert!(ts.contains("state s1 { p }\n"));
        assert!(ts.contains("  -> s2 a1 { q }\n"));
        assert!(ts.contains("state s2 terminal { p }\n"));
    }
}
