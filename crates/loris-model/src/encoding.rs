use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// One outgoing transition of an encoded state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionEncoding {
    /// Transition label from the store (an action identifier), or a
    /// synthetic label for instrumented terminal edges.
    pub label: String,
    /// Key of the target state.
    pub target: String,
    /// Atomic propositions holding on this transition.
    pub propositions: IndexSet<String>,
}

impl TransitionEncoding {
    pub fn new(label: impl Into<String>, target: impl Into<String>) -> Self {
        TransitionEncoding {
            label: label.into(),
            target: target.into(),
            propositions: IndexSet::new(),
        }
    }

    /// Canonical serialization of the proposition set: sorted and
    /// `&`-joined. Two transitions with set-equal propositions produce the
    /// same conjunct, which is how duplicates are detected.
    pub fn encoded_conjunct(&self) -> String {
        let mut aps: Vec<&str> = self.propositions.iter().map(String::as_str).collect();
        aps.sort_unstable();
        aps.join("&")
    }
}

/// One state of the temporal model: its proposition set and its outgoing
/// transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEncoding {
    pub key: String,
    pub propositions: IndexSet<String>,
    pub transitions: Vec<TransitionEncoding>,
    /// Set only when terminal states are flagged in place rather than
    /// instrumented with a synthetic sink.
    #[serde(default)]
    pub terminal: bool,
}

impl StateEncoding {
    pub fn new(key: impl Into<String>) -> Self {
        StateEncoding {
            key: key.into(),
            propositions: IndexSet::new(),
            transitions: Vec::new(),
            terminal: false,
        }
    }
}
