use serde::{Deserialize, Serialize};

/// One observation in a recorded execution run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalTraceEvent {
    /// Key of the concrete state that was observed.
    pub state: String,
    /// Label of the action taken from that state, when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// An ordered sequence of observations from one execution run.
///
/// Traces seed the initial-state set of a temporal model: the state of the
/// first event of every trace is initial.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TemporalTrace {
    pub events: Vec<TemporalTraceEvent>,
}

impl TemporalTrace {
    pub fn first_state(&self) -> Option<&str> {
        self.events.first().map(|e| e.state.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_state_of_empty_trace_is_none() {
        assert!(TemporalTrace::default().first_state().is_none());
    }

    #[test]
    fn first_state_reads_the_head_event() {
        let trace = TemporalTrace {
            events: vec![
                TemporalTraceEvent {
                    state: "s1".into(),
                    action: Some("click".into()),
                },
                TemporalTraceEvent {
                    state: "s2".into(),
                    action: None,
                },
            ],
        };
        assert_eq!(trace.first_state(), Some("s1"));
    }
}
