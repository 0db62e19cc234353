use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use loris_model::attributes::AttributeValue;
use loris_model::traces::TemporalTrace;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("model `{0}` was not found in the graph store")]
    ModelNotFound(String),
    #[error("graph store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed graph data: {0}")]
    Malformed(String),
}

/// Metadata of one recorded abstract model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub identifier: String,
    pub application_name: String,
    pub application_version: String,
    /// Attribute names the exploration engine abstracted states over.
    #[serde(default)]
    pub abstraction_attributes: Vec<String>,
}

/// One outgoing edge of a concrete state, with its own property bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub label: String,
    pub target: String,
    #[serde(default)]
    pub attributes: Vec<(String, AttributeValue)>,
}

/// One concrete state as persisted by the exploration engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    pub key: String,
    #[serde(default)]
    pub attributes: Vec<(String, AttributeValue)>,
    #[serde(default)]
    pub transitions: Vec<TransitionRecord>,
}

/// Forward-only cursor over the concrete states of a model. Each element is
/// consumed exactly once; the builder never needs random access.
pub type StateCursor<'a> = Box<dyn Iterator<Item = Result<StateRecord, StoreError>> + 'a>;

/// Boundary to the external graph store.
///
/// Implementations are synchronous and may block; I/O failures surfaced
/// through the cursor abort the running build, with no retries.
pub trait GraphStore {
    /// Look up the target model; absence is an explicit error, not an
    /// empty result.
    fn find_model(&self, identifier: &str) -> Result<ModelInfo, StoreError>;

    /// Total state count, for progress reporting only.
    fn state_count(&self, identifier: &str) -> Result<usize, StoreError>;

    fn stream_states<'s>(&'s self, identifier: &str) -> Result<StateCursor<'s>, StoreError>;

    /// Ordered trace events per recorded execution run.
    fn fetch_traces(&self, identifier: &str) -> Result<Vec<TemporalTrace>, StoreError>;
}

/// Serialized form of a recorded graph, used by the in-memory store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphFile {
    pub model: ModelInfo,
    pub states: Vec<StateRecord>,
    #[serde(default)]
    pub traces: Vec<TemporalTrace>,
}

/// Graph store backed by a fully materialized [`GraphFile`].
///
/// Serves exported graph snapshots and test fixtures; the streaming
/// contract is the same as for a database-backed store.
#[derive(Debug, Clone)]
pub struct MemoryGraphStore {
    graph: GraphFile,
}

impl MemoryGraphStore {
    pub fn new(graph: GraphFile) -> Self {
        MemoryGraphStore { graph }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, StoreError> {
        let json = fs::read_to_string(path)?;
        let graph: GraphFile =
            serde_json::from_str(&json).map_err(|err| StoreError::Malformed(err.to_string()))?;
        Ok(MemoryGraphStore { graph })
    }

    fn check_identifier(&self, identifier: &str) -> Result<(), StoreError> {
        if self.graph.model.identifier == identifier {
            Ok(())
        } else {
            Err(StoreError::ModelNotFound(identifier.to_string()))
        }
    }
}

impl GraphStore for MemoryGraphStore {
    fn find_model(&self, identifier: &str) -> Result<ModelInfo, StoreError> {
        self.check_identifier(identifier)?;
        Ok(self.graph.model.clone())
    }

    fn state_count(&self, identifier: &str) -> Result<usize, StoreError> {
        self.check_identifier(identifier)?;
        Ok(self.graph.states.len())
    }

    fn stream_states<'s>(&'s self, identifier: &str) -> Result<StateCursor<'s>, StoreError> {
        self.check_identifier(identifier)?;
        Ok(Box::new(self.graph.states.iter().cloned().map(Ok)))
    }

    fn fetch_traces(&self, identifier: &str) -> Result<Vec<TemporalTrace>, StoreError> {
        self.check_identifier(identifier)?;
        Ok(self.graph.traces.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> GraphFile {
        GraphFile {
            model: ModelInfo {
                identifier: "m1".into(),
                application_name: "calc".into(),
                application_version: "1.0".into(),
                abstraction_attributes: vec!["Role".into()],
            },
            states: vec![StateRecord {
                key: "s1".into(),
                attributes: vec![("Role".into(), AttributeValue::Text("Button".into()))],
                transitions: vec![],
            }],
            traces: vec![],
        }
    }

    #[test]
    fn unknown_identifier_is_an_explicit_not_found() {
        let store = MemoryGraphStore::new(graph());
        assert!(matches!(
            store.find_model("other"),
            Err(StoreError::ModelNotFound(id)) if id == "other"
        ));
        assert!(matches!(
            store.stream_states("other"),
            Err(StoreError::ModelNotFound(_))
        ));
    }

    #[test]
    fn cursor_yields_each_state_once() {
        let store = MemoryGraphStore::new(graph());
        let states: Vec<_> = store
            .stream_states("m1")
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].key, "s1");
    }

    #[test]
    fn graph_file_round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        let original = graph();
        fs::write(&path, serde_json::to_string_pretty(&original).unwrap()).unwrap();
        let store = MemoryGraphStore::from_json_file(&path).unwrap();
        assert_eq!(store.graph, original);
    }

    #[test]
    fn malformed_graph_file_is_reported_as_such() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            MemoryGraphStore::from_json_file(&path),
            Err(StoreError::Malformed(_))
        ));
    }
}
