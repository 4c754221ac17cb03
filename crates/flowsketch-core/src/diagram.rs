//! A named, persistable diagram: the graph plus its identity.

use crate::graph::Graph;
use crate::model::DiagramId;
use crate::storage::DiagramRecord;
use chrono::{DateTime, Utc};

/// Name given to diagrams that have not been named yet.
pub const DEFAULT_DIAGRAM_NAME: &str = "Untitled Diagram";

/// The diagram currently open in an editor.
#[derive(Debug, Clone)]
pub struct Diagram {
    pub id: DiagramId,
    pub name: String,
    pub graph: Graph,
    /// Time of the last save, `None` until saved.
    pub last_modified: Option<DateTime<Utc>>,
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagram {
    /// An empty diagram with a generated id and the default name.
    pub fn new() -> Self {
        Self {
            id: DiagramId::generate(),
            name: DEFAULT_DIAGRAM_NAME.to_string(),
            graph: Graph::new(),
            last_modified: None,
        }
    }

    /// Rebuild a diagram from a stored snapshot.
    pub fn from_record(record: DiagramRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            graph: Graph::from_parts(record.nodes, record.edges),
            last_modified: Some(record.last_modified),
        }
    }

    pub fn is_saved(&self) -> bool {
        self.last_modified.is_some()
    }
}
