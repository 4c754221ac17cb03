//! Diagram persistence on top of a key-value store.
//!
//! Layout: one index entry holding `[{id, name, lastModified}]` and one record
//! per diagram. Every save and delete keeps the two consistent.

use super::{KeyValueStore, StorageError, StorageResult};
use crate::model::{DiagramId, Edge, Node};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Key of the diagram index.
pub const INDEX_KEY: &str = "flowsketch_index";
/// Prefix of per-diagram record keys.
pub const RECORD_KEY_PREFIX: &str = "flowsketch_diagram_";

/// Index entry for a saved diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramMeta {
    pub id: DiagramId,
    pub name: String,
    pub last_modified: DateTime<Utc>,
}

/// Full persisted snapshot of a diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramRecord {
    pub id: DiagramId,
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    pub last_modified: DateTime<Utc>,
}

impl DiagramRecord {
    pub fn meta(&self) -> DiagramMeta {
        DiagramMeta {
            id: self.id.clone(),
            name: self.name.clone(),
            last_modified: self.last_modified,
        }
    }
}

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Saves, lists, loads and deletes diagrams.
///
/// Reads never fail: a missing, unreadable or corrupt entry is reported as
/// "nothing there" after logging.
pub struct DiagramGateway<S: KeyValueStore> {
    store: Arc<S>,
    clock: Clock,
}

fn record_key(id: &DiagramId) -> String {
    format!("{}{}", RECORD_KEY_PREFIX, id)
}

impl<S: KeyValueStore> DiagramGateway<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_clock(store, Utc::now)
    }

    /// Use a custom time source for `lastModified` stamps.
    pub fn with_clock(
        store: Arc<S>,
        clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static,
    ) -> Self {
        Self {
            store,
            clock: Box::new(clock),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn read_index(&self) -> Vec<DiagramMeta> {
        let raw = match self.store.get(INDEX_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("Failed to read diagram index: {}", e);
                return Vec::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("Ignoring corrupt diagram index: {}", e);
            Vec::new()
        })
    }

    fn write_index(&self, index: &[DiagramMeta]) -> StorageResult<()> {
        let json = serde_json::to_string(index)?;
        self.store.set(INDEX_KEY, &json)
    }

    /// Saved diagrams, most recently modified first.
    pub fn list(&self) -> Vec<DiagramMeta> {
        let mut index = self.read_index();
        index.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        index
    }

    /// Persist a snapshot and update its index entry.
    ///
    /// The record is written before the index, so the index never names a
    /// record that does not exist.
    pub fn save(
        &self,
        id: &DiagramId,
        name: &str,
        nodes: &[Node],
        edges: &[Edge],
    ) -> StorageResult<DiagramRecord> {
        let record = DiagramRecord {
            id: id.clone(),
            name: name.to_string(),
            nodes: nodes.to_vec(),
            edges: edges.to_vec(),
            last_modified: (self.clock)(),
        };
        let json = serde_json::to_string(&record)?;
        self.store.set(&record_key(id), &json)?;

        let mut index = self.read_index();
        match index.iter_mut().find(|m| &m.id == id) {
            Some(entry) => *entry = record.meta(),
            None => index.push(record.meta()),
        }
        self.write_index(&index)?;

        log::info!("Saved diagram {} ({})", id, name);
        Ok(record)
    }

    /// Read a snapshot, reporting why it could not be read.
    ///
    /// A missing record is [`StorageError::NotFound`]; unparseable JSON is
    /// [`StorageError::Serialization`].
    pub fn fetch(&self, id: &DiagramId) -> StorageResult<DiagramRecord> {
        let raw = self
            .store
            .get(&record_key(id))?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Load a snapshot. Missing and corrupt records both yield `None`.
    pub fn load(&self, id: &DiagramId) -> Option<DiagramRecord> {
        match self.fetch(id) {
            Ok(record) => {
                log::info!("Loaded diagram {}", id);
                Some(record)
            }
            Err(StorageError::NotFound(_)) => {
                log::debug!("Diagram {} not found", id);
                None
            }
            Err(e @ StorageError::Serialization(_)) => {
                log::error!("Diagram {} is corrupt: {}", id, e);
                None
            }
            Err(e) => {
                log::warn!("Failed to read diagram {}: {}", id, e);
                None
            }
        }
    }

    /// Whether the id is indexed or has a record, readable or not.
    pub fn contains(&self, id: &DiagramId) -> bool {
        self.read_index().iter().any(|m| &m.id == id)
            || self.store.contains(&record_key(id)).unwrap_or(false)
    }

    /// Remove a record and its index entry.
    pub fn delete(&self, id: &DiagramId) -> StorageResult<()> {
        self.store.remove(&record_key(id))?;
        let mut index = self.read_index();
        let before = index.len();
        index.retain(|m| &m.id != id);
        if index.len() != before {
            self.write_index(&index)?;
        }
        log::info!("Deleted diagram {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeId, NodeKind};
    use crate::storage::MemoryStore;
    use chrono::TimeZone;
    use kurbo::Point;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// A gateway whose clock advances one minute per save.
    fn gateway() -> DiagramGateway<MemoryStore> {
        let tick = AtomicI64::new(0);
        DiagramGateway::with_clock(Arc::new(MemoryStore::new()), move || {
            let minutes = tick.fetch_add(1, Ordering::SeqCst);
            Utc.timestamp_opt(1_700_000_000 + minutes * 60, 0).unwrap()
        })
    }

    fn sample_nodes() -> (Vec<Node>, Vec<Edge>) {
        let a = Node::with_id(NodeId::from("A"), NodeKind::Terminal, Point::new(0.0, 0.0), "Start");
        let b = Node::with_id(NodeId::from("B"), NodeKind::Process, Point::new(0.0, 120.0), "Work");
        let e = Edge::new(NodeId::from("A"), NodeId::from("B"));
        (vec![a, b], vec![e])
    }

    #[test]
    fn test_save_and_load() {
        let gateway = gateway();
        let (nodes, edges) = sample_nodes();
        let id = DiagramId::from("d1");
        gateway.save(&id, "First", &nodes, &edges).unwrap();

        let record = gateway.load(&id).unwrap();
        assert_eq!(record.name, "First");
        assert_eq!(record.nodes, nodes);
        assert_eq!(record.edges, edges);
    }

    #[test]
    fn test_list_sorted_newest_first() {
        let gateway = gateway();
        gateway.save(&DiagramId::from("a"), "A", &[], &[]).unwrap();
        gateway.save(&DiagramId::from("b"), "B", &[], &[]).unwrap();
        gateway.save(&DiagramId::from("c"), "C", &[], &[]).unwrap();
        // Re-saving moves a diagram to the front without duplicating it.
        gateway.save(&DiagramId::from("a"), "A2", &[], &[]).unwrap();

        let names: Vec<_> = gateway.list().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["A2", "C", "B"]);
    }

    #[test]
    fn test_load_missing() {
        let gateway = gateway();
        assert!(gateway.load(&DiagramId::from("nope")).is_none());
    }

    #[test]
    fn test_delete_removes_index_entry() {
        let gateway = gateway();
        let id = DiagramId::from("gone");
        gateway.save(&id, "Gone", &[], &[]).unwrap();
        gateway.delete(&id).unwrap();
        assert!(gateway.load(&id).is_none());
        assert!(gateway.list().is_empty());
        // Deleting twice is fine.
        gateway.delete(&id).unwrap();
    }

    #[test]
    fn test_corrupt_data_degrades() {
        let gateway = gateway();
        let id = DiagramId::from("x");
        gateway.store().set(INDEX_KEY, "{not json").unwrap();
        gateway.store().set(&record_key(&id), "[]").unwrap();
        assert!(gateway.list().is_empty());
        assert!(gateway.load(&id).is_none());

        // Saving over a corrupt index starts a fresh one.
        gateway.save(&id, "Fixed", &[], &[]).unwrap();
        assert_eq!(gateway.list().len(), 1);
    }

    #[test]
    fn test_fetch_errors() {
        let gateway = gateway();
        let id = DiagramId::from("x");
        assert!(matches!(gateway.fetch(&id), Err(StorageError::NotFound(missing)) if missing == "x"));

        gateway.save(&id, "X", &[], &[]).unwrap();
        gateway.store().set(&record_key(&id), "{broken").unwrap();
        assert!(matches!(gateway.fetch(&id), Err(StorageError::Serialization(_))));
    }

    #[test]
    fn test_corrupt_record_can_be_deleted() {
        let gateway = gateway();
        let id = DiagramId::from("x");
        gateway.save(&id, "X", &[], &[]).unwrap();
        gateway.store().set(&record_key(&id), "{broken").unwrap();

        assert_eq!(gateway.list().len(), 1);
        assert!(gateway.load(&id).is_none());
        assert!(gateway.contains(&id));
        assert!(!gateway.contains(&DiagramId::from("other")));

        gateway.delete(&id).unwrap();
        assert!(gateway.list().is_empty());
        assert!(!gateway.contains(&id));
    }

    #[test]
    fn test_record_json_shape() {
        let gateway = gateway();
        let id = DiagramId::from("shape");
        gateway.save(&id, "Shape", &[], &[]).unwrap();
        let raw = gateway.store().get(&record_key(&id)).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        for field in ["id", "name", "nodes", "edges", "lastModified"] {
            assert!(value.get(field).is_some(), "missing {}", field);
        }
    }
}
