//! Project persistence.
//!
//! A [`ProjectRecord`] is the JSON shape written to a [`ProjectStore`]:
//! `{id, name, components, wires, texts, connectionNodes, createdAt,
//! updatedAt}` with epoch-millisecond timestamps. Stores are pluggable so
//! the editor core never decides where or when a project is written.

use std::time::{SystemTime, UNIX_EPOCH};

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{EditorError, Result};
use crate::model::{Component, ConnectionNode, Schematic, TextElement, Wire, WireBundle};

/// Milliseconds since the Unix epoch, or 0 if the clock is before it.
pub fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

/// A saved project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub wires: Vec<Wire>,
    #[serde(default)]
    pub texts: Vec<TextElement>,
    #[serde(default)]
    pub connection_nodes: Vec<ConnectionNode>,
    #[serde(default, rename = "wireBundles", skip_serializing_if = "Vec::is_empty")]
    pub bundles: Vec<WireBundle>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl ProjectRecord {
    pub fn from_document(id: &str, name: &str, doc: &Schematic, created_at: i64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            components: doc.components.values().cloned().collect(),
            wires: doc.wires.values().cloned().collect(),
            texts: doc.texts.values().cloned().collect(),
            connection_nodes: doc.nodes.values().cloned().collect(),
            bundles: doc.bundles.values().cloned().collect(),
            created_at,
            updated_at: now_ms(),
        }
    }

    /// Rebuild the document, dropping wires whose bindings do not resolve.
    pub fn to_document(&self) -> Schematic {
        fn keyed<T: Clone>(items: &[T], id: impl Fn(&T) -> &str) -> IndexMap<String, T> {
            items.iter().map(|t| (id(t).to_string(), t.clone())).collect()
        }
        let mut doc = Schematic {
            components: keyed(&self.components, |c| c.id.as_str()),
            wires: keyed(&self.wires, |w| w.id.as_str()),
            texts: keyed(&self.texts, |t| t.id.as_str()),
            nodes: keyed(&self.connection_nodes, |n| n.id.as_str()),
            bundles: keyed(&self.bundles, |b| b.id.as_str()),
        };
        let dropped = doc.sanitize();
        if !dropped.is_empty() {
            warn!(project = %self.id, dropped = dropped.len(), "dropped wires with dangling bindings");
        }
        doc
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stores
// ────────────────────────────────────────────────────────────────────────────

/// A persistence sink for project records.
pub trait ProjectStore {
    fn save(&mut self, record: &ProjectRecord) -> Result<()>;

    /// `Ok(None)` when no project with this id exists.
    fn load(&self, id: &str) -> Result<Option<ProjectRecord>>;

    /// Ids of all stored projects.
    fn list(&self) -> Result<Vec<String>>;
}

/// One `<id>.json` file per project under a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: Utf8PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Utf8PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

impl ProjectStore for JsonFileStore {
    fn save(&mut self, record: &ProjectRecord) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&record.id);
        std::fs::write(&path, record.to_json()?)?;
        info!(%path, "saved project");
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Option<ProjectRecord>> {
        let path = self.path_for(id);
        match std::fs::read_to_string(&path) {
            Ok(text) => ProjectRecord::from_json(&text).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(EditorError::Io(e)),
        }
    }

    fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in self.dir.read_dir_utf8()? {
            let path = entry?.into_path();
            if path.extension() == Some("json") {
                if let Some(stem) = path.file_stem() {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// In-memory store holding serialized records, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: IndexMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw JSON under `id`, bypassing serialization.
    pub fn insert_raw(&mut self, id: &str, json: &str) {
        self.records.insert(id.to_string(), json.to_string());
    }
}

impl ProjectStore for MemoryStore {
    fn save(&mut self, record: &ProjectRecord) -> Result<()> {
        self.records.insert(record.id.clone(), record.to_json()?);
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Option<ProjectRecord>> {
        self.records
            .get(id)
            .map(|text| ProjectRecord::from_json(text))
            .transpose()
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self.records.keys().cloned().collect())
    }
}

/// Load a record, treating missing and corrupt data alike as absent.
pub fn load_record(store: &dyn ProjectStore, id: &str) -> Option<ProjectRecord> {
    match store.load(id) {
        Ok(Some(record)) => {
            debug!(project = id, "loaded project");
            Some(record)
        }
        Ok(None) => {
            warn!(project = id, "project not found");
            None
        }
        Err(e) => {
            warn!(project = id, error = %e, "failed to load project");
            None
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// JSON export
// ────────────────────────────────────────────────────────────────────────────

/// A project record stamped with its export time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonExport {
    #[serde(flatten)]
    pub record: ProjectRecord,
    pub exported_at: i64,
}

/// Serialize `record` for download with an `exportedAt` stamp.
pub fn export_json(record: &ProjectRecord) -> Result<String> {
    let export = JsonExport {
        record: record.clone(),
        exported_at: now_ms(),
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::model::WirePoint;
    use crate::terminals::ComponentType;

    fn sample() -> Schematic {
        let mut doc = Schematic::new();
        let r = doc.add_component(Component::new(ComponentType::Resistor, 100.0, 100.0));
        let n = doc.add_node(ConnectionNode::new(200.0, 100.0));
        doc.add_wire(Wire::new(
            vec![
                WirePoint::terminal(Point::new(124.0, 100.0), &r, "right"),
                WirePoint::node(Point::new(200.0, 100.0), &n),
            ],
            None,
        ));
        doc.add_text(TextElement::new(10.0, 10.0, "R1"));
        doc
    }

    #[test]
    fn test_record_json_shape() {
        let record = ProjectRecord::from_document("p1", "Demo", &sample(), 5);
        let value: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
        assert_eq!(value["createdAt"], 5);
        assert!(value["connectionNodes"].is_array());
        assert_eq!(value["wires"][0]["points"][0]["terminalId"], "right");
        assert!(value["wires"][0]["points"][1]["componentId"].is_null());
        assert_eq!(value["components"][0]["type"], "Resistor");
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("projects")).unwrap();
        let mut store = JsonFileStore::new(path);
        let record = ProjectRecord::from_document("p1", "Demo", &sample(), 1);
        store.save(&record).unwrap();
        assert_eq!(store.list().unwrap(), vec!["p1".to_string()]);
        let loaded = store.load("p1").unwrap().unwrap();
        assert_eq!(loaded, record);
        assert_eq!(loaded.to_document().wires.len(), 1);
        assert!(store.load("missing").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_record_loads_as_none() {
        let mut store = MemoryStore::new();
        store.insert_raw("bad", "{ not json");
        assert!(store.load("bad").is_err());
        assert!(load_record(&store, "bad").is_none());
        assert!(load_record(&store, "absent").is_none());
    }

    #[test]
    fn test_dangling_wires_dropped_on_load() {
        let mut record = ProjectRecord::from_document("p1", "Demo", &sample(), 1);
        record.connection_nodes.clear();
        let doc = record.to_document();
        assert!(doc.wires.is_empty());
        assert_eq!(doc.components.len(), 1);
    }

    #[test]
    fn test_export_adds_timestamp() {
        let record = ProjectRecord::from_document("p1", "Demo", &sample(), 1);
        let value: serde_json::Value = serde_json::from_str(&export_json(&record).unwrap()).unwrap();
        assert!(value["exportedAt"].as_i64().unwrap() > 0);
        assert_eq!(value["name"], "Demo");
    }
}
