//! Test-only documents and backends.
//!
//! [`ScriptedDocument`] implements the capability trait with behavior the
//! test controls (which faces accept moves, whether layouts fail), so store
//! and gateway tests do not depend on a real graph engine.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::core::document::{DocumentError, EdgeId, FaceId, GraphDocument, VertexId};
use crate::error::{StoreError, StoreResult};
use crate::io::backend::Backend;

/// Deterministic stand-in for a graph document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptedDocument {
    pub boundary: usize,
    /// Faces `0..faces` exist.
    pub faces: u32,
    /// Faces whose validity predicates report true.
    #[serde(default)]
    pub valid_faces: Vec<FaceId>,
    #[serde(default)]
    pub layout_passes: u32,
    /// One coordinate per boundary vertex; every layout pass rewrites them all
    /// to the new pass number, one at a time.
    #[serde(default)]
    pub coords: Vec<u32>,
    /// Layouts write one coordinate and then fail.
    #[serde(default)]
    pub fail_layouts: bool,
    /// Applied moves, e.g. `square:1` or `cycle:2:inverse`.
    #[serde(default)]
    pub moves: Vec<String>,
    #[serde(default)]
    pub labeling: Option<(FaceId, usize)>,
    #[serde(default)]
    pub interior_degrees: Vec<usize>,
    /// The record still serializes but `from_record` rejects it.
    #[serde(default)]
    pub unloadable: bool,
}

impl ScriptedDocument {
    fn check_face(&self, face: FaceId) -> Result<(), DocumentError> {
        if face < self.faces {
            Ok(())
        } else {
            Err(DocumentError::UnknownFace(face))
        }
    }

    fn relayout(&mut self) -> Result<(), DocumentError> {
        self.layout_passes += 1;
        let pass = self.layout_passes;
        for (i, coord) in self.coords.iter_mut().enumerate() {
            *coord = pass;
            if self.fail_layouts && i == 0 {
                return Err(DocumentError::Rejected("layout diverged".to_string()));
            }
            std::thread::yield_now();
        }
        if self.fail_layouts {
            return Err(DocumentError::Rejected("layout diverged".to_string()));
        }
        Ok(())
    }
}

impl GraphDocument for ScriptedDocument {
    fn with_boundary(boundary_vertices: usize) -> Result<Self, DocumentError> {
        if boundary_vertices == 0 {
            return Err(DocumentError::Rejected(
                "at least one boundary vertex is required".to_string(),
            ));
        }
        Ok(Self {
            boundary: boundary_vertices,
            faces: boundary_vertices as u32,
            valid_faces: Vec::new(),
            layout_passes: 0,
            coords: vec![0; boundary_vertices],
            fail_layouts: false,
            moves: Vec::new(),
            labeling: None,
            interior_degrees: vec![boundary_vertices],
            unloadable: false,
        })
    }

    fn from_record(record: &Value) -> Result<Self, DocumentError> {
        let doc: Self = serde_json::from_value(record.clone())
            .map_err(|err| DocumentError::Malformed(err.to_string()))?;
        if doc.unloadable {
            return Err(DocumentError::Malformed("record marked unloadable".to_string()));
        }
        Ok(doc)
    }

    fn to_record(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    fn to_analysis(&self) -> Value {
        json!({
            "boundarySize": self.boundary,
            "layoutPasses": self.layout_passes,
            "moves": self.moves,
            "labeling": self.labeling,
        })
    }

    fn tutte_layout(&mut self) -> Result<(), DocumentError> {
        self.relayout()
    }

    fn lloyd_layout(&mut self) -> Result<(), DocumentError> {
        self.relayout()
    }

    fn is_cycle_valid(&self, face: FaceId, _inverse: bool) -> bool {
        self.valid_faces.contains(&face)
    }

    fn cycle(&mut self, face: FaceId, inverse: bool) -> Result<(), DocumentError> {
        self.check_face(face)?;
        let suffix = if inverse { ":inverse" } else { "" };
        self.moves.push(format!("cycle:{face}{suffix}"));
        Ok(())
    }

    fn is_square_move_valid(&self, face: FaceId) -> bool {
        self.valid_faces.contains(&face)
    }

    fn square_move(&mut self, face: FaceId) -> Result<(), DocumentError> {
        self.check_face(face)?;
        self.moves.push(format!("square:{face}"));
        Ok(())
    }

    fn separation_labeling(&mut self, face: FaceId, rank: usize) -> Result<(), DocumentError> {
        self.check_face(face)?;
        self.labeling = Some((face, rank));
        Ok(())
    }

    fn trip(&self, vertex: VertexId, index: usize) -> Result<Vec<EdgeId>, DocumentError> {
        if vertex as usize >= self.boundary {
            return Err(DocumentError::UnknownVertex(vertex));
        }
        if index == 0 {
            return Err(DocumentError::Rejected("trip index must be positive".to_string()));
        }
        Ok(vec![vertex, index as EdgeId])
    }

    fn edge_trips(&self, edge: EdgeId) -> Result<Vec<Vec<EdgeId>>, DocumentError> {
        if edge as usize >= self.boundary {
            return Err(DocumentError::UnknownEdge(edge));
        }
        Ok(vec![vec![edge], vec![edge, edge]])
    }

    fn interior_total_degrees(&self) -> impl Iterator<Item = usize> + '_ {
        self.interior_degrees.iter().copied()
    }
}

/// Backend keeping records in memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: Mutex<BTreeMap<String, Value>>,
}

impl MemoryBackend {
    pub fn record(&self, name: &str) -> Option<Value> {
        self.records.lock().get(name).cloned()
    }

    /// Drop a record behind the store's back.
    pub fn forget(&self, name: &str) {
        self.records.lock().remove(name);
    }
}

impl Backend for MemoryBackend {
    fn scan(&self) -> StoreResult<Vec<String>> {
        Ok(self.records.lock().keys().cloned().collect())
    }

    fn read(&self, name: &str) -> StoreResult<Value> {
        self.record(name).ok_or_else(|| {
            StoreError::persistence(name, std::io::Error::from(std::io::ErrorKind::NotFound))
        })
    }

    fn write(&self, name: &str, record: &Value) -> StoreResult<()> {
        self.records.lock().insert(name.to_string(), record.clone());
        Ok(())
    }

    fn delete(&self, name: &str) -> StoreResult<()> {
        self.records.lock().remove(name);
        Ok(())
    }
}

/// In-memory backend whose writes and deletes can be made to fail.
#[derive(Debug, Default)]
pub struct FaultyBackend {
    inner: MemoryBackend,
    fail_writes: AtomicBool,
    fail_deletes: AtomicBool,
    writes: AtomicUsize,
}

impl FaultyBackend {
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &MemoryBackend {
        &self.inner
    }
}

fn injected(name: &str) -> StoreError {
    StoreError::persistence(name, std::io::Error::other("injected failure"))
}

impl Backend for FaultyBackend {
    fn scan(&self) -> StoreResult<Vec<String>> {
        self.inner.scan()
    }

    fn read(&self, name: &str) -> StoreResult<Value> {
        self.inner.read(name)
    }

    fn write(&self, name: &str, record: &Value) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(injected(name));
        }
        self.inner.write(name, record)?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn delete(&self, name: &str) -> StoreResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(injected(name));
        }
        self.inner.delete(name)
    }
}

/// Fresh temp directory for filesystem-backed tests.
pub fn data_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("tempdir")
}
