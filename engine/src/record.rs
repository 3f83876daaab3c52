//! Record (de)serialization with schema + invariant validation.
//!
//! The record is the document's full projection and its persisted form:
//!
//! ```json
//! {"version": 1,
//!  "vertices": [{"id": 0, "x": 0.0, "y": 10.0, "filled": false, "boundary": true}],
//!  "edges": [{"id": 0, "sourceId": 1, "targetId": 0, "multiplicity": 1}],
//!  "faces": [{"id": 0, "vertexIds": [1, 0]}]}
//! ```
//!
//! Clients saving an edited graph may omit `version`, `faces` and edge ids;
//! missing edge ids are assigned after the largest id present.

use std::sync::OnceLock;

use hpg_store::{DocumentError, EdgeId, VertexId};
use jsonschema::{Validator, validator_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::graph::{Edge, Face, HourglassGraph, Vertex};
use crate::invariants::validate_invariants;

const V1_SCHEMA: &str = include_str!("../schemas/hpg/v1.schema.json");

/// Current record version.
pub const VERSION: u32 = 1;

#[derive(Deserialize)]
struct GraphRecord {
    #[serde(default)]
    version: Option<u32>,
    vertices: Vec<Vertex>,
    edges: Vec<EdgeRecord>,
    #[serde(default)]
    faces: Vec<Face>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EdgeRecord {
    #[serde(default)]
    id: Option<EdgeId>,
    source_id: VertexId,
    target_id: VertexId,
    #[serde(default = "default_multiplicity")]
    multiplicity: u32,
    #[serde(default)]
    label: Option<String>,
}

fn default_multiplicity() -> u32 {
    1
}

#[derive(Serialize)]
struct RecordView<'a> {
    version: u32,
    vertices: &'a [Vertex],
    edges: &'a [Edge],
    faces: &'a [Face],
}

fn schema() -> Result<&'static Validator, DocumentError> {
    static VALIDATOR: OnceLock<Result<Validator, String>> = OnceLock::new();
    VALIDATOR
        .get_or_init(|| {
            let schema: Value =
                serde_json::from_str(V1_SCHEMA).map_err(|err| format!("parse schema: {err}"))?;
            validator_for(&schema).map_err(|err| format!("invalid schema: {err}"))
        })
        .as_ref()
        .map_err(|err| DocumentError::Malformed(err.clone()))
}

fn validate_schema(value: &Value) -> Result<(), DocumentError> {
    let validator = schema()?;
    if validator.is_valid(value) {
        return Ok(());
    }
    let messages = validator
        .iter_errors(value)
        .map(|err| err.to_string())
        .collect::<Vec<_>>();
    Err(DocumentError::Malformed(format!(
        "schema validation failed: {}",
        messages.join("; ")
    )))
}

/// Parse and validate a record (schema, then invariants).
pub fn from_value(value: &Value) -> Result<HourglassGraph, DocumentError> {
    validate_schema(value)?;
    let record: GraphRecord = serde_json::from_value(value.clone())
        .map_err(|err| DocumentError::Malformed(err.to_string()))?;
    if let Some(version) = record.version {
        if version != VERSION {
            return Err(DocumentError::Malformed(format!(
                "unsupported record version {version}"
            )));
        }
    }

    let mut next_id = record
        .edges
        .iter()
        .filter_map(|e| e.id)
        .max()
        .map_or(0, |max| max.saturating_add(1));
    let edges = record
        .edges
        .into_iter()
        .map(|e| {
            let id = e.id.unwrap_or_else(|| {
                let id = next_id;
                next_id = next_id.saturating_add(1);
                id
            });
            Edge {
                id,
                source_id: e.source_id,
                target_id: e.target_id,
                multiplicity: e.multiplicity,
                label: e.label,
            }
        })
        .collect();

    let graph = HourglassGraph {
        vertices: record.vertices,
        edges,
        faces: record.faces,
    };
    let errors = validate_invariants(&graph);
    if !errors.is_empty() {
        return Err(DocumentError::Malformed(format!(
            "graph invariants failed: {}",
            errors.join("; ")
        )));
    }
    debug!(
        vertices = graph.vertices.len(),
        edges = graph.edges.len(),
        faces = graph.faces.len(),
        "parsed graph record"
    );
    Ok(graph)
}

/// Full record for `graph`.
pub fn to_value(graph: &HourglassGraph) -> Value {
    let view = RecordView {
        version: VERSION,
        vertices: &graph.vertices,
        edges: &graph.edges,
        faces: &graph.faces,
    };
    // Plain structs of numbers, bools and strings always serialize.
    serde_json::to_value(view).unwrap_or(Value::Null)
}
