//! Capability contract the store requires from a graph document.
//!
//! The store never looks inside a document. Everything it needs (building,
//! (de)serializing, projecting, laying out, moving, labeling, tracing trips)
//! goes through [`GraphDocument`]. The concrete engine is chosen by the
//! binary as the store's type parameter.

use serde_json::Value;
use thiserror::Error;

pub type VertexId = u32;
pub type EdgeId = u32;
pub type FaceId = u32;

/// Failures reported by a document capability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("malformed record: {0}")]
    Malformed(String),

    #[error("unknown face {0}")]
    UnknownFace(FaceId),

    #[error("unknown vertex {0}")]
    UnknownVertex(VertexId),

    #[error("unknown edge {0}")]
    UnknownEdge(EdgeId),

    #[error("{0}")]
    Rejected(String),
}

/// A named unit of combinatorial graph state plus geometric layout.
///
/// Implementations must round-trip: `from_record(&d.to_record())` is
/// observably identical to `d` under both projections.
pub trait GraphDocument: Clone + Send + Sync + 'static {
    /// Minimal valid document with `boundary_vertices` boundary vertices.
    fn with_boundary(boundary_vertices: usize) -> Result<Self, DocumentError>;

    /// Rebuild a document from its self-describing record.
    fn from_record(record: &Value) -> Result<Self, DocumentError>;

    /// Full projection: everything needed to reconstruct or display the
    /// document. Also the persisted form.
    fn to_record(&self) -> Value;

    /// Reduced/derived view for the analysis consumer.
    fn to_analysis(&self) -> Value;

    /// Updates coordinates only; combinatorial structure is untouched.
    fn tutte_layout(&mut self) -> Result<(), DocumentError>;

    /// Updates coordinates only; combinatorial structure is untouched.
    fn lloyd_layout(&mut self) -> Result<(), DocumentError>;

    fn is_cycle_valid(&self, face: FaceId, inverse: bool) -> bool;

    fn cycle(&mut self, face: FaceId, inverse: bool) -> Result<(), DocumentError>;

    fn is_square_move_valid(&self, face: FaceId) -> bool;

    fn square_move(&mut self, face: FaceId) -> Result<(), DocumentError>;

    fn separation_labeling(&mut self, face: FaceId, rank: usize) -> Result<(), DocumentError>;

    /// Ordered edge ids visited by trip `index` starting at `vertex`.
    fn trip(&self, vertex: VertexId, index: usize) -> Result<Vec<EdgeId>, DocumentError>;

    /// Every trip leaving along `edge`, one per admissible trip index.
    fn edge_trips(&self, edge: EdgeId) -> Result<Vec<Vec<EdgeId>>, DocumentError>;

    /// Total degree (multiplicity-weighted) of each interior vertex.
    fn interior_total_degrees(&self) -> impl Iterator<Item = usize> + '_;
}
