//! Capability trait implementation.

use hpg_store::{DocumentError, EdgeId, FaceId, GraphDocument, VertexId};
use serde_json::Value;

use crate::graph::HourglassGraph;
use crate::{analysis, labeling, layout, moves, record, trips};

impl GraphDocument for HourglassGraph {
    fn with_boundary(boundary_vertices: usize) -> Result<Self, DocumentError> {
        HourglassGraph::new(boundary_vertices)
    }

    fn from_record(value: &Value) -> Result<Self, DocumentError> {
        record::from_value(value)
    }

    fn to_record(&self) -> Value {
        record::to_value(self)
    }

    fn to_analysis(&self) -> Value {
        analysis::analysis(self)
    }

    fn tutte_layout(&mut self) -> Result<(), DocumentError> {
        layout::tutte(self)
    }

    fn lloyd_layout(&mut self) -> Result<(), DocumentError> {
        layout::lloyd(self)
    }

    fn is_cycle_valid(&self, face: FaceId, inverse: bool) -> bool {
        moves::is_cycle_valid(self, face, inverse)
    }

    fn cycle(&mut self, face: FaceId, inverse: bool) -> Result<(), DocumentError> {
        moves::cycle(self, face, inverse)
    }

    fn is_square_move_valid(&self, face: FaceId) -> bool {
        moves::is_square_move_valid(self, face)
    }

    fn square_move(&mut self, face: FaceId) -> Result<(), DocumentError> {
        moves::square_move(self, face)
    }

    fn separation_labeling(&mut self, face: FaceId, rank: usize) -> Result<(), DocumentError> {
        labeling::separation_labeling(self, face, rank)
    }

    fn trip(&self, vertex: VertexId, index: usize) -> Result<Vec<EdgeId>, DocumentError> {
        trips::trip(self, vertex, index)
    }

    fn edge_trips(&self, edge: EdgeId) -> Result<Vec<Vec<EdgeId>>, DocumentError> {
        trips::edge_trips(self, edge)
    }

    fn interior_total_degrees(&self) -> impl Iterator<Item = usize> + '_ {
        self.interior_vertices().map(|v| self.total_degree(v.id))
    }
}
