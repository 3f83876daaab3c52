//! Structural invariants not expressible via JSON Schema.

use std::collections::HashSet;

use crate::graph::HourglassGraph;

/// Check structural invariants:
/// - No duplicate vertex, edge or face ids
/// - Finite coordinates
/// - Edge endpoints exist and differ; `multiplicity > 0`
/// - Face vertices exist
pub fn validate_invariants(graph: &HourglassGraph) -> Vec<String> {
    let mut errors = Vec::new();

    let mut vertex_ids = HashSet::new();
    for vertex in &graph.vertices {
        if !vertex_ids.insert(vertex.id) {
            errors.push(format!("duplicate vertex id {}", vertex.id));
        }
        if !vertex.x.is_finite() || !vertex.y.is_finite() {
            errors.push(format!("vertex {}: coordinates must be finite", vertex.id));
        }
    }

    let mut edge_ids = HashSet::new();
    for edge in &graph.edges {
        if !edge_ids.insert(edge.id) {
            errors.push(format!("duplicate edge id {}", edge.id));
        }
        for endpoint in [edge.source_id, edge.target_id] {
            if !vertex_ids.contains(&endpoint) {
                errors.push(format!("edge {}: unknown vertex {}", edge.id, endpoint));
            }
        }
        if edge.source_id == edge.target_id {
            errors.push(format!("edge {}: self loop at vertex {}", edge.id, edge.source_id));
        }
        if edge.multiplicity == 0 {
            errors.push(format!("edge {}: multiplicity must be > 0", edge.id));
        }
    }

    let mut face_ids = HashSet::new();
    for face in &graph.faces {
        if !face_ids.insert(face.id) {
            errors.push(format!("duplicate face id {}", face.id));
        }
        for vertex in &face.vertex_ids {
            if !vertex_ids.contains(vertex) {
                errors.push(format!("face {}: unknown vertex {}", face.id, vertex));
            }
        }
    }

    errors
}
