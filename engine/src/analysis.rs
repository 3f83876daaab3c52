//! Analyzer view: geometry plus derived combinatorial data.

use std::collections::HashMap;

use hpg_store::VertexId;
use serde_json::{Value, json};

use crate::graph::HourglassGraph;
use crate::moves::{is_cycle_valid, is_square_move_valid};

pub(crate) fn analysis(graph: &HourglassGraph) -> Value {
    let vertices = graph
        .vertices
        .iter()
        .map(|v| {
            json!({
                "id": v.id,
                "x": v.x,
                "y": v.y,
                "filled": v.filled,
                "boundary": v.boundary,
                "totalDegree": graph.total_degree(v.id),
            })
        })
        .collect::<Vec<_>>();

    // Position of each edge among those joining the same two vertices.
    let mut seen: HashMap<(VertexId, VertexId), usize> = HashMap::new();
    let edges = graph
        .edges
        .iter()
        .map(|e| {
            let pair = (e.source_id.min(e.target_id), e.source_id.max(e.target_id));
            let slot = seen.entry(pair).or_default();
            let index = *slot;
            *slot += 1;
            json!({
                "id": e.id,
                "sourceId": e.source_id,
                "targetId": e.target_id,
                "multiplicity": e.multiplicity,
                "index": index,
                "label": e.label.as_deref().unwrap_or(""),
            })
        })
        .collect::<Vec<_>>();

    let faces = graph
        .faces
        .iter()
        .map(|f| {
            json!({
                "id": f.id,
                "vertexIds": f.vertex_ids,
                "degree": f.vertex_ids.len(),
                "label": f.label,
            })
        })
        .collect::<Vec<_>>();

    let square_move_faces = graph
        .faces
        .iter()
        .map(|f| f.id)
        .filter(|&id| is_square_move_valid(graph, id))
        .collect::<Vec<_>>();
    let cycle_faces = graph
        .faces
        .iter()
        .map(|f| f.id)
        .filter(|&id| is_cycle_valid(graph, id, false) || is_cycle_valid(graph, id, true))
        .collect::<Vec<_>>();

    json!({
        "boundarySize": graph.boundary_size(),
        "rank": graph.rank(),
        "vertices": vertices,
        "edges": edges,
        "faces": faces,
        "squareMoveFaces": square_move_faces,
        "cycleFaces": cycle_faces,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_analysis() {
        let graph = HourglassGraph::new(3).expect("graph");
        let view = analysis(&graph);

        assert_eq!(view["boundarySize"], json!(3));
        assert_eq!(view["rank"], json!(3));
        assert_eq!(view["vertices"][3]["totalDegree"], json!(3));
        assert_eq!(view["vertices"][0]["totalDegree"], json!(1));
        assert_eq!(view["edges"][0]["label"], json!(""));
        assert_eq!(view["faces"][0]["degree"], json!(3));
        assert_eq!(view["faces"][0]["label"], Value::Null);
        assert_eq!(view["squareMoveFaces"], json!([]));
        assert_eq!(view["cycleFaces"], json!([]));
    }

    #[test]
    fn parallel_edges_are_numbered_per_vertex_pair() {
        let graph = crate::record::from_value(&json!({
            "vertices": [{"id": 0, "x": 0, "y": 0}, {"id": 1, "x": 1, "y": 0}, {"id": 2, "x": 0, "y": 1}],
            "edges": [
                {"sourceId": 0, "targetId": 1},
                {"sourceId": 0, "targetId": 2},
                {"sourceId": 1, "targetId": 0, "multiplicity": 2}
            ]
        }))
        .expect("graph");
        let view = analysis(&graph);
        let indices = view["edges"]
            .as_array()
            .expect("edges")
            .iter()
            .map(|e| e["index"].clone())
            .collect::<Vec<_>>();
        assert_eq!(indices, vec![json!(0), json!(0), json!(1)]);
    }

    #[test]
    fn empty_graph_has_no_rank() {
        let view = analysis(&HourglassGraph::default());
        assert_eq!(view["rank"], Value::Null);
        assert_eq!(view["boundarySize"], json!(0));
    }
}
