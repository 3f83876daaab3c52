//! Trips: walks that turn by a fixed number of steps at every vertex.
//!
//! Edges around a vertex are ordered counter-clockwise by angle. Trip `i`
//! arriving at a filled vertex leaves `i` steps clockwise from the edge it
//! came in on; at an unfilled vertex it turns `i` steps counter-clockwise.
//! A trip ends at the first boundary vertex it reaches, or after `4·|E|`
//! steps.

use hpg_store::{DocumentError, EdgeId, VertexId};

use crate::graph::HourglassGraph;

/// `(edge id, neighbour index)` per vertex index, counter-clockwise.
type Rotation = Vec<Vec<(EdgeId, usize)>>;

fn rotation_system(graph: &HourglassGraph) -> Rotation {
    let mut around: Vec<Vec<(EdgeId, usize, f64)>> = vec![Vec::new(); graph.vertices.len()];
    for edge in &graph.edges {
        let (Some(a), Some(b)) = (
            graph.vertex_index(edge.source_id),
            graph.vertex_index(edge.target_id),
        ) else {
            continue;
        };
        let (va, vb) = (&graph.vertices[a], &graph.vertices[b]);
        around[a].push((edge.id, b, (vb.y - va.y).atan2(vb.x - va.x)));
        around[b].push((edge.id, a, (va.y - vb.y).atan2(va.x - vb.x)));
    }
    around
        .into_iter()
        .map(|mut darts| {
            darts.sort_by(|l, r| l.2.total_cmp(&r.2).then(l.0.cmp(&r.0)));
            darts.into_iter().map(|(edge, to, _)| (edge, to)).collect()
        })
        .collect()
}

/// Walk trip `index` leaving `start` along its `first`-th dart.
fn trace(
    graph: &HourglassGraph,
    rotation: &Rotation,
    start: usize,
    first: usize,
    index: usize,
) -> Vec<EdgeId> {
    let limit = 4 * graph.edges.len().max(1);
    let (mut edge, mut current) = rotation[start][first];
    let mut path = vec![edge];

    while path.len() < limit && !graph.vertices[current].boundary {
        let darts = &rotation[current];
        let Some(pos) = darts.iter().position(|&(e, _)| e == edge) else {
            break;
        };
        let degree = darts.len();
        let step = index % degree;
        let next = if graph.vertices[current].filled {
            (pos + degree - step) % degree
        } else {
            (pos + step) % degree
        };
        (edge, current) = darts[next];
        path.push(edge);
    }
    path
}

fn check_index(index: usize) -> Result<(), DocumentError> {
    if index == 0 {
        return Err(DocumentError::Rejected(
            "trip index must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Trip `index` from `vertex`, leaving along its first edge in angular order.
pub fn trip(
    graph: &HourglassGraph,
    vertex: VertexId,
    index: usize,
) -> Result<Vec<EdgeId>, DocumentError> {
    check_index(index)?;
    let start = graph
        .vertex_index(vertex)
        .ok_or(DocumentError::UnknownVertex(vertex))?;
    let rotation = rotation_system(graph);
    if rotation[start].is_empty() {
        return Ok(Vec::new());
    }
    Ok(trace(graph, &rotation, start, 0, index))
}

/// All trips leaving along `edge` from its source, for indices
/// `1..=max(1, d - 1)` where `d` is the number of edges at the source.
pub fn edge_trips(graph: &HourglassGraph, edge: EdgeId) -> Result<Vec<Vec<EdgeId>>, DocumentError> {
    let source = graph
        .edge(edge)
        .ok_or(DocumentError::UnknownEdge(edge))?
        .source_id;
    let start = graph
        .vertex_index(source)
        .ok_or(DocumentError::UnknownVertex(source))?;
    let rotation = rotation_system(graph);
    let first = rotation[start]
        .iter()
        .position(|&(e, _)| e == edge)
        .ok_or(DocumentError::UnknownEdge(edge))?;
    let count = rotation[start].len().saturating_sub(1).max(1);
    Ok((1..=count)
        .map(|index| trace(graph, &rotation, start, first, index))
        .collect())
}
