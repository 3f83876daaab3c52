//! Relaxation layouts. Only coordinates of interior vertices change.

use hpg_store::DocumentError;
use tracing::debug;

use crate::graph::HourglassGraph;

const TUTTE_MAX_ITERATIONS: usize = 2_000;
const TUTTE_TOLERANCE: f64 = 1e-9;
const LLOYD_ITERATIONS: usize = 50;

/// Tutte embedding: every interior vertex moves to the multiplicity-weighted
/// barycenter of its neighbours while boundary vertices stay fixed.
pub fn tutte(graph: &mut HourglassGraph) -> Result<(), DocumentError> {
    let neighbours = weighted_neighbours(graph);
    let mut coords = coordinates(graph);

    for iteration in 0..TUTTE_MAX_ITERATIONS {
        let mut max_shift: f64 = 0.0;
        for (i, around) in neighbours.iter().enumerate() {
            if graph.vertices[i].boundary || around.is_empty() {
                continue;
            }
            let (mut sx, mut sy, mut total) = (0.0, 0.0, 0.0);
            for &(j, weight) in around {
                sx += weight * coords[j].0;
                sy += weight * coords[j].1;
                total += weight;
            }
            let (x, y) = (sx / total, sy / total);
            max_shift = max_shift
                .max((x - coords[i].0).abs())
                .max((y - coords[i].1).abs());
            coords[i] = (x, y);
        }
        if max_shift < TUTTE_TOLERANCE {
            debug!(iteration, "tutte layout converged");
            break;
        }
    }
    commit(graph, &coords)
}

/// Lloyd-style relaxation: every interior vertex moves to the mean centroid
/// of the faces it lies on.
pub fn lloyd(graph: &mut HourglassGraph) -> Result<(), DocumentError> {
    let memberships = face_memberships(graph);
    let corners = graph
        .faces
        .iter()
        .map(|face| {
            face.vertex_ids
                .iter()
                .filter_map(|&id| graph.vertex_index(id))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    let mut coords = coordinates(graph);

    for _ in 0..LLOYD_ITERATIONS {
        let centroids = corners
            .iter()
            .map(|corners| {
                let n = corners.len().max(1) as f64;
                let (sx, sy) = corners
                    .iter()
                    .fold((0.0, 0.0), |(ax, ay), &i| (ax + coords[i].0, ay + coords[i].1));
                (sx / n, sy / n)
            })
            .collect::<Vec<_>>();

        for (i, faces) in memberships.iter().enumerate() {
            if graph.vertices[i].boundary || faces.is_empty() {
                continue;
            }
            let n = faces.len() as f64;
            let (sx, sy) = faces.iter().fold((0.0, 0.0), |(ax, ay), &f| {
                (ax + centroids[f].0, ay + centroids[f].1)
            });
            coords[i] = (sx / n, sy / n);
        }
    }
    debug!(iterations = LLOYD_ITERATIONS, "lloyd layout finished");
    commit(graph, &coords)
}

fn coordinates(graph: &HourglassGraph) -> Vec<(f64, f64)> {
    graph.vertices.iter().map(|v| (v.x, v.y)).collect()
}

/// Install `coords` only when every one is finite; otherwise the graph keeps
/// its previous layout.
fn commit(graph: &mut HourglassGraph, coords: &[(f64, f64)]) -> Result<(), DocumentError> {
    if let Some((i, _)) = coords
        .iter()
        .enumerate()
        .find(|(_, (x, y))| !x.is_finite() || !y.is_finite())
    {
        return Err(DocumentError::Rejected(format!(
            "layout produced non-finite coordinates at vertex {}",
            graph.vertices[i].id
        )));
    }
    for (vertex, &(x, y)) in graph.vertices.iter_mut().zip(coords) {
        vertex.x = x;
        vertex.y = y;
    }
    Ok(())
}

/// Per vertex index: `(neighbour index, multiplicity)`.
fn weighted_neighbours(graph: &HourglassGraph) -> Vec<Vec<(usize, f64)>> {
    let mut neighbours = vec![Vec::new(); graph.vertices.len()];
    for edge in &graph.edges {
        let (Some(a), Some(b)) = (
            graph.vertex_index(edge.source_id),
            graph.vertex_index(edge.target_id),
        ) else {
            continue;
        };
        let weight = f64::from(edge.multiplicity);
        neighbours[a].push((b, weight));
        neighbours[b].push((a, weight));
    }
    neighbours
}

/// Per vertex index: indices of the faces containing it.
fn face_memberships(graph: &HourglassGraph) -> Vec<Vec<usize>> {
    let mut memberships = vec![Vec::new(); graph.vertices.len()];
    for (f, face) in graph.faces.iter().enumerate() {
        for &id in &face.vertex_ids {
            if let Some(i) = graph.vertex_index(id) {
                if !memberships[i].contains(&f) {
                    memberships[i].push(f);
                }
            }
        }
    }
    memberships
}
