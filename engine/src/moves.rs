//! Validity-checked local moves at a face.
//!
//! Each move is planned first; the plan fails with the reason the move is
//! not allowed. Validity predicates are "does planning succeed", and applying
//! a move re-plans so an invalid move is rejected rather than half-applied.

use std::collections::HashSet;

use hpg_store::{DocumentError, FaceId};

use crate::graph::HourglassGraph;

/// Vertex indices of the square face, in face order.
fn square_plan(graph: &HourglassGraph, face: FaceId) -> Result<Vec<usize>, DocumentError> {
    let face = graph.face(face).ok_or(DocumentError::UnknownFace(face))?;
    if face.vertex_ids.len() != 4 {
        return Err(DocumentError::Rejected(format!(
            "square move needs a face with 4 vertices, face {} has {}",
            face.id,
            face.vertex_ids.len()
        )));
    }
    let indices = face
        .vertex_ids
        .iter()
        .map(|&id| graph.vertex_index(id).ok_or(DocumentError::UnknownVertex(id)))
        .collect::<Result<Vec<_>, _>>()?;
    if indices.iter().any(|&i| graph.vertices[i].boundary) {
        return Err(DocumentError::Rejected(format!(
            "square move at face {} touches the boundary",
            face.id
        )));
    }
    let alternating = (0..4).all(|k| {
        graph.vertices[indices[k]].filled != graph.vertices[indices[(k + 1) % 4]].filled
    });
    if !alternating {
        return Err(DocumentError::Rejected(format!(
            "square move at face {} needs alternating vertex colours",
            face.id
        )));
    }
    if graph.side_edges(face).is_none() {
        return Err(DocumentError::Rejected(format!(
            "face {} is not bounded by edges",
            face.id
        )));
    }
    Ok(indices)
}

pub fn is_square_move_valid(graph: &HourglassGraph, face: FaceId) -> bool {
    square_plan(graph, face).is_ok()
}

/// Swap the colour of each vertex of a square face.
pub fn square_move(graph: &mut HourglassGraph, face: FaceId) -> Result<(), DocumentError> {
    for i in square_plan(graph, face)? {
        graph.vertices[i].filled = !graph.vertices[i].filled;
    }
    Ok(())
}

/// `(edge index, raise)` per side: raised sides gain one strand, the others
/// lose one.
fn cycle_plan(
    graph: &HourglassGraph,
    face: FaceId,
    inverse: bool,
) -> Result<Vec<(usize, bool)>, DocumentError> {
    let face = graph.face(face).ok_or(DocumentError::UnknownFace(face))?;
    let len = face.vertex_ids.len();
    if len < 4 || len % 2 != 0 {
        return Err(DocumentError::Rejected(format!(
            "cycle needs a face with an even number of sides (at least 4), face {} has {len}",
            face.id
        )));
    }
    let sides = graph.side_edges(face).ok_or_else(|| {
        DocumentError::Rejected(format!("face {} is not bounded by edges", face.id))
    })?;
    let distinct = sides.iter().collect::<HashSet<_>>();
    if distinct.len() != sides.len() {
        return Err(DocumentError::Rejected(format!(
            "face {} uses an edge twice",
            face.id
        )));
    }

    let plan = sides
        .into_iter()
        .enumerate()
        .map(|(k, edge)| (edge, (k % 2 == 0) != inverse))
        .collect::<Vec<_>>();
    for &(edge, raise) in &plan {
        let edge = &graph.edges[edge];
        if !raise && edge.multiplicity < 2 {
            return Err(DocumentError::Rejected(format!(
                "edge {} has a single strand and cannot lose one",
                edge.id
            )));
        }
        if raise && edge.multiplicity == u32::MAX {
            return Err(DocumentError::Rejected(format!(
                "edge {} is at the strand limit and cannot gain one",
                edge.id
            )));
        }
    }
    Ok(plan)
}

pub fn is_cycle_valid(graph: &HourglassGraph, face: FaceId, inverse: bool) -> bool {
    cycle_plan(graph, face, inverse).is_ok()
}

/// Shift one strand around the face: even sides gain, odd sides lose
/// (swapped for `inverse`). Every vertex keeps its total degree.
pub fn cycle(graph: &mut HourglassGraph, face: FaceId, inverse: bool) -> Result<(), DocumentError> {
    for (edge, raise) in cycle_plan(graph, face, inverse)? {
        let edge = &mut graph.edges[edge];
        let shifted = if raise {
            edge.multiplicity.checked_add(1)
        } else {
            edge.multiplicity.checked_sub(1)
        };
        // The plan bounds every side, so this never trips.
        edge.multiplicity = shifted.ok_or_else(|| {
            DocumentError::Rejected(format!("edge {} multiplicity out of range", edge.id))
        })?;
    }
    Ok(())
}
