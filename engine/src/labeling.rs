//! Separation labeling.
//!
//! Faces are labeled with their distance from a base face in the dual graph
//! (faces adjacent when they share an edge), capped at the rank. Each edge
//! is labeled with the labels of the faces on either side, joined by `|`.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use hpg_store::{DocumentError, FaceId};

use crate::graph::HourglassGraph;

pub fn separation_labeling(
    graph: &mut HourglassGraph,
    face: FaceId,
    rank: usize,
) -> Result<(), DocumentError> {
    let base = graph.face_index(face).ok_or(DocumentError::UnknownFace(face))?;

    // Edge index -> faces having it as a side.
    let mut faces_of_edge: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
    for (f, candidate) in graph.faces.iter().enumerate() {
        for (a, b) in candidate.sides() {
            if let Some(edge) = graph.edge_index_between(a, b) {
                faces_of_edge.entry(edge).or_default().insert(f);
            }
        }
    }

    let mut adjacent = vec![BTreeSet::new(); graph.faces.len()];
    for faces in faces_of_edge.values() {
        for &f in faces {
            adjacent[f].extend(faces.iter().copied().filter(|&g| g != f));
        }
    }

    let mut distance = vec![None; graph.faces.len()];
    distance[base] = Some(0usize);
    let mut queue = VecDeque::from([base]);
    while let Some(f) = queue.pop_front() {
        let next = distance[f].map_or(0, |d| d + 1);
        for &g in &adjacent[f] {
            if distance[g].is_none() {
                distance[g] = Some(next);
                queue.push_back(g);
            }
        }
    }

    let cap = u32::try_from(rank).unwrap_or(u32::MAX);
    for (candidate, d) in graph.faces.iter_mut().zip(&distance) {
        candidate.label = d.map(|d| u32::try_from(d).unwrap_or(u32::MAX).min(cap));
    }

    for (e, edge) in graph.edges.iter_mut().enumerate() {
        let labels = faces_of_edge
            .get(&e)
            .into_iter()
            .flatten()
            .filter_map(|&f| graph.faces[f].label)
            .collect::<BTreeSet<_>>();
        edge.label = if labels.is_empty() {
            None
        } else {
            Some(
                labels
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join("|"),
            )
        };
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_labels(graph: &HourglassGraph) -> Vec<Option<u32>> {
        graph.faces.iter().map(|f| f.label).collect()
    }

    #[test]
    fn labels_are_dual_distances() {
        let mut graph = HourglassGraph::new(6).expect("graph");
        separation_labeling(&mut graph, 0, 6).expect("label");
        // Faces of the star form a ring of six around the center.
        assert_eq!(
            face_labels(&graph),
            vec![Some(0), Some(1), Some(2), Some(3), Some(2), Some(1)]
        );
        // Spoke i separates faces i-1 and i.
        assert_eq!(graph.edges[0].label.as_deref(), Some("0|1"));
        assert_eq!(graph.edges[1].label.as_deref(), Some("0|1"));
        assert_eq!(graph.edges[3].label.as_deref(), Some("2|3"));
    }

    #[test]
    fn labels_are_capped_at_rank() {
        let mut graph = HourglassGraph::new(6).expect("graph");
        separation_labeling(&mut graph, 0, 1).expect("label");
        assert_eq!(
            face_labels(&graph),
            vec![Some(0), Some(1), Some(1), Some(1), Some(1), Some(1)]
        );
        assert_eq!(graph.edges[3].label.as_deref(), Some("1"));
    }

    #[test]
    fn unreachable_faces_stay_unlabeled() {
        let mut graph = HourglassGraph::new(3).expect("graph");
        graph.faces.push(crate::graph::Face {
            id: 10,
            vertex_ids: vec![0, 1, 2],
            label: Some(5),
        });
        separation_labeling(&mut graph, 0, 3).expect("label");
        assert_eq!(graph.faces[3].label, None);
    }

    #[test]
    fn unknown_face_is_an_error() {
        let mut graph = HourglassGraph::new(3).expect("graph");
        assert_eq!(
            separation_labeling(&mut graph, 3, 3),
            Err(DocumentError::UnknownFace(3))
        );
        assert_eq!(graph, HourglassGraph::new(3).expect("graph"));
    }
}
