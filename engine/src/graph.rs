//! Graph data: vertices, hourglass edges and faces.

use std::f64::consts::{FRAC_PI_2, TAU};

use hpg_store::{DocumentError, EdgeId, FaceId, VertexId};
use serde::{Deserialize, Serialize};

/// Radius of the circle boundary vertices are placed on.
pub const BOUNDARY_RADIUS: f64 = 10.0;

/// Largest boundary accepted by [`HourglassGraph::new`].
pub const MAX_BOUNDARY: usize = 4096;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vertex {
    pub id: VertexId,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub filled: bool,
    #[serde(default)]
    pub boundary: bool,
}

/// An hourglass edge; `multiplicity` counts its parallel strands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source_id: VertexId,
    pub target_id: VertexId,
    pub multiplicity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    pub fn joins(&self, a: VertexId, b: VertexId) -> bool {
        (self.source_id == a && self.target_id == b) || (self.source_id == b && self.target_id == a)
    }

    pub fn touches(&self, v: VertexId) -> bool {
        self.source_id == v || self.target_id == v
    }

    /// Endpoint opposite `v`.
    pub fn other(&self, v: VertexId) -> VertexId {
        if self.source_id == v {
            self.target_id
        } else {
            self.source_id
        }
    }
}

/// A face, as the cyclic sequence of vertices around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Face {
    pub id: FaceId,
    pub vertex_ids: Vec<VertexId>,
    /// Separation label, once a labeling has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<u32>,
}

impl Face {
    /// Consecutive vertex pairs around the face, wrapping at the end.
    pub fn sides(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        let len = self.vertex_ids.len();
        (0..len).map(move |k| (self.vertex_ids[k], self.vertex_ids[(k + 1) % len]))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HourglassGraph {
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    pub faces: Vec<Face>,
}

impl HourglassGraph {
    /// Star graph: `boundary` boundary vertices on a circle (clockwise from
    /// the top), one filled interior vertex at the origin joined to each of
    /// them, and one face per pair of neighbouring boundary vertices.
    pub fn new(boundary: usize) -> Result<Self, DocumentError> {
        if boundary == 0 {
            return Err(DocumentError::Rejected(
                "at least one boundary vertex is required".to_string(),
            ));
        }
        if boundary > MAX_BOUNDARY {
            return Err(DocumentError::Rejected(format!(
                "boundary of {boundary} vertices exceeds the limit of {MAX_BOUNDARY}"
            )));
        }
        // Bounded by MAX_BOUNDARY above.
        let n = boundary as u32;
        let center = n;

        let mut vertices = (0..n)
            .map(|i| {
                let angle = FRAC_PI_2 - TAU * f64::from(i) / f64::from(n);
                Vertex {
                    id: i,
                    x: BOUNDARY_RADIUS * angle.cos(),
                    y: BOUNDARY_RADIUS * angle.sin(),
                    filled: false,
                    boundary: true,
                }
            })
            .collect::<Vec<_>>();
        vertices.push(Vertex {
            id: center,
            x: 0.0,
            y: 0.0,
            filled: true,
            boundary: false,
        });

        let edges = (0..n)
            .map(|i| Edge {
                id: i,
                source_id: center,
                target_id: i,
                multiplicity: 1,
                label: None,
            })
            .collect();

        let faces = if n == 1 {
            vec![Face {
                id: 0,
                vertex_ids: vec![center, 0],
                label: None,
            }]
        } else {
            (0..n)
                .map(|i| Face {
                    id: i,
                    vertex_ids: vec![center, i, (i + 1) % n],
                    label: None,
                })
                .collect()
        };

        Ok(Self {
            vertices,
            edges,
            faces,
        })
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.iter().find(|v| v.id == id)
    }

    pub fn vertex_index(&self, id: VertexId) -> Option<usize> {
        self.vertices.iter().position(|v| v.id == id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Index of the first edge joining `a` and `b`.
    pub fn edge_index_between(&self, a: VertexId, b: VertexId) -> Option<usize> {
        self.edges.iter().position(|e| e.joins(a, b))
    }

    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.iter().find(|f| f.id == id)
    }

    pub fn face_index(&self, id: FaceId) -> Option<usize> {
        self.faces.iter().position(|f| f.id == id)
    }

    /// Edge index of every side of `face`, or `None` if some side is not an
    /// edge.
    pub fn side_edges(&self, face: &Face) -> Option<Vec<usize>> {
        face.sides()
            .map(|(a, b)| self.edge_index_between(a, b))
            .collect()
    }

    /// Sum of the multiplicities of the edges at `v`.
    pub fn total_degree(&self, v: VertexId) -> usize {
        self.edges
            .iter()
            .filter(|e| e.touches(v))
            .map(|e| e.multiplicity as usize)
            .sum()
    }

    pub fn boundary_size(&self) -> usize {
        self.vertices.iter().filter(|v| v.boundary).count()
    }

    pub fn interior_vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter().filter(|v| !v.boundary)
    }

    /// Max total degree over interior vertices.
    pub fn rank(&self) -> Option<usize> {
        self.interior_vertices().map(|v| self.total_degree(v.id)).max()
    }
}
