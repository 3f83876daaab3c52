//! Fixed catalogue of document operations: layout, moves, labeling, trips.
//!
//! Each operation resolves the document by name and invokes exactly one
//! capability. Missing parameters are rejected before any lock is taken.
//! Mutations run under the document's exclusive lock via [`Store::update`]
//! and are saved before the call returns; trip queries take the shared lock
//! and never save.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::core::document::{DocumentError, EdgeId, FaceId, GraphDocument, VertexId};
use crate::core::projection::{ProjectionKind, project};
use crate::core::rank::labeling_rank;
use crate::core::types::{LayoutAlgorithm, MoveKind, MoveOutcome, MoveRequest};
use crate::error::{StoreError, StoreResult};
use crate::io::backend::{Backend, FsBackend};
use crate::store::{Edit, Store};

/// Mutation gateway over a shared [`Store`].
pub struct Gateway<D, B = FsBackend> {
    store: Arc<Store<D, B>>,
}

impl<D, B> Clone for Gateway<D, B> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<D: GraphDocument, B: Backend> Gateway<D, B> {
    pub fn new(store: Arc<Store<D, B>>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store<D, B> {
        &self.store
    }

    /// Run a layout and return the analysis projection.
    pub fn apply_layout(&self, name: &str, algorithm: LayoutAlgorithm) -> StoreResult<Value> {
        self.apply_layout_as(name, algorithm, ProjectionKind::Analysis)
    }

    /// Run a layout and return the requested projection.
    pub fn apply_layout_as(
        &self,
        name: &str,
        algorithm: LayoutAlgorithm,
        view: ProjectionKind,
    ) -> StoreResult<Value> {
        info!(name, %algorithm, "applying layout");
        self.store.update(name, |doc| {
            let result = match algorithm {
                LayoutAlgorithm::Tutte => doc.tutte_layout(),
                LayoutAlgorithm::Lloyd => doc.lloyd_layout(),
            };
            result.map_err(|err| StoreError::operation(name, err))?;
            Ok(Edit::Changed(project(doc, view)))
        })
    }

    /// Validate, then apply, a structural move.
    ///
    /// A move the document's validity predicate rejects is not an error: the
    /// document is left as is, nothing is saved, and `applied` is false.
    pub fn propose_move(&self, name: &str, request: MoveRequest) -> StoreResult<MoveOutcome> {
        let face = request
            .face
            .ok_or_else(|| StoreError::invalid("missing 'face_id'"))?;
        let MoveRequest { kind, inverse, .. } = request;

        let outcome = self.store.update(name, |doc| {
            let valid = match kind {
                MoveKind::Cycle => doc.is_cycle_valid(face, inverse),
                MoveKind::Square => doc.is_square_move_valid(face),
            };
            if !valid {
                return Ok(Edit::Unchanged(MoveOutcome {
                    applied: false,
                    analysis: doc.to_analysis(),
                }));
            }
            let result = match kind {
                MoveKind::Cycle => doc.cycle(face, inverse),
                MoveKind::Square => doc.square_move(face),
            };
            result.map_err(|err| StoreError::operation(name, err))?;
            Ok(Edit::Changed(MoveOutcome {
                applied: true,
                analysis: doc.to_analysis(),
            }))
        })?;

        if outcome.applied {
            info!(name, %kind, face, inverse, "applied move");
        } else {
            debug!(name, %kind, face, inverse, "move rejected by validity check");
        }
        Ok(outcome)
    }

    /// Separation labeling at `face`, with rank = max interior total degree.
    pub fn apply_labeling(&self, name: &str, face: Option<FaceId>) -> StoreResult<Value> {
        let face = face.ok_or_else(|| StoreError::invalid("missing 'face_id'"))?;
        self.store.update(name, |doc| {
            let rank = labeling_rank(doc).ok_or_else(|| {
                StoreError::operation(
                    name,
                    DocumentError::Rejected(
                        "labeling needs at least one interior vertex".to_string(),
                    ),
                )
            })?;
            info!(name, face, rank, "applying separation labeling");
            doc.separation_labeling(face, rank)
                .map_err(|err| StoreError::operation(name, err))?;
            Ok(Edit::Changed(doc.to_analysis()))
        })
    }

    /// Edge ids of trip `index` from `vertex`. Read-only.
    pub fn query_trip(
        &self,
        name: &str,
        vertex: Option<VertexId>,
        index: Option<usize>,
    ) -> StoreResult<Vec<EdgeId>> {
        let vertex = vertex.ok_or_else(|| StoreError::invalid("missing 'vertexId'"))?;
        let index = index.ok_or_else(|| StoreError::invalid("missing 'tripIndex'"))?;
        self.store
            .read(name, |doc| doc.trip(vertex, index))?
            .map_err(|err| StoreError::operation(name, err))
    }

    /// Every trip leaving along `edge`. Read-only.
    pub fn query_edge_trips(&self, name: &str, edge: Option<EdgeId>) -> StoreResult<Vec<Vec<EdgeId>>> {
        let edge = edge.ok_or_else(|| StoreError::invalid("missing 'edgeId'"))?;
        self.store
            .read(name, |doc| doc.edge_trips(edge))?
            .map_err(|err| StoreError::operation(name, err))
    }

    /// Overwrite-or-create `name` from a full record sent by a client.
    /// Returns whether `name` already existed.
    pub fn save_full(&self, name: &str, record: &Value) -> StoreResult<bool> {
        if record.is_null() || record.as_object().is_some_and(|o| o.is_empty()) {
            return Err(StoreError::invalid("no data provided"));
        }
        let doc = D::from_record(record)
            .map_err(|err| StoreError::invalid(format!("cannot read dataset '{name}': {err}")))?;
        self.store.replace(name, doc)
    }
}
