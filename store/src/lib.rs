//! Named store of hourglass plabic graph documents.
//!
//! The crate keeps the authoritative name → document table, mirrors it to one
//! file per document, and runs the fixed catalogue of graph mutations against
//! it. The split follows the rest of the workspace:
//!
//! - **[`core`]**: Pure logic (capability trait, request types, projections,
//!   rank). No I/O.
//! - **[`io`]**: The persistence backend (file per document, atomic writes).
//!
//! [`store`] and [`gateway`] combine the two: the store owns locking and
//! persistence ordering, the gateway validates requests and dispatches to the
//! document's capabilities.

pub mod core;
pub mod error;
pub mod gateway;
pub mod io;
pub mod logging;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::core::document::{DocumentError, EdgeId, FaceId, GraphDocument, VertexId};
pub use crate::core::projection::ProjectionKind;
pub use crate::core::types::{LayoutAlgorithm, MoveKind, MoveOutcome, MoveRequest};
pub use crate::error::{StoreError, StoreResult};
pub use crate::gateway::Gateway;
pub use crate::io::backend::{Backend, FsBackend};
pub use crate::store::{DocumentGuard, Edit, LoadReport, Store};
