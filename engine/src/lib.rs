//! Hourglass plabic graph documents.
//!
//! [`HourglassGraph`] is the concrete document behind the `hpg-store`
//! capability trait: boundary and interior vertices with coordinates, edges
//! carrying hourglass multiplicities, and faces given as vertex cycles.
//!
//! The algorithms here are deliberately small: bounded relaxation layouts,
//! validity-checked square and cycle moves, a dual-distance separation
//! labeling, and angular-order trips.

mod analysis;
mod document;
pub mod graph;
pub mod invariants;
pub mod labeling;
pub mod layout;
pub mod moves;
pub mod record;
pub mod trips;

pub use crate::graph::{Edge, Face, HourglassGraph, Vertex};
