//! Deterministic, pure logic shared by the store and the gateway.
//!
//! Core modules must be free of I/O side effects. They describe what a graph
//! document has to offer and how requests against it are shaped.

pub mod document;
pub mod projection;
pub mod rank;
pub mod types;
