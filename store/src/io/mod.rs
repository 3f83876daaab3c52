//! Side-effecting persistence for the document store.

pub mod backend;
pub mod naming;
