//! Identity reader, command executor, and the reconciler driving them.

pub mod compliance;
pub mod error;
pub mod executor;
#[cfg(test)]
pub(crate) mod fake;
pub mod reader;
pub mod reconcile;
