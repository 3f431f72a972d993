//! Data structures for identity records and operation outcomes.

pub mod identity;
pub mod outcome;
