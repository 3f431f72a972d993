//! Self-healing enforcement of the Steam Deck user account.
//!
//! Makes sure the `deck` account exists with uid 1000, is usable (not
//! locked), and belongs to its required groups, repairing whatever state
//! the identity database was left in.
//!
//! ## Modules
//! - `cli` — Command-line handlers and the ensure orchestrator
//! - `core` — Identity reader, command executor, reconciler
//! - `models` — Identity records and operation outcomes
//! - `util` — Privilege gate, utility runner, logging, journald

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod util;
