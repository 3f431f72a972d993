//! Utility modules for privilege, process, and logging concerns.

pub mod command;
pub mod journald;
pub mod logging;
pub mod privilege;
