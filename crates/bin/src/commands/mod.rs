//! Subcommand implementations.

pub(crate) mod analyze;
pub(crate) mod catalog;
