//! CLI subcommand implementations.

pub mod durations;
pub mod explain;
pub mod suggest;
