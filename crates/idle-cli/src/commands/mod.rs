//! Subcommand implementations.

pub mod normalize;
pub mod simulate;
