//! CLI command implementations.

pub mod status;
