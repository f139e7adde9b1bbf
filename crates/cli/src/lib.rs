//! # Trellis CLI
//!
//! Command implementations and the interactive session behind the `trellis` binary.

pub mod commands;
pub mod interactive;
