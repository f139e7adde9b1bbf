//! # Trellis Shared
//!
//! Common types used across all Trellis crates.

pub mod error;
pub mod identity;
pub mod config;

// Re-exports
pub use error::*;
pub use identity::*;
pub use config::*;
