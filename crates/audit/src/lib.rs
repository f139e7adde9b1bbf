//! # Trellis Audit
//!
//! Bounded in-memory log of access decisions.

mod audit_logger;

pub use audit_logger::{AuditLogger, AuditEntry, AuditEventType, AuditStats};
