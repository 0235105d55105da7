//! Audit logging system for Fedha
//!
//! Records all create, update, delete operations with before/after values
//! in an append-only audit log.
//!
//! - `AuditEntry`: one operation with timestamp, entity information, and
//!   optional before/after values.
//! - `AuditLogger`: appends entries to the log file as JSON lines.
//! - `generate_diff`: human-readable summary of top-level field changes.

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
