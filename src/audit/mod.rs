//! Audit logging for Notas
//!
//! Records every registration, cancellation and recovery in an append-only
//! log so the history of a folio can be reconstructed even though the
//! table itself only keeps the current state.
//!
//! - `AuditEntry`: one operation with timestamp, folio and optional
//!   before/after snapshots.
//! - `AuditLogger`: writes entries as line-delimited JSON (JSONL).

mod entry;
mod logger;

pub use entry::{AuditEntry, Operation};
pub use logger::AuditLogger;
