//! Storage layer for Notas
//!
//! Provides CSV file storage with atomic writes, automatic directory creation
//! and an audit trail of every mutation.

pub mod file_io;
pub mod invoices;

pub use file_io::{read_csv, write_atomic, write_csv_atomic};
pub use invoices::InvoiceRepository;

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, Operation};
use crate::config::paths::NotasPaths;
use crate::error::NotasError;

/// Main storage coordinator: the invoice table plus its audit log
pub struct Storage {
    paths: NotasPaths,
    pub invoices: InvoiceRepository,
    audit: AuditLogger,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: NotasPaths) -> Result<Self, NotasError> {
        paths.ensure_directories()?;

        Ok(Self {
            invoices: InvoiceRepository::new(paths.invoices_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &NotasPaths {
        &self.paths
    }

    /// Get the audit logger
    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), NotasError> {
        self.invoices.load()
    }

    /// Record a creation in the audit log.
    ///
    /// Called after the table is written, so a failure here comes back as
    /// the non-fatal `NotasError::Audit`.
    pub fn log_create<T: Serialize>(
        &self,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), NotasError> {
        self.record(AuditEntry::create(entity_id, entity_name, entity))
    }

    /// Record a status change (cancel or recover) in the audit log
    pub fn log_status_change<T: Serialize>(
        &self,
        operation: Operation,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
        summary: Option<String>,
    ) -> Result<(), NotasError> {
        self.record(AuditEntry::status_change(
            operation,
            entity_id,
            entity_name,
            before,
            after,
            summary,
        ))
    }

    fn record(&self, entry: AuditEntry) -> Result<(), NotasError> {
        self.audit.log(&entry).map_err(|e| NotasError::Audit {
            folio: entry.entity_id.clone(),
            reason: e.to_string(),
        })
    }
}
