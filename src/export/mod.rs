//! Export module for Notas
//!
//! Writes a set of notes to a spreadsheet with the columns
//! `Folio, Fecha, Cliente, Monto`:
//! - XLSX: via `rust_xlsxwriter`
//! - CSV: via the `csv` crate

pub mod csv;
pub mod xlsx;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::config::{ExportFormat, NotasPaths};
use crate::error::{NotasError, NotasResult};
use crate::models::Invoice;

/// Header row shared by every export format
pub const EXPORT_HEADER: [&str; 4] = ["Folio", "Fecha", "Cliente", "Monto"];

/// File stem used for period exports
pub const PERIOD_EXPORT_STEM: &str = "periodo";

/// One exported row
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub folio: u32,
    /// `YYYY-MM-DD`, empty for cancelled notes
    pub date: String,
    pub customer: String,
    pub amount: f64,
}

impl From<&Invoice> for ExportRow {
    fn from(invoice: &Invoice) -> Self {
        Self {
            folio: invoice.folio.value(),
            date: invoice
                .issue_date()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            customer: invoice.customer_name.clone(),
            amount: invoice.amount().to_f64(),
        }
    }
}

/// `{stem}_{YYYY-MM-DD}.{ext}`
pub fn export_file_name(stem: &str, date: NaiveDate, format: ExportFormat) -> String {
    format!("{}_{}.{}", stem, date.format("%Y-%m-%d"), format.extension())
}

/// Default location for an export: the export directory plus the file name
pub fn default_export_path(
    paths: &NotasPaths,
    stem: &str,
    date: NaiveDate,
    format: ExportFormat,
) -> PathBuf {
    paths.export_dir().join(export_file_name(stem, date, format))
}

/// Write the notes to `path` in the given format.
///
/// An empty set is refused rather than producing a header-only file.
pub fn export_invoices(invoices: &[Invoice], path: &Path, format: ExportFormat) -> NotasResult<()> {
    if invoices.is_empty() {
        return Err(NotasError::EmptyResult("nothing to export".into()));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            NotasError::Export(format!(
                "Failed to create export directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let rows: Vec<ExportRow> = invoices.iter().map(ExportRow::from).collect();
    match format {
        ExportFormat::Xlsx => xlsx::write_xlsx(path, &rows),
        ExportFormat::Csv => csv::write_csv(path, &rows),
    }
}
