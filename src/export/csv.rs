//! CSV export

use std::path::Path;

use super::{ExportRow, EXPORT_HEADER};
use crate::error::{NotasError, NotasResult};

/// Write rows as CSV with the export header
pub fn write_csv(path: &Path, rows: &[ExportRow]) -> NotasResult<()> {
    let mut writer = ::csv::Writer::from_path(path)
        .map_err(|e| NotasError::Export(format!("Failed to create {}: {}", path.display(), e)))?;

    writer.write_record(EXPORT_HEADER)?;
    for row in rows {
        writer.write_record([
            row.folio.to_string(),
            row.date.clone(),
            row.customer.clone(),
            format!("{:.2}", row.amount),
        ])?;
    }

    writer
        .flush()
        .map_err(|e| NotasError::Export(format!("Failed to write {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_csv() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");

        let rows = vec![
            ExportRow {
                folio: 1,
                date: "2024-01-10".into(),
                customer: "Ruiz, Hermanos".into(),
                amount: 1250.5,
            },
            ExportRow {
                folio: 2,
                date: String::new(),
                customer: "Ana".into(),
                amount: 200.0,
            },
        ];
        write_csv(&path, &rows).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "Folio,Fecha,Cliente,Monto");
        assert_eq!(lines[1], "1,2024-01-10,\"Ruiz, Hermanos\",1250.50");
        assert_eq!(lines[2], "2,,Ana,200.00");
    }
}
