//! XLSX export

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use super::{ExportRow, EXPORT_HEADER};
use crate::error::{NotasError, NotasResult};

/// Write rows to a single-sheet workbook with the export header
pub fn write_xlsx(path: &Path, rows: &[ExportRow]) -> NotasResult<()> {
    build_workbook(rows)
        .and_then(|mut workbook| workbook.save(path))
        .map_err(|e| NotasError::Export(format!("Failed to write {}: {}", path.display(), e)))
}

fn build_workbook(rows: &[ExportRow]) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let amount_format = Format::new().set_num_format("0.00");

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Notas")?;

    for (col, title) in EXPORT_HEADER.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &header_format)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let r = index as u32 + 1;
        worksheet.write_number(r, 0, row.folio)?;
        worksheet.write_string(r, 1, &row.date)?;
        worksheet.write_string(r, 2, &row.customer)?;
        worksheet.write_number_with_format(r, 3, row.amount, &amount_format)?;
    }

    worksheet.set_column_width(1, 12)?;
    worksheet.set_column_width(2, 30)?;

    Ok(workbook)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_xlsx_creates_zip_container() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.xlsx");

        let rows = vec![ExportRow {
            folio: 1,
            date: "2024-01-10".into(),
            customer: "Ana".into(),
            amount: 99.9,
        }];
        write_xlsx(&path, &rows).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
