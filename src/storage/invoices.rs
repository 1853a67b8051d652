//! Invoice repository for CSV storage
//!
//! Manages loading and saving notes to notas_servicio.csv. The table is kept
//! in memory in folio order and the whole file is rewritten on every
//! mutation.
//!
//! The store assumes a single process owns the file. Two processes writing
//! the same file will race on folio assignment and lose updates.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{NotasError, NotasResult};
use crate::models::{Folio, Invoice, InvoiceStatus, LineItem, Money};

use super::file_io::{read_csv, write_csv_atomic};

/// Column names of the backing file, in order
pub const COLUMNS: &[&str] = &[
    "Folio",
    "Fecha",
    "Cliente",
    "RFC",
    "Correo",
    "Monto",
    "Detalle",
    "Estado",
    "FechaOriginal",
];

/// One line of the backing file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct InvoiceRow {
    #[serde(rename = "Folio")]
    folio: String,
    #[serde(rename = "Fecha", default)]
    date: String,
    #[serde(rename = "Cliente", default)]
    customer: String,
    #[serde(rename = "RFC", default)]
    tax_id: String,
    #[serde(rename = "Correo", default)]
    email: String,
    #[serde(rename = "Monto", default)]
    amount: String,
    #[serde(rename = "Detalle", default)]
    detail: String,
    #[serde(rename = "Estado", default)]
    status: Option<String>,
    #[serde(rename = "FechaOriginal", default)]
    original_date: Option<String>,
}

/// Line item as encoded inside the `Detalle` column
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DetailEntry {
    #[serde(rename = "Nombre")]
    name: String,
    #[serde(rename = "Costo")]
    cost: StoredCost,
}

/// Costs are written as exact decimal strings; older files hold floats
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredCost {
    Exact(String),
    Float(f64),
}

impl StoredCost {
    fn to_money(&self) -> Option<Money> {
        match self {
            StoredCost::Exact(s) => Money::parse(s).ok(),
            StoredCost::Float(f) => Money::from_f64(*f),
        }
    }
}

impl InvoiceRow {
    fn from_invoice(invoice: &Invoice) -> NotasResult<Self> {
        let detail: Vec<DetailEntry> = invoice
            .line_items()
            .iter()
            .map(|item| DetailEntry {
                name: item.name.clone(),
                cost: StoredCost::Exact(item.cost.to_decimal_string()),
            })
            .collect();

        Ok(Self {
            folio: invoice.folio.to_string(),
            date: invoice
                .issue_date()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            customer: invoice.customer_name.clone(),
            tax_id: invoice.tax_id.clone(),
            email: invoice.email.clone(),
            amount: invoice.amount().to_decimal_string(),
            detail: serde_json::to_string(&detail)?,
            status: Some(invoice.status.as_storage_str().to_string()),
            original_date: invoice
                .retained_date()
                .map(|d| d.format("%Y-%m-%d").to_string()),
        })
    }

    fn into_invoice(self, line: u64) -> NotasResult<Invoice> {
        let bad = |what: &str, value: &str| {
            NotasError::Storage(format!("Line {}: invalid {} '{}'", line, what, value))
        };

        let folio: Folio = parse_folio(&self.folio).ok_or_else(|| bad("folio", &self.folio))?;

        let date = non_empty(&self.date)
            .map(|s| parse_stored_date(s).ok_or_else(|| bad("date", s)))
            .transpose()?;

        let original_date = self
            .original_date
            .as_deref()
            .and_then(non_empty)
            .map(|s| parse_stored_date(s).ok_or_else(|| bad("original date", s)))
            .transpose()?;

        // Legacy files carry no status column: an empty date means cancelled
        let status = match self.status.as_deref().and_then(non_empty) {
            Some(s) => InvoiceStatus::from_storage_str(s).ok_or_else(|| bad("status", s))?,
            None if date.is_some() => InvoiceStatus::Active,
            None => InvoiceStatus::Cancelled,
        };

        let issued_on = match status {
            InvoiceStatus::Active => date,
            InvoiceStatus::Cancelled => original_date.or(date),
        };

        let amount = parse_stored_amount(&self.amount).ok_or_else(|| bad("amount", &self.amount))?;
        let line_items = decode_detail(&self.detail).ok_or_else(|| bad("detail", &self.detail))?;

        Invoice::from_stored(
            folio,
            status,
            issued_on,
            self.customer,
            self.tax_id,
            self.email,
            line_items,
            amount,
        )
        .map_err(|e| NotasError::Storage(format!("Line {}: folio {}: {}", line, folio, e)))
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn parse_folio(s: &str) -> Option<Folio> {
    let trimmed = s.trim();
    // Spreadsheet tools sometimes write integer columns as "3.0"
    let digits = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    digits.parse::<u32>().ok().and_then(Folio::new)
}

/// Parse a stored date, accepting a trailing time component
fn parse_stored_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Exact decimal first; older files may carry a float with stray digits
fn parse_stored_amount(s: &str) -> Option<Money> {
    Money::parse(s)
        .ok()
        .or_else(|| s.trim().parse::<f64>().ok().and_then(Money::from_f64))
        .filter(|m| !m.is_negative())
}

/// Decode the `Detalle` column: JSON, or the single-quoted list literal
/// written by older versions of the file.
fn decode_detail(s: &str) -> Option<Vec<LineItem>> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(Vec::new());
    }

    let entries: Vec<DetailEntry> = serde_json::from_str(trimmed)
        .ok()
        .or_else(|| serde_json::from_str(&single_quoted_to_json(trimmed)).ok())?;

    entries
        .into_iter()
        .map(|entry| entry.cost.to_money().map(|cost| LineItem::new(entry.name, cost)))
        .collect()
}

/// Rewrite single-quoted string literals as JSON strings
fn single_quoted_to_json(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                out.push('"');
                while let Some(inner) = chars.next() {
                    match inner {
                        '\\' => match chars.next() {
                            Some('\'') => out.push('\''),
                            Some(other) => {
                                out.push('\\');
                                out.push(other);
                            }
                            None => out.push('\\'),
                        },
                        '"' => out.push_str("\\\""),
                        '\'' => break,
                        other => out.push(other),
                    }
                }
                out.push('"');
            }
            '"' => {
                out.push('"');
                while let Some(inner) = chars.next() {
                    out.push(inner);
                    match inner {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                out.push(escaped);
                            }
                        }
                        '"' => break,
                        _ => {}
                    }
                }
            }
            other => out.push(other),
        }
    }

    out
}

/// Repository for note persistence; owns folio assignment
pub struct InvoiceRepository {
    path: PathBuf,
    data: RwLock<Vec<Invoice>>,
}

impl InvoiceRepository {
    /// Create a new invoice repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(Vec::new()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn read(&self) -> NotasResult<RwLockReadGuard<'_, Vec<Invoice>>> {
        self.data
            .read()
            .map_err(|e| NotasError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> NotasResult<RwLockWriteGuard<'_, Vec<Invoice>>> {
        self.data
            .write()
            .map_err(|e| NotasError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Load notes from disk.
    ///
    /// A missing file yields an empty table. A file that exists but fails to
    /// parse is an error; the in-memory table is left untouched.
    pub fn load(&self) -> NotasResult<()> {
        let rows: Vec<(u64, InvoiceRow)> = read_csv(&self.path)?.unwrap_or_default();

        let mut invoices = Vec::with_capacity(rows.len());
        let mut seen = BTreeSet::new();
        for (line, row) in rows {
            let invoice = row.into_invoice(line)?;
            if !seen.insert(invoice.folio) {
                return Err(NotasError::Storage(format!(
                    "Line {}: duplicate folio {}",
                    line, invoice.folio
                )));
            }
            invoices.push(invoice);
        }
        invoices.sort_by_key(|i| i.folio);

        *self.write()? = invoices;
        Ok(())
    }

    fn persist(path: &Path, invoices: &[Invoice]) -> NotasResult<()> {
        let rows = invoices
            .iter()
            .map(InvoiceRow::from_invoice)
            .collect::<NotasResult<Vec<_>>>()?;
        write_csv_atomic(path, COLUMNS, &rows)
    }

    /// The folio the next created note will receive: record count + 1
    pub fn next_folio(&self) -> NotasResult<Folio> {
        Ok(Folio::after_count(self.read()?.len()))
    }

    /// Add a note and persist the whole table.
    ///
    /// The in-memory table is rolled back if the write fails.
    pub fn append(&self, invoice: Invoice) -> NotasResult<()> {
        invoice
            .validate()
            .map_err(|e| NotasError::Validation(e.to_string()))?;

        let mut data = self.write()?;
        if data.iter().any(|i| i.folio == invoice.folio) {
            return Err(NotasError::Storage(format!(
                "Folio {} is already in use",
                invoice.folio
            )));
        }

        data.push(invoice);
        if let Err(e) = Self::persist(&self.path, &data) {
            data.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Replace a note's issue date and persist. `None` cancels the note.
    ///
    /// Returns the note as it was before the change.
    pub fn update_date(&self, folio: Folio, date: Option<NaiveDate>) -> NotasResult<Invoice> {
        let mut data = self.write()?;
        let index = data
            .iter()
            .position(|i| i.folio == folio)
            .ok_or_else(|| NotasError::invoice_not_found(folio.to_string()))?;

        let before = data[index].clone();
        data[index].set_issue_date(date);

        if let Err(e) = Self::persist(&self.path, &data) {
            data[index] = before;
            return Err(e);
        }
        Ok(before)
    }

    /// Get a note by folio, whatever its status
    pub fn get(&self, folio: Folio) -> NotasResult<Option<Invoice>> {
        Ok(self.read()?.iter().find(|i| i.folio == folio).cloned())
    }

    /// Get all notes in folio order
    pub fn get_all(&self) -> NotasResult<Vec<Invoice>> {
        Ok(self.read()?.clone())
    }

    /// Distinct tax ids present in the store, sorted ascending
    pub fn distinct_tax_ids(&self) -> NotasResult<Vec<String>> {
        let ids: BTreeSet<String> = self.read()?.iter().map(|i| i.tax_id.clone()).collect();
        Ok(ids.into_iter().collect())
    }

    /// Count notes
    pub fn count(&self) -> NotasResult<usize> {
        Ok(self.read()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, InvoiceRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notas_servicio.csv");
        let repo = InvoiceRepository::new(path);
        (temp_dir, repo)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample(folio: Folio) -> Invoice {
        Invoice::new(
            folio,
            date(2024, 1, 10),
            "Taller \"El Rayo\", S.A.",
            "ABCD123456AB1",
            "rayo@example.com",
            vec![
                LineItem::new("Diagnóstico", Money::from_cents(50000)),
                LineItem::new("Mano de obra, 'extra'", Money::from_cents(75050)),
            ],
        )
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
        assert_eq!(repo.next_folio().unwrap(), Folio::FIRST);
    }

    #[test]
    fn test_append_and_reload_round_trip() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let invoice = sample(repo.next_folio().unwrap());
        repo.append(invoice.clone()).unwrap();

        let repo2 = InvoiceRepository::new(repo.path().clone());
        repo2.load().unwrap();

        let loaded = repo2.get(Folio::FIRST).unwrap().unwrap();
        assert_eq!(loaded, invoice);
        assert_eq!(loaded.amount(), Money::from_cents(125050));
        assert_eq!(loaded.line_items()[0].name, "Diagnóstico");
        assert_eq!(loaded.line_items()[1].name, "Mano de obra, 'extra'");
    }

    #[test]
    fn test_large_costs_reload_exactly() {
        let (_temp_dir, repo) = create_test_repo();
        let big = Money::parse("900719925474.93").unwrap();
        let invoice = Invoice::new(
            Folio::FIRST,
            date(2024, 1, 10),
            "Constructora Norte",
            "ABCD123456AB1",
            "norte@example.com",
            vec![
                LineItem::new("Obra", big),
                LineItem::new("Ajuste", Money::from_cents(1)),
            ],
        );
        repo.append(invoice.clone()).unwrap();

        let contents = fs::read_to_string(repo.path()).unwrap();
        assert!(contents.contains("\"\"Costo\"\":\"\"900719925474.93\"\""));

        let repo2 = InvoiceRepository::new(repo.path().clone());
        repo2.load().unwrap();
        let loaded = repo2.get(Folio::FIRST).unwrap().unwrap();
        assert_eq!(loaded, invoice);
        assert_eq!(loaded.amount().to_decimal_string(), "900719925474.94");
    }

    #[test]
    fn test_load_float_amount_from_older_files() {
        let (_temp_dir, repo) = create_test_repo();
        fs::write(
            repo.path(),
            "Folio,Fecha,Cliente,RFC,Correo,Monto,Detalle\n1,2024-01-10,Ana,ABC123456AB1,a@b.c,0.30000000000000004,\"[{'Nombre': 'A', 'Costo': 0.1}, {'Nombre': 'B', 'Costo': 0.2}]\"\n",
        )
        .unwrap();

        repo.load().unwrap();
        let loaded = repo.get(Folio::FIRST).unwrap().unwrap();
        assert_eq!(loaded.amount(), Money::from_cents(30));
    }

    #[test]
    fn test_header_columns() {
        let (_temp_dir, repo) = create_test_repo();
        repo.append(sample(Folio::FIRST)).unwrap();

        let contents = fs::read_to_string(repo.path()).unwrap();
        let header = contents.lines().next().unwrap();
        assert_eq!(
            header,
            "Folio,Fecha,Cliente,RFC,Correo,Monto,Detalle,Estado,FechaOriginal"
        );
    }

    #[test]
    fn test_folios_follow_count() {
        let (_temp_dir, repo) = create_test_repo();
        for expected in 1..=3u32 {
            let folio = repo.next_folio().unwrap();
            assert_eq!(folio.value(), expected);
            repo.append(sample(folio)).unwrap();
        }
        repo.update_date(Folio::new(2).unwrap(), None).unwrap();
        assert_eq!(repo.next_folio().unwrap().value(), 4);
    }

    #[test]
    fn test_append_rejects_duplicate_folio() {
        let (_temp_dir, repo) = create_test_repo();
        repo.append(sample(Folio::FIRST)).unwrap();
        assert!(repo.append(sample(Folio::FIRST)).is_err());
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_update_date_cancel_and_reactivate_persist() {
        let (_temp_dir, repo) = create_test_repo();
        repo.append(sample(Folio::FIRST)).unwrap();

        let before = repo.update_date(Folio::FIRST, None).unwrap();
        assert!(before.is_active());

        let repo2 = InvoiceRepository::new(repo.path().clone());
        repo2.load().unwrap();
        let cancelled = repo2.get(Folio::FIRST).unwrap().unwrap();
        assert!(cancelled.is_cancelled());
        assert_eq!(cancelled.retained_date(), Some(date(2024, 1, 10)));

        repo2
            .update_date(Folio::FIRST, Some(date(2024, 5, 5)))
            .unwrap();
        let repo3 = InvoiceRepository::new(repo.path().clone());
        repo3.load().unwrap();
        let active = repo3.get(Folio::FIRST).unwrap().unwrap();
        assert_eq!(active.issue_date(), Some(date(2024, 5, 5)));
    }

    #[test]
    fn test_update_date_unknown_folio() {
        let (_temp_dir, repo) = create_test_repo();
        let err = repo.update_date(Folio::FIRST, None).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_distinct_tax_ids_sorted() {
        let (_temp_dir, repo) = create_test_repo();
        let mut a = sample(Folio::new(1).unwrap());
        a.tax_id = "ZZZ010101AA1".into();
        let mut b = sample(Folio::new(2).unwrap());
        b.tax_id = "AAA010101AA1".into();
        let c = sample(Folio::new(3).unwrap());
        let mut d = sample(Folio::new(4).unwrap());
        d.tax_id = "AAA010101AA1".into();
        for invoice in [a, b, c, d] {
            repo.append(invoice).unwrap();
        }

        assert_eq!(
            repo.distinct_tax_ids().unwrap(),
            vec!["AAA010101AA1", "ABCD123456AB1", "ZZZ010101AA1"]
        );
    }

    #[test]
    fn test_load_legacy_file() {
        let (_temp_dir, repo) = create_test_repo();
        fs::write(
            repo.path(),
            "Folio,Fecha,Cliente,RFC,Correo,Monto,Detalle\n\
             1,2024-01-10,Ana,ABC123456AB1,ana@example.com,1250.5,\"[{'Nombre': 'Diagnóstico', 'Costo': 500.0}, {'Nombre': \"\"O'Brien\"\", 'Costo': 750.5}]\"\n\
             2,,Luis,ABC123456AB1,luis@example.com,200.0,\"[{'Nombre': 'Afinación', 'Costo': 200.0}]\"\n\
             3,2024-02-15 00:00:00,Eva,ABC123456AB1,eva@example.com,100.0,\"[{'Nombre': 'Revisión', 'Costo': 100.0}]\"\n",
        )
        .unwrap();

        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 3);

        let first = repo.get(Folio::new(1).unwrap()).unwrap().unwrap();
        assert_eq!(first.amount(), Money::from_cents(125050));
        assert_eq!(first.line_items()[1].name, "O'Brien");

        let second = repo.get(Folio::new(2).unwrap()).unwrap().unwrap();
        assert!(second.is_cancelled());
        assert_eq!(second.retained_date(), None);

        let third = repo.get(Folio::new(3).unwrap()).unwrap().unwrap();
        assert_eq!(third.issue_date(), Some(date(2024, 2, 15)));
    }

    #[test]
    fn test_load_rejects_malformed_date() {
        let (_temp_dir, repo) = create_test_repo();
        fs::write(
            repo.path(),
            "Folio,Fecha,Cliente,RFC,Correo,Monto,Detalle\n1,10/01/2024,Ana,ABC123456AB1,a@b.c,100.00,[]\n",
        )
        .unwrap();

        let err = repo.load().unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("invalid date"));
    }

    #[test]
    fn test_load_rejects_amount_mismatch() {
        let (_temp_dir, repo) = create_test_repo();
        fs::write(
            repo.path(),
            "Folio,Fecha,Cliente,RFC,Correo,Monto,Detalle\n1,2024-01-10,Ana,ABC123456AB1,a@b.c,99.00,\"[{\"\"Nombre\"\": \"\"X\"\", \"\"Costo\"\": 100.0}]\"\n",
        )
        .unwrap();

        assert!(repo.load().is_err());
    }

    #[test]
    fn test_load_rejects_duplicate_folios() {
        let (_temp_dir, repo) = create_test_repo();
        fs::write(
            repo.path(),
            "Folio,Fecha,Cliente,RFC,Correo,Monto,Detalle\n1,2024-01-10,A,ABC123456AB1,a@b.c,0.00,[]\n1,2024-01-11,B,ABC123456AB1,b@b.c,0.00,[]\n",
        )
        .unwrap();

        let err = repo.load().unwrap_err();
        assert!(err.to_string().contains("duplicate folio"));
    }

    #[test]
    fn test_single_quoted_to_json() {
        assert_eq!(
            single_quoted_to_json("[{'a': 'b'}]"),
            "[{\"a\": \"b\"}]"
        );
        assert_eq!(
            single_quoted_to_json("[{'a': 'say \"hi\"'}]"),
            "[{\"a\": \"say \\\"hi\\\"\"}]"
        );
        assert_eq!(single_quoted_to_json("['it\\'s']"), "[\"it's\"]");
    }
}
