//! File I/O utilities with atomic writes
//!
//! Provides safe file operations that won't corrupt data on failure.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::NotasError;

/// Read every row of a CSV file with a header line.
///
/// Returns `Ok(None)` when the file does not exist so the caller can start an
/// empty table. Rows are paired with their 1-based line number for
/// diagnostics.
pub fn read_csv<T, P>(path: P) -> Result<Option<Vec<(u64, T)>>, NotasError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)
        .map_err(|e| NotasError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let headers = reader
        .headers()
        .map_err(|e| NotasError::Storage(format!("Failed to read {}: {}", path.display(), e)))?
        .clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| {
            NotasError::Storage(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row = record.deserialize(Some(&headers)).map_err(|e| {
            NotasError::Storage(format!(
                "Failed to parse {} at line {}: {}",
                path.display(),
                line,
                e
            ))
        })?;
        rows.push((line, row));
    }

    Ok(Some(rows))
}

/// Write rows as CSV atomically (write to temp, then rename)
///
/// A header line is emitted even when `rows` is empty, using `header`.
pub fn write_csv_atomic<T, P>(path: P, header: &[&str], rows: &[T]) -> Result<(), NotasError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    write_atomic(path, |writer| {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        csv_writer
            .write_record(header)
            .map_err(|e| NotasError::Storage(format!("Failed to write header: {}", e)))?;

        for row in rows {
            csv_writer
                .serialize(row)
                .map_err(|e| NotasError::Storage(format!("Failed to serialize row: {}", e)))?;
        }

        csv_writer
            .flush()
            .map_err(|e| NotasError::Storage(format!("Failed to flush data: {}", e)))?;
        Ok(())
    })
}

/// Run `write` against a temp file next to `path`, then rename it over `path`.
///
/// The target is either completely replaced or left untouched.
pub fn write_atomic<P, F>(path: P, write: F) -> Result<(), NotasError>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<File>) -> Result<(), NotasError>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            NotasError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_path = temp_path_for(path);

    let file = File::create(&temp_path)
        .map_err(|e| NotasError::Storage(format!("Failed to create temp file: {}", e)))?;
    let mut writer = BufWriter::new(file);

    let written = write(&mut writer).and_then(|_| {
        writer
            .flush()
            .map_err(|e| NotasError::Storage(format!("Failed to flush data: {}", e)))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| NotasError::Storage(format!("Failed to sync data: {}", e)))
    });

    if let Err(e) = written {
        drop(writer);
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    drop(writer);

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        NotasError::Storage(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
