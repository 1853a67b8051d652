//! Append-only audit log
//!
//! One JSON object per line. Entries are only ever appended; readers parse
//! the whole file and pick what they need.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use crate::error::{NotasError, NotasResult};
use crate::models::Folio;

use super::entry::AuditEntry;

/// JSONL audit log of note mutations
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append one entry as a single write of one line, then sync it
    pub fn log(&self, entry: &AuditEntry) -> NotasResult<()> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        file.write_all(&line)?;
        file.sync_data()?;
        Ok(())
    }

    /// Non-blank lines with their 1-based line numbers. A missing log is empty.
    fn lines(&self) -> NotasResult<Vec<(usize, String)>> {
        let contents = match fs::read_to_string(&self.log_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| (n + 1, line.to_string()))
            .collect())
    }

    fn parse((line_num, line): (usize, String)) -> NotasResult<AuditEntry> {
        serde_json::from_str(&line).map_err(|e| {
            NotasError::Json(format!("Audit log line {}: {}", line_num, e))
        })
    }

    /// Every entry, oldest first
    pub fn read_all(&self) -> NotasResult<Vec<AuditEntry>> {
        self.lines()?.into_iter().map(Self::parse).collect()
    }

    /// The last `count` entries, oldest first; earlier lines are not parsed
    pub fn read_recent(&self, count: usize) -> NotasResult<Vec<AuditEntry>> {
        let mut lines = self.lines()?;
        let start = lines.len().saturating_sub(count);
        lines.split_off(start).into_iter().map(Self::parse).collect()
    }

    /// Every entry recorded against one folio, oldest first
    pub fn read_for_folio(&self, folio: Folio) -> NotasResult<Vec<AuditEntry>> {
        let id = folio.to_string();
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|entry| entry.entity_id == id)
            .collect())
    }

    pub fn entry_count(&self) -> NotasResult<usize> {
        Ok(self.lines()?.len())
    }
}
