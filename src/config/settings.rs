//! User settings for Notas
//!
//! Manages operator preferences: the item-list sentinel, how recovery dates
//! are chosen, and the default export format.

use serde::{Deserialize, Serialize};

use super::paths::NotasPaths;
use crate::error::NotasError;

/// Which date a recovered note receives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryDate {
    /// Stamp the day the note is recovered
    #[default]
    Today,
    /// Restore the issue date the note had before cancellation
    Original,
}

/// Spreadsheet format used by exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Excel workbook (.xlsx)
    #[default]
    Xlsx,
    /// Comma-separated values (.csv)
    Csv,
}

impl ExportFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }
}

/// User settings for Notas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used when printing amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format accepted at prompts (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Service name that ends line-item collection (case-insensitive)
    #[serde(default = "default_finish_sentinel")]
    pub finish_sentinel: String,

    /// Date policy applied when recovering a cancelled note
    #[serde(default)]
    pub recovery_date: RecoveryDate,

    /// Default export format
    #[serde(default)]
    pub export_format: ExportFormat,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_finish_sentinel() -> String {
    "fin".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            finish_sentinel: default_finish_sentinel(),
            recovery_date: RecoveryDate::default(),
            export_format: ExportFormat::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    pub fn load_or_create(paths: &NotasPaths) -> Result<Self, NotasError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| NotasError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| NotasError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to disk
    pub fn save(&self, paths: &NotasPaths) -> Result<(), NotasError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| NotasError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| NotasError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Whether a service name entered at the item prompt ends collection
    pub fn is_finish_sentinel(&self, input: &str) -> bool {
        input.trim().eq_ignore_ascii_case(&self.finish_sentinel)
    }
}
