//! Path management for Notas
//!
//! Resolves where configuration, the invoice table, the audit log and
//! spreadsheet exports live.
//!
//! ## Path Resolution Order
//!
//! 1. `NOTAS_DATA_DIR` environment variable (if set)
//! 2. The platform config directory reported by `directories`
//!    (`~/.config/notas-cli` on Linux, `%APPDATA%\notas-cli` on Windows)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::NotasError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "NOTAS_DATA_DIR";

/// Manages all paths used by Notas
#[derive(Debug, Clone)]
pub struct NotasPaths {
    /// Base directory for all Notas data
    base_dir: PathBuf,
}

impl NotasPaths {
    /// Create a new NotasPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined and the
    /// override variable is unset.
    pub fn new() -> Result<Self, NotasError> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create NotasPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (<base>/data/)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the directory spreadsheet exports are written to
    pub fn export_dir(&self) -> PathBuf {
        self.base_dir.join("exports")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Get the path to the invoice table
    pub fn invoices_file(&self) -> PathBuf {
        self.data_dir().join("notas_servicio.csv")
    }

    /// Ensure the base, data and export directories exist
    pub fn ensure_directories(&self) -> Result<(), NotasError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| NotasError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| NotasError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.export_dir())
            .map_err(|e| NotasError::Io(format!("Failed to create export directory: {}", e)))?;

        Ok(())
    }
}

fn resolve_default_path() -> Result<PathBuf, NotasError> {
    ProjectDirs::from("", "", "notas-cli")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| NotasError::Config("Could not determine a home directory".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = NotasPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
        assert_eq!(paths.export_dir(), temp_dir.path().join("exports"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = NotasPaths::with_base_dir(temp_dir.path().join("nested"));

        paths.ensure_directories().unwrap();

        assert!(paths.data_dir().exists());
        assert!(paths.export_dir().exists());
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = NotasPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(
            paths.invoices_file(),
            temp_dir.path().join("data").join("notas_servicio.csv")
        );
    }
}
