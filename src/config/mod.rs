//! Configuration module for Notas
//!
//! This module provides configuration management including:
//! - Platform path resolution with an env override
//! - Operator settings persistence

pub mod paths;
pub mod settings;

pub use paths::NotasPaths;
pub use settings::{ExportFormat, RecoveryDate, Settings};
