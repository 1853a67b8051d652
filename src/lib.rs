//! Notas - service note (nota de servicio) register for the terminal
//!
//! Registers notes with line-item service charges, keeps them in a CSV
//! table, and supports queries by period, folio or customer, soft
//! cancellation and recovery, and spreadsheet export.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (notes, folios, money)
//! - `storage`: CSV file storage layer
//! - `audit`: Audit logging system
//! - `services`: Business logic layer
//! - `display`: Terminal formatting
//! - `export`: Spreadsheet export
//! - `cli`: Interactive menu and scripted subcommands
//!
//! # Example
//!
//! ```rust,ignore
//! use notas_cli::config::{NotasPaths, Settings};
//! use notas_cli::storage::Storage;
//!
//! let paths = NotasPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let mut storage = Storage::new(paths)?;
//! storage.load_all()?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{NotasError, NotasResult};
