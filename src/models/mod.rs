//! Core data models for Notas
//!
//! This module contains the data structures that represent the service note
//! domain: folios, money amounts, line items and the notes themselves.

pub mod folio;
pub mod invoice;
pub mod money;

pub use folio::{Folio, FolioParseError};
pub use invoice::{Invoice, InvoiceStatus, InvoiceValidationError, LineItem};
pub use money::{Money, MoneyParseError};
