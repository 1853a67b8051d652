//! Display formatting for terminal output
//!
//! Provides utilities for formatting notes for terminal display: tables,
//! detail views and query summaries.

pub mod invoice;

pub use invoice::{
    format_invoice_details, format_invoice_table, format_summary, format_tax_id_choices,
    CANCELLED_LABEL,
};
