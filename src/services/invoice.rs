//! Invoice registration service
//!
//! Commits finished registrations to the store and records them in the audit
//! log. The non-interactive `create` path drives the same state machine the
//! console uses, so both enforce identical rules.

use chrono::NaiveDate;

use crate::config::Settings;
use crate::error::{NotasError, NotasResult};
use crate::models::Invoice;
use crate::storage::Storage;

use super::builder::{HeaderInput, InvoiceBuilder};

/// Service for registering notes
pub struct InvoiceService<'a> {
    storage: &'a Storage,
}

/// Input for registering a note in one call
#[derive(Debug, Clone)]
pub struct CreateInvoiceInput {
    pub date: String,
    pub customer_name: String,
    pub tax_id: String,
    pub email: String,
    /// (service name, cost) pairs as typed by the user
    pub items: Vec<(String, String)>,
}

impl<'a> InvoiceService<'a> {
    /// Create a new invoice service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Commit a builder that reached COMMIT.
    ///
    /// The folio is assigned here, immediately before appending, so it is
    /// always one more than the number of stored notes. The note is on disk
    /// before the audit entry is written; if only the latter fails the
    /// error is `NotasError::Audit` and the note stays registered.
    pub fn commit(&self, builder: &InvoiceBuilder) -> NotasResult<Invoice> {
        let folio = self.storage.invoices.next_folio()?;
        let invoice = builder.build(folio)?;

        self.storage.invoices.append(invoice.clone())?;

        self.storage.log_create(
            invoice.folio.to_string(),
            Some(invoice.customer_name.clone()),
            &invoice,
        )?;

        Ok(invoice)
    }

    /// Register a note from already-collected input.
    ///
    /// Any rejected step fails the whole call; nothing is re-prompted.
    pub fn create(
        &self,
        settings: &Settings,
        today: NaiveDate,
        input: CreateInvoiceInput,
    ) -> NotasResult<Invoice> {
        let mut builder = InvoiceBuilder::new(settings, today);

        builder.submit_date(&input.date)?;
        builder.submit_header(HeaderInput {
            customer_name: input.customer_name,
            tax_id: input.tax_id,
            email: input.email,
        })?;

        for (name, cost) in &input.items {
            if settings.is_finish_sentinel(name) {
                return Err(NotasError::Validation(format!(
                    "'{}' is reserved to end the service list",
                    name
                )));
            }
            builder.submit_item_name(name)?;
            builder.submit_item_cost(cost)?;
        }
        builder.submit_item_name(&settings.finish_sentinel)?;

        self.commit(&builder)
    }
}
