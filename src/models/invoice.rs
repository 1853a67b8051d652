//! Service note (invoice) model
//!
//! A note carries header fields, an ordered list of service charges and a
//! derived total. Cancellation is a status flag kept next to the last
//! issue date, so a cancelled note still knows when it was issued.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::folio::Folio;
use super::money::Money;

/// Lifecycle state of a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Note is in force and visible to date queries
    #[default]
    Active,
    /// Note was cancelled; it has no queryable date until recovered
    Cancelled,
}

impl InvoiceStatus {
    /// Label used in the backing file
    pub fn as_storage_str(&self) -> &'static str {
        match self {
            Self::Active => "activa",
            Self::Cancelled => "cancelada",
        }
    }

    /// Parse the backing-file label
    pub fn from_storage_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "activa" | "active" => Some(Self::Active),
            "cancelada" | "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// One service charge on a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Service description
    pub name: String,

    /// Cost of the service, always positive
    pub cost: Money,
}

impl LineItem {
    /// Create a new line item
    pub fn new(name: impl Into<String>, cost: Money) -> Self {
        Self {
            name: name.into(),
            cost,
        }
    }
}

/// A service note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Sequential invoice number
    pub folio: Folio,

    /// Most recent issue date, retained while the note is cancelled. Only
    /// cancelled notes imported from legacy files can lack one.
    issued_on: Option<NaiveDate>,

    /// Active or cancelled
    #[serde(default)]
    pub status: InvoiceStatus,

    /// Customer name (free text)
    pub customer_name: String,

    /// Customer tax identifier (RFC)
    pub tax_id: String,

    /// Customer email
    pub email: String,

    line_items: Vec<LineItem>,

    amount: Money,
}

impl Invoice {
    /// Create a new active note; the amount is derived from the items
    pub fn new(
        folio: Folio,
        issued_on: NaiveDate,
        customer_name: impl Into<String>,
        tax_id: impl Into<String>,
        email: impl Into<String>,
        line_items: Vec<LineItem>,
    ) -> Self {
        let amount = line_items.iter().map(|item| item.cost).sum();
        Self {
            folio,
            issued_on: Some(issued_on),
            status: InvoiceStatus::Active,
            customer_name: customer_name.into(),
            tax_id: tax_id.into(),
            email: email.into(),
            line_items,
            amount,
        }
    }

    /// Total of all line items
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// Line items in insertion order
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    /// The queryable issue date: `None` while cancelled
    pub fn issue_date(&self) -> Option<NaiveDate> {
        match self.status {
            InvoiceStatus::Active => self.issued_on,
            InvoiceStatus::Cancelled => None,
        }
    }

    /// The last issue date, including while cancelled
    pub fn retained_date(&self) -> Option<NaiveDate> {
        self.issued_on
    }

    /// Check if the note is active
    pub fn is_active(&self) -> bool {
        self.status == InvoiceStatus::Active
    }

    /// Check if the note is cancelled
    pub fn is_cancelled(&self) -> bool {
        self.status == InvoiceStatus::Cancelled
    }

    /// Mark as cancelled, keeping the issue date on record
    pub fn cancel(&mut self) {
        self.status = InvoiceStatus::Cancelled;
    }

    /// Reactivate with the given issue date
    pub fn reactivate(&mut self, date: NaiveDate) {
        self.status = InvoiceStatus::Active;
        self.issued_on = Some(date);
    }

    /// Apply a nullable date: `None` cancels, `Some` (re)activates
    pub fn set_issue_date(&mut self, date: Option<NaiveDate>) {
        match date {
            Some(d) => self.reactivate(d),
            None => self.cancel(),
        }
    }

    /// Check the derived-amount, positive-cost and dated-when-active invariants
    pub fn validate(&self) -> Result<(), InvoiceValidationError> {
        if self.is_active() && self.issued_on.is_none() {
            return Err(InvoiceValidationError::MissingIssueDate);
        }

        if let Some(item) = self.line_items.iter().find(|i| !i.cost.is_positive()) {
            return Err(InvoiceValidationError::NonPositiveCost {
                name: item.name.clone(),
                cost: item.cost,
            });
        }

        let items_total = Money::checked_sum(self.line_items.iter().map(|i| i.cost))
            .ok_or(InvoiceValidationError::AmountTooLarge)?;
        if items_total != self.amount {
            return Err(InvoiceValidationError::AmountMismatch {
                amount: self.amount,
                items_total,
            });
        }

        Ok(())
    }

    /// Rebuild a note read from storage, checking every invariant against
    /// the stored amount rather than recomputing it
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_stored(
        folio: Folio,
        status: InvoiceStatus,
        issued_on: Option<NaiveDate>,
        customer_name: String,
        tax_id: String,
        email: String,
        line_items: Vec<LineItem>,
        stored_amount: Money,
    ) -> Result<Invoice, InvoiceValidationError> {
        let invoice = Invoice {
            folio,
            issued_on,
            status,
            customer_name,
            tax_id,
            email,
            line_items,
            amount: stored_amount,
        };
        invoice.validate()?;
        Ok(invoice)
    }
}

impl fmt::Display for Invoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.issue_date() {
            Some(date) => write!(
                f,
                "#{} {} {} {}",
                self.folio,
                date.format("%Y-%m-%d"),
                self.customer_name,
                self.amount
            ),
            None => write!(
                f,
                "#{} CANCELADA {} {}",
                self.folio, self.customer_name, self.amount
            ),
        }
    }
}

/// Validation errors for notes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvoiceValidationError {
    AmountMismatch { amount: Money, items_total: Money },
    NonPositiveCost { name: String, cost: Money },
    MissingIssueDate,
    AmountTooLarge,
}

impl fmt::Display for InvoiceValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmountMismatch {
                amount,
                items_total,
            } => write!(
                f,
                "Amount ({}) does not match the sum of its services ({})",
                amount, items_total
            ),
            Self::NonPositiveCost { name, cost } => {
                write!(f, "Service '{}' has a non-positive cost ({})", name, cost)
            }
            Self::MissingIssueDate => write!(f, "Active note has no issue date"),
            Self::AmountTooLarge => {
                write!(f, "Services add up to more than {}", Money::MAX)
            }
        }
    }
}

impl std::error::Error for InvoiceValidationError {}
