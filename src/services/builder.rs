//! Registration workflow as a state machine
//!
//! `InvoiceBuilder` walks COLLECT_DATE -> COLLECT_HEADER -> COLLECT_ITEMS ->
//! COMMIT and can fall into ABORTED from the header step. It never touches
//! stdin or stdout; the console drives it one input at a time and decides
//! what to re-prompt based on the returned errors.
//!
//! The two failure policies differ on purpose: a bad date or a bad cost is
//! rejected and the same step is asked again, while a bad RFC or email
//! aborts the whole registration.

use chrono::NaiveDate;

use crate::config::Settings;
use crate::error::{NotasError, NotasResult};
use crate::models::{Folio, Invoice, LineItem, Money};

use super::validation::{valid_email, valid_line_item, valid_tax_id};

/// Where the workflow currently is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationState {
    CollectDate,
    CollectHeader,
    CollectItems,
    Commit,
    Aborted(String),
}

/// Result of offering a service name during item collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStep {
    /// The name was recorded; a cost is expected next
    NeedCost,
    /// The sentinel was entered; collection is over
    Finished,
}

/// Header fields collected in one step
#[derive(Debug, Clone, Default)]
pub struct HeaderInput {
    pub customer_name: String,
    pub tax_id: String,
    pub email: String,
}

/// Accumulates a note across the registration steps
#[derive(Debug, Clone)]
pub struct InvoiceBuilder {
    state: RegistrationState,
    today: NaiveDate,
    date_format: String,
    finish_sentinel: String,
    issue_date: Option<NaiveDate>,
    header: HeaderInput,
    pending_item: Option<String>,
    items: Vec<LineItem>,
}

impl InvoiceBuilder {
    /// Start a registration; `today` bounds the accepted issue date
    pub fn new(settings: &Settings, today: NaiveDate) -> Self {
        Self {
            state: RegistrationState::CollectDate,
            today,
            date_format: settings.date_format.clone(),
            finish_sentinel: settings.finish_sentinel.clone(),
            issue_date: None,
            header: HeaderInput::default(),
            pending_item: None,
            items: Vec::new(),
        }
    }

    /// Current state
    pub fn state(&self) -> &RegistrationState {
        &self.state
    }

    /// Items collected so far
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Running total of the collected items
    pub fn running_total(&self) -> Money {
        self.items.iter().map(|i| i.cost).sum()
    }

    /// The service name waiting for its cost, if any
    pub fn pending_item(&self) -> Option<&str> {
        self.pending_item.as_deref()
    }

    fn expect_state(&self, expected: RegistrationState) -> NotasResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(NotasError::Validation(format!(
                "Registration is in state {:?}, expected {:?}",
                self.state, expected
            )))
        }
    }

    /// COLLECT_DATE: accept a date string.
    ///
    /// Unparsable or future dates are rejected and the state is unchanged.
    pub fn submit_date(&mut self, input: &str) -> NotasResult<NaiveDate> {
        self.expect_state(RegistrationState::CollectDate)?;

        let date = NaiveDate::parse_from_str(input.trim(), &self.date_format).map_err(|_| {
            NotasError::Validation(format!(
                "Invalid date '{}'. Expected format: {}",
                input.trim(),
                display_format(&self.date_format)
            ))
        })?;

        if date > self.today {
            return Err(NotasError::Validation(format!(
                "Date {} cannot be after today ({})",
                date, self.today
            )));
        }

        self.issue_date = Some(date);
        self.state = RegistrationState::CollectHeader;
        Ok(date)
    }

    /// COLLECT_HEADER: accept customer name, RFC and email in one shot.
    ///
    /// An invalid RFC or email moves the workflow to ABORTED.
    pub fn submit_header(&mut self, header: HeaderInput) -> NotasResult<()> {
        self.expect_state(RegistrationState::CollectHeader)?;

        let reason = if !valid_tax_id(&header.tax_id) {
            Some(format!("RFC '{}' does not have a valid format", header.tax_id))
        } else if !valid_email(&header.email) {
            Some(format!("Email '{}' does not have a valid format", header.email))
        } else {
            None
        };

        if let Some(reason) = reason {
            self.state = RegistrationState::Aborted(reason.clone());
            return Err(NotasError::Aborted(reason));
        }

        self.header = header;
        self.state = RegistrationState::CollectItems;
        Ok(())
    }

    /// COLLECT_ITEMS: offer a service name. The sentinel ends collection.
    pub fn submit_item_name(&mut self, name: &str) -> NotasResult<ItemStep> {
        self.expect_state(RegistrationState::CollectItems)?;

        if name.trim().eq_ignore_ascii_case(&self.finish_sentinel) {
            self.pending_item = None;
            self.state = RegistrationState::Commit;
            return Ok(ItemStep::Finished);
        }

        self.pending_item = Some(name.trim().to_string());
        Ok(ItemStep::NeedCost)
    }

    /// COLLECT_ITEMS: cost for the pending service name.
    ///
    /// Unparsable, non-positive or sub-cent costs are rejected and the same
    /// name stays pending, as is a cost that would push the note past
    /// `Money::MAX`.
    pub fn submit_item_cost(&mut self, input: &str) -> NotasResult<LineItem> {
        self.expect_state(RegistrationState::CollectItems)?;

        let name = self
            .pending_item
            .clone()
            .ok_or_else(|| NotasError::Validation("No service name is waiting for a cost".into()))?;

        let cost = Money::parse(input).map_err(|e| NotasError::Validation(e.to_string()))?;
        if !valid_line_item(cost) {
            return Err(NotasError::Validation(
                "The service cost must be greater than zero".into(),
            ));
        }
        if Money::checked_sum(self.items.iter().map(|i| i.cost).chain([cost])).is_none() {
            return Err(NotasError::Validation(format!(
                "The note total cannot exceed {}",
                Money::MAX
            )));
        }

        let item = LineItem::new(name, cost);
        self.items.push(item.clone());
        self.pending_item = None;
        Ok(item)
    }

    /// COMMIT: build the note with the folio assigned by the store
    pub fn build(&self, folio: Folio) -> NotasResult<Invoice> {
        self.expect_state(RegistrationState::Commit)?;

        let date = self
            .issue_date
            .ok_or_else(|| NotasError::Validation("Issue date was never collected".into()))?;

        Ok(Invoice::new(
            folio,
            date,
            self.header.customer_name.trim(),
            self.header.tax_id.clone(),
            self.header.email.clone(),
            self.items.clone(),
        ))
    }
}

fn display_format(format: &str) -> String {
    format
        .replace("%Y", "YYYY")
        .replace("%m", "MM")
        .replace("%d", "DD")
}
