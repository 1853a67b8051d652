//! Cancellation and recovery of notes
//!
//! Cancelling clears a note's queryable date; recovering restores one. Both
//! take a confirmation callback that sees the note before anything is
//! written, so the console can show it and ask.

use chrono::NaiveDate;

use crate::audit::Operation;
use crate::config::{RecoveryDate, Settings};
use crate::error::{NotasError, NotasResult};
use crate::models::{Folio, Invoice};
use crate::storage::Storage;

/// Outcome of a confirmed mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// The change was written; holds the note as it is now
    Applied(Invoice),
    /// The user declined; nothing changed
    Declined,
}

/// Service for cancelling and recovering notes
pub struct LifecycleService<'a> {
    storage: &'a Storage,
    settings: &'a Settings,
}

impl<'a> LifecycleService<'a> {
    /// Create a new lifecycle service
    pub fn new(storage: &'a Storage, settings: &'a Settings) -> Self {
        Self { storage, settings }
    }

    /// The active note with this folio.
    ///
    /// A missing folio and an already-cancelled one give the same error.
    pub fn find_cancellable(&self, folio: Folio) -> NotasResult<Invoice> {
        self.storage
            .invoices
            .get(folio)?
            .filter(|i| i.is_active())
            .ok_or(NotasError::NotFoundOrCancelled(folio.value()))
    }

    /// Cancel an active note after confirmation
    pub fn cancel<F>(&self, folio: Folio, confirm: F) -> NotasResult<LifecycleOutcome>
    where
        F: FnOnce(&Invoice) -> NotasResult<bool>,
    {
        let invoice = self.find_cancellable(folio)?;
        if !confirm(&invoice)? {
            return Ok(LifecycleOutcome::Declined);
        }

        let before = self.storage.invoices.update_date(folio, None)?;
        let after = self.fetch(folio)?;

        self.storage.log_status_change(
            Operation::Cancel,
            folio.to_string(),
            Some(after.customer_name.clone()),
            &before,
            &after,
            Some(format!(
                "status: {} -> {}",
                before.status.as_storage_str(),
                after.status.as_storage_str()
            )),
        )?;

        Ok(LifecycleOutcome::Applied(after))
    }

    /// All cancelled notes in folio order.
    ///
    /// Fails with `NoCancelled` when there are none, so recovery can stop
    /// before asking for a folio.
    pub fn list_cancelled(&self) -> NotasResult<Vec<Invoice>> {
        let cancelled: Vec<Invoice> = self
            .storage
            .invoices
            .get_all()?
            .into_iter()
            .filter(|i| i.is_cancelled())
            .collect();

        if cancelled.is_empty() {
            return Err(NotasError::NoCancelled);
        }
        Ok(cancelled)
    }

    /// The date a recovered note gets under the configured policy
    pub fn recovery_date(&self, invoice: &Invoice, today: NaiveDate) -> NaiveDate {
        match self.settings.recovery_date {
            RecoveryDate::Today => today,
            RecoveryDate::Original => invoice.retained_date().unwrap_or(today),
        }
    }

    /// Recover a cancelled note after confirmation.
    ///
    /// Only folios in the cancelled set are accepted.
    pub fn recover<F>(
        &self,
        folio: Folio,
        today: NaiveDate,
        confirm: F,
    ) -> NotasResult<LifecycleOutcome>
    where
        F: FnOnce(&Invoice) -> NotasResult<bool>,
    {
        let invoice = self
            .list_cancelled()?
            .into_iter()
            .find(|i| i.folio == folio)
            .ok_or_else(|| NotasError::NotFound {
                entity_type: "Cancelled note",
                identifier: folio.to_string(),
            })?;

        if !confirm(&invoice)? {
            return Ok(LifecycleOutcome::Declined);
        }

        let date = self.recovery_date(&invoice, today);
        let before = self.storage.invoices.update_date(folio, Some(date))?;
        let after = self.fetch(folio)?;

        self.storage.log_status_change(
            Operation::Recover,
            folio.to_string(),
            Some(after.customer_name.clone()),
            &before,
            &after,
            Some(format!("status: cancelada -> activa, date: {}", date)),
        )?;

        Ok(LifecycleOutcome::Applied(after))
    }

    fn fetch(&self, folio: Folio) -> NotasResult<Invoice> {
        self.storage
            .invoices
            .get(folio)?
            .ok_or_else(|| NotasError::invoice_not_found(folio.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::NotasPaths;
    use crate::models::{LineItem, Money};
    use crate::services::{Period, QueryService};
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = NotasPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn add(storage: &Storage, issued: NaiveDate) -> Folio {
        let folio = storage.invoices.next_folio().unwrap();
        storage
            .invoices
            .append(Invoice::new(
                folio,
                issued,
                "Taller Ruiz",
                "ABCD123456AB1",
                "ruiz@example.com",
                vec![LineItem::new("Lavado", Money::from_cents(12000))],
            ))
            .unwrap();
        folio
    }

    #[test]
    fn test_cancel_clears_queryable_date() {
        let (_temp_dir, storage) = create_test_storage();
        let settings = Settings::default();
        let folio = add(&storage, date(2024, 1, 10));

        let outcome = LifecycleService::new(&storage, &settings)
            .cancel(folio, |_| Ok(true))
            .unwrap();
        let LifecycleOutcome::Applied(invoice) = outcome else {
            panic!("expected the cancellation to apply");
        };
        assert!(invoice.is_cancelled());
        assert_eq!(invoice.issue_date(), None);

        let period = Period::resolve(None, None, date(2024, 6, 1)).unwrap();
        assert!(QueryService::new(&storage).by_period(period).unwrap().is_empty());
    }

    #[test]
    fn test_cancel_missing_and_cancelled_share_error() {
        let (_temp_dir, storage) = create_test_storage();
        let settings = Settings::default();
        let service = LifecycleService::new(&storage, &settings);
        let folio = add(&storage, date(2024, 1, 10));

        service.cancel(folio, |_| Ok(true)).unwrap();

        let again = service.cancel(folio, |_| Ok(true)).unwrap_err();
        let missing = service
            .cancel(Folio::new(42).unwrap(), |_| Ok(true))
            .unwrap_err();
        assert!(matches!(again, NotasError::NotFoundOrCancelled(1)));
        assert!(matches!(missing, NotasError::NotFoundOrCancelled(42)));
    }

    #[test]
    fn test_declined_cancel_changes_nothing() {
        let (_temp_dir, storage) = create_test_storage();
        let settings = Settings::default();
        let folio = add(&storage, date(2024, 1, 10));

        let outcome = LifecycleService::new(&storage, &settings)
            .cancel(folio, |_| Ok(false))
            .unwrap();
        assert_eq!(outcome, LifecycleOutcome::Declined);
        assert!(storage.invoices.get(folio).unwrap().unwrap().is_active());
        assert_eq!(storage.audit().entry_count().unwrap(), 0);
    }

    #[test]
    fn test_recover_stamps_today_by_default() {
        let (_temp_dir, storage) = create_test_storage();
        let settings = Settings::default();
        let service = LifecycleService::new(&storage, &settings);
        let folio = add(&storage, date(2024, 1, 10));
        service.cancel(folio, |_| Ok(true)).unwrap();

        let outcome = service.recover(folio, date(2024, 3, 1), |_| Ok(true)).unwrap();
        let LifecycleOutcome::Applied(invoice) = outcome else {
            panic!("expected the recovery to apply");
        };
        assert_eq!(invoice.issue_date(), Some(date(2024, 3, 1)));

        let entries = storage.audit().read_all().unwrap();
        let ops: Vec<Operation> = entries.iter().map(|e| e.operation).collect();
        assert_eq!(ops, vec![Operation::Cancel, Operation::Recover]);
    }

    #[test]
    fn test_recover_original_date_policy() {
        let (_temp_dir, storage) = create_test_storage();
        let settings = Settings {
            recovery_date: RecoveryDate::Original,
            ..Settings::default()
        };
        let service = LifecycleService::new(&storage, &settings);
        let folio = add(&storage, date(2024, 1, 10));
        service.cancel(folio, |_| Ok(true)).unwrap();

        service.recover(folio, date(2024, 3, 1), |_| Ok(true)).unwrap();
        assert_eq!(
            storage.invoices.get(folio).unwrap().unwrap().issue_date(),
            Some(date(2024, 1, 10))
        );
    }

    #[test]
    fn test_recover_without_cancelled_notes() {
        let (_temp_dir, storage) = create_test_storage();
        let settings = Settings::default();
        add(&storage, date(2024, 1, 10));

        let err = LifecycleService::new(&storage, &settings)
            .recover(Folio::FIRST, date(2024, 3, 1), |_| Ok(true))
            .unwrap_err();
        assert!(matches!(err, NotasError::NoCancelled));
    }

    #[test]
    fn test_recover_rejects_active_folio() {
        let (_temp_dir, storage) = create_test_storage();
        let settings = Settings::default();
        let service = LifecycleService::new(&storage, &settings);
        let cancelled = add(&storage, date(2024, 1, 10));
        let active = add(&storage, date(2024, 1, 11));
        service.cancel(cancelled, |_| Ok(true)).unwrap();

        let err = service
            .recover(active, date(2024, 3, 1), |_| Ok(true))
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(service.list_cancelled().unwrap().len(), 1);
    }
}
