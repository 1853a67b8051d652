//! Query service
//!
//! Read-only lookups over the note table: by issue-date period, by folio and
//! by customer RFC. Period and customer queries also report the mean amount
//! of what they matched.

use chrono::NaiveDate;

use crate::error::{NotasError, NotasResult};
use crate::models::{Folio, Invoice, Money};
use crate::storage::Storage;

/// Lower bound used when a period query leaves the start blank
pub fn default_period_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Notes matched by a query plus their mean amount
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub invoices: Vec<Invoice>,
    pub mean: Option<Money>,
}

impl QueryResult {
    fn new(invoices: Vec<Invoice>) -> Self {
        let mean = Money::mean(invoices.iter().map(|i| i.amount()));
        Self { invoices, mean }
    }

    pub fn is_empty(&self) -> bool {
        self.invoices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.invoices.len()
    }

    /// Sum of all matched amounts
    pub fn total(&self) -> Money {
        self.invoices.iter().map(|i| i.amount()).sum()
    }
}

/// Resolved bounds of a period query, both inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    /// Fill blank bounds with defaults and check ordering
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> NotasResult<Self> {
        let start = start.unwrap_or_else(default_period_start);
        let end = end.unwrap_or(today);

        if end < start {
            return Err(NotasError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Parse an optional period bound; blank input means "use the default"
pub fn parse_period_bound(input: &str, format: &str) -> NotasResult<Option<NaiveDate>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, format)
        .map(Some)
        .map_err(|_| NotasError::Validation(format!("Invalid date '{}'", trimmed)))
}

/// A customer query's answer
#[derive(Debug, Clone)]
pub struct CustomerQuery {
    pub tax_id: String,
    pub result: QueryResult,
}

/// Service for querying notes
pub struct QueryService<'a> {
    storage: &'a Storage,
}

impl<'a> QueryService<'a> {
    /// Create a new query service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Active notes whose issue date falls in the period, oldest first.
    ///
    /// Cancelled notes never match because they have no queryable date.
    pub fn by_period(&self, period: Period) -> NotasResult<QueryResult> {
        let mut invoices: Vec<Invoice> = self
            .storage
            .invoices
            .get_all()?
            .into_iter()
            .filter(|i| i.issue_date().is_some_and(|d| period.contains(d)))
            .collect();

        invoices.sort_by_key(|i| (i.issue_date(), i.folio));
        Ok(QueryResult::new(invoices))
    }

    /// A single note by folio, including cancelled ones
    pub fn by_folio(&self, folio: Folio) -> NotasResult<Invoice> {
        self.storage
            .invoices
            .get(folio)?
            .ok_or_else(|| NotasError::invoice_not_found(folio.to_string()))
    }

    /// Distinct RFCs, sorted ascending; the list a customer is picked from
    pub fn customer_tax_ids(&self) -> NotasResult<Vec<String>> {
        self.storage.invoices.distinct_tax_ids()
    }

    /// Notes for the customer at a 1-based position of `customer_tax_ids`.
    ///
    /// Cancelled notes are included.
    pub fn by_customer(&self, selection: usize) -> NotasResult<CustomerQuery> {
        let tax_ids = self.customer_tax_ids()?;
        if tax_ids.is_empty() {
            return Err(NotasError::EmptyResult("there are no customers yet".into()));
        }

        let tax_id = selection
            .checked_sub(1)
            .and_then(|index| tax_ids.get(index))
            .ok_or_else(|| {
                NotasError::Validation(format!(
                    "Selection {} is out of range (1-{})",
                    selection,
                    tax_ids.len()
                ))
            })?
            .clone();

        let result = self.by_tax_id(&tax_id)?;
        Ok(CustomerQuery { tax_id, result })
    }

    /// Notes for an RFC in folio order, including cancelled ones
    pub fn by_tax_id(&self, tax_id: &str) -> NotasResult<QueryResult> {
        let invoices: Vec<Invoice> = self
            .storage
            .invoices
            .get_all()?
            .into_iter()
            .filter(|i| i.tax_id == tax_id)
            .collect();

        if invoices.is_empty() {
            return Err(NotasError::customer_not_found(tax_id));
        }
        Ok(QueryResult::new(invoices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::NotasPaths;
    use crate::models::LineItem;
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

    fn add(storage: &Storage, issued: NaiveDate, tax_id: &str, cents: &[i64]) -> Folio {
        let folio = storage.invoices.next_folio().unwrap();
        let items = cents
            .iter()
            .enumerate()
            .map(|(n, c)| LineItem::new(format!("Servicio {}", n + 1), Money::from_cents(*c)))
            .collect();
        storage
            .invoices
            .append(Invoice::new(
                folio,
                issued,
                "Cliente",
                tax_id,
                "c@example.com",
                items,
            ))
            .unwrap();
        folio
    }

    #[test]
    fn test_period_defaults() {
        let today = date(2024, 6, 1);
        let period = Period::resolve(None, None, today).unwrap();
        assert_eq!(period.start, date(2000, 1, 1));
        assert_eq!(period.end, today);
    }

    #[test]
    fn test_inverted_period_rejected() {
        let err = Period::resolve(Some(date(2024, 3, 1)), Some(date(2024, 2, 1)), date(2024, 6, 1))
            .unwrap_err();
        assert!(matches!(err, NotasError::InvalidRange { .. }));
    }

    #[test]
    fn test_parse_period_bound() {
        assert_eq!(parse_period_bound("  ", "%Y-%m-%d").unwrap(), None);
        assert_eq!(
            parse_period_bound("2024-02-29", "%Y-%m-%d").unwrap(),
            Some(date(2024, 2, 29))
        );
        assert!(parse_period_bound("2023-02-29", "%Y-%m-%d").is_err());
    }

    #[test]
    fn test_by_period_filters_and_averages() {
        let (_temp_dir, storage) = create_test_storage();
        add(&storage, date(2024, 1, 10), "AAA010101AA1", &[10000]);
        add(&storage, date(2024, 2, 10), "AAA010101AA1", &[20000, 5000]);
        add(&storage, date(2024, 5, 10), "BBB010101BB1", &[99900]);

        let service = QueryService::new(&storage);
        let result = service
            .by_period(Period {
                start: date(2024, 1, 1),
                end: date(2024, 2, 10),
            })
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.mean, Some(Money::from_cents(17500)));
        assert_eq!(result.total(), Money::from_cents(35000));
    }

    #[test]
    fn test_by_period_orders_by_date() {
        let (_temp_dir, storage) = create_test_storage();
        add(&storage, date(2024, 3, 1), "AAA010101AA1", &[100]);
        add(&storage, date(2024, 1, 1), "AAA010101AA1", &[100]);

        let result = QueryService::new(&storage)
            .by_period(Period::resolve(None, None, date(2024, 6, 1)).unwrap())
            .unwrap();
        let folios: Vec<u32> = result.invoices.iter().map(|i| i.folio.value()).collect();
        assert_eq!(folios, vec![2, 1]);
    }

    #[test]
    fn test_cancelled_excluded_from_period() {
        let (_temp_dir, storage) = create_test_storage();
        let folio = add(&storage, date(2024, 1, 10), "AAA010101AA1", &[100]);
        storage.invoices.update_date(folio, None).unwrap();

        let result = QueryService::new(&storage)
            .by_period(Period::resolve(None, None, date(2024, 6, 1)).unwrap())
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(result.mean, None);
    }

    #[test]
    fn test_by_folio_includes_cancelled() {
        let (_temp_dir, storage) = create_test_storage();
        let folio = add(&storage, date(2024, 1, 10), "AAA010101AA1", &[100]);
        storage.invoices.update_date(folio, None).unwrap();

        let service = QueryService::new(&storage);
        assert!(service.by_folio(folio).unwrap().is_cancelled());

        let missing = service.by_folio(Folio::new(9).unwrap()).unwrap_err();
        assert!(missing.is_not_found());
    }

    #[test]
    fn test_by_customer_selection() {
        let (_temp_dir, storage) = create_test_storage();
        add(&storage, date(2024, 1, 10), "ZZZ010101ZZ1", &[100]);
        add(&storage, date(2024, 1, 11), "AAA010101AA1", &[100]);
        let cancelled = add(&storage, date(2024, 1, 12), "AAA010101AA1", &[301]);
        storage.invoices.update_date(cancelled, None).unwrap();

        let service = QueryService::new(&storage);
        assert_eq!(
            service.customer_tax_ids().unwrap(),
            vec!["AAA010101AA1".to_string(), "ZZZ010101ZZ1".to_string()]
        );

        let first = service.by_customer(1).unwrap();
        assert_eq!(first.tax_id, "AAA010101AA1");
        assert_eq!(first.result.len(), 2);
        assert_eq!(first.result.mean, Some(Money::from_cents(201)));

        assert!(service.by_customer(0).unwrap_err().is_validation());
        assert!(service.by_customer(3).unwrap_err().is_validation());
    }

    #[test]
    fn test_by_customer_with_empty_store() {
        let (_temp_dir, storage) = create_test_storage();
        let err = QueryService::new(&storage).by_customer(1).unwrap_err();
        assert!(matches!(err, NotasError::EmptyResult(_)));
    }
}
