//! Service layer for Notas
//!
//! The service layer provides business logic on top of the storage layer:
//! the registration workflow, queries and the cancel/recover lifecycle.

pub mod builder;
pub mod invoice;
pub mod lifecycle;
pub mod query;
pub mod validation;

pub use builder::{HeaderInput, InvoiceBuilder, ItemStep, RegistrationState};
pub use invoice::{CreateInvoiceInput, InvoiceService};
pub use lifecycle::{LifecycleOutcome, LifecycleService};
pub use query::{parse_period_bound, CustomerQuery, Period, QueryResult, QueryService};
