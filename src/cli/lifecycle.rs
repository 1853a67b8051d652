//! Cancel and recover CLI commands
//!
//! Without `--force` the note is shown and confirmation is read from stdin.

use crate::config::Settings;
use crate::display::format_invoice_details;
use crate::error::NotasResult;
use crate::models::Folio;
use crate::services::{LifecycleOutcome, LifecycleService};
use crate::storage::Storage;

use super::menu::local_today;
use super::prompt::Prompt;

/// Handle `notas cancel`
pub fn handle_cancel_command(
    storage: &Storage,
    settings: &Settings,
    folio: &str,
    force: bool,
) -> NotasResult<()> {
    let folio: Folio = folio.parse()?;
    let service = LifecycleService::new(storage, settings);

    let outcome = service.cancel(folio, |invoice| {
        if force {
            return Ok(true);
        }
        print!("{}", format_invoice_details(invoice, &settings.currency_symbol));
        Prompt::stdio().confirm("Cancel this note?")
    })?;

    match outcome {
        LifecycleOutcome::Applied(invoice) => println!("Note {} cancelled.", invoice.folio),
        LifecycleOutcome::Declined => println!("Nothing was changed."),
    }
    Ok(())
}

/// Handle `notas recover`
pub fn handle_recover_command(
    storage: &Storage,
    settings: &Settings,
    folio: &str,
    force: bool,
) -> NotasResult<()> {
    let folio: Folio = folio.parse()?;
    let service = LifecycleService::new(storage, settings);
    let today = local_today();

    let outcome = service.recover(folio, today, |invoice| {
        if force {
            return Ok(true);
        }
        print!("{}", format_invoice_details(invoice, &settings.currency_symbol));
        let date = service.recovery_date(invoice, today);
        Prompt::stdio().confirm(&format!("Recover this note with date {}?", date))
    })?;

    match outcome {
        LifecycleOutcome::Applied(invoice) => {
            println!("Note {} recovered: {}", invoice.folio, invoice)
        }
        LifecycleOutcome::Declined => println!("Nothing was changed."),
    }
    Ok(())
}
