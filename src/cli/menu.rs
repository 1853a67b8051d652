//! Interactive menu
//!
//! Top level: register, queries, cancel, recover, exit. The query submenu
//! offers period, folio and customer lookups. Errors are reported and the
//! loop keeps going, except persistence errors which end the session.

use std::io::{BufRead, Write};

use chrono::{Local, NaiveDate};

use crate::config::{NotasPaths, Settings};
use crate::display::{
    format_invoice_details, format_invoice_table, format_summary, format_tax_id_choices,
};
use crate::error::{NotasError, NotasResult};
use crate::export::{default_export_path, export_invoices, PERIOD_EXPORT_STEM};
use crate::models::Invoice;
use crate::services::{
    parse_period_bound, HeaderInput, InvoiceBuilder, InvoiceService, ItemStep, LifecycleOutcome,
    LifecycleService, Period, QueryService,
};
use crate::storage::Storage;

use super::prompt::Prompt;

/// Today's date on the local clock
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Interactive session over a storage handle
pub struct Console<'a, R, W> {
    storage: &'a Storage,
    settings: &'a Settings,
    prompt: Prompt<R, W>,
    clock: fn() -> NaiveDate,
}

enum MainChoice {
    Register,
    Queries,
    Cancel,
    Recover,
    Exit,
}

impl<'a, R: BufRead, W: Write> Console<'a, R, W> {
    pub fn new(storage: &'a Storage, settings: &'a Settings, prompt: Prompt<R, W>) -> Self {
        Self {
            storage,
            settings,
            prompt,
            clock: local_today,
        }
    }

    /// Replace the clock used for "today"
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    /// Hand back the prompt, mainly to inspect scripted output
    pub fn into_prompt(self) -> Prompt<R, W> {
        self.prompt
    }

    fn paths(&self) -> &NotasPaths {
        self.storage.paths()
    }

    fn symbol(&self) -> &str {
        &self.settings.currency_symbol
    }

    /// Run until the user exits or input runs out
    pub fn run(&mut self) -> NotasResult<()> {
        loop {
            self.prompt.say("")?;
            self.prompt.say("=== Notas de servicio ===")?;
            self.prompt.say("1. Register note")?;
            self.prompt.say("2. Queries")?;
            self.prompt.say("3. Cancel note")?;
            self.prompt.say("4. Recover note")?;
            self.prompt.say("5. Exit")?;

            let Some(answer) = self.prompt.read_line("Choose an option: ")? else {
                return Ok(());
            };

            let choice = match answer.trim() {
                "1" => MainChoice::Register,
                "2" => MainChoice::Queries,
                "3" => MainChoice::Cancel,
                "4" => MainChoice::Recover,
                "5" => MainChoice::Exit,
                other => {
                    self.prompt
                        .say(format!("'{}' is not a valid option.", other))?;
                    continue;
                }
            };

            let result = match choice {
                MainChoice::Register => self.register(),
                MainChoice::Queries => self.queries(),
                MainChoice::Cancel => self.cancel(),
                MainChoice::Recover => self.recover(),
                MainChoice::Exit => match self.prompt.confirm("Exit the program?") {
                    Ok(true) => return Ok(()),
                    Ok(false) => Ok(()),
                    Err(e) => Err(e),
                },
            };

            self.report(result)?;
        }
    }

    /// Print a non-fatal error and continue; hand fatal ones back
    fn report(&mut self, result: NotasResult<()>) -> NotasResult<()> {
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => self.prompt.say(format!("Error: {}", e)),
        }
    }

    fn register(&mut self) -> NotasResult<()> {
        let mut builder = InvoiceBuilder::new(self.settings, (self.clock)());

        loop {
            let input = self.prompt.ask("Fecha (YYYY-MM-DD): ")?;
            match builder.submit_date(&input) {
                Ok(_) => break,
                Err(e) => self.prompt.say(e.to_string())?,
            }
        }

        let customer_name = self.prompt.ask("Cliente: ")?;
        let tax_id = self.prompt.ask("RFC: ")?;
        let email = self.prompt.ask("Correo: ")?;
        builder.submit_header(HeaderInput {
            customer_name,
            tax_id,
            email,
        })?;

        let name_label = format!(
            "Servicio ('{}' para terminar): ",
            self.settings.finish_sentinel
        );
        loop {
            let name = self.prompt.ask(&name_label)?;
            if builder.submit_item_name(&name)? == ItemStep::Finished {
                break;
            }
            loop {
                let cost = self.prompt.ask("Costo: ")?;
                match builder.submit_item_cost(&cost) {
                    Ok(item) => {
                        let total = builder.running_total().format_with_symbol(self.symbol());
                        self.prompt
                            .say(format!("Added {} (total {})", item.name, total))?;
                        break;
                    }
                    Err(e) => self.prompt.say(e.to_string())?,
                }
            }
        }

        let invoice = InvoiceService::new(self.storage).commit(&builder)?;
        self.prompt
            .say(format_invoice_details(&invoice, self.symbol()))?;
        self.prompt
            .say(format!("Note {} registered.", invoice.folio))
    }

    fn queries(&mut self) -> NotasResult<()> {
        loop {
            self.prompt.say("")?;
            self.prompt.say("--- Queries ---")?;
            self.prompt.say("1. By period")?;
            self.prompt.say("2. By folio")?;
            self.prompt.say("3. By customer")?;
            self.prompt.say("4. Back")?;

            let answer = self.prompt.ask("Choose an option: ")?;
            let result = match answer.trim() {
                "1" => self.query_period(),
                "2" => self.query_folio(),
                "3" => self.query_customer(),
                "4" => return Ok(()),
                other => self
                    .prompt
                    .say(format!("'{}' is not a valid option.", other)),
            };
            self.report(result)?;
        }
    }

    fn query_period(&mut self) -> NotasResult<()> {
        let format = self.settings.date_format.clone();
        let start = parse_period_bound(
            &self.prompt.ask("Start date (blank for 2000-01-01): ")?,
            &format,
        )?;
        let end = parse_period_bound(&self.prompt.ask("End date (blank for today): ")?, &format)?;

        let today = (self.clock)();
        let period = Period::resolve(start, end, today)?;
        let result = QueryService::new(self.storage).by_period(period)?;

        if result.is_empty() {
            return self.prompt.say(format!(
                "No notes issued between {} and {}.",
                period.start, period.end
            ));
        }

        self.prompt
            .say(format_invoice_table(&result.invoices, self.symbol()))?;
        self.prompt.say(format_summary(&result, self.symbol()))?;
        self.offer_export(&result.invoices, PERIOD_EXPORT_STEM, today)
    }

    fn query_folio(&mut self) -> NotasResult<()> {
        let Some(folio) = self.prompt.ask_folio("Folio: ")? else {
            return Ok(());
        };

        let invoice = QueryService::new(self.storage).by_folio(folio)?;
        if invoice.is_cancelled() {
            self.prompt.say("This note is cancelled.")?;
        }
        self.prompt
            .say(format_invoice_details(&invoice, self.symbol()))
    }

    fn query_customer(&mut self) -> NotasResult<()> {
        let service = QueryService::new(self.storage);
        let tax_ids = service.customer_tax_ids()?;
        if tax_ids.is_empty() {
            return Err(NotasError::EmptyResult("there are no customers yet".into()));
        }

        self.prompt.say(format_tax_id_choices(&tax_ids))?;
        let answer = self.prompt.ask("Select a customer: ")?;
        let selection: usize = answer.trim().parse().map_err(|_| {
            NotasError::Validation(format!("'{}' is not a number", answer.trim()))
        })?;

        let query = service.by_customer(selection)?;
        self.prompt.say(format!("Customer {}", query.tax_id))?;
        self.prompt
            .say(format_invoice_table(&query.result.invoices, self.symbol()))?;
        self.prompt
            .say(format_summary(&query.result, self.symbol()))?;
        self.offer_export(&query.result.invoices, &query.tax_id, (self.clock)())
    }

    fn offer_export(&mut self, invoices: &[Invoice], stem: &str, today: NaiveDate) -> NotasResult<()> {
        if !self.prompt.confirm("Export to a spreadsheet?")? {
            return Ok(());
        }

        let format = self.settings.export_format;
        let path = default_export_path(self.paths(), stem, today, format);
        export_invoices(invoices, &path, format)?;
        self.prompt.say(format!("Exported to {}", path.display()))
    }

    fn cancel(&mut self) -> NotasResult<()> {
        let Some(folio) = self.prompt.ask_folio("Folio to cancel (blank to go back): ")? else {
            return Ok(());
        };

        let service = LifecycleService::new(self.storage, self.settings);
        let symbol = self.settings.currency_symbol.as_str();
        let prompt = &mut self.prompt;

        let outcome = service.cancel(folio, |invoice| {
            prompt.say(format_invoice_details(invoice, symbol))?;
            prompt.confirm("Cancel this note?")
        })?;

        match outcome {
            LifecycleOutcome::Applied(invoice) => {
                self.prompt.say(format!("Note {} cancelled.", invoice.folio))
            }
            LifecycleOutcome::Declined => self.prompt.say("Nothing was changed."),
        }
    }

    fn recover(&mut self) -> NotasResult<()> {
        let service = LifecycleService::new(self.storage, self.settings);
        let cancelled = service.list_cancelled()?;

        self.prompt.say("Cancelled notes:")?;
        self.prompt
            .say(format_invoice_table(&cancelled, self.symbol()))?;

        let Some(folio) = self.prompt.ask_folio("Folio to recover (blank to go back): ")? else {
            return Ok(());
        };

        let today = (self.clock)();
        let symbol = self.settings.currency_symbol.as_str();
        let prompt = &mut self.prompt;

        let outcome = service.recover(folio, today, |invoice| {
            let date = service.recovery_date(invoice, today);
            prompt.say(format_invoice_details(invoice, symbol))?;
            prompt.confirm(&format!("Recover this note with date {}?", date))
        })?;

        match outcome {
            LifecycleOutcome::Applied(invoice) => self.prompt.say(format!(
                "Note {} recovered: {}",
                invoice.folio,
                invoice
            )),
            LifecycleOutcome::Declined => self.prompt.say("Nothing was changed."),
        }
    }
}
