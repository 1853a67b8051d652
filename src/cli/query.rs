//! Query CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{
    format_invoice_details, format_invoice_table, format_summary, format_tax_id_choices,
};
use crate::error::NotasResult;
use crate::export::{default_export_path, export_invoices, PERIOD_EXPORT_STEM};
use crate::models::{Folio, Invoice};
use crate::services::{parse_period_bound, Period, QueryService};
use crate::storage::Storage;

use super::menu::local_today;

/// Query subcommands
#[derive(Subcommand, Debug)]
pub enum QueryCommands {
    /// Active notes issued within a period
    Period {
        /// Start date (YYYY-MM-DD), defaults to 2000-01-01
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        to: Option<String>,
        /// Also write the result to the export directory
        #[arg(long)]
        export: bool,
    },
    /// One note by folio, cancelled or not
    Folio {
        /// Folio number
        folio: String,
    },
    /// Notes for one customer; lists customers when no selection is given
    Customer {
        /// Position in the customer list (1-based)
        #[arg(short, long)]
        select: Option<usize>,
        /// Also write the result to the export directory
        #[arg(long)]
        export: bool,
    },
}

/// Handle a query command
pub fn handle_query_command(
    storage: &Storage,
    settings: &Settings,
    cmd: QueryCommands,
) -> NotasResult<()> {
    let service = QueryService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        QueryCommands::Period { from, to, export } => {
            let start = parse_period_bound(from.as_deref().unwrap_or(""), &settings.date_format)?;
            let end = parse_period_bound(to.as_deref().unwrap_or(""), &settings.date_format)?;
            let today = local_today();
            let period = Period::resolve(start, end, today)?;

            let result = service.by_period(period)?;
            if result.is_empty() {
                println!("No notes issued between {} and {}.", period.start, period.end);
                return Ok(());
            }

            println!("{}", format_invoice_table(&result.invoices, symbol));
            println!("{}", format_summary(&result, symbol));
            if export {
                write_export(storage, settings, &result.invoices, PERIOD_EXPORT_STEM)?;
            }
        }

        QueryCommands::Folio { folio } => {
            let invoice = service.by_folio(folio.parse::<Folio>()?)?;
            if invoice.is_cancelled() {
                println!("This note is cancelled.");
            }
            print!("{}", format_invoice_details(&invoice, symbol));
        }

        QueryCommands::Customer { select, export } => {
            let Some(selection) = select else {
                println!("{}", format_tax_id_choices(&service.customer_tax_ids()?));
                return Ok(());
            };

            let query = service.by_customer(selection)?;
            println!("Customer {}", query.tax_id);
            println!("{}", format_invoice_table(&query.result.invoices, symbol));
            println!("{}", format_summary(&query.result, symbol));
            if export {
                write_export(storage, settings, &query.result.invoices, &query.tax_id)?;
            }
        }
    }

    Ok(())
}

fn write_export(
    storage: &Storage,
    settings: &Settings,
    invoices: &[Invoice],
    stem: &str,
) -> NotasResult<()> {
    let path = default_export_path(
        storage.paths(),
        stem,
        local_today(),
        settings.export_format,
    );
    export_invoices(invoices, &path, settings.export_format)?;
    println!("Exported to {}", path.display());
    Ok(())
}
