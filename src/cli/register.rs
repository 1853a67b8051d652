//! Register CLI command
//!
//! Registers a note from flags instead of the interactive wizard.

use clap::Args;

use crate::config::Settings;
use crate::display::format_invoice_details;
use crate::error::{NotasError, NotasResult};
use crate::services::{CreateInvoiceInput, InvoiceService};
use crate::storage::Storage;

use super::menu::local_today;

/// Arguments for `notas register`
#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Issue date (YYYY-MM-DD), not after today
    #[arg(short, long)]
    pub date: String,

    /// Customer name
    #[arg(short, long)]
    pub customer: String,

    /// Customer RFC
    #[arg(short, long)]
    pub rfc: String,

    /// Customer email
    #[arg(short, long)]
    pub email: String,

    /// Service as "Name=Cost"; repeat for each service
    #[arg(short, long = "item", value_name = "NAME=COST")]
    pub items: Vec<String>,
}

/// Split "Name=Cost" on the last '='
pub fn parse_item(raw: &str) -> NotasResult<(String, String)> {
    let (name, cost) = raw.rsplit_once('=').ok_or_else(|| {
        NotasError::Validation(format!("Item '{}' must look like Name=Cost", raw))
    })?;

    if name.trim().is_empty() {
        return Err(NotasError::Validation(format!(
            "Item '{}' has no service name",
            raw
        )));
    }
    Ok((name.trim().to_string(), cost.trim().to_string()))
}

/// Handle `notas register`
pub fn handle_register_command(
    storage: &Storage,
    settings: &Settings,
    args: RegisterArgs,
) -> NotasResult<()> {
    let items = args
        .items
        .iter()
        .map(|raw| parse_item(raw))
        .collect::<NotasResult<Vec<_>>>()?;

    let invoice = InvoiceService::new(storage).create(
        settings,
        local_today(),
        CreateInvoiceInput {
            date: args.date,
            customer_name: args.customer,
            tax_id: args.rfc,
            email: args.email,
            items,
        },
    )?;

    print!("{}", format_invoice_details(&invoice, &settings.currency_symbol));
    println!("Note {} registered.", invoice.folio);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item() {
        assert_eq!(
            parse_item("Mano de obra=750.50").unwrap(),
            ("Mano de obra".to_string(), "750.50".to_string())
        );
        assert_eq!(
            parse_item("a=b=10").unwrap(),
            ("a=b".to_string(), "10".to_string())
        );
        assert!(parse_item("Lavado").is_err());
        assert!(parse_item(" =10").is_err());
    }
}
