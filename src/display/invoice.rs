//! Note display formatting
//!
//! Formats notes for terminal output in table, detail and summary views.

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::models::Invoice;
use crate::services::QueryResult;

/// Date column value for cancelled notes
pub const CANCELLED_LABEL: &str = "CANCELADA";

#[derive(Tabled)]
struct InvoiceRow {
    #[tabled(rename = "Folio")]
    folio: u32,
    #[tabled(rename = "Fecha")]
    date: String,
    #[tabled(rename = "Cliente")]
    customer: String,
    #[tabled(rename = "RFC")]
    tax_id: String,
    #[tabled(rename = "Monto")]
    amount: String,
}

impl InvoiceRow {
    fn new(invoice: &Invoice, symbol: &str) -> Self {
        Self {
            folio: invoice.folio.value(),
            date: format_date_cell(invoice),
            customer: invoice.customer_name.clone(),
            tax_id: invoice.tax_id.clone(),
            amount: invoice.amount().format_with_symbol(symbol),
        }
    }
}

fn format_date_cell(invoice: &Invoice) -> String {
    invoice
        .issue_date()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| CANCELLED_LABEL.to_string())
}

/// Format a list of notes as a table
pub fn format_invoice_table(invoices: &[Invoice], symbol: &str) -> String {
    if invoices.is_empty() {
        return "No notes found.".to_string();
    }

    let rows: Vec<InvoiceRow> = invoices.iter().map(|i| InvoiceRow::new(i, symbol)).collect();
    Table::new(rows)
        .with(Style::psql())
        .with(Modify::new(Columns::last()).with(Alignment::right()))
        .to_string()
}

/// Format one note with its header fields and numbered services
pub fn format_invoice_details(invoice: &Invoice, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Folio:    {}\n", invoice.folio));
    output.push_str(&format!("Fecha:    {}\n", format_date_cell(invoice)));
    if invoice.is_cancelled() {
        if let Some(date) = invoice.retained_date() {
            output.push_str(&format!("Emitida:  {}\n", date.format("%Y-%m-%d")));
        }
    }
    output.push_str(&format!("Cliente:  {}\n", invoice.customer_name));
    output.push_str(&format!("RFC:      {}\n", invoice.tax_id));
    output.push_str(&format!("Correo:   {}\n", invoice.email));

    output.push_str("Servicios:\n");
    if invoice.line_items().is_empty() {
        output.push_str("  (none)\n");
    }
    for (n, item) in invoice.line_items().iter().enumerate() {
        output.push_str(&format!(
            "  {}. {:<30} {:>12}\n",
            n + 1,
            item.name,
            item.cost.format_with_symbol(symbol)
        ));
    }

    output.push_str(&format!(
        "Monto:    {}\n",
        invoice.amount().format_with_symbol(symbol)
    ));

    output
}

/// Count and mean line shown under query results
pub fn format_summary(result: &QueryResult, symbol: &str) -> String {
    match result.mean {
        Some(mean) => format!(
            "{} note(s), total {}, mean amount {}",
            result.len(),
            result.total().format_with_symbol(symbol),
            mean.format_with_symbol(symbol)
        ),
        None => "0 notes".to_string(),
    }
}

/// Numbered list of customer RFCs to choose from
pub fn format_tax_id_choices(tax_ids: &[String]) -> String {
    if tax_ids.is_empty() {
        return "No customers found.".to_string();
    }

    tax_ids
        .iter()
        .enumerate()
        .map(|(n, id)| format!("{:>3}. {}", n + 1, id))
        .collect::<Vec<_>>()
        .join("\n")
}
