//! Audit history CLI command

use crate::error::NotasResult;
use crate::models::Folio;
use crate::storage::Storage;

/// Handle `notas history`: the most recent entries, or every entry for one
/// folio, oldest first
pub fn handle_history_command(
    storage: &Storage,
    limit: usize,
    folio: Option<&str>,
) -> NotasResult<()> {
    let entries = match folio {
        Some(folio) => storage.audit().read_for_folio(folio.parse::<Folio>()?)?,
        None => storage.audit().read_recent(limit)?,
    };

    if entries.is_empty() {
        println!("No history recorded yet.");
        return Ok(());
    }

    for entry in entries {
        println!("{}", entry.format_human_readable());
    }
    Ok(())
}
