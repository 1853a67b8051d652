//! CLI command for exporting a customer's notes

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::config::{ExportFormat, Settings};
use crate::error::NotasResult;
use crate::export::{default_export_path, export_invoices};
use crate::services::QueryService;
use crate::storage::Storage;

use super::menu::local_today;

/// Export format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    /// Excel workbook
    Xlsx,
    /// Comma-separated values
    Csv,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Xlsx => ExportFormat::Xlsx,
            FormatArg::Csv => ExportFormat::Csv,
        }
    }
}

/// Arguments for `notas export`
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Customer RFC whose notes are exported
    #[arg(long)]
    pub rfc: String,

    /// Output file (defaults to {RFC}_{date} in the export directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to the configured one)
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,
}

/// Handle `notas export`
pub fn handle_export_command(
    storage: &Storage,
    settings: &Settings,
    args: ExportArgs,
) -> NotasResult<()> {
    let format = args
        .format
        .map(ExportFormat::from)
        .unwrap_or(settings.export_format);

    let result = QueryService::new(storage).by_tax_id(&args.rfc)?;
    let path = args.output.unwrap_or_else(|| {
        default_export_path(storage.paths(), &args.rfc, local_today(), format)
    });

    export_invoices(&result.invoices, &path, format)?;
    println!(
        "Exported {} note(s) for {} to {}",
        result.len(),
        args.rfc,
        path.display()
    );
    Ok(())
}
