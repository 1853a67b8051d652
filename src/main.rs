use anyhow::Result;
use clap::{Parser, Subcommand};

use notas_cli::cli::{
    handle_cancel_command, handle_export_command, handle_history_command, handle_query_command,
    handle_recover_command, handle_register_command, Console, ExportArgs, Prompt, QueryCommands,
    RegisterArgs,
};
use notas_cli::config::{NotasPaths, Settings};
use notas_cli::storage::Storage;

#[derive(Parser)]
#[command(
    name = "notas",
    version,
    about = "Service note register for the terminal",
    long_about = "Notas registers service notes (notas de servicio) with itemised \
                  charges, queries them by period, folio or customer, cancels and \
                  recovers them, and exports them to spreadsheets."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the interactive menu (default)
    Menu,

    /// Register a note from flags
    Register(RegisterArgs),

    /// Query notes
    #[command(subcommand)]
    Query(QueryCommands),

    /// Cancel an active note
    Cancel {
        /// Folio number
        folio: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Recover a cancelled note
    Recover {
        /// Folio number
        folio: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Export a customer's notes to a spreadsheet
    Export(ExportArgs),

    /// Show the audit history
    History {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Only entries for this folio
        #[arg(short, long)]
        folio: Option<String>,
    },

    /// Show configuration paths and settings
    Config {
        /// Write the current settings to the settings file
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = NotasPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    // A store that exists but fails to load stops here
    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => {
            Console::new(&storage, &settings, Prompt::stdio()).run()?;
        }
        Commands::Register(args) => {
            handle_register_command(&storage, &settings, args)?;
        }
        Commands::Query(cmd) => {
            handle_query_command(&storage, &settings, cmd)?;
        }
        Commands::Cancel { folio, force } => {
            handle_cancel_command(&storage, &settings, &folio, force)?;
        }
        Commands::Recover { folio, force } => {
            handle_recover_command(&storage, &settings, &folio, force)?;
        }
        Commands::Export(args) => {
            handle_export_command(&storage, &settings, args)?;
        }
        Commands::History { limit, folio } => {
            handle_history_command(&storage, limit, folio.as_deref())?;
        }
        Commands::Config { init } => {
            if init {
                settings.save(&paths)?;
                println!("Settings written to {}", paths.settings_file().display());
                println!();
            }
            println!("Notas Configuration");
            println!("===================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!("Data file:        {}", paths.invoices_file().display());
            println!("Audit log:        {}", paths.audit_log().display());
            println!("Export directory: {}", paths.export_dir().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol:  {}", settings.currency_symbol);
            println!("  Date format:      {}", settings.date_format);
            println!("  Finish sentinel:  {}", settings.finish_sentinel);
            println!("  Recovery date:    {:?}", settings.recovery_date);
            println!("  Export format:    {:?}", settings.export_format);
        }
    }

    Ok(())
}
