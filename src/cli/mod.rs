//! CLI command handlers
//!
//! This module contains the interactive console and the scripted
//! subcommands, bridging clap argument parsing with the service layer.

pub mod export;
pub mod history;
pub mod lifecycle;
pub mod menu;
pub mod prompt;
pub mod query;
pub mod register;

pub use export::{handle_export_command, ExportArgs};
pub use history::handle_history_command;
pub use lifecycle::{handle_cancel_command, handle_recover_command};
pub use menu::Console;
pub use prompt::Prompt;
pub use query::{handle_query_command, QueryCommands};
pub use register::{handle_register_command, RegisterArgs};
