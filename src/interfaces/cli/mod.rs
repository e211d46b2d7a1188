//! CLI interface module
//!
//! This module provides command-line interface functionality for geolocator.

pub mod commands;

use crate::cli::{Commands, ConfigCommands};
use std::fmt;

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<crate::errors::GeolocatorError> for CliError {
    fn from(err: crate::errors::GeolocatorError) -> Self {
        use crate::errors::GeolocatorError;
        match err {
            GeolocatorError::DatabaseConfig(msg)
            | GeolocatorError::DatabaseConnection(msg)
            | GeolocatorError::DatabaseOperation(msg) => CliError::StorageError(msg),
            GeolocatorError::Validation(msg) => CliError::ParseError(msg),
            other => CliError::CommandError(other.format_simple()),
        }
    }
}

/// Run a CLI command from clap-parsed input
///
/// `serve` 由 main 直接启动服务器，不经过这里。
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    match cmd {
        Commands::User { action } => commands::run_user_command(action).await,

        // Generate doesn't need DB connection
        Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        } => commands::config_generate(output_path, force).await,

        Commands::Client { conn, action } => commands::run_client_command(conn, action).await,

        Commands::Serve => Err(CliError::CommandError(
            "serve must be started from the main entry point".to_string(),
        )),
    }
}
