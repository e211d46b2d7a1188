//! Generate config command

use std::path::Path;

use colored::Colorize;

use super::prompt::confirm;
use crate::interfaces::cli::CliError;

/// Generate example configuration file
pub async fn config_generate(output_path: Option<String>, force: bool) -> Result<(), CliError> {
    let path = output_path.unwrap_or_else(|| "config.example.toml".to_string());

    if !force && Path::new(&path).exists() {
        let prompt = format!(
            "{} {} {}",
            "File already exists:".yellow(),
            path.blue(),
            "Overwrite?".yellow()
        );
        if !confirm(&prompt) {
            println!("{}", "Aborted.".red());
            return Ok(());
        }
    }

    println!(
        "{} {}",
        "Generating configuration file...".yellow(),
        path.blue()
    );

    if let Err(e) = crate::config::StaticConfig::default().save_to_file(&path) {
        println!(
            "  {} {}",
            "Failed to generate configuration file".red(),
            e.to_string().red()
        );
        return Err(CliError::CommandError(format!(
            "Unable to write configuration file: {}",
            e
        )));
    }

    println!(
        "  {} {}",
        "Configuration file generated successfully".green(),
        path.blue()
    );
    println!(
        "  {}",
        "Set auth.jwt_secret (or GEO__AUTH__JWT_SECRET) before exposing the server".dimmed()
    );
    Ok(())
}
