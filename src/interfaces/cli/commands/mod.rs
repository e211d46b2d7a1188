//! CLI command implementations

mod client_commands;
mod config_gen;
mod prompt;
mod user_management;

pub use client_commands::run_client_command;
pub use config_gen::config_generate;
pub use user_management::run_user_command;
