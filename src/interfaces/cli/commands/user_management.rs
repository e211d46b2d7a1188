//! 用户账户管理（直接访问数据库）

use std::sync::Arc;

use colored::Colorize;
use tracing::warn;

use super::prompt::get_password;
use crate::api::jwt::JwtService;
use crate::cli::UserCommands;
use crate::config::get_config;
use crate::interfaces::cli::CliError;
use crate::services::AuthService;
use crate::storage::StorageFactory;

pub async fn run_user_command(action: UserCommands) -> Result<(), CliError> {
    let storage = StorageFactory::create()
        .await
        .map_err(|e| CliError::StorageError(e.to_string()))?;
    let jwt = Arc::new(JwtService::from_config(&get_config().auth));
    let auth = AuthService::new(storage.clone(), jwt);

    let result = match action {
        UserCommands::Create {
            name,
            email,
            password,
            stdin,
        } => create_user(&auth, &name, &email, password, stdin).await,
        UserCommands::ResetPassword {
            email,
            password,
            stdin,
        } => reset_password(&auth, &email, password, stdin).await,
        UserCommands::List => list_users(&auth).await,
    };

    if let Err(e) = storage.close().await {
        warn!("Failed to close database connections: {}", e);
    }
    result
}

async fn create_user(
    auth: &AuthService,
    name: &str,
    email: &str,
    password: Option<String>,
    stdin: bool,
) -> Result<(), CliError> {
    let password = get_password(password, stdin, true)?;
    let user = auth.create_user(name, email, &password).await?;
    println!(
        "{} Created user #{} {} <{}>",
        "✓".green().bold(),
        user.id,
        user.name.cyan(),
        user.email
    );
    Ok(())
}

async fn reset_password(
    auth: &AuthService,
    email: &str,
    password: Option<String>,
    stdin: bool,
) -> Result<(), CliError> {
    let password = get_password(password, stdin, true)?;
    let user = auth.reset_password(email, &password).await?;
    println!(
        "{} Password reset for {}",
        "✓".green().bold(),
        user.email.cyan()
    );
    Ok(())
}

async fn list_users(auth: &AuthService) -> Result<(), CliError> {
    let users = auth.list_users().await?;
    if users.is_empty() {
        println!("{}", "No users found".yellow());
        return Ok(());
    }

    println!("{}", format!("Users ({})", users.len()).bold());
    for user in users {
        println!(
            "  #{:<5} {:<24} {}  {}",
            user.id,
            user.name.cyan(),
            user.email,
            user.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
        );
    }
    Ok(())
}
