//! 调用运行中服务器的客户端命令

use colored::Colorize;

use super::prompt::{confirm, get_password};
use crate::cli::{ClientCommands, ClientConnection};
use crate::client::render::{render_history, render_location, render_page};
use crate::client::{HomePage, HttpGeoApi};
use crate::config::try_get_config;
use crate::interfaces::cli::CliError;

pub async fn run_client_command(
    conn: ClientConnection,
    action: ClientCommands,
) -> Result<(), CliError> {
    let api_prefix = conn.api_prefix.clone().unwrap_or_else(|| {
        try_get_config()
            .map(|c| c.routes.api_prefix.clone())
            .unwrap_or_else(|| "/api".to_string())
    });
    let api = HttpGeoApi::new(&conn.server, &api_prefix, conn.token.clone());

    match action {
        ClientCommands::Login { email, password } => {
            let password = get_password(password, false, false)?;
            let login = api.login(&email, &password).await?;
            println!(
                "{} Logged in as {} <{}>",
                "✓".green().bold(),
                login.user.name.cyan(),
                login.user.email
            );
            println!("  {} {}s", "Expires in:".dimmed(), login.expires_in);
            println!("export GEO_TOKEN={}", login.token);
            Ok(())
        }

        ClientCommands::Logout => {
            require_token(&conn)?;
            api.logout().await?;
            println!("{} Logged out", "✓".green().bold());
            Ok(())
        }

        ClientCommands::Whoami => {
            require_token(&conn)?;
            let user = api.current_user().await?;
            println!("{} <{}>", user.name.cyan(), user.email);
            println!("  {} {}", "ID:".dimmed(), user.id);
            println!(
                "  {} {}",
                "Created:".dimmed(),
                user.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            Ok(())
        }

        ClientCommands::Lookup { ip } => {
            require_token(&conn)?;
            let mut page = HomePage::new(api);
            match ip {
                Some(ip) => {
                    page.set_ip_input(ip);
                    page.submit_search().await;
                }
                None => page.fetch_self_location().await,
            }
            print_lookup(&page)
        }

        ClientCommands::Home => {
            require_token(&conn)?;
            let mut page = HomePage::new(api);
            page.mount().await;
            print!("{}", render_page(&page));
            Ok(())
        }

        ClientCommands::History => {
            require_token(&conn)?;
            let mut page = HomePage::new(api);
            page.refresh_history().await;
            print!("{}", render_history(&page.state().history, &[]));
            Ok(())
        }

        ClientCommands::Delete { ids, yes } => {
            require_token(&conn)?;
            let mut page = HomePage::new(api);
            page.refresh_history().await;
            for id in ids {
                if !page.state().selected.contains(&id) {
                    page.toggle_selection(id);
                }
            }

            match page.delete_selected(|prompt| yes || confirm(prompt)).await {
                Some(count) => {
                    println!("{} Deleted {} item(s)", "✓".green().bold(), count);
                    Ok(())
                }
                None => match &page.state().error {
                    Some(error) => Err(CliError::CommandError(error.clone())),
                    None => {
                        println!("{}", "Aborted.".red());
                        Ok(())
                    }
                },
            }
        }
    }
}

fn require_token(conn: &ClientConnection) -> Result<(), CliError> {
    if conn.token.as_deref().is_none_or(str::is_empty) {
        return Err(CliError::CommandError(
            "No token provided. Run `client login` and pass --token or set GEO_TOKEN.".to_string(),
        ));
    }
    Ok(())
}

fn print_lookup(page: &HomePage<HttpGeoApi>) -> Result<(), CliError> {
    let state = page.state();
    if let Some(error) = &state.error {
        return Err(CliError::CommandError(error.clone()));
    }
    if let Some(geo) = &state.geo_data {
        print!("{}", render_location(geo));
    }
    Ok(())
}
