//! Command-line interface definitions using clap

use clap::{Args, Parser, Subcommand};

/// Geolocator - IP geolocation lookup with per-user search history
#[derive(Parser, Debug)]
#[command(name = "geolocator")]
#[command(version)]
#[command(about = "IP geolocation lookup service with per-user search history", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(long, short = 'c', global = true, default_value = crate::config::DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Manage user accounts (direct database access)
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Talk to a running server
    Client {
        #[command(flatten)]
        conn: ClientConnection,

        #[command(subcommand)]
        action: ClientCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create a user
    Create {
        /// Display name
        #[arg(long)]
        name: String,

        /// Login email (unique)
        #[arg(long)]
        email: String,

        /// Password (if not provided, will prompt interactively)
        #[arg(long)]
        password: Option<String>,

        /// Read password from stdin (for scripting)
        #[arg(long)]
        stdin: bool,
    },

    /// Reset a user's password
    ResetPassword {
        /// Login email
        #[arg(long)]
        email: String,

        /// New password (if not provided, will prompt interactively)
        #[arg(long)]
        password: Option<String>,

        /// Read password from stdin (for scripting)
        #[arg(long)]
        stdin: bool,
    },

    /// List all users
    List,
}

/// Configuration management commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },
}

/// Server connection options for client commands
#[derive(Args, Debug, Clone)]
pub struct ClientConnection {
    /// Server base URL
    #[arg(long, env = "GEO_SERVER_URL", default_value = "http://127.0.0.1:8080")]
    pub server: String,

    /// Bearer token from `client login`
    #[arg(long, env = "GEO_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// API route prefix (defaults to routes.api_prefix from config)
    #[arg(long)]
    pub api_prefix: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ClientCommands {
    /// Log in and print a bearer token
    Login {
        #[arg(long)]
        email: String,

        /// Password (if not provided, will prompt interactively)
        #[arg(long)]
        password: Option<String>,
    },

    /// Revoke the current token
    Logout,

    /// Show the account the token belongs to
    Whoami,

    /// Look up an IP address (omit for your own location)
    Lookup {
        ip: Option<String>,
    },

    /// Show your location and search history
    Home,

    /// List search history
    History,

    /// Delete history entries by id
    Delete {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<i64>,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["geolocator"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, "config.toml");
    }

    #[test]
    fn test_parse_user_create() {
        let cli = Cli::try_parse_from([
            "geolocator",
            "user",
            "create",
            "--name",
            "Ada",
            "--email",
            "ada@example.com",
            "--password",
            "secret123",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::User {
                action: UserCommands::Create { name, email, password, stdin },
            }) => {
                assert_eq!(name, "Ada");
                assert_eq!(email, "ada@example.com");
                assert_eq!(password.as_deref(), Some("secret123"));
                assert!(!stdin);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_client_delete() {
        let cli = Cli::try_parse_from([
            "geolocator",
            "client",
            "--server",
            "http://localhost:9000",
            "delete",
            "1",
            "2",
            "-y",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Client {
                conn,
                action: ClientCommands::Delete { ids, yes },
            }) => {
                assert_eq!(conn.server, "http://localhost:9000");
                assert_eq!(ids, vec![1, 2]);
                assert!(yes);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_client_whoami() {
        let cli = Cli::try_parse_from([
            "geolocator",
            "client",
            "--token",
            "abc",
            "whoami",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Client {
                conn,
                action: ClientCommands::Whoami,
            }) => assert_eq!(conn.token.as_deref(), Some("abc")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_client_delete_requires_ids() {
        assert!(Cli::try_parse_from(["geolocator", "client", "delete"]).is_err());
    }
}
