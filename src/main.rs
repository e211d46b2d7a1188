use clap::Parser;

use geolocator::cli::{Cli, Commands};
use geolocator::config::{get_config, init_config_from};
use geolocator::runtime::modes;
use geolocator::system::logging::init_logging;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config_from(&cli.config);

    // guard 必须存活到进程结束，否则文件日志会丢失
    let _log_guard = init_logging(&get_config().logging);

    match cli.command {
        None | Some(Commands::Serve) => {
            if let Err(e) = modes::run_server().await {
                eprintln!("{} {:#}", colored::Colorize::red("Server error:"), e);
                std::process::exit(1);
            }
        }
        Some(cmd) => {
            if let Err(e) = modes::run_cli(cmd).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
