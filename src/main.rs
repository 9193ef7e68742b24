//! guest-ftp server - Entry Point
//!
//! Usage: `guest-ftp-server [control-port]`

use log::{error, info};
use std::process::ExitCode;

use guest_ftp::config::{ServerMode, Settings};
use guest_ftp::server::{Server, run_local};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    let settings = match Settings::load("server.control_port", std::env::args().nth(1)) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            eprintln!("guest-ftp-server: {e}");
            return ExitCode::FAILURE;
        }
    };
    let config = settings.server;

    match config.mode {
        ServerMode::Networked => {
            info!("Launching FTP server...");
            match Server::bind(config).await {
                Ok(server) => {
                    server.start().await;
                    info!("Server stopped");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("guest-ftp-server: cannot bind control socket: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        ServerMode::Local => match run_local(&config).await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                error!("Local session failed: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}
