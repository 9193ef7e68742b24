//! guest-ftp client - Entry Point
//!
//! Usage: `guest-ftp-client [data-port]`
//!
//! Requests are read from stdin; commands, replies and diagnostics go to
//! stdout.

use log::{error, info};
use std::process::ExitCode;
use tokio::io::BufReader;

use guest_ftp::client::ClientDriver;
use guest_ftp::config::Settings;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let settings = match Settings::load("client.data_port", std::env::args().nth(1)) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            eprintln!("guest-ftp-client: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!("Starting FTP client (first data port {})", settings.client.data_port);
    let mut driver = ClientDriver::new(tokio::io::stdout(), settings.client);
    let mut input = BufReader::new(tokio::io::stdin());

    match driver.run(&mut input).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Client failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
