pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod session;
pub mod transfer;

pub use client::ClientDriver;
pub use config::Settings;
pub use server::Server;
