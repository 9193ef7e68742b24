//! Configuration management
//!
//! Settings are layered the usual way: built-in defaults, then an optional
//! `config.toml`, then `GUEST_FTP_*` environment variables, then the single
//! positional port argument of the binary.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const CONFIG_FILE: &str = "config";
const ENV_PREFIX: &str = "GUEST_FTP";

/// Complete configuration for both binaries
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub client: ClientConfig,
}

/// How the server is driven.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServerMode {
    /// Serve control connections on a TCP socket.
    Networked,
    /// Read commands from stdin, write replies to stdout, copy retrieved
    /// files locally.
    Local,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub mode: ServerMode,

    /// IP address to bind the control connection
    pub bind_address: String,
    pub control_port: u16,

    /// Directory RETR paths are resolved against
    pub server_root: String,

    /// Where local mode copies retrieved files
    pub retr_dir: String,

    /// Receive timeout on the control channel; a timeout only re-polls
    pub read_timeout_ms: u64,

    /// Bound on connecting back to the client's data port
    pub connect_timeout_secs: u64,

    pub max_command_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            mode: ServerMode::Networked,
            bind_address: "0.0.0.0".to_string(),
            control_port: 2121,
            server_root: ".".to_string(),
            retr_dir: "retr_files".to_string(),
            read_timeout_ms: 5000,
            connect_timeout_secs: 10,
            max_command_length: 512,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClientConfig {
    /// First data port; incremented for every GET. 0 uses ephemeral ports.
    pub data_port: u16,

    /// Where retrieved files are stored
    pub retr_dir: String,

    /// Credentials of the guest login sent after CONNECT
    pub username: String,
    pub password: String,

    pub reply_timeout_ms: u64,
    pub accept_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_port: 0,
            retr_dir: "retr_files".to_string(),
            username: "anonymous".to_string(),
            password: "guest@".to_string(),
            reply_timeout_ms: 5000,
            accept_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Loads settings, with `port_argument` (the binary's positional
    /// argument) overriding the key `port_key`.
    pub fn load(port_key: &str, port_argument: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );

        if let Some(port) = port_argument {
            builder = builder.set_override(port_key, port)?;
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let server = &self.server;
        let client = &self.client;

        if server.mode == ServerMode::Networked && server.control_port == 0 {
            return Err(ConfigError::Message("Control port cannot be 0".into()));
        }

        if server.server_root.is_empty() {
            return Err(ConfigError::Message("server_root cannot be empty".into()));
        }

        if server.retr_dir.is_empty() || client.retr_dir.is_empty() {
            return Err(ConfigError::Message("retr_dir cannot be empty".into()));
        }

        if server.read_timeout_ms == 0 || client.reply_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "read and reply timeouts must be greater than 0".into(),
            ));
        }

        if server.connect_timeout_secs == 0 || client.accept_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "data channel timeouts must be greater than 0".into(),
            ));
        }

        if server.max_command_length == 0 {
            return Err(ConfigError::Message(
                "max_command_length must be greater than 0".into(),
            ));
        }

        if client.username.is_empty() || client.password.is_empty() {
            return Err(ConfigError::Message(
                "guest username and password cannot be empty".into(),
            ));
        }

        Ok(())
    }
}

impl ServerConfig {
    /// Bind address and control port as a socket address string
    pub fn control_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.control_port)
    }

    pub fn server_root_path(&self) -> PathBuf {
        PathBuf::from(&self.server_root)
    }

    pub fn retr_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.retr_dir)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl ClientConfig {
    pub fn retr_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.retr_dir)
    }

    pub fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }

    pub fn accept_timeout(&self) -> Duration {
        Duration::from_secs(self.accept_timeout_secs)
    }
}
