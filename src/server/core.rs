use log::{error, info, warn};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::config::ServerConfig;
use crate::server::handler::{SessionEnd, SessionOptions, run_session};
use crate::transfer::{ActiveConnector, LocalCopy, RetrievedFiles};

pub struct Server {
    listener: TcpListener,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Binds the control socket described by `config`.
    pub async fn bind(config: ServerConfig) -> io::Result<Self> {
        let socket = config.control_socket();
        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => {
                info!("Server bound to {}", socket);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                return Err(e);
            }
        };

        if !config.server_root_path().is_dir() {
            warn!(
                "Server root {} is not a directory; every RETR will fail",
                config.server_root
            );
        }

        Ok(Self {
            listener,
            config: Arc::new(config),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves until Ctrl-C.
    pub async fn start(&self) {
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        };
        self.serve_until(shutdown).await;
    }

    /// Accepts control connections until `shutdown` resolves.
    ///
    /// Only one connection is served at a time: accepting a new one aborts
    /// the task serving the previous one.
    pub async fn serve_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!("Starting FTP server on {}", self.config.control_socket());
        tokio::pin!(shutdown);

        let mut current: Option<JoinHandle<()>> = None;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, no longer accepting connections");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        if let Some(previous) = current.take() {
                            if !previous.is_finished() {
                                warn!("Connection from {} supersedes the current session", addr);
                                previous.abort();
                            }
                        }

                        let config = Arc::clone(&self.config);
                        current = Some(tokio::spawn(async move {
                            serve_connection(stream, addr, config).await;
                        }));
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                    }
                },
            }
        }

        if let Some(handle) = current {
            handle.abort();
        }
    }
}

/// Runs one session on an accepted control connection.
async fn serve_connection(stream: TcpStream, addr: SocketAddr, config: Arc<ServerConfig>) {
    info!("Accepted control connection from {}", addr);

    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut connector = ActiveConnector::new(config.connect_timeout());
    let options = SessionOptions::from_config(&config, false);

    match run_session(&mut reader, &mut write_half, &mut connector, &options).await {
        Ok(SessionEnd::Quit) => info!("Client {} quit", addr),
        Ok(end) => info!("Session with {} ended: {:?}", addr, end),
        Err(e) => warn!("Control connection with {} failed: {}", addr, e),
    }
}

/// Runs a single session over stdin and stdout, copying retrieved files
/// into the configured directory.
pub async fn run_local(config: &ServerConfig) -> io::Result<SessionEnd> {
    let mut reader = BufReader::new(tokio::io::stdin());
    let mut writer = tokio::io::stdout();
    let mut connector = LocalCopy::new(RetrievedFiles::new(config.retr_dir_path()));
    let options = SessionOptions::from_config(config, true);

    let end = run_session(&mut reader, &mut writer, &mut connector, &options).await?;
    info!("Local session ended: {:?}", end);
    Ok(end)
}
