//! Module `data_channel`
//!
//! Server side of the active-mode data channel. A [`DataConnector`] turns the
//! endpoint remembered from PORT into a writable channel for one RETR:
//! [`ActiveConnector`] connects back to the client over TCP, [`LocalCopy`]
//! writes into the retrieved-file store when the server runs in batch mode.

use std::future::Future;
use std::io;
use std::net::SocketAddrV4;
use std::time::Duration;

use log::{error, info};
use tokio::fs::File;
use tokio::io::AsyncWrite;
use tokio::net::TcpStream;

use crate::error::TransferError;
use crate::transfer::RetrievedFiles;

/// Opens the data channel for one retrieval.
pub trait DataConnector {
    type Channel: AsyncWrite + Unpin + Send;

    /// Opens the channel for the `sequence`-th retrieval of the session.
    fn open(
        &mut self,
        endpoint: SocketAddrV4,
        sequence: u32,
    ) -> impl Future<Output = Result<Self::Channel, TransferError>> + Send;
}

/// Connects to the client's listening socket, as active mode requires.
pub struct ActiveConnector {
    timeout: Duration,
}

impl ActiveConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl DataConnector for ActiveConnector {
    type Channel = TcpStream;

    async fn open(&mut self, endpoint: SocketAddrV4, _sequence: u32) -> Result<TcpStream, TransferError> {
        info!("Active mode: connecting to client data socket {}", endpoint);

        match tokio::time::timeout(self.timeout, TcpStream::connect(endpoint)).await {
            Ok(Ok(stream)) => {
                info!("Connected to client data socket {}", endpoint);
                Ok(stream)
            }
            Ok(Err(e)) => {
                error!("Failed to connect to client data socket {}: {}", endpoint, e);
                Err(TransferError::Connect(e))
            }
            Err(_) => {
                error!(
                    "Timed out after {:?} connecting to client data socket {}",
                    self.timeout, endpoint
                );
                Err(TransferError::Connect(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("no connection to {endpoint} within {:?}", self.timeout),
                )))
            }
        }
    }
}

/// Copies retrieved files into a local directory instead of sending them.
pub struct LocalCopy {
    store: RetrievedFiles,
}

impl LocalCopy {
    pub fn new(store: RetrievedFiles) -> Self {
        Self { store }
    }
}

impl DataConnector for LocalCopy {
    type Channel = File;

    async fn open(&mut self, _endpoint: SocketAddrV4, sequence: u32) -> Result<File, TransferError> {
        let file = self.store.create(sequence).await.map_err(TransferError::Connect)?;
        info!("Copying retrieval {} to {}", sequence, self.store.path_for(sequence).display());
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_active_connector_reaches_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let endpoint = SocketAddrV4::new(Ipv4Addr::LOCALHOST, port);

        let mut connector = ActiveConnector::new(Duration::from_secs(5));
        let mut channel = connector.open(endpoint, 1).await.unwrap();
        channel.write_all(b"payload").await.unwrap();
        channel.shutdown().await.unwrap();

        let (mut accepted, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        accepted.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, b"payload");
    }

    #[tokio::test]
    async fn test_active_connector_reports_refused_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut connector = ActiveConnector::new(Duration::from_secs(5));
        let endpoint = SocketAddrV4::new(Ipv4Addr::LOCALHOST, port);
        let err = connector.open(endpoint, 1).await.unwrap_err();
        assert!(matches!(err, TransferError::Connect(_)));
        assert_eq!(err.reply().code(), 425);
    }

    #[tokio::test]
    async fn test_local_copy_numbers_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut connector = LocalCopy::new(RetrievedFiles::new(dir.path().join("retr_files")));
        let endpoint = SocketAddrV4::new(Ipv4Addr::LOCALHOST, 1080);

        let mut channel = connector.open(endpoint, 3).await.unwrap();
        channel.write_all(b"copied").await.unwrap();
        channel.shutdown().await.unwrap();

        let copied = std::fs::read(dir.path().join("retr_files").join("file3")).unwrap();
        assert_eq!(copied, b"copied");
    }
}
