//! Client side of the active-mode data channel
//!
//! The client opens a listening socket before each GET, advertises it with
//! PORT, and accepts the single connection the server makes back.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use log::info;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpSocket};

use crate::error::ClientError;
use crate::protocol::Command;

/// A listening socket waiting for one data connection.
///
/// Dropping it closes the socket, whether or not a connection was accepted.
pub struct DataListener {
    listener: TcpListener,
    advertised: SocketAddrV4,
}

impl DataListener {
    /// Listens on `port` (0 picks an ephemeral port) on all interfaces and
    /// advertises it under `advertise_ip`.
    pub fn open(advertise_ip: Ipv4Addr, port: u16) -> io::Result<Self> {
        let socket = TcpSocket::new_v4()?;
        socket.set_reuseaddr(true)?;
        socket.bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))?;
        let listener = socket.listen(1)?;

        let advertised = SocketAddrV4::new(advertise_ip, listener.local_addr()?.port());
        info!("Data listener open, advertising {}", advertised);
        Ok(Self { listener, advertised })
    }

    pub fn advertised(&self) -> SocketAddrV4 {
        self.advertised
    }

    /// The PORT command announcing this listener.
    pub fn port_command(&self) -> Command {
        Command::Port(self.advertised)
    }

    /// Accepts the server's connection and copies everything it sends into
    /// `dest` until the server closes it. Both sockets are closed on return.
    pub async fn receive_into<W>(self, dest: &mut W, wait: Duration) -> Result<u64, ClientError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let (mut stream, peer) = tokio::time::timeout(wait, self.listener.accept())
            .await
            .map_err(|_| ClientError::AcceptTimeout(wait))?
            .map_err(ClientError::Data)?;
        info!("Data connection accepted from {}", peer);

        let bytes = tokio::io::copy(&mut stream, dest)
            .await
            .map_err(ClientError::Data)?;
        dest.flush().await.map_err(ClientError::Data)?;
        info!("Received {} bytes from {}", bytes, peer);
        Ok(bytes)
    }
}
