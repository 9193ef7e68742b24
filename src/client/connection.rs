//! Client control connection
//!
//! Owns the TCP control channel to one server and knows the local IPv4
//! address it was opened from, which is what PORT advertises.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use log::{debug, info};
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, lookup_host};

use crate::error::ClientError;
use crate::protocol::{Command, read_line_polling};

pub struct ControlConnection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    local_ip: Ipv4Addr,
    peer: SocketAddr,
    reply_timeout: Duration,
}

impl ControlConnection {
    /// Resolves `host` to an IPv4 address and connects to it.
    pub async fn connect(host: &str, port: u16, reply_timeout: Duration) -> Result<Self, ClientError> {
        let target = lookup_host((host, port))
            .await?
            .find(SocketAddr::is_ipv4)
            .ok_or_else(|| ClientError::NoIpv4Address(host.to_string()))?;

        let stream = TcpStream::connect(target).await?;
        let local_ip = match stream.local_addr()?.ip() {
            IpAddr::V4(ip) => ip,
            IpAddr::V6(_) => return Err(ClientError::NoIpv4Address(host.to_string())),
        };
        info!("Control connection to {} open from {}", target, local_ip);

        let (read_half, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer,
            local_ip,
            peer: target,
            reply_timeout,
        })
    }

    pub fn local_ip(&self) -> Ipv4Addr {
        self.local_ip
    }

    pub async fn send(&mut self, command: &Command) -> Result<(), ClientError> {
        debug!("Sending {:?}", command);
        self.writer.write_all(command.to_wire().as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Reads one raw reply line, terminator included.
    pub async fn read_line(&mut self) -> Result<String, ClientError> {
        let mut buf = Vec::new();
        read_line_polling(&mut self.reader, &mut buf, self.reply_timeout).await?;
        if buf.is_empty() {
            return Err(ClientError::Closed);
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub async fn close(mut self) {
        if let Err(e) = self.writer.shutdown().await {
            debug!("Error shutting down control connection to {}: {}", self.peer, e);
        }
        info!("Control connection to {} closed", self.peer);
    }
}
