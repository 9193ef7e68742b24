//! Client driver
//!
//! Reads CONNECT/GET/QUIT requests line by line, echoes each one, and turns
//! it into the control channel exchanges it stands for. Every command sent to
//! the server and every reply received is written to the console.

use log::{info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::client::connection::ControlConnection;
use crate::config::ClientConfig;
use crate::error::{ClientError, RequestError};
use crate::protocol::{
    Command, ReplyLine, Request, RequestKind, TransferType, parse_reply, parse_request,
};
use crate::transfer::{DataListener, RetrievedFiles};

const BEFORE_CONNECT: &[RequestKind] = &[RequestKind::Connect];
const AFTER_CONNECT: &[RequestKind] = &[RequestKind::Connect, RequestKind::Get, RequestKind::Quit];

/// Console output of the client.
struct Console<W> {
    out: W,
}

impl<W: AsyncWrite + Unpin> Console<W> {
    async fn print(&mut self, text: &str) -> Result<(), ClientError> {
        self.out
            .write_all(text.as_bytes())
            .await
            .map_err(ClientError::Console)?;
        self.out.flush().await.map_err(ClientError::Console)
    }

    async fn println(&mut self, text: &str) -> Result<(), ClientError> {
        self.print(&format!("{text}\n")).await
    }

    /// Reads and prints one reply. Error replies and malformed lines stop the
    /// current command sequence.
    async fn reply(&mut self, connection: &mut ControlConnection) -> Result<ReplyLine, ClientError> {
        let line = connection.read_line().await?;
        match parse_reply(&line) {
            Ok(reply) => {
                self.println(&reply.to_string()).await?;
                if reply.is_error() {
                    Err(ClientError::Rejected(reply.code))
                } else {
                    Ok(reply)
                }
            }
            Err(e) => {
                self.println(&e.to_string()).await?;
                Err(ClientError::MalformedReply(e))
            }
        }
    }

    /// Sends `command`, echoes it, and reads its first reply.
    async fn exchange(
        &mut self,
        connection: &mut ControlConnection,
        command: &Command,
    ) -> Result<ReplyLine, ClientError> {
        connection.send(command).await?;
        self.print(&command.to_wire()).await?;
        self.reply(connection).await
    }
}

pub struct ClientDriver<W> {
    console: Console<W>,
    config: ClientConfig,
    expected: &'static [RequestKind],
    connection: Option<ControlConnection>,
    next_data_port: u16,
    files_retrieved: u32,
    store: RetrievedFiles,
}

impl<W: AsyncWrite + Unpin> ClientDriver<W> {
    pub fn new(out: W, config: ClientConfig) -> Self {
        Self {
            console: Console { out },
            store: RetrievedFiles::new(config.retr_dir_path()),
            next_data_port: config.data_port,
            config,
            expected: BEFORE_CONNECT,
            connection: None,
            files_retrieved: 0,
        }
    }

    /// Number of GETs whose RETR was accepted by the server.
    pub fn files_retrieved(&self) -> u32 {
        self.files_retrieved
    }

    pub fn into_output(self) -> W {
        self.console.out
    }

    /// Processes requests until QUIT or end of input.
    ///
    /// Only console failures are returned; everything else is reported on
    /// the console and the next request is read.
    pub async fn run<R>(&mut self, input: &mut R) -> Result<(), ClientError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input
                .read_until(b'\n', &mut buf)
                .await
                .map_err(ClientError::Console)?
                == 0
            {
                break;
            }

            let raw = String::from_utf8_lossy(&buf).into_owned();
            self.console.print(&raw).await?;
            let line = normalize_line_ending(&raw);

            if !RequestKind::of(&line).is_some_and(|kind| self.expected.contains(&kind)) {
                self.console.println(&RequestError::Unexpected.to_string()).await?;
                continue;
            }

            let request = match parse_request(&line) {
                Ok(request) => request,
                Err(e) => {
                    self.console.println(&e.to_string()).await?;
                    continue;
                }
            };
            self.console.println(&request.to_string()).await?;

            match request {
                Request::Connect { host, port } => {
                    let result = self.connect(&host, port).await;
                    self.recover(result).await?;
                }
                Request::Get(path) => {
                    let result = self.get(&path).await;
                    self.recover(result).await?;
                }
                Request::Quit => {
                    let result = self.quit().await;
                    self.recover(result).await?;
                    info!("Client terminating on QUIT");
                    return Ok(());
                }
            }
        }

        info!("End of input");
        if let Some(connection) = self.connection.take() {
            connection.close().await;
        }
        Ok(())
    }

    /// Opens a new control connection and logs in as guest.
    async fn connect(&mut self, host: &str, port: u16) -> Result<(), ClientError> {
        if let Some(previous) = self.connection.take() {
            previous.close().await;
        }
        self.expected = BEFORE_CONNECT;

        let connection = ControlConnection::connect(host, port, self.config.reply_timeout()).await?;
        self.expected = AFTER_CONNECT;
        let connection = self.connection.insert(connection);

        self.console.reply(connection).await?;

        let login = [
            Command::User(self.config.username.clone()),
            Command::Pass(self.config.password.clone()),
            Command::Syst,
            Command::Type(TransferType::Image),
        ];
        for command in &login {
            self.console.exchange(connection, command).await?;
        }
        Ok(())
    }

    /// Retrieves `path` over a fresh active-mode data channel.
    async fn get(&mut self, path: &str) -> Result<(), ClientError> {
        let connection = self.connection.as_mut().ok_or(ClientError::Closed)?;

        let port = self.next_data_port;
        if port != 0 {
            self.next_data_port = port.saturating_add(1);
        }
        let listener = DataListener::open(connection.local_ip(), port)
            .map_err(|e| ClientError::DataPort(port, e))?;

        self.console.exchange(connection, &listener.port_command()).await?;
        self.console
            .exchange(connection, &Command::Retr(path.to_string()))
            .await?;

        // Numbered once RETR is accepted; a failed transfer still uses up
        // its number.
        self.files_retrieved += 1;
        let sequence = self.files_retrieved;
        let mut file = self.store.create(sequence).await.map_err(ClientError::Data)?;
        let received = listener
            .receive_into(&mut file, self.config.accept_timeout())
            .await;
        drop(file);

        let completion = self.console.reply(connection).await;
        let bytes = received?;
        completion?;

        info!(
            "Stored {} bytes of {} as {}",
            bytes,
            path,
            self.store.path_for(sequence).display()
        );
        Ok(())
    }

    async fn quit(&mut self) -> Result<(), ClientError> {
        let mut connection = self.connection.take().ok_or(ClientError::Closed)?;
        let result = self.console.exchange(&mut connection, &Command::Quit).await;
        connection.close().await;
        result.map(|_| ())
    }

    /// Reports a failed request. Console failures are passed on; a broken
    /// control connection is dropped.
    async fn recover(&mut self, result: Result<(), ClientError>) -> Result<(), ClientError> {
        match result {
            Ok(()) => Ok(()),
            Err(e @ ClientError::Console(_)) => Err(e),
            Err(ClientError::Rejected(code)) => {
                info!("Command sequence stopped by reply {}", code);
                Ok(())
            }
            Err(ClientError::MalformedReply(e)) => {
                warn!("Command sequence stopped by malformed reply: {}", e);
                Ok(())
            }
            Err(e) => {
                warn!("{}", e);
                self.console.println(&format!("ERROR -- {e}")).await?;
                if e.is_fatal_to_connection() {
                    if let Some(connection) = self.connection.take() {
                        connection.close().await;
                    }
                    self.expected = BEFORE_CONNECT;
                }
                Ok(())
            }
        }
    }
}

/// Turns a bare-LF terminator into CRLF.
fn normalize_line_ending(line: &str) -> String {
    match line.strip_suffix('\n') {
        Some(body) if !body.ends_with('\r') => format!("{body}\r\n"),
        _ => line.to_string(),
    }
}
