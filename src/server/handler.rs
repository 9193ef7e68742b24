//! Control channel driver
//!
//! Runs one FTP session over any buffered byte stream: greets, then reads
//! CRLF-terminated lines, passes each through the grammar and the session
//! state machine, and writes the replies back. The same loop serves a live
//! socket and the stdin/stdout batch mode.

use std::io;
use std::net::SocketAddrV4;
use std::path::PathBuf;
use std::time::Duration;

use log::{info, warn};
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};

use crate::config::ServerConfig;
use crate::error::{GrammarError, TransferError};
use crate::protocol::{Reply, parse_command, read_line_polling};
use crate::session::{Action, Session};
use crate::transfer::{DataConnector, open_for_retrieval, send_file};

/// Per-session knobs of the driver loop.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub server_root: PathBuf,
    pub read_timeout: Duration,
    pub max_command_length: usize,
    /// Echo every received line to the output ahead of its replies.
    pub echo_commands: bool,
}

impl SessionOptions {
    pub fn from_config(config: &ServerConfig, echo_commands: bool) -> Self {
        Self {
            server_root: config.server_root_path(),
            read_timeout: config.read_timeout(),
            max_command_length: config.max_command_length,
            echo_commands,
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// QUIT completed.
    Quit,
    /// The peer closed the control channel.
    Disconnected,
    /// Input ended in the middle of a line.
    Unterminated,
}

/// Drives one session to completion.
///
/// Protocol errors are answered and the loop continues; only I/O failures on
/// the control channel itself are returned as errors.
pub async fn run_session<R, W, C>(
    reader: &mut R,
    writer: &mut W,
    connector: &mut C,
    options: &SessionOptions,
) -> io::Result<SessionEnd>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    C: DataConnector,
{
    let mut session = Session::new();
    send_reply(writer, Reply::ServiceReady).await?;

    let mut buf = Vec::new();
    loop {
        buf.clear();
        read_line_polling(reader, &mut buf, options.read_timeout).await?;

        if buf.is_empty() {
            info!("Control channel closed by peer");
            return Ok(SessionEnd::Disconnected);
        }

        if options.echo_commands {
            writer.write_all(&buf).await?;
        }

        if !buf.ends_with(b"\n") {
            warn!("Input ended without a newline");
            send_reply(writer, GrammarError::MissingCrlf.reply()).await?;
            return Ok(SessionEnd::Unterminated);
        }

        let line = String::from_utf8_lossy(&buf);
        info!("Received: {:?}", line);

        if line.len() > options.max_command_length {
            let err = GrammarError::TooLong(options.max_command_length);
            warn!("{}", err);
            send_reply(writer, err.reply()).await?;
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                warn!("Rejected line {:?}: {}", line, e);
                send_reply(writer, e.reply()).await?;
                continue;
            }
        };

        match session.execute(command) {
            Ok(Action::Reply(reply)) => send_reply(writer, reply).await?,
            Ok(Action::Close(reply)) => {
                send_reply(writer, reply).await?;
                info!("Session closed by QUIT");
                return Ok(SessionEnd::Quit);
            }
            Ok(Action::Retrieve { path, endpoint }) => {
                retrieve(&mut session, &path, endpoint, connector, writer, options).await?
            }
            Err(e) => {
                warn!("Out of sequence: {}", e);
                send_reply(writer, e.reply()).await?;
            }
        }
    }
}

/// Performs an approved RETR.
///
/// 150 goes out only once the file is open and the data channel is
/// connected; a failure after that point still owes the client a 425.
async fn retrieve<W, C>(
    session: &mut Session,
    path: &str,
    endpoint: SocketAddrV4,
    connector: &mut C,
    writer: &mut W,
    options: &SessionOptions,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
    C: DataConnector,
{
    let mut file = match open_for_retrieval(&options.server_root, path).await {
        Ok(file) => file,
        Err(e) => return fail_transfer(writer, e).await,
    };

    let sequence = session.files_retrieved() + 1;
    let mut channel = match connector.open(endpoint, sequence).await {
        Ok(channel) => channel,
        Err(e) => return fail_transfer(writer, e).await,
    };

    send_reply(writer, Reply::FileStatusOk).await?;

    let sent = send_file(&mut file, &mut channel).await;
    drop(channel);

    match sent {
        Ok(bytes) => {
            let total = session.record_retrieval();
            info!("RETR {} complete: {} bytes (retrieval #{})", path, bytes, total);
            send_reply(writer, Reply::FileActionCompleted).await
        }
        Err(e) => fail_transfer(writer, TransferError::Aborted(e)).await,
    }
}

async fn fail_transfer<W>(writer: &mut W, err: TransferError) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    warn!("RETR failed: {}", err);
    send_reply(writer, err.reply()).await
}

/// Writes one reply line and flushes it.
pub async fn send_reply<W>(writer: &mut W, reply: Reply) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    info!("Sending reply: {}", reply);
    writer.write_all(reply.to_wire().as_bytes()).await?;
    writer.flush().await
}
