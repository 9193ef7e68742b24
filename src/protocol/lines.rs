//! Line reading with a re-polled receive timeout.

use std::io;
use std::time::Duration;

use log::debug;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::timeout;

/// Reads up to and including the next `\n` into `buf`.
///
/// A receive timeout is not an error: the read is simply polled again, and
/// bytes that arrived before the timeout stay in `buf`. On return `buf` is
/// either empty (clean end of stream), ends with `\n` (a full line), or holds
/// an unterminated final chunk.
pub async fn read_line_polling<R>(reader: &mut R, buf: &mut Vec<u8>, poll: Duration) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        match timeout(poll, reader.read_until(b'\n', buf)).await {
            Ok(result) => return result.map(|_| ()),
            Err(_) => debug!("No complete line within {poll:?}, polling again"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncWriteExt, BufReader};

    #[tokio::test]
    async fn test_reads_one_line_at_a_time() {
        let mut reader = BufReader::new(&b"NOOP\r\nQUIT\r\ntail"[..]);
        let mut buf = Vec::new();
        let poll = Duration::from_millis(50);

        read_line_polling(&mut reader, &mut buf, poll).await.unwrap();
        assert_eq!(buf, b"NOOP\r\n");
        buf.clear();
        read_line_polling(&mut reader, &mut buf, poll).await.unwrap();
        assert_eq!(buf, b"QUIT\r\n");
        buf.clear();
        read_line_polling(&mut reader, &mut buf, poll).await.unwrap();
        assert_eq!(buf, b"tail");
        buf.clear();
        read_line_polling(&mut reader, &mut buf, poll).await.unwrap();
        assert!(buf.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_keeps_partial_line() {
        let (client, server) = tokio::io::duplex(64);
        let mut reader = BufReader::new(server);
        let writer = tokio::spawn(async move {
            let mut client = client;
            client.write_all(b"SY").await.unwrap();
            tokio::time::sleep(Duration::from_millis(60)).await;
            client.write_all(b"ST\r\n").await.unwrap();
            client
        });

        let mut buf = Vec::new();
        read_line_polling(&mut reader, &mut buf, Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(buf, b"SYST\r\n");
        drop(writer.await.unwrap());
    }
}
