//! Module `file_ops`
//!
//! Locates the file a RETR asks for under the served root and streams it
//! across a data channel.

use std::io;
use std::path::{Component, Path, PathBuf};

use log::{info, warn};
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::TransferError;

/// Resolves `requested` against `root`.
///
/// The path must stay inside `root` and name an existing regular file.
pub fn resolve_file_path(root: &Path, requested: &str) -> Result<PathBuf, TransferError> {
    let relative = Path::new(requested);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        warn!("Rejected path outside the served root: {}", requested);
        return Err(TransferError::FileUnavailable(requested.to_string()));
    }

    let path = root.join(relative);
    if path.is_file() {
        Ok(path)
    } else {
        Err(TransferError::FileUnavailable(requested.to_string()))
    }
}

/// Opens the requested file for reading.
pub async fn open_for_retrieval(root: &Path, requested: &str) -> Result<File, TransferError> {
    let path = resolve_file_path(root, requested)?;
    File::open(&path).await.map_err(|e| {
        warn!("Failed to open {}: {}", path.display(), e);
        TransferError::FileUnavailable(requested.to_string())
    })
}

/// Streams `file` into `channel`, then shuts the channel down so the peer
/// sees end of file. Returns the number of bytes sent.
pub async fn send_file<W>(file: &mut File, channel: &mut W) -> io::Result<u64>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let bytes = tokio::io::copy(file, channel).await?;
    channel.shutdown().await?;
    info!("Sent {} bytes over data channel", bytes);
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn served_root() -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("a")).unwrap();
        fs::write(root.path().join("a").join("b.txt"), b"hello world").unwrap();
        root
    }

    #[test]
    fn test_resolves_existing_file() {
        let root = served_root();
        let path = resolve_file_path(root.path(), "a/b.txt").unwrap();
        assert_eq!(path, root.path().join("a/b.txt"));
    }

    #[test]
    fn test_missing_file_and_directory() {
        let root = served_root();
        assert!(matches!(
            resolve_file_path(root.path(), "a/missing.txt"),
            Err(TransferError::FileUnavailable(_))
        ));
        assert!(matches!(
            resolve_file_path(root.path(), "a"),
            Err(TransferError::FileUnavailable(_))
        ));
    }

    #[test]
    fn test_rejects_parent_components() {
        let root = served_root();
        fs::write(root.path().join("secret"), b"x").unwrap();
        let inner = root.path().join("a");
        assert!(resolve_file_path(&inner, "../secret").is_err());
        assert!(resolve_file_path(&inner, "b.txt").is_ok());
    }

    #[tokio::test]
    async fn test_send_file_copies_all_bytes() {
        let root = served_root();
        let mut file = open_for_retrieval(root.path(), "a/b.txt").await.unwrap();
        let mut sink: Vec<u8> = Vec::new();
        let sent = send_file(&mut file, &mut sink).await.unwrap();
        assert_eq!(sent, 11);
        assert_eq!(sink, b"hello world");
    }
}
