//! Retrieved file store
//!
//! Where retrieved bytes end up on disk: `<dir>/file<N>` for the N-th
//! retrieval.

use std::io;
use std::path::PathBuf;

use tokio::fs::{self, File};

#[derive(Debug, Clone)]
pub struct RetrievedFiles {
    dir: PathBuf,
}

impl RetrievedFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, sequence: u32) -> PathBuf {
        self.dir.join(format!("file{sequence}"))
    }

    /// Creates (or truncates) the destination for the `sequence`-th file,
    /// creating the directory first if needed.
    pub async fn create(&self, sequence: u32) -> io::Result<File> {
        fs::create_dir_all(&self.dir).await?;
        File::create(self.path_for(sequence)).await
    }
}
