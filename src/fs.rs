//! File system abstraction for testability.

use async_trait::async_trait;
use std::path::Path;

/// Abstraction over the file system operations a job needs.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Creates a directory and all of its missing parents. Succeeds if it already exists.
    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()>;

    /// Reads a whole file as UTF-8 text.
    async fn read_to_string(&self, path: &Path) -> std::io::Result<String>;
}

/// Default file system implementation using `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileSystem;

impl TokioFileSystem {
    /// Creates a new `TokioFileSystem` instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystem for TokioFileSystem {
    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    async fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        tokio::fs::read_to_string(path).await
    }
}
