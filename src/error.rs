//! Error types for the vidl library.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while preparing or running download jobs.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// The engine binary could not be started.
    #[error("Failed to start {binary}: {source}")]
    EngineSpawn {
        /// Binary that was invoked.
        binary: String,
        /// Underlying spawn error.
        source: std::io::Error,
    },

    /// The engine ran but reported a failure.
    #[error("{message}")]
    Engine {
        /// Exit code, if the process exited normally.
        status: Option<i32>,
        /// Most relevant diagnostic line from the engine.
        message: String,
    },

    /// Batch URL list does not exist.
    #[error("File '{}' not found", .path.display())]
    BatchFileNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },
}

/// A specialized `Result` type for vidl operations.
pub type Result<T> = std::result::Result<T, Error>;
