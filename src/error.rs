//! Error types for the face guidance engine.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Speech synthesis backend failed for a single message
    #[error("Speech error: {0}")]
    Speech(String),

    /// The notification channel has been shut down
    #[error("Notification channel is closed")]
    ChannelClosed,

    /// Frame acquisition or detector output could not be read
    #[error("Frame source error: {0}")]
    FrameSource(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic I/O error with description
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
