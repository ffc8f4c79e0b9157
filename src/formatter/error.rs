//! Formatter failures.

use std::io;

use thiserror::Error;

/// Failure raised by a formatter or its consumption task.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum FormatterError {
    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An envelope could not be serialised.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The formatter could not prepare its output.
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// The formatter rejected an envelope.
    #[error("processing failed: {0}")]
    Processing(String),

    /// The consumption task panicked.
    #[error("formatter task panicked: {0}")]
    Panicked(String),

    /// The consumption task was aborted before completing.
    #[error("formatter task was cancelled")]
    Cancelled,
}

/// Why [`super::FormatterHandle::enqueue`] refused an envelope.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum EnqueueError {
    /// The formatter is disabled by configuration or failed to initialize.
    #[error("formatter is disabled")]
    Disabled,
    /// The formatter's queue has been closed.
    #[error("formatter queue is closed")]
    Closed,
    /// The formatter has not been launched yet.
    #[error("formatter has not been launched")]
    NotLaunched,
}
