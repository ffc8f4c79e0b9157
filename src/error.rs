//! Crate-level error and result types.
//!
//! Each concern has its own error enum; [`Error`] collects them for callers
//! that drive the whole pipeline, such as the replay binary.

use crate::{config::ConfigError, formatter::FormatterError};

/// Any failure surfaced by `gherkin_relay`.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Formatter(#[from] FormatterError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A line of an envelope log could not be parsed.
    #[error("invalid envelope on line {line}: {source}")]
    Envelope {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Result alias using [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
