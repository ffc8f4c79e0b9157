#![doc(html_root_url = "https://docs.rs/gherkin-relay/latest")]
//! Public API for the `gherkin_relay` library.
//!
//! This crate routes the Cucumber message stream of a test run to any number
//! of independently configured formatters, each running in its own task.
//! It also reconciles identifiers of Gherkin documents and pickles produced
//! elsewhere so they can be merged into one run.

pub mod broker;
pub mod config;
pub mod error;
pub mod file_writing;
pub mod formatter;
pub mod formatters;
pub mod ids;
pub mod messages;
pub mod replay;

pub use broker::{FormatterShutdown, MessageBroker, RuntimeOptions};
pub use config::{ConfigError, FormatterConfiguration, FormattersConfigProvider};
/// Result type alias re-exported for convenience.
pub use error::{Error, Result};
pub use formatter::{Formatter, FormatterContext, FormatterError, ShutdownReport, ShutdownTimeouts};
pub use ids::{IdGenerator, IdReconciler, IdStyle};
pub use messages::Envelope;
pub use replay::Replay;
