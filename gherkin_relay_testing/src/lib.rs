//! Test support for `gherkin_relay`.
//!
//! Provides a serialised handle on the global test logger, formatters with
//! scripted failures and builders for envelope streams and documents.
//!
//! ```rust
//! use gherkin_relay_testing::{RecordingFormatter, envelopes};
//!
//! let formatter = RecordingFormatter::new("recorder");
//! let recording = formatter.recording();
//! assert!(recording.envelopes().is_empty());
//! assert_eq!(envelopes::run(2).len(), 6);
//! ```

pub mod envelopes;
pub mod formatters;
pub mod logging;

pub use formatters::{Behaviour, Recording, RecordingFormatter};
pub use logging::{LoggerHandle, logger};
