//! Formatter contract and runtime.
//!
//! A [`Formatter`] turns the envelope stream into one output artifact. The
//! [`FormatterHandle`] drives it through its lifecycle: configuration gate,
//! initialization, an isolated consumption task and a two-stage shutdown.

mod attachments;
mod error;
mod runtime;

use std::sync::Arc;

use async_trait::async_trait;
pub use attachments::{ATTACHMENT_OPTIONS_SETTING, AttachmentHandling, AttachmentOptions};
pub use error::{EnqueueError, FormatterError};
pub use runtime::{FormatterHandle, FormatterState, LaunchOutcome, ShutdownReport, ShutdownTimeouts};

use crate::{
    config::{FormatterConfiguration, PlaceholderResolver},
    messages::Envelope,
};

/// Consumer turning envelopes into output.
///
/// Methods are called from a single task, one at a time: `initialize` once,
/// `process` for each envelope in order, then `finish` exactly once.
#[async_trait]
pub trait Formatter: Send + 'static {
    /// Name used to look up this formatter's configuration.
    fn name(&self) -> &str;

    /// Prepare output using the resolved configuration.
    ///
    /// # Errors
    ///
    /// An error disables the formatter for the rest of the run.
    async fn initialize(
        &mut self,
        config: &FormatterConfiguration,
        context: &FormatterContext,
    ) -> Result<(), FormatterError>;

    /// Handle one envelope.
    ///
    /// # Errors
    ///
    /// An error stops the consumption loop; it is reported at shutdown.
    async fn process(&mut self, envelope: &Envelope) -> Result<(), FormatterError>;

    /// Flush and release output. Runs once however the loop ended.
    ///
    /// # Errors
    ///
    /// Reported at shutdown.
    async fn finish(&mut self) -> Result<(), FormatterError>;
}

/// Services shared with every formatter during initialization.
#[derive(Clone, Debug)]
pub struct FormatterContext {
    placeholders: Arc<PlaceholderResolver>,
}

impl FormatterContext {
    #[must_use]
    pub fn new(placeholders: Arc<PlaceholderResolver>) -> Self { Self { placeholders } }

    /// Expands `{placeholder}` templates in configured paths.
    #[must_use]
    pub fn placeholders(&self) -> &PlaceholderResolver { &self.placeholders }
}
