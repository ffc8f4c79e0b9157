//! Fan-out of the envelope stream to every registered formatter.
//!
//! The broker is driven by a single producer. It never buffers envelopes
//! itself: each one is handed to every running formatter's own queue, and a
//! formatter that cannot take it (disabled, closed, not yet launched) simply
//! does not receive it. Formatter failures never reach the producer; they
//! are returned from [`MessageBroker::shutdown`].

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::{
    config::{ConfigError, FormattersConfigProvider},
    formatter::{
        EnqueueError,
        Formatter,
        FormatterContext,
        FormatterError,
        FormatterHandle,
        LaunchOutcome,
        ShutdownReport,
        ShutdownTimeouts,
    },
    messages::Envelope,
};

/// Per-broker settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub shutdown_timeouts: ShutdownTimeouts,
}

/// Outcome of shutting down one formatter.
#[derive(Debug)]
pub struct FormatterShutdown {
    pub formatter: String,
    pub result: Result<ShutdownReport, FormatterError>,
}

/// Routes envelopes from one producer to many formatters.
#[derive(Debug)]
pub struct MessageBroker {
    provider: Arc<FormattersConfigProvider>,
    context: FormatterContext,
    options: RuntimeOptions,
    formatters: Vec<FormatterHandle>,
    initialized: bool,
}

impl MessageBroker {
    #[must_use]
    pub fn new(provider: Arc<FormattersConfigProvider>, options: RuntimeOptions) -> Self {
        let context = FormatterContext::new(Arc::clone(provider.placeholders()));
        Self {
            provider,
            context,
            options,
            formatters: Vec::new(),
            initialized: false,
        }
    }

    /// Add a formatter. Formatters registered after initialization stay
    /// unlaunched and receive nothing.
    pub fn register<F: Formatter>(&mut self, formatter: F) -> &mut Self {
        self.register_boxed(Box::new(formatter))
    }

    pub fn register_boxed(&mut self, formatter: Box<dyn Formatter>) -> &mut Self {
        if self.initialized {
            warn!(formatter = formatter.name(), "formatter registered after initialization is ignored");
        }
        self.formatters.push(FormatterHandle::new(formatter));
        self
    }

    /// Resolve configuration and launch every registered formatter.
    ///
    /// Runs at most once; later calls return immediately. Called implicitly
    /// by [`publish`](Self::publish) on the first `testRunStarted`.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] raised while resolving configuration. No
    /// formatter is launched in that case.
    pub async fn initialize(&mut self) -> Result<(), ConfigError> {
        if self.initialized {
            return Ok(());
        }
        let enabled = self.provider.enabled()?;
        let mut configs = Vec::with_capacity(self.formatters.len());
        for handle in &self.formatters {
            configs.push(self.provider.formatter_configuration(handle.name())?);
        }
        self.initialized = true;
        if !enabled {
            info!("formatters globally disabled");
        }

        for (handle, config) in self.formatters.iter_mut().zip(configs) {
            match handle.launch(config, &self.context).await {
                LaunchOutcome::Running => debug!(formatter = handle.name(), "formatter launched"),
                LaunchOutcome::Disabled => debug!(formatter = handle.name(), "formatter disabled"),
            }
        }
        Ok(())
    }

    /// Forward `envelope` to every running formatter.
    ///
    /// After forwarding `testRunFinished` the queue of every formatter is
    /// closed; consumption tasks drain on their own and are joined by
    /// [`shutdown`](Self::shutdown).
    ///
    /// # Errors
    ///
    /// Only configuration errors raised by the implicit initialization are
    /// returned.
    pub async fn publish(&mut self, envelope: Envelope) -> Result<(), ConfigError> {
        if envelope.is_test_run_started() {
            self.initialize().await?;
        }
        let finished = envelope.is_test_run_finished();
        let kind = envelope.kind();
        let envelope = Arc::new(envelope);

        for handle in &self.formatters {
            match handle.enqueue(Arc::clone(&envelope)) {
                Ok(()) | Err(EnqueueError::Disabled) => {}
                Err(EnqueueError::Closed) => {
                    warn!(formatter = handle.name(), kind, "envelope dropped: formatter closed");
                }
                Err(EnqueueError::NotLaunched) => {
                    debug!(formatter = handle.name(), kind, "envelope dropped: formatter not launched");
                }
            }
        }

        if finished {
            for handle in &mut self.formatters {
                handle.close();
            }
        }
        Ok(())
    }

    /// Whether initialization has run and at least one formatter is taking
    /// envelopes.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.initialized && self.formatters.iter().any(FormatterHandle::is_active)
    }

    #[must_use]
    pub fn active_formatters(&self) -> Vec<&str> {
        self.formatters
            .iter()
            .filter(|h| h.is_active())
            .map(FormatterHandle::name)
            .collect()
    }

    /// Join every formatter concurrently and report how each one ended.
    pub async fn shutdown(&mut self) -> Vec<FormatterShutdown> {
        let timeouts = self.options.shutdown_timeouts;
        join_all(self.formatters.iter_mut().map(|handle| async move {
            let result = handle.shutdown(timeouts).await;
            FormatterShutdown {
                formatter: handle.name().to_owned(),
                result,
            }
        }))
        .await
    }
}
