//! Lifecycle of a single formatter instance.
//!
//! ```text
//! Constructed -> LaunchPending -> Disabled
//!                              -> Running -> Closing -> Closed
//! ```
//!
//! A running formatter owns an unbounded queue and one consumption task.
//! The task processes envelopes strictly in arrival order until it has
//! processed `testRunFinished`, the queue is closed and drained, or
//! cancellation is requested. [`Formatter::finish`] runs on every exit path
//! except a panic inside `finish` itself.

use std::{
    any::Any,
    fmt,
    panic::AssertUnwindSafe,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use futures::FutureExt;
use log::{debug, error, info, warn};
use tokio::{
    sync::mpsc,
    task::{JoinError, JoinHandle},
    time::timeout,
};
use tokio_util::sync::CancellationToken;

use super::{AttachmentOptions, EnqueueError, Formatter, FormatterContext, FormatterError};
use crate::{config::FormatterConfiguration, messages::Envelope};

/// Lifecycle state of a [`FormatterHandle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatterState {
    Constructed,
    LaunchPending,
    Disabled,
    Running,
    Closing,
    Closed,
}

/// Bounds for the two shutdown stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShutdownTimeouts {
    /// Time the task gets to finish on its own after the queue is closed.
    pub graceful: Duration,
    /// Time the task gets after cancellation before it is abandoned.
    pub forced: Duration,
}

impl ShutdownTimeouts {
    pub const DEFAULT_STAGE: Duration = Duration::from_secs(15);
}

impl Default for ShutdownTimeouts {
    fn default() -> Self {
        Self {
            graceful: Self::DEFAULT_STAGE,
            forced: Self::DEFAULT_STAGE,
        }
    }
}

/// How a formatter ended when it was shut down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutdownReport {
    /// The task finished within the graceful stage.
    Completed,
    /// The task finished only after cancellation was requested.
    CompletedAfterCancel,
    /// The task did not finish in either stage and was aborted.
    Abandoned,
    /// No task was ever started (disabled or never launched).
    NeverStarted,
    /// Shutdown already ran for this formatter.
    AlreadyShutDown,
}

/// Whether a launched formatter is taking envelopes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaunchOutcome {
    Running,
    Disabled,
}

#[derive(Clone, Debug)]
struct SharedState(Arc<Mutex<FormatterState>>);

impl SharedState {
    fn new() -> Self { Self(Arc::new(Mutex::new(FormatterState::Constructed))) }

    fn get(&self) -> FormatterState { *self.0.lock().unwrap_or_else(PoisonError::into_inner) }

    fn set(&self, state: FormatterState) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Move `Running` to `Closing`; other states are left alone.
    fn begin_closing(&self) {
        let mut state = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == FormatterState::Running {
            *state = FormatterState::Closing;
        }
    }
}

type TaskResult = Result<(), FormatterError>;

/// Owner of one formatter: its queue, its consumption task and its state.
pub struct FormatterHandle {
    name: String,
    state: SharedState,
    formatter: Option<Box<dyn Formatter>>,
    sender: Option<mpsc::UnboundedSender<Arc<Envelope>>>,
    task: Option<JoinHandle<TaskResult>>,
    cancel: CancellationToken,
    attachments: AttachmentOptions,
}

impl fmt::Debug for FormatterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterHandle")
            .field("name", &self.name)
            .field("state", &self.state.get())
            .finish_non_exhaustive()
    }
}

impl FormatterHandle {
    /// Wrap `formatter` in the `Constructed` state.
    #[must_use]
    pub fn new(formatter: Box<dyn Formatter>) -> Self {
        Self {
            name: formatter.name().to_ascii_lowercase(),
            state: SharedState::new(),
            formatter: Some(formatter),
            sender: None,
            task: None,
            cancel: CancellationToken::new(),
            attachments: AttachmentOptions::default(),
        }
    }

    /// Lower-cased formatter name, as used for configuration lookup.
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    #[must_use]
    pub fn state(&self) -> FormatterState { self.state.get() }

    /// Whether envelopes are currently accepted.
    #[must_use]
    pub fn is_active(&self) -> bool { self.state() == FormatterState::Running }

    /// Run the configuration gate and, if enabled, initialize the formatter
    /// and start its consumption task.
    ///
    /// `config` is `None` when the formatter is not configured. A failing
    /// [`Formatter::initialize`] disables the formatter; the failure is
    /// logged and never returned. Launching twice is a no-op.
    pub async fn launch(
        &mut self,
        config: Option<FormatterConfiguration>,
        context: &FormatterContext,
    ) -> LaunchOutcome {
        if self.state() != FormatterState::Constructed {
            return if self.is_active() {
                LaunchOutcome::Running
            } else {
                LaunchOutcome::Disabled
            };
        }
        self.state.set(FormatterState::LaunchPending);

        let (Some(config), Some(mut formatter)) = (config, self.formatter.take()) else {
            debug!("formatter not configured: formatter={}", self.name);
            self.state.set(FormatterState::Disabled);
            return LaunchOutcome::Disabled;
        };

        if let Err(e) = formatter.initialize(&config, context).await {
            warn!("formatter disabled after failed initialization: formatter={}, error={e}", self.name);
            tracing::warn!(formatter = %self.name, error = %e, "formatter initialization failed");
            self.state.set(FormatterState::Disabled);
            return LaunchOutcome::Disabled;
        }

        self.attachments = AttachmentOptions::from_configuration(&config, context.placeholders());
        let (tx, rx) = mpsc::unbounded_channel();
        self.sender = Some(tx);
        self.state.set(FormatterState::Running);
        self.task = Some(tokio::spawn(consume(
            self.name.clone(),
            formatter,
            rx,
            self.cancel.clone(),
            self.state.clone(),
        )));
        info!("formatter attached: formatter={}", self.name);
        LaunchOutcome::Running
    }

    /// Queue `envelope` without blocking.
    ///
    /// # Errors
    ///
    /// Returns an [`EnqueueError`] when the formatter is not running; the
    /// envelope is dropped.
    pub fn enqueue(&self, envelope: Arc<Envelope>) -> Result<(), EnqueueError> {
        match self.state() {
            FormatterState::Constructed | FormatterState::LaunchPending => {
                return Err(EnqueueError::NotLaunched);
            }
            FormatterState::Disabled => return Err(EnqueueError::Disabled),
            FormatterState::Closing | FormatterState::Closed => return Err(EnqueueError::Closed),
            FormatterState::Running => {}
        }
        let sender = self.sender.as_ref().ok_or(EnqueueError::Closed)?;
        sender
            .send(self.attachments.apply(envelope))
            .map_err(|_| EnqueueError::Closed)
    }

    /// Close the write side of the queue. The task drains what is already
    /// queued and then finishes. Does not wait.
    pub fn close(&mut self) {
        if self.sender.take().is_some() {
            self.state.begin_closing();
            debug!("formatter queue closed: formatter={}", self.name);
        }
    }

    /// Close the queue and wait for the task in two bounded stages.
    ///
    /// The first stage waits `timeouts.graceful`. If the task is still
    /// running, cancellation is requested and the second stage waits
    /// `timeouts.forced`. A task that outlives both is aborted and reported
    /// as [`ShutdownReport::Abandoned`].
    ///
    /// # Errors
    ///
    /// Returns the [`FormatterError`] that ended the consumption task, if
    /// any.
    pub async fn shutdown(&mut self, timeouts: ShutdownTimeouts) -> Result<ShutdownReport, FormatterError> {
        self.close();
        let Some(mut task) = self.task.take() else {
            return Ok(match self.state() {
                FormatterState::Closed => ShutdownReport::AlreadyShutDown,
                _ => ShutdownReport::NeverStarted,
            });
        };

        if let Ok(joined) = timeout(timeouts.graceful, &mut task).await {
            return self.finished(joined, ShutdownReport::Completed);
        }
        warn!(
            "formatter did not finish in time, cancelling: formatter={}, waited={:?}",
            self.name, timeouts.graceful
        );
        self.cancel.cancel();

        if let Ok(joined) = timeout(timeouts.forced, &mut task).await {
            return self.finished(joined, ShutdownReport::CompletedAfterCancel);
        }
        task.abort();
        self.state.set(FormatterState::Closed);
        error!(
            "formatter abandoned after forced shutdown: formatter={}, waited={:?}",
            self.name, timeouts.forced
        );
        tracing::error!(formatter = %self.name, "formatter abandoned");
        Ok(ShutdownReport::Abandoned)
    }

    fn finished(
        &self,
        joined: Result<TaskResult, JoinError>,
        report: ShutdownReport,
    ) -> Result<ShutdownReport, FormatterError> {
        self.state.set(FormatterState::Closed);
        let result = match joined {
            Ok(result) => result,
            Err(e) if e.is_panic() => {
                let payload = e.into_panic();
                Err(FormatterError::Panicked(panic_text(payload.as_ref())))
            }
            Err(_) => Err(FormatterError::Cancelled),
        };
        match result {
            Ok(()) => {
                debug!("formatter closed: formatter={}, report={report:?}", self.name);
                Ok(report)
            }
            Err(e) => {
                error!("formatter failed: formatter={}, error={e}", self.name);
                Err(e)
            }
        }
    }
}

enum LoopEnd {
    RunFinished,
    Drained,
    Cancelled,
}

async fn consume(
    name: String,
    mut formatter: Box<dyn Formatter>,
    mut rx: mpsc::UnboundedReceiver<Arc<Envelope>>,
    cancel: CancellationToken,
    state: SharedState,
) -> TaskResult {
    let outcome = AssertUnwindSafe(run_loop(formatter.as_mut(), &mut rx, &cancel, &state))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| {
            Err(FormatterError::Panicked(panic_text(panic.as_ref())))
        });
    rx.close();
    state.begin_closing();

    match &outcome {
        Ok(LoopEnd::RunFinished) => debug!("formatter saw end of run: formatter={name}"),
        Ok(LoopEnd::Drained) => debug!("formatter queue drained: formatter={name}"),
        Ok(LoopEnd::Cancelled) => warn!("formatter cancelled before draining: formatter={name}"),
        Err(e) => {
            error!("formatter stopped processing: formatter={name}, error={e}");
            tracing::error!(formatter = %name, error = %e, "formatter processing failed");
        }
    }

    let finished = formatter.finish().await;
    state.set(FormatterState::Closed);
    if let Err(e) = &finished {
        error!("formatter finalizer failed: formatter={name}, error={e}");
    }
    outcome.and(finished)
}

async fn run_loop(
    formatter: &mut dyn Formatter,
    rx: &mut mpsc::UnboundedReceiver<Arc<Envelope>>,
    cancel: &CancellationToken,
    state: &SharedState,
) -> Result<LoopEnd, FormatterError> {
    loop {
        let envelope = tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(LoopEnd::Cancelled),
            next = rx.recv() => match next {
                Some(envelope) => envelope,
                None => return Ok(LoopEnd::Drained),
            },
        };
        formatter.process(&envelope).await?;
        if envelope.is_test_run_finished() {
            rx.close();
            state.begin_closing();
            return Ok(LoopEnd::RunFinished);
        }
    }
}

/// Readable text for a panic payload: `String` and `&str` payloads verbatim,
/// anything else through `Debug`.
fn panic_text(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_owned()
    } else {
        format!("{payload:?}")
    }
}
