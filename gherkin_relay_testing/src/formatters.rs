//! Formatters with scripted behaviour for broker and runtime tests.

use std::{
    future,
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use gherkin_relay::{
    Envelope,
    Formatter,
    FormatterConfiguration,
    FormatterContext,
    FormatterError,
};

/// What a [`RecordingFormatter`] observed, shared with the test.
#[derive(Clone, Debug, Default)]
pub struct Recording(Arc<Mutex<RecordingState>>);

#[derive(Debug, Default)]
struct RecordingState {
    config: Option<FormatterConfiguration>,
    envelopes: Vec<Envelope>,
    finished: usize,
}

impl Recording {
    fn with<T>(&self, f: impl FnOnce(&mut RecordingState) -> T) -> T {
        f(&mut self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Configuration passed to `initialize`, if it ran.
    #[must_use]
    pub fn config(&self) -> Option<FormatterConfiguration> { self.with(|s| s.config.clone()) }

    #[must_use]
    pub fn initialized(&self) -> bool { self.with(|s| s.config.is_some()) }

    #[must_use]
    pub fn envelopes(&self) -> Vec<Envelope> { self.with(|s| s.envelopes.clone()) }

    /// Kinds of the processed envelopes, in processing order.
    #[must_use]
    pub fn kinds(&self) -> Vec<&'static str> {
        self.with(|s| s.envelopes.iter().map(Envelope::kind).collect())
    }

    /// Number of times `finish` ran.
    #[must_use]
    pub fn finish_count(&self) -> usize { self.with(|s| s.finished) }
}

/// Scripted failure points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Behaviour {
    /// Process everything.
    #[default]
    Record,
    /// Fail `initialize`.
    FailInitialize,
    /// Return an error while processing envelope number `n` (1-based).
    FailOn(usize),
    /// Panic while processing envelope number `n` (1-based).
    PanicOn(usize),
    /// Never return from processing envelope number `n` (1-based).
    StallOn(usize),
}

/// Records every envelope it is given and misbehaves on request.
#[derive(Debug)]
pub struct RecordingFormatter {
    name: String,
    behaviour: Behaviour,
    recording: Recording,
}

impl RecordingFormatter {
    pub fn new(name: impl Into<String>) -> Self { Self::with_behaviour(name, Behaviour::Record) }

    pub fn with_behaviour(name: impl Into<String>, behaviour: Behaviour) -> Self {
        Self {
            name: name.into(),
            behaviour,
            recording: Recording::default(),
        }
    }

    /// Shared view of what this formatter observes.
    #[must_use]
    pub fn recording(&self) -> Recording { self.recording.clone() }
}

#[async_trait]
impl Formatter for RecordingFormatter {
    fn name(&self) -> &str { &self.name }

    async fn initialize(
        &mut self,
        config: &FormatterConfiguration,
        _context: &FormatterContext,
    ) -> Result<(), FormatterError> {
        if self.behaviour == Behaviour::FailInitialize {
            return Err(FormatterError::Initialization(format!(
                "{} refused to start",
                self.name
            )));
        }
        self.recording.with(|s| s.config = Some(config.clone()));
        Ok(())
    }

    async fn process(&mut self, envelope: &Envelope) -> Result<(), FormatterError> {
        let position = self.recording.with(|s| s.envelopes.len()) + 1;
        match self.behaviour {
            Behaviour::FailOn(n) if n == position => {
                return Err(FormatterError::Processing(format!("failed on envelope {n}")));
            }
            Behaviour::PanicOn(n) if n == position => panic!("panicked on envelope {n}"),
            Behaviour::StallOn(n) if n == position => future::pending::<()>().await,
            _ => {}
        }
        self.recording.with(|s| s.envelopes.push(envelope.clone()));
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), FormatterError> {
        self.recording.with(|s| s.finished += 1);
        Ok(())
    }
}
