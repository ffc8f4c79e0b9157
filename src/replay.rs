//! Replay of a recorded envelope log through a [`MessageBroker`].
//!
//! A log written by one run (or another tool) carries its own identifiers.
//! [`Replay`] reconciles every `gherkinDocument` and `pickle` envelope
//! against this run's identifier generator before publishing, so documents
//! merged from several logs never share identifiers. Scenario and step
//! events follow their pickle's new identifiers.

use std::collections::HashMap;

use log::debug;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::{
    broker::MessageBroker,
    error::{Error, Result},
    ids::{IdMap, IdReconciler},
    messages::{Envelope, Pickle},
};

/// Reconciles identifiers of replayed envelopes, one document at a time.
#[derive(Debug)]
pub struct Replay {
    reconciler: IdReconciler,
    documents: HashMap<String, IdMap>,
    pickle_ids: HashMap<String, String>,
}

impl Replay {
    #[must_use]
    pub fn new(reconciler: IdReconciler) -> Self {
        Self {
            reconciler,
            documents: HashMap::new(),
            pickle_ids: HashMap::new(),
        }
    }

    /// Rewrite identifiers in `envelope` where needed.
    ///
    /// Pickles always receive fresh identifiers; their references into the
    /// document follow whatever the document reconciliation rewrote.
    pub fn prepare(&mut self, envelope: &mut Envelope) {
        match envelope {
            Envelope::GherkinDocument(document) => {
                let result = self.reconciler.reconcile_document(document);
                let uri = document.uri.clone().unwrap_or_default();
                self.documents.insert(uri, result.id_map);
            }
            Envelope::Pickle(pickle) => {
                let before = pickle_ids(pickle);
                let empty = IdMap::default();
                let id_map = self.documents.get(&pickle.uri).unwrap_or(&empty);
                self.reconciler
                    .reconcile_pickles(std::slice::from_mut(pickle), id_map);
                self.pickle_ids.extend(before.into_iter().zip(pickle_ids(pickle)));
            }
            Envelope::ScenarioStarted(started) => self.follow(&mut started.pickle_id),
            Envelope::StepStarted(started) => self.follow(&mut started.pickle_step_id),
            Envelope::StepFinished(finished) => self.follow(&mut finished.pickle_step_id),
            _ => {}
        }
    }

    fn follow(&self, id: &mut String) {
        if let Some(new) = self.pickle_ids.get(id.as_str()) {
            id.clone_from(new);
        }
    }

    /// Read NDJSON envelopes from `input` and publish each one.
    ///
    /// Blank lines are skipped. Returns the number of envelopes published.
    ///
    /// # Errors
    ///
    /// Fails on unreadable input, on a line that is not an envelope, and on
    /// configuration errors raised by the broker.
    pub async fn run<R>(&mut self, input: R, broker: &mut MessageBroker) -> Result<usize>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut line_number = 0;
        let mut published = 0;
        while let Some(line) = lines.next_line().await? {
            line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            let mut envelope: Envelope = serde_json::from_str(&line).map_err(|source| Error::Envelope {
                line: line_number,
                source,
            })?;
            self.prepare(&mut envelope);
            broker.publish(envelope).await?;
            published += 1;
        }
        debug!("replay finished: lines={line_number}, published={published}");
        Ok(published)
    }
}

fn pickle_ids(pickle: &Pickle) -> Vec<String> {
    std::iter::once(pickle.id())
        .chain(pickle.steps.iter().map(|step| step.id()))
        .map(str::to_owned)
        .collect()
}
