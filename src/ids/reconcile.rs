//! Rewriting identifiers of pre-parsed documents and their pickles.
//!
//! Documents may have been parsed ahead of time (for example cached by a
//! build step) with a different identifier style or an independent counter.
//! [`IdReconciler`] makes such documents consistent with the shared
//! [`IdGenerator`] of the current run. It records every rewritten identifier
//! in an [`IdMap`] so that pickle back-references can follow.

use std::{collections::HashMap, sync::Arc};

use log::debug;

use super::{IdGenerator, IdStyle, IncrementingIdGenerator};
use crate::messages::{
    Background,
    Examples,
    FeatureChild,
    GherkinDocument,
    Pickle,
    RuleChild,
    Scenario,
    Step,
    TableRow,
    Tag,
};

/// Mapping from a node's original identifier to its replacement.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdMap {
    entries: HashMap<String, String>,
}

impl IdMap {
    /// Replacement for `old`, if it was rewritten.
    #[must_use]
    pub fn get(&self, old: &str) -> Option<&str> { self.entries.get(old).map(String::as_str) }

    /// Replacement for `old`, or `old` itself when it was not rewritten.
    #[must_use]
    pub fn resolve<'a>(&'a self, old: &'a str) -> &'a str { self.get(old).unwrap_or(old) }

    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    fn insert(&mut self, old: String, new: String) { self.entries.insert(old, new); }
}

/// What [`IdReconciler::reconcile_document`] did to a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reconciliation {
    /// The document was left untouched.
    Unchanged,
    /// The document was left untouched and the shared counter was seeded to
    /// resume after its highest identifier.
    Seeded {
        /// First identifier the counter will issue.
        next: u64,
    },
    /// Every identifier in the document was replaced.
    Rewritten,
}

/// Result of reconciling one document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentReconciliation {
    pub outcome: Reconciliation,
    pub id_map: IdMap,
}

impl DocumentReconciliation {
    fn untouched(outcome: Reconciliation) -> Self {
        Self {
            outcome,
            id_map: IdMap::default(),
        }
    }
}

/// Brings documents and pickles in line with the run's identifier generator.
#[derive(Clone, Debug)]
pub struct IdReconciler {
    generator: Arc<IdGenerator>,
}

impl IdReconciler {
    #[must_use]
    pub fn new(generator: Arc<IdGenerator>) -> Self { Self { generator } }

    #[must_use]
    pub fn generator(&self) -> &Arc<IdGenerator> { &self.generator }

    /// Reconcile `document` in place.
    ///
    /// * UUID target: documents are never rewritten; UUIDs cannot collide
    ///   with anything the generator issues.
    /// * Incrementing target, counter already used: rewrite.
    /// * Incrementing target, document in UUID style: rewrite.
    /// * Incrementing target, unused counter, incrementing document: seed the
    ///   counter past the document's highest identifier and keep the
    ///   document. If another caller consumed the counter in the meantime, or
    ///   an earlier document already seeded it, the document is rewritten
    ///   instead.
    pub fn reconcile_document(&self, document: &mut GherkinDocument) -> DocumentReconciliation {
        let Some(existing) = IdStyle::probe(document) else {
            return DocumentReconciliation::untouched(Reconciliation::Unchanged);
        };
        let counter = match self.generator.as_ref() {
            IdGenerator::Uuid => {
                return DocumentReconciliation::untouched(Reconciliation::Unchanged);
            }
            IdGenerator::Incrementing(counter) => counter,
        };

        if existing == IdStyle::Incrementing && !counter.has_been_used() {
            if let Some(outcome) = try_seed(counter, document) {
                debug!(
                    "kept identifiers of {} and seeded counter: outcome={outcome:?}",
                    document.uri.as_deref().unwrap_or("<unknown>")
                );
                return DocumentReconciliation::untouched(outcome);
            }
        }

        let id_map = self.rewrite_document(document);
        debug!(
            "rewrote {} identifiers in {}: from={existing}",
            id_map.len(),
            document.uri.as_deref().unwrap_or("<unknown>")
        );
        DocumentReconciliation {
            outcome: Reconciliation::Rewritten,
            id_map,
        }
    }

    /// Give every pickle and pickle step a fresh identifier and follow
    /// rewritten document identifiers through `id_map`.
    pub fn reconcile_pickles(&self, pickles: &mut [Pickle], id_map: &IdMap) {
        for pickle in pickles {
            pickle.set_id(self.generator.new_id());
            remap_all(&mut pickle.ast_node_ids, id_map);
            for step in &mut pickle.steps {
                step.set_id(self.generator.new_id());
                remap_all(&mut step.ast_node_ids, id_map);
            }
            for tag in &mut pickle.tags {
                if let Some(new) = id_map.get(tag.ast_node_id()) {
                    tag.set_ast_node_id(new.to_owned());
                }
            }
        }
    }

    /// Reconcile a document together with the pickles compiled from it.
    pub fn reconcile(
        &self,
        document: &mut GherkinDocument,
        pickles: &mut [Pickle],
    ) -> DocumentReconciliation {
        let result = self.reconcile_document(document);
        self.reconcile_pickles(pickles, &result.id_map);
        result
    }

    fn rewrite_document(&self, document: &mut GherkinDocument) -> IdMap {
        let mut rewriter = Rewriter {
            generator: &self.generator,
            map: IdMap::default(),
        };
        if let Some(feature) = document.feature.as_mut() {
            rewriter.tags(&mut feature.tags);
            for child in &mut feature.children {
                match child {
                    FeatureChild::Rule(rule) => {
                        let id = rewriter.assign(rule.id());
                        rule.set_id(id);
                        rewriter.tags(&mut rule.tags);
                        for child in &mut rule.children {
                            match child {
                                RuleChild::Background(background) => rewriter.background(background),
                                RuleChild::Scenario(scenario) => rewriter.scenario(scenario),
                            }
                        }
                    }
                    FeatureChild::Background(background) => rewriter.background(background),
                    FeatureChild::Scenario(scenario) => rewriter.scenario(scenario),
                }
            }
        }
        rewriter.map
    }
}

fn try_seed(counter: &IncrementingIdGenerator, document: &GherkinDocument) -> Option<Reconciliation> {
    let Some(highest) = document
        .node_ids()
        .into_iter()
        .filter_map(|id| id.parse::<u64>().ok())
        .max()
    else {
        // Nothing numeric to collide with.
        return Some(Reconciliation::Unchanged);
    };
    counter.seed_if_unused(highest).then(|| Reconciliation::Seeded {
        next: highest.saturating_add(1),
    })
}

fn remap_all(ids: &mut [String], id_map: &IdMap) {
    for id in ids {
        if let Some(new) = id_map.get(id) {
            *id = new.to_owned();
        }
    }
}

struct Rewriter<'a> {
    generator: &'a IdGenerator,
    map: IdMap,
}

impl Rewriter<'_> {
    fn assign(&mut self, old: &str) -> String {
        let new = self.generator.new_id();
        self.map.insert(old.to_owned(), new.clone());
        new
    }

    fn tags(&mut self, tags: &mut [Tag]) {
        for tag in tags {
            let id = self.assign(tag.id());
            tag.set_id(id);
        }
    }

    fn background(&mut self, background: &mut Background) {
        let id = self.assign(background.id());
        background.set_id(id);
        self.steps(&mut background.steps);
    }

    fn scenario(&mut self, scenario: &mut Scenario) {
        let id = self.assign(scenario.id());
        scenario.set_id(id);
        self.tags(&mut scenario.tags);
        self.steps(&mut scenario.steps);
        for examples in &mut scenario.examples {
            self.examples(examples);
        }
    }

    fn steps(&mut self, steps: &mut [Step]) {
        for step in steps {
            let id = self.assign(step.id());
            step.set_id(id);
            if let Some(table) = step.data_table.as_mut() {
                self.rows(&mut table.rows);
            }
        }
    }

    fn examples(&mut self, examples: &mut Examples) {
        let id = self.assign(examples.id());
        examples.set_id(id);
        self.tags(&mut examples.tags);
        if let Some(header) = examples.table_header.as_mut() {
            self.rows(std::slice::from_mut(header));
        }
        self.rows(&mut examples.table_body);
    }

    fn rows(&mut self, rows: &mut [TableRow]) {
        for row in rows {
            let id = self.assign(row.id());
            row.set_id(id);
        }
    }
}
