//! Resolved scenario instances.
//!
//! A [`Pickle`] is produced per scenario (or per examples row of an outline)
//! at run time. `ast_node_ids` are back-references into the owning
//! [`super::GherkinDocument`], never ownership.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pickle {
    id: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub steps: Vec<PickleStep>,
    #[serde(default)]
    pub tags: Vec<PickleTag>,
    #[serde(default)]
    pub ast_node_ids: Vec<String>,
}

impl Pickle {
    #[must_use]
    pub fn new(id: impl Into<String>, uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uri: uri.into(),
            name: name.into(),
            language: "en".to_owned(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn id(&self) -> &str { &self.id }

    pub(crate) fn set_id(&mut self, id: String) { self.id = id; }

    #[must_use]
    pub fn with_ast_node_id(mut self, id: impl Into<String>) -> Self {
        self.ast_node_ids.push(id.into());
        self
    }

    #[must_use]
    pub fn with_step(mut self, step: PickleStep) -> Self {
        self.steps.push(step);
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: PickleTag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Every back-reference held by the pickle, its steps and its tags.
    pub fn referenced_node_ids(&self) -> impl Iterator<Item = &str> {
        self.ast_node_ids
            .iter()
            .chain(self.steps.iter().flat_map(|step| step.ast_node_ids.iter()))
            .map(String::as_str)
            .chain(self.tags.iter().map(|tag| tag.ast_node_id.as_str()))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickleStep {
    id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "type")]
    pub kind: Option<PickleStepKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument: Option<PickleStepArgument>,
    #[serde(default)]
    pub ast_node_ids: Vec<String>,
}

impl PickleStep {
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn id(&self) -> &str { &self.id }

    pub(crate) fn set_id(&mut self, id: String) { self.id = id; }

    #[must_use]
    pub fn with_ast_node_id(mut self, id: impl Into<String>) -> Self {
        self.ast_node_ids.push(id.into());
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: PickleStepKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn with_table(mut self, table: PickleTable) -> Self {
        self.argument = Some(PickleStepArgument {
            data_table: Some(table),
        });
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickleStepKind {
    Unknown,
    Context,
    Action,
    Outcome,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickleStepArgument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_table: Option<PickleTable>,
}

/// Step table with example values substituted. Rows carry no identity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickleTable {
    #[serde(default)]
    pub rows: Vec<PickleTableRow>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickleTableRow {
    #[serde(default)]
    pub cells: Vec<PickleTableCell>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickleTableCell {
    pub value: String,
}

/// Tag inherited by a pickle; `ast_node_id` points at the source `Tag`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickleTag {
    pub name: String,
    ast_node_id: String,
}

impl PickleTag {
    #[must_use]
    pub fn new(name: impl Into<String>, ast_node_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ast_node_id: ast_node_id.into(),
        }
    }

    #[must_use]
    pub fn ast_node_id(&self) -> &str { &self.ast_node_id }

    pub(crate) fn set_ast_node_id(&mut self, id: String) { self.ast_node_id = id; }
}
