//! Static Gherkin document model.
//!
//! The tree mirrors the `gherkinDocument` message of the Cucumber Messages
//! protocol. Nodes carrying identity expose their identifier read-only; only
//! the [`crate::ids`] module may assign a new one.

use serde::{Deserialize, Serialize};

/// Parsed representation of one feature file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GherkinDocument {
    /// Location of the source file relative to the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// The feature, absent for empty files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<Feature>,
}

impl GherkinDocument {
    /// Create a document for `uri` holding `feature`.
    #[must_use]
    pub fn new(uri: impl Into<String>, feature: Feature) -> Self {
        Self {
            uri: Some(uri.into()),
            feature: Some(feature),
        }
    }

    /// Collect every node identifier in document order.
    #[must_use]
    pub fn node_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        if let Some(feature) = &self.feature {
            ids.extend(feature.tags.iter().map(Tag::id));
            for child in &feature.children {
                child.collect_ids(&mut ids);
            }
        }
        ids
    }
}

/// Top-level `Feature:` block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub children: Vec<FeatureChild>,
}

impl Feature {
    /// Create an English feature named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            language: "en".to_owned(),
            keyword: "Feature".to_owned(),
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: impl Into<FeatureChild>) -> Self {
        self.children.push(child.into());
        self
    }
}

/// A child of a [`Feature`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureChild {
    Rule(Rule),
    Background(Background),
    Scenario(Scenario),
}

impl FeatureChild {
    /// Identifier of the node itself.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Rule(rule) => rule.id(),
            Self::Background(background) => background.id(),
            Self::Scenario(scenario) => scenario.id(),
        }
    }

    fn collect_ids<'a>(&'a self, ids: &mut Vec<&'a str>) {
        match self {
            Self::Rule(rule) => rule.collect_ids(ids),
            Self::Background(background) => background.collect_ids(ids),
            Self::Scenario(scenario) => scenario.collect_ids(ids),
        }
    }
}

impl From<Rule> for FeatureChild {
    fn from(value: Rule) -> Self { Self::Rule(value) }
}

impl From<Background> for FeatureChild {
    fn from(value: Background) -> Self { Self::Background(value) }
}

impl From<Scenario> for FeatureChild {
    fn from(value: Scenario) -> Self { Self::Scenario(value) }
}

/// `Rule:` block grouping backgrounds and scenarios.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    id: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub children: Vec<RuleChild>,
}

impl Rule {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            keyword: "Rule".to_owned(),
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn id(&self) -> &str { &self.id }

    pub(crate) fn set_id(&mut self, id: String) { self.id = id; }

    #[must_use]
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: impl Into<RuleChild>) -> Self {
        self.children.push(child.into());
        self
    }

    fn collect_ids<'a>(&'a self, ids: &mut Vec<&'a str>) {
        ids.push(&self.id);
        ids.extend(self.tags.iter().map(Tag::id));
        for child in &self.children {
            match child {
                RuleChild::Background(background) => background.collect_ids(ids),
                RuleChild::Scenario(scenario) => scenario.collect_ids(ids),
            }
        }
    }
}

/// A child of a [`Rule`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleChild {
    Background(Background),
    Scenario(Scenario),
}

impl From<Background> for RuleChild {
    fn from(value: Background) -> Self { Self::Background(value) }
}

impl From<Scenario> for RuleChild {
    fn from(value: Scenario) -> Self { Self::Scenario(value) }
}

/// `Background:` steps shared by the scenarios of a feature or rule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Background {
    id: String,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Background {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            keyword: "Background".to_owned(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn id(&self) -> &str { &self.id }

    pub(crate) fn set_id(&mut self, id: String) { self.id = id; }

    #[must_use]
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    fn collect_ids<'a>(&'a self, ids: &mut Vec<&'a str>) {
        ids.push(&self.id);
        for step in &self.steps {
            step.collect_ids(ids);
        }
    }
}

/// `Scenario:` or, when `examples` is non-empty, `Scenario Outline:`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    id: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub examples: Vec<Examples>,
}

impl Scenario {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            keyword: "Scenario".to_owned(),
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn id(&self) -> &str { &self.id }

    pub(crate) fn set_id(&mut self, id: String) { self.id = id; }

    /// Whether this scenario is a scenario outline.
    #[must_use]
    pub fn is_outline(&self) -> bool { !self.examples.is_empty() }

    #[must_use]
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    #[must_use]
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    #[must_use]
    pub fn with_examples(mut self, examples: Examples) -> Self {
        self.keyword = "Scenario Outline".to_owned();
        self.examples.push(examples);
        self
    }

    fn collect_ids<'a>(&'a self, ids: &mut Vec<&'a str>) {
        ids.push(&self.id);
        ids.extend(self.tags.iter().map(Tag::id));
        for step in &self.steps {
            step.collect_ids(ids);
        }
        for examples in &self.examples {
            examples.collect_ids(ids);
        }
    }
}

/// A single `Given`/`When`/`Then` line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    id: String,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_table: Option<DataTable>,
}

impl Step {
    #[must_use]
    pub fn new(id: impl Into<String>, keyword: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            keyword: keyword.into(),
            text: text.into(),
            data_table: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str { &self.id }

    pub(crate) fn set_id(&mut self, id: String) { self.id = id; }

    #[must_use]
    pub fn with_data_table(mut self, table: DataTable) -> Self {
        self.data_table = Some(table);
        self
    }

    fn collect_ids<'a>(&'a self, ids: &mut Vec<&'a str>) {
        ids.push(&self.id);
        if let Some(table) = &self.data_table {
            ids.extend(table.rows.iter().map(TableRow::id));
        }
    }
}

/// Table argument attached to a step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTable {
    #[serde(default)]
    pub rows: Vec<TableRow>,
}

/// `Examples:` block of a scenario outline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Examples {
    id: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_header: Option<TableRow>,
    #[serde(default)]
    pub table_body: Vec<TableRow>,
}

impl Examples {
    #[must_use]
    pub fn new(id: impl Into<String>, header: TableRow) -> Self {
        Self {
            id: id.into(),
            keyword: "Examples".to_owned(),
            table_header: Some(header),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn id(&self) -> &str { &self.id }

    pub(crate) fn set_id(&mut self, id: String) { self.id = id; }

    #[must_use]
    pub fn with_row(mut self, row: TableRow) -> Self {
        self.table_body.push(row);
        self
    }

    fn collect_ids<'a>(&'a self, ids: &mut Vec<&'a str>) {
        ids.push(&self.id);
        ids.extend(self.tags.iter().map(Tag::id));
        ids.extend(self.table_header.iter().map(TableRow::id));
        ids.extend(self.table_body.iter().map(TableRow::id));
    }
}

/// One row of a data table or examples table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    id: String,
    #[serde(default)]
    pub cells: Vec<TableCell>,
}

impl TableRow {
    #[must_use]
    pub fn new<I, S>(id: impl Into<String>, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            cells: cells
                .into_iter()
                .map(|value| TableCell {
                    value: value.into(),
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str { &self.id }

    pub(crate) fn set_id(&mut self, id: String) { self.id = id; }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCell {
    pub value: String,
}

/// `@tag` annotation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    id: String,
    pub name: String,
}

impl Tag {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str { &self.id }

    pub(crate) fn set_id(&mut self, id: String) { self.id = id; }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ids_follow_document_order() {
        let feature = Feature::new("Checkout")
            .with_tag(Tag::new("1", "@smoke"))
            .with_child(Background::new("2").with_step(Step::new("3", "Given ", "a cart")))
            .with_child(
                Scenario::new("4", "Pay")
                    .with_tag(Tag::new("5", "@slow"))
                    .with_step(Step::new("6", "When ", "I pay <amount>"))
                    .with_examples(
                        Examples::new("7", TableRow::new("8", ["amount"]))
                            .with_row(TableRow::new("9", ["10"])),
                    ),
            );
        let doc = GherkinDocument::new("features/checkout.feature", feature);

        assert_eq!(
            doc.node_ids(),
            vec!["1", "2", "3", "4", "5", "6", "7", "8", "9"]
        );
    }

    #[test]
    fn children_serialise_as_tagged_objects() {
        let child = FeatureChild::from(Scenario::new("s1", "one"));
        let json = serde_json::to_value(&child).expect("serialise child");
        assert_eq!(json["scenario"]["id"], "s1");
        assert_eq!(json["scenario"]["name"], "one");
    }
}
