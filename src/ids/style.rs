//! Identifier style detection.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::messages::{FeatureChild, GherkinDocument};

/// How identifiers are generated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdStyle {
    /// Random globally unique identifiers.
    #[default]
    Uuid,
    /// Process-local increasing integers.
    Incrementing,
}

impl IdStyle {
    /// Classify a single identifier: anything that is not a UUID counts as
    /// incrementing.
    #[must_use]
    pub fn of(id: &str) -> Self {
        if Uuid::parse_str(id).is_ok() {
            Self::Uuid
        } else {
            Self::Incrementing
        }
    }

    /// Determine the style a document was generated with.
    ///
    /// Looks at the first top-level child (rule, background or scenario) and
    /// falls back to the first feature tag. Returns `None` for documents with
    /// no identified nodes.
    #[must_use]
    pub fn probe(document: &GherkinDocument) -> Option<Self> {
        let feature = document.feature.as_ref()?;
        let id = match feature.children.first() {
            Some(FeatureChild::Rule(rule)) => rule.id(),
            Some(FeatureChild::Background(background)) => background.id(),
            Some(FeatureChild::Scenario(scenario)) => scenario.id(),
            None => feature.tags.first()?.id(),
        };
        Some(Self::of(id))
    }
}

impl fmt::Display for IdStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid => f.write_str("uuid"),
            Self::Incrementing => f.write_str("incrementing"),
        }
    }
}

/// Error returned when parsing an unknown style name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown id generation style '{0}'; expected 'uuid' or 'incrementing'")]
pub struct UnknownIdStyle(pub String);

impl FromStr for IdStyle {
    type Err = UnknownIdStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uuid" => Ok(Self::Uuid),
            "incrementing" => Ok(Self::Incrementing),
            _ => Err(UnknownIdStyle(s.to_owned())),
        }
    }
}
