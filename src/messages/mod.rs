//! Envelope model moved through the broker.
//!
//! An [`Envelope`] wraps exactly one message kind and serialises in the
//! Cucumber Messages NDJSON shape: a single-key object naming the kind, for
//! example `{"testRunStarted":{...}}`. Envelopes carry no sequence number;
//! emission order is the only ordering guarantee.

mod gherkin;
mod pickle;

use chrono::Utc;
pub use gherkin::{
    Background,
    DataTable,
    Examples,
    Feature,
    FeatureChild,
    GherkinDocument,
    Rule,
    RuleChild,
    Scenario,
    Step,
    TableCell,
    TableRow,
    Tag,
};
pub use pickle::{
    Pickle,
    PickleStep,
    PickleStepArgument,
    PickleStepKind,
    PickleTable,
    PickleTableCell,
    PickleTableRow,
    PickleTag,
};
use serde::{Deserialize, Serialize};

/// One event of the test-execution message stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Envelope {
    GherkinDocument(GherkinDocument),
    Pickle(Pickle),
    TestRunStarted(TestRunStarted),
    TestRunFinished(TestRunFinished),
    FeatureStarted(FeatureStarted),
    FeatureFinished(FeatureFinished),
    ScenarioStarted(ScenarioStarted),
    ScenarioFinished(ScenarioFinished),
    StepStarted(StepStarted),
    StepFinished(StepFinished),
    Attachment(Attachment),
    ExternalAttachment(ExternalAttachment),
}

impl Envelope {
    /// Protocol name of the wrapped message, used in log output.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GherkinDocument(_) => "gherkinDocument",
            Self::Pickle(_) => "pickle",
            Self::TestRunStarted(_) => "testRunStarted",
            Self::TestRunFinished(_) => "testRunFinished",
            Self::FeatureStarted(_) => "featureStarted",
            Self::FeatureFinished(_) => "featureFinished",
            Self::ScenarioStarted(_) => "scenarioStarted",
            Self::ScenarioFinished(_) => "scenarioFinished",
            Self::StepStarted(_) => "stepStarted",
            Self::StepFinished(_) => "stepFinished",
            Self::Attachment(_) => "attachment",
            Self::ExternalAttachment(_) => "externalAttachment",
        }
    }

    #[must_use]
    pub fn is_test_run_started(&self) -> bool { matches!(self, Self::TestRunStarted(_)) }

    #[must_use]
    pub fn is_test_run_finished(&self) -> bool { matches!(self, Self::TestRunFinished(_)) }
}

macro_rules! envelope_from {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Envelope {
                fn from(value: $variant) -> Self { Self::$variant(value) }
            }
        )*
    };
}

envelope_from!(
    GherkinDocument,
    Pickle,
    TestRunStarted,
    TestRunFinished,
    FeatureStarted,
    FeatureFinished,
    ScenarioStarted,
    ScenarioFinished,
    StepStarted,
    StepFinished,
    Attachment,
    ExternalAttachment,
);

/// Wall-clock instant as seconds and nanoseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: u32,
}

impl Timestamp {
    #[must_use]
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            seconds: now.timestamp(),
            nanos: now.timestamp_subsec_nanos(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunStarted {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub timestamp: Timestamp,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunFinished {
    pub success: bool,
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_run_started_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureStarted {
    pub uri: String,
    pub name: String,
    pub timestamp: Timestamp,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFinished {
    pub uri: String,
    pub timestamp: Timestamp,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioStarted {
    pub id: String,
    pub pickle_id: String,
    pub timestamp: Timestamp,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioFinished {
    pub scenario_started_id: String,
    pub status: Status,
    pub timestamp: Timestamp,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStarted {
    pub scenario_started_id: String,
    pub pickle_step_id: String,
    pub timestamp: Timestamp,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepFinished {
    pub scenario_started_id: String,
    pub pickle_step_id: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: Timestamp,
}

/// Outcome of a scenario or step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    Unknown,
    Passed,
    Skipped,
    Pending,
    Undefined,
    Ambiguous,
    Failed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentEncoding {
    #[default]
    Identity,
    Base64,
}

/// Content attached inline to a step or scenario.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub body: String,
    pub content_encoding: ContentEncoding,
    pub media_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_step_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_case_started_id: Option<String>,
}

/// Attachment stored outside the message stream and referenced by `url`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalAttachment {
    pub url: String,
    pub media_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_step_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_case_started_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn envelope_serialises_with_kind_key() {
        let envelope = Envelope::from(TestRunStarted {
            id: Some("1".into()),
            timestamp: Timestamp {
                seconds: 10,
                nanos: 5,
            },
        });
        let line = serde_json::to_string(&envelope).expect("serialise envelope");
        assert_eq!(
            line,
            r#"{"testRunStarted":{"id":"1","timestamp":{"seconds":10,"nanos":5}}}"#
        );
    }

    #[test]
    fn envelope_parses_ndjson_line() {
        let line = r#"{"testRunFinished":{"success":true,"timestamp":{"seconds":1,"nanos":0}}}"#;
        let envelope: Envelope = serde_json::from_str(line).expect("parse envelope");
        assert!(envelope.is_test_run_finished());
        assert_eq!(envelope.kind(), "testRunFinished");
    }

    #[rstest]
    #[case(Status::Passed, "\"PASSED\"")]
    #[case(Status::Undefined, "\"UNDEFINED\"")]
    fn status_uses_protocol_spelling(#[case] status: Status, #[case] expected: &str) {
        assert_eq!(
            serde_json::to_string(&status).expect("serialise status"),
            expected
        );
    }
}
