//! Ready-made envelope streams and documents.

use gherkin_relay::messages::{
    Envelope,
    Feature,
    GherkinDocument,
    Pickle,
    PickleStep,
    PickleTag,
    Scenario,
    Status,
    Step,
    StepFinished,
    StepStarted,
    Tag,
    TestRunFinished,
    TestRunStarted,
    Timestamp,
};

/// A complete run: `testRunStarted`, a started/finished pair per step and
/// `testRunFinished`.
#[must_use]
pub fn run(steps: usize) -> Vec<Envelope> {
    let mut envelopes = vec![
        TestRunStarted {
            id: Some("run".into()),
            timestamp: Timestamp::now(),
        }
        .into(),
    ];
    for step in 0..steps {
        let pickle_step_id = format!("step-{step}");
        envelopes.push(
            StepStarted {
                scenario_started_id: "scenario".into(),
                pickle_step_id: pickle_step_id.clone(),
                timestamp: Timestamp::now(),
            }
            .into(),
        );
        envelopes.push(
            StepFinished {
                scenario_started_id: "scenario".into(),
                pickle_step_id,
                status: Status::Passed,
                message: None,
                timestamp: Timestamp::now(),
            }
            .into(),
        );
    }
    envelopes.push(
        TestRunFinished {
            success: true,
            timestamp: Timestamp::now(),
            message: None,
            test_run_started_id: Some("run".into()),
        }
        .into(),
    );
    envelopes
}

/// A document with one tagged scenario of `steps` steps, plus its pickle.
///
/// Identifiers are issued by `next_id` in document order: feature tag,
/// scenario, scenario tag, steps. Pickle identifiers follow.
pub fn document_with_pickle(
    uri: &str,
    steps: usize,
    mut next_id: impl FnMut() -> String,
) -> (GherkinDocument, Pickle) {
    let feature_tag = Tag::new(next_id(), "@feature");
    let scenario_id = next_id();
    let scenario_tag = Tag::new(next_id(), "@scenario");
    let step_ids: Vec<String> = (0..steps).map(|_| next_id()).collect();

    let mut scenario = Scenario::new(scenario_id.clone(), "scenario").with_tag(scenario_tag.clone());
    for (n, id) in step_ids.iter().enumerate() {
        scenario = scenario.with_step(Step::new(id.clone(), "Given ", format!("step {n}")));
    }
    let document = GherkinDocument::new(
        uri,
        Feature::new("feature")
            .with_tag(feature_tag.clone())
            .with_child(scenario),
    );

    let mut pickle = Pickle::new(next_id(), uri, "scenario")
        .with_ast_node_id(scenario_id)
        .with_tag(PickleTag::new(feature_tag.name.clone(), feature_tag.id()))
        .with_tag(PickleTag::new(scenario_tag.name.clone(), scenario_tag.id()));
    for (n, id) in step_ids.into_iter().enumerate() {
        pickle = pickle.with_step(PickleStep::new(next_id(), format!("step {n}")).with_ast_node_id(id));
    }
    (document, pickle)
}

/// An id source counting up from `first`.
pub fn counting_from(first: u64) -> impl FnMut() -> String {
    let mut next = first;
    move || {
        let id = next.to_string();
        next += 1;
        id
    }
}
