//! Replaying an NDJSON log through the broker.

use std::{collections::HashSet, sync::Arc};

use gherkin_relay::{
    Envelope,
    Error,
    FormattersConfigProvider,
    IdGenerator,
    IdReconciler,
    MessageBroker,
    Replay,
    RuntimeOptions,
    config::{HostConfigResolver, MapEnvironment},
};
use gherkin_relay_testing::{RecordingFormatter, envelopes};
use rstest::rstest;

fn ndjson(stream: &[Envelope]) -> String {
    stream
        .iter()
        .map(|envelope| serde_json::to_string(envelope).expect("serialise"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn recording_broker() -> (MessageBroker, gherkin_relay_testing::Recording) {
    let env = MapEnvironment::new().with("REQNROLL_FORMATTERS_RECORDER", "true");
    let provider = FormattersConfigProvider::standard(Arc::new(env), None, HostConfigResolver::default());
    let mut broker = MessageBroker::new(Arc::new(provider), RuntimeOptions::default());
    let formatter = RecordingFormatter::new("recorder");
    let recording = formatter.recording();
    broker.register(formatter);
    (broker, recording)
}

#[tokio::test]
async fn replays_every_envelope_in_order() {
    let (mut broker, recording) = recording_broker();
    let (document, pickle) = envelopes::document_with_pickle("a.feature", 2, envelopes::counting_from(1));
    let mut stream = envelopes::run(2);
    stream.insert(0, pickle.into());
    stream.insert(0, document.into());
    let input = format!("{}\n\n", ndjson(&stream));

    let mut replay = Replay::new(IdReconciler::new(Arc::new(IdGenerator::uuid())));
    let published = replay.run(input.as_bytes(), &mut broker).await.expect("replay");
    broker.shutdown().await;

    assert_eq!(published, stream.len());
    // the broker launches formatters on testRunStarted, after the static messages
    assert_eq!(recording.envelopes(), stream[2..]);
}

#[rstest]
#[case::not_json("{ nope")]
#[case::unknown_kind(r#"{"somethingElse":{}}"#)]
#[tokio::test]
async fn reports_the_offending_line(#[case] bad: &str) {
    let (mut broker, _recording) = recording_broker();
    let input = format!("{}\n{bad}\n", ndjson(&envelopes::run(0)[..1]));

    let mut replay = Replay::new(IdReconciler::new(Arc::new(IdGenerator::uuid())));
    let err = replay.run(input.as_bytes(), &mut broker).await.expect_err("invalid line");
    broker.shutdown().await;
    assert!(matches!(err, Error::Envelope { line: 2, .. }), "unexpected error {err}");
}

#[tokio::test]
async fn merged_logs_keep_identifiers_distinct() {
    let (mut broker, recording) = recording_broker();
    let mut stream = envelopes::run(0);
    for uri in ["a.feature", "b.feature"] {
        // each log numbers its own identifiers from zero
        let (document, pickle) = envelopes::document_with_pickle(uri, 2, envelopes::counting_from(0));
        stream.insert(stream.len() - 1, document.into());
        stream.insert(stream.len() - 1, pickle.into());
    }

    let mut replay = Replay::new(IdReconciler::new(Arc::new(IdGenerator::incrementing())));
    replay
        .run(ndjson(&stream).as_bytes(), &mut broker)
        .await
        .expect("replay");
    broker.shutdown().await;

    let mut seen = HashSet::new();
    for envelope in recording.envelopes() {
        let ids: Vec<String> = match &envelope {
            Envelope::GherkinDocument(document) => document.node_ids().into_iter().map(str::to_owned).collect(),
            Envelope::Pickle(pickle) => std::iter::once(pickle.id())
                .chain(pickle.steps.iter().map(|step| step.id()))
                .map(str::to_owned)
                .collect(),
            _ => continue,
        };
        for id in ids {
            assert!(seen.insert(id.clone()), "identifier {id} used twice");
        }
    }
    // two documents of five nodes, two pickles of three identifiers
    assert_eq!(seen.len(), 16);
}
