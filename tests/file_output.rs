//! Built-in formatters writing through the broker.

use std::{fs, sync::Arc};

use gherkin_relay::{
    Envelope,
    FormattersConfigProvider,
    MessageBroker,
    RuntimeOptions,
    ShutdownReport,
    config::{HostConfigResolver, MapEnvironment},
    formatters::{self, HtmlOutput},
    messages::ExternalAttachment,
};
use gherkin_relay_testing::envelopes;
use rstest::{fixture, rstest};
use tempfile::TempDir;

#[fixture]
fn out_dir() -> TempDir { TempDir::new().expect("temp dir") }

fn broker(env: MapEnvironment) -> MessageBroker {
    let provider = FormattersConfigProvider::standard(Arc::new(env), None, HostConfigResolver::default());
    let mut broker = MessageBroker::new(Arc::new(provider), RuntimeOptions::default());
    for formatter in formatters::builtin() {
        broker.register_boxed(formatter);
    }
    broker
}

async fn replay(broker: &mut MessageBroker, stream: Vec<Envelope>) {
    for envelope in stream {
        broker.publish(envelope).await.expect("publish");
    }
    for shutdown in broker.shutdown().await {
        assert!(
            matches!(shutdown.result, Ok(ShutdownReport::Completed | ShutdownReport::NeverStarted)),
            "{} ended with {:?}",
            shutdown.formatter,
            shutdown.result
        );
    }
}

fn read_log(path: &std::path::Path) -> Vec<Envelope> {
    fs::read_to_string(path)
        .expect("read log")
        .lines()
        .map(|line| serde_json::from_str(line).expect("valid envelope"))
        .collect()
}

#[rstest]
#[tokio::test]
async fn message_and_html_reports_are_written(out_dir: TempDir) {
    let dir = out_dir.path().display();
    let env = MapEnvironment::new()
        .with("REQNROLL_FORMATTERS_MESSAGE", format!("outputFilePath={dir}/logs/run_{{env:RUN}}"))
        .with("REQNROLL_FORMATTERS_HTML", format!("outputFilePath={dir}/"))
        .with("RUN", "42");
    let mut broker = broker(env);
    let stream = envelopes::run(3);
    replay(&mut broker, stream.clone()).await;

    assert_eq!(read_log(&out_dir.path().join("logs/run_42.ndjson")), stream);
    let page = fs::read_to_string(out_dir.path().join(HtmlOutput::DEFAULT_FILE_NAME)).expect("read page");
    assert_eq!(page.matches(r#""stepFinished""#).count(), 3);
}

#[rstest]
#[tokio::test]
async fn disabled_formatter_writes_nothing(out_dir: TempDir) {
    let dir = out_dir.path().display();
    let env = MapEnvironment::new()
        .with("REQNROLL_FORMATTERS_MESSAGE", format!("outputFilePath={dir}/run"))
        .with("REQNROLL_FORMATTERS_HTML", "false");
    let mut broker = broker(env);
    replay(&mut broker, envelopes::run(1)).await;

    let written: Vec<_> = fs::read_dir(out_dir.path())
        .expect("list output")
        .map(|entry| entry.expect("entry").file_name())
        .collect();
    assert_eq!(written, ["run.ndjson"]);
}

#[rstest]
#[tokio::test]
async fn external_attachments_are_relocated_per_formatter(out_dir: TempDir) {
    let config = serde_json::json!({
        "message": {
            "outputFilePath": out_dir.path().join("run").display().to_string(),
            "attachmentHandlingOptions": {
                "attachmentHandling": "External",
                "externalAttachmentsStoragePath": "attachments/{env:RUN}"
            }
        }
    });
    let env = MapEnvironment::new()
        .with("REQNROLL_FORMATTERS", config.to_string())
        .with("RUN", "7");
    let mut broker = broker(env);

    let mut stream = envelopes::run(0);
    stream.insert(
        1,
        ExternalAttachment {
            url: "screenshot.png".into(),
            media_type: "image/png".into(),
            ..ExternalAttachment::default()
        }
        .into(),
    );
    replay(&mut broker, stream).await;

    let attachment = read_log(&out_dir.path().join("run.ndjson"))
        .into_iter()
        .find_map(|envelope| match envelope {
            Envelope::ExternalAttachment(a) => Some(a),
            _ => None,
        })
        .expect("attachment logged");
    assert_eq!(
        std::path::Path::new(&attachment.url),
        std::path::Path::new("attachments/7/screenshot.png")
    );
}
