//! NDJSON message log.

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::{
    file_writing::{FileFormatter, FileOutput, OutputWriter},
    formatter::FormatterError,
    messages::Envelope,
};

/// Writes each envelope as one line of JSON, in arrival order.
#[derive(Clone, Copy, Debug, Default)]
pub struct MessageOutput;

impl MessageOutput {
    pub const NAME: &'static str = "message";
    pub const DEFAULT_FILE_NAME: &'static str = "reqnroll_report.ndjson";
    pub const EXTENSION: &'static str = ".ndjson";
}

#[async_trait]
impl FileOutput for MessageOutput {
    fn name(&self) -> &str { Self::NAME }

    fn default_file_name(&self) -> &str { Self::DEFAULT_FILE_NAME }

    fn extension(&self) -> &str { Self::EXTENSION }

    async fn write_envelope(
        &mut self,
        envelope: &Envelope,
        writer: &mut OutputWriter,
    ) -> Result<(), FormatterError> {
        let mut line = serde_json::to_vec(envelope)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        Ok(())
    }
}

/// The `message` formatter.
pub type MessageFormatter = FileFormatter<MessageOutput>;

#[must_use]
pub fn message_formatter() -> MessageFormatter { FileFormatter::new(MessageOutput) }

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;
    use crate::{
        config::{FormatterConfiguration, MapEnvironment, PlaceholderResolver},
        formatter::{Formatter, FormatterContext},
        messages::{TestRunFinished, TestRunStarted},
    };

    #[tokio::test]
    async fn writes_one_line_per_envelope() {
        let dir = TempDir::new().expect("temp dir");
        let context = FormatterContext::new(Arc::new(PlaceholderResolver::from_environment(Arc::new(
            MapEnvironment::new(),
        ))));
        let config = FormatterConfiguration::default()
            .with_output_file_path(dir.path().join("run").to_string_lossy().into_owned());

        let mut formatter = message_formatter();
        formatter.initialize(&config, &context).await.expect("initialize");
        let envelopes: Vec<Envelope> = vec![
            TestRunStarted::default().into(),
            TestRunFinished {
                success: true,
                ..TestRunFinished::default()
            }
            .into(),
        ];
        for envelope in &envelopes {
            formatter.process(envelope).await.expect("process");
        }
        formatter.finish().await.expect("finish");

        let written = std::fs::read_to_string(dir.path().join("run.ndjson")).expect("read log");
        let parsed: Vec<Envelope> = written
            .lines()
            .map(|line| serde_json::from_str(line).expect("valid line"))
            .collect();
        assert_eq!(parsed, envelopes);
    }
}
