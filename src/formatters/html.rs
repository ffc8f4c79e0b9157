//! Single-page HTML report.
//!
//! Envelopes are collected in memory and written, as a JSON array inside a
//! `<script>` element, when the formatter finishes. Rendering is left to the
//! page; this module only guarantees that the embedded data is complete and
//! cannot break out of the script element.

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::{
    file_writing::{FileFormatter, FileOutput, OutputWriter},
    formatter::FormatterError,
    messages::Envelope,
};

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Test report</title>
</head>
<body>
<div id="report"></div>
<script id="envelopes" type="application/json">
"#;

const PAGE_TAIL: &str = r#"
</script>
<script>
(function () {
  const envelopes = JSON.parse(document.getElementById("envelopes").textContent);
  const finished = envelopes.find((e) => e.testRunFinished);
  const steps = envelopes.filter((e) => e.stepFinished).map((e) => e.stepFinished.status);
  const count = (status) => steps.filter((s) => s === status).length;
  const report = document.getElementById("report");
  const outcome = finished ? (finished.testRunFinished.success ? "passed" : "failed") : "incomplete";
  report.textContent = `Run ${outcome}: ${count("PASSED")} passed, ${count("FAILED")} failed, ${steps.length} steps`;
})();
</script>
</body>
</html>
"#;

/// Collects envelopes and renders them at the end of the run.
#[derive(Clone, Debug, Default)]
pub struct HtmlOutput {
    envelopes: Vec<serde_json::Value>,
}

impl HtmlOutput {
    pub const NAME: &'static str = "html";
    pub const DEFAULT_FILE_NAME: &'static str = "reqnroll_report.html";
    pub const EXTENSION: &'static str = ".html";
}

#[async_trait]
impl FileOutput for HtmlOutput {
    fn name(&self) -> &str { Self::NAME }

    fn default_file_name(&self) -> &str { Self::DEFAULT_FILE_NAME }

    fn extension(&self) -> &str { Self::EXTENSION }

    async fn write_envelope(
        &mut self,
        envelope: &Envelope,
        _writer: &mut OutputWriter,
    ) -> Result<(), FormatterError> {
        self.envelopes.push(serde_json::to_value(envelope)?);
        Ok(())
    }

    async fn end(&mut self, writer: &mut OutputWriter) -> Result<(), FormatterError> {
        let data = escape_script(&serde_json::to_string(&self.envelopes)?);
        writer.write_all(PAGE_HEAD.as_bytes()).await?;
        writer.write_all(data.as_bytes()).await?;
        writer.write_all(PAGE_TAIL.as_bytes()).await?;
        self.envelopes.clear();
        Ok(())
    }
}

/// Keep JSON from closing the surrounding `<script>` element.
fn escape_script(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

/// The `html` formatter.
pub type HtmlFormatter = FileFormatter<HtmlOutput>;

#[must_use]
pub fn html_formatter() -> HtmlFormatter { FileFormatter::new(HtmlOutput::default()) }

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;
    use crate::{
        config::{FormatterConfiguration, MapEnvironment, PlaceholderResolver},
        formatter::{Formatter, FormatterContext},
        messages::{StepFinished, TestRunFinished},
    };

    #[test]
    fn script_terminators_are_escaped() {
        let escaped = escape_script(r#"{"m":"</script><b>&"}"#);
        assert!(!escaped.contains("</script>"));
        let value: serde_json::Value = serde_json::from_str(&escaped).expect("still valid JSON");
        assert_eq!(value["m"], "</script><b>&");
    }

    #[tokio::test]
    async fn writes_page_with_embedded_envelopes() {
        let dir = TempDir::new().expect("temp dir");
        let context = FormatterContext::new(Arc::new(PlaceholderResolver::from_environment(Arc::new(
            MapEnvironment::new(),
        ))));
        let config = FormatterConfiguration::default()
            .with_output_file_path(format!("{}/", dir.path().display()));

        let mut formatter = html_formatter();
        formatter.initialize(&config, &context).await.expect("initialize");
        formatter
            .process(&StepFinished::default().into())
            .await
            .expect("process step");
        formatter
            .process(&TestRunFinished::default().into())
            .await
            .expect("process finish");
        formatter.finish().await.expect("finish");

        let page = std::fs::read_to_string(dir.path().join(HtmlOutput::DEFAULT_FILE_NAME))
            .expect("read page");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains(r#""stepFinished""#));
        assert!(page.contains(r#""testRunFinished""#));
    }
}
