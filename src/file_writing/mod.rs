//! Formatters that write one output file.
//!
//! [`FileFormatter`] implements [`Formatter`] for any [`FileOutput`]: it
//! resolves the output path, creates missing directories, opens a buffered
//! writer once during initialization and flushes and closes it exactly once
//! in [`Formatter::finish`].

mod path;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, info, warn};
pub use path::{DEFAULT_OUTPUT_DIRECTORY, OutputPathError, resolve_output_path};
use tokio::{
    fs::{self, File},
    io::{AsyncWriteExt, BufWriter},
};

use crate::{
    config::FormatterConfiguration,
    formatter::{Formatter, FormatterContext, FormatterError},
    messages::Envelope,
};

/// Capacity of the output buffer.
pub const OUTPUT_BUFFER_CAPACITY: usize = 64 * 1024;

/// Buffered handle to the output file.
pub type OutputWriter = BufWriter<File>;

/// Output-format half of a file-writing formatter.
#[async_trait]
pub trait FileOutput: Send + 'static {
    /// Formatter name used for configuration lookup.
    fn name(&self) -> &str;

    /// File name used when the configuration names only a directory, or
    /// nothing at all.
    fn default_file_name(&self) -> &str;

    /// Extension, including the dot, enforced on the output file.
    fn extension(&self) -> &str;

    /// Called once after the file has been opened.
    ///
    /// # Errors
    ///
    /// An error disables the formatter.
    async fn start(&mut self, _writer: &mut OutputWriter) -> Result<(), FormatterError> { Ok(()) }

    /// Write (or record) one envelope.
    ///
    /// # Errors
    ///
    /// An error stops the formatter.
    async fn write_envelope(
        &mut self,
        envelope: &Envelope,
        writer: &mut OutputWriter,
    ) -> Result<(), FormatterError>;

    /// Called once before the file is flushed and closed.
    ///
    /// # Errors
    ///
    /// Reported at shutdown.
    async fn end(&mut self, _writer: &mut OutputWriter) -> Result<(), FormatterError> { Ok(()) }
}

/// [`Formatter`] writing a [`FileOutput`] to disk.
#[derive(Debug)]
pub struct FileFormatter<O> {
    output: O,
    writer: Option<OutputWriter>,
    path: Option<PathBuf>,
}

impl<O: FileOutput> FileFormatter<O> {
    #[must_use]
    pub fn new(output: O) -> Self {
        Self {
            output,
            writer: None,
            path: None,
        }
    }

    /// Resolved output file, once initialized.
    #[must_use]
    pub fn path(&self) -> Option<&Path> { self.path.as_deref() }
}

#[async_trait]
impl<O: FileOutput> Formatter for FileFormatter<O> {
    fn name(&self) -> &str { self.output.name() }

    async fn initialize(
        &mut self,
        config: &FormatterConfiguration,
        context: &FormatterContext,
    ) -> Result<(), FormatterError> {
        let path = resolve_output_path(
            config.output_file_path.as_deref(),
            self.output.default_file_name(),
            self.output.extension(),
            context.placeholders(),
        )
        .map_err(|e| FormatterError::Initialization(format!("{e}; output path is invalid or missing")))?;

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await.map_err(|e| {
                FormatterError::Initialization(format!(
                    "cannot create destination directory {}: {e}",
                    dir.display()
                ))
            })?;
        }
        let file = File::create(&path).await.map_err(|e| {
            FormatterError::Initialization(format!("cannot open {}: {e}", path.display()))
        })?;
        let mut writer = BufWriter::with_capacity(OUTPUT_BUFFER_CAPACITY, file);
        if let Err(e) = self.output.start(&mut writer).await {
            // a disabled formatter leaves no output behind
            drop(writer);
            if let Err(remove) = fs::remove_file(&path).await {
                warn!("cannot remove {} after failed start: {remove}", path.display());
            }
            return Err(e);
        }

        info!("formatter writing to file: formatter={}, path={}", self.output.name(), path.display());
        self.writer = Some(writer);
        self.path = Some(path);
        Ok(())
    }

    async fn process(&mut self, envelope: &Envelope) -> Result<(), FormatterError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| FormatterError::Processing("output file is not open".to_owned()))?;
        self.output.write_envelope(envelope, writer).await
    }

    async fn finish(&mut self) -> Result<(), FormatterError> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };
        let ended = self.output.end(&mut writer).await;
        let flushed = writer.shutdown().await.map_err(FormatterError::from);
        debug!(
            "output file closed: formatter={}, path={:?}",
            self.output.name(),
            self.path.as_deref()
        );
        ended.and(flushed)
    }
}
