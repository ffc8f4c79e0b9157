//! Project configuration file resolver.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use serde_json::Value;

use super::{ConfigError, ConfigResolver, ResolvedFormatters, resolver::formatters_from_json};

/// Default project configuration file name, looked up in the working
/// directory.
pub const DEFAULT_CONFIG_FILE: &str = "reqnroll.json";

/// Reads the `formatters` section of the project configuration file.
///
/// A missing file, a file without a `formatters` key, and a file that is not
/// valid JSON all resolve to an empty map; the latter is logged.
#[derive(Clone, Debug)]
pub struct FileConfigResolver {
    path: PathBuf,
}

impl FileConfigResolver {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    #[must_use]
    pub fn path(&self) -> &Path { &self.path }
}

impl Default for FileConfigResolver {
    fn default() -> Self { Self::new(DEFAULT_CONFIG_FILE) }
}

impl ConfigResolver for FileConfigResolver {
    fn name(&self) -> &'static str { "file" }

    fn resolve(&self) -> Result<ResolvedFormatters, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no configuration file at {}", self.path.display());
                return Ok(ResolvedFormatters::new());
            }
            Err(e) => {
                warn!("cannot read configuration file {}: {e}", self.path.display());
                return Ok(ResolvedFormatters::new());
            }
        };

        let document: Value = match serde_json::from_str(&text) {
            Ok(document) => document,
            Err(e) => {
                warn!("ignoring invalid configuration file {}: {e}", self.path.display());
                return Ok(ResolvedFormatters::new());
            }
        };

        Ok(document
            .get("formatters")
            .map(|section| formatters_from_json(section, "configuration file"))
            .unwrap_or_default())
    }
}
