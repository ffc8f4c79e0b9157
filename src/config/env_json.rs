//! Resolver for the JSON blob held in `REQNROLL_FORMATTERS`.

use std::sync::Arc;

use log::warn;
use serde_json::Value;

use super::{
    ConfigError,
    ConfigResolver,
    Environment,
    FORMATTERS_ENV,
    ResolvedFormatters,
    resolver::formatters_from_json,
};

/// Reads a JSON object shaped like the project file's `formatters` section
/// from a single environment variable.
///
/// Both `{"html": {...}}` and `{"formatters": {"html": {...}}}` are
/// accepted.
#[derive(Clone, Debug)]
pub struct EnvJsonConfigResolver {
    env: Arc<dyn Environment>,
}

impl EnvJsonConfigResolver {
    #[must_use]
    pub fn new(env: Arc<dyn Environment>) -> Self { Self { env } }
}

impl ConfigResolver for EnvJsonConfigResolver {
    fn name(&self) -> &'static str { "environment json" }

    fn resolve(&self) -> Result<ResolvedFormatters, ConfigError> {
        let Some(raw) = self.env.var(FORMATTERS_ENV) else {
            return Ok(ResolvedFormatters::new());
        };
        if raw.trim().is_empty() {
            return Ok(ResolvedFormatters::new());
        }

        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("ignoring {FORMATTERS_ENV}: not valid JSON: {e}");
                return Ok(ResolvedFormatters::new());
            }
        };
        let section = value.get("formatters").unwrap_or(&value);
        Ok(formatters_from_json(section, FORMATTERS_ENV))
    }
}
