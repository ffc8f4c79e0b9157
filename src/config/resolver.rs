//! Resolver contract and helpers shared by the JSON-shaped sources.

use std::{collections::BTreeMap, fmt};

use log::warn;
use serde_json::{Map, Value};

use super::ConfigError;

/// Settings of one formatter.
pub type FormatterSettings = Map<String, Value>;

/// Output of one resolver: formatter name to settings, where `None` is an
/// explicit request to disable the formatter.
pub type ResolvedFormatters = BTreeMap<String, Option<FormatterSettings>>;

/// Canonical spelling of the output path setting.
pub const OUTPUT_FILE_PATH: &str = "outputFilePath";

/// One source of formatter configuration.
pub trait ConfigResolver: fmt::Debug + Send + Sync {
    /// Short source name used in log output.
    fn name(&self) -> &'static str;

    /// Read this source.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the source holds a value that cannot be
    /// interpreted. Sources that are merely absent yield an empty map.
    fn resolve(&self) -> Result<ResolvedFormatters, ConfigError>;
}

/// Formatter names are matched case-insensitively.
pub(crate) fn normalise_formatter_name(name: &str) -> String { name.trim().to_ascii_lowercase() }

/// Setting keys keep their spelling except for the output path, which is
/// matched case-insensitively.
pub(crate) fn canonical_setting_key(key: &str) -> String {
    let key = key.trim();
    if key.eq_ignore_ascii_case(OUTPUT_FILE_PATH) {
        OUTPUT_FILE_PATH.to_owned()
    } else {
        key.to_owned()
    }
}

/// Interpret a JSON object shaped like the project file's `formatters`
/// section.
///
/// Each entry may be a settings object, `true` (enabled with no settings),
/// or `false`/`null` (disabled). Other values are skipped with a warning.
pub(crate) fn formatters_from_json(section: &Value, source: &str) -> ResolvedFormatters {
    let Some(entries) = section.as_object() else {
        warn!("ignoring {source} formatters section: expected a JSON object");
        return ResolvedFormatters::new();
    };

    let mut resolved = ResolvedFormatters::new();
    for (name, entry) in entries {
        let settings = match entry {
            Value::Object(settings) => Some(
                settings
                    .iter()
                    .map(|(key, value)| (canonical_setting_key(key), value.clone()))
                    .collect(),
            ),
            Value::Null | Value::Bool(false) => None,
            Value::Bool(true) => Some(FormatterSettings::new()),
            Value::String(flag) if flag.eq_ignore_ascii_case("true") => Some(FormatterSettings::new()),
            Value::String(flag) if flag.eq_ignore_ascii_case("false") => None,
            other => {
                warn!("ignoring {source} entry for formatter '{name}': unsupported value {other}");
                continue;
            }
        };
        resolved.insert(normalise_formatter_name(name), settings);
    }
    resolved
}
