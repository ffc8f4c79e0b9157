//! Resolver for per-formatter `REQNROLL_FORMATTERS_<NAME>` variables.

use std::sync::Arc;

use serde_json::Value;

use super::{
    ConfigError,
    ConfigResolver,
    Environment,
    FORMATTER_ENV_PREFIX,
    FORMATTERS_DISABLED_ENV,
    FormatterSettings,
    ResolvedFormatters,
    resolver::{canonical_setting_key, normalise_formatter_name},
};

/// Reads one variable per formatter.
///
/// The value is `true` (enable with no settings), `false` (disable) or a
/// `key=value;key2=value2` list. An empty value is ignored. A segment without
/// `=` fails resolution immediately.
#[derive(Clone, Debug)]
pub struct EnvKeyValueConfigResolver {
    env: Arc<dyn Environment>,
}

impl EnvKeyValueConfigResolver {
    #[must_use]
    pub fn new(env: Arc<dyn Environment>) -> Self { Self { env } }
}

impl ConfigResolver for EnvKeyValueConfigResolver {
    fn name(&self) -> &'static str { "environment key/value" }

    fn resolve(&self) -> Result<ResolvedFormatters, ConfigError> {
        let mut resolved = ResolvedFormatters::new();
        for (variable, raw) in self.env.vars() {
            if variable == FORMATTERS_DISABLED_ENV {
                continue;
            }
            let Some(formatter) = variable.strip_prefix(FORMATTER_ENV_PREFIX) else {
                continue;
            };
            let formatter = normalise_formatter_name(formatter);
            if formatter.is_empty() {
                continue;
            }
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }

            let settings = if raw.eq_ignore_ascii_case("true") {
                Some(FormatterSettings::new())
            } else if raw.eq_ignore_ascii_case("false") {
                None
            } else {
                Some(parse_settings(raw, &variable, &formatter)?)
            };
            resolved.insert(formatter, settings);
        }
        Ok(resolved)
    }
}

fn parse_settings(raw: &str, variable: &str, formatter: &str) -> Result<FormatterSettings, ConfigError> {
    let mut settings = FormatterSettings::new();
    for segment in raw.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((key, value)) = segment.split_once('=') else {
            return Err(ConfigError::MalformedSetting {
                variable: variable.to_owned(),
                formatter: formatter.to_owned(),
                setting: segment.to_owned(),
            });
        };
        settings.insert(
            canonical_setting_key(key),
            Value::String(value.trim().to_owned()),
        );
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::config::{MapEnvironment, OUTPUT_FILE_PATH};

    fn resolve(pairs: &[(&str, &str)]) -> Result<ResolvedFormatters, ConfigError> {
        let env: MapEnvironment = pairs.iter().copied().collect();
        EnvKeyValueConfigResolver::new(Arc::new(env)).resolve()
    }

    #[test]
    fn output_path_setting() {
        let resolved = resolve(&[("REQNROLL_FORMATTERS_HTML", "outputFilePath=out.html")])
            .expect("resolve");
        let html = resolved["html"].as_ref().expect("html enabled");
        assert_eq!(html[OUTPUT_FILE_PATH], "out.html");
    }

    #[rstest]
    #[case("true", Some(FormatterSettings::new()))]
    #[case("TRUE", Some(FormatterSettings::new()))]
    #[case("false", None)]
    fn boolean_flags(#[case] raw: &str, #[case] expected: Option<FormatterSettings>) {
        let resolved = resolve(&[("REQNROLL_FORMATTERS_SAMPLE", raw)]).expect("resolve");
        assert_eq!(resolved["sample"], expected);
    }

    #[test]
    fn trims_keys_values_and_canonicalises_output_path() {
        let resolved = resolve(&[(
            "REQNROLL_FORMATTERS_SAMPLE",
            "  OUTPUTFilePath  =  foo.txt  ;   setting2  =  value2 ;",
        )])
        .expect("resolve");
        let sample = resolved["sample"].as_ref().expect("enabled");
        assert_eq!(sample[OUTPUT_FILE_PATH], "foo.txt");
        assert_eq!(sample["setting2"], "value2");
    }

    #[test]
    fn value_keeps_everything_after_first_equals() {
        let resolved = resolve(&[("REQNROLL_FORMATTERS_SAMPLE", "filter=a=b")]).expect("resolve");
        assert_eq!(resolved["sample"].as_ref().expect("enabled")["filter"], "a=b");
    }

    #[test]
    fn empty_value_and_disable_flag_are_skipped() {
        let resolved = resolve(&[
            ("REQNROLL_FORMATTERS_SAMPLE", ""),
            (FORMATTERS_DISABLED_ENV, "true"),
            ("UNRELATED", "x=y"),
        ])
        .expect("resolve");
        assert!(resolved.is_empty());
    }

    #[test]
    fn segment_without_equals_fails() {
        let err = resolve(&[("REQNROLL_FORMATTERS_SAMPLE", "foo")]).expect_err("must fail");
        assert!(err.to_string().contains("'foo'"));
    }
}
