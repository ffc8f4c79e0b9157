//! Resolver for parameters passed in by a host test runner.
//!
//! Hosts such as test-logger integrations hand over flat `name -> value`
//! parameters. Separators inside values arrive without quotes or braces, so
//! the nested settings object is rebuilt here:
//!
//! ```text
//! html = outputFilePath:out.html
//! message = outputFilePath:run.ndjson,attachmentHandlingOptions:{attachmentHandling:External}
//! ```
//!
//! `:` separates a key from its value and `,` separates pairs, both only at
//! nesting depth zero. A backslash escapes the next character, so
//! `C\:\\reports` is the string `C:\reports`.

use serde_json::{Map, Value};

use super::{ConfigError, ConfigResolver, ResolvedFormatters, resolver::formatters_from_json};

/// Formatter settings supplied by the host as flattened strings.
#[derive(Clone, Debug, Default)]
pub struct HostConfigResolver {
    parameters: Vec<(String, String)>,
}

impl HostConfigResolver {
    #[must_use]
    pub fn new<I, K, V>(parameters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            parameters: parameters
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.parameters.is_empty() }
}

impl ConfigResolver for HostConfigResolver {
    fn name(&self) -> &'static str { "host" }

    fn resolve(&self) -> Result<ResolvedFormatters, ConfigError> {
        let mut section = Map::new();
        for (name, raw) in &self.parameters {
            if name.trim().is_empty() {
                return Err(ConfigError::HostParameter {
                    parameter: name.clone(),
                    reason: "parameter name is empty".to_owned(),
                });
            }
            section.insert(name.trim().to_owned(), reconstruct_value(raw));
        }
        Ok(formatters_from_json(&Value::Object(section), "host parameters"))
    }
}

/// Rebuild a JSON value from its flattened form.
pub(crate) fn reconstruct_value(raw: &str) -> Value {
    let value = strip_outer_braces(raw.trim());

    let parts = split_top_level(value, ':');
    if let [key, inner] = parts.as_slice() {
        if !key.contains([',', '{', '[']) {
            let mut object = Map::new();
            object.insert(unescape(key.trim()), reconstruct_value(inner));
            return Value::Object(object);
        }
    }

    if value.contains(':') && value.contains(',') {
        let mut object = Map::new();
        for pair in split_top_level(value, ',') {
            match split_top_level(pair, ':').as_slice() {
                [key, inner] => {
                    object.insert(unescape(key.trim()), reconstruct_value(inner));
                }
                _ => {
                    log::warn!("ignoring host setting fragment '{}'", pair.trim());
                }
            }
        }
        return Value::Object(object);
    }

    Value::String(unescape(value))
}

fn strip_outer_braces(value: &str) -> &str {
    match value.strip_prefix('{').and_then(|v| v.strip_suffix('}')) {
        Some(inner) if braces_balanced(inner) => inner.trim(),
        _ => value,
    }
}

fn braces_balanced(value: &str) -> bool {
    let mut depth = 0_i32;
    let mut escaped = false;
    for c in value.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Split on `separator` outside braces and brackets, honouring escapes. A
/// trailing empty segment is dropped.
fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0_i32;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' | '[' => depth += 1,
            '}' | ']' => depth -= 1,
            c if c == separator && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if start < input.len() {
        parts.push(&input[start..]);
    }
    parts
}

fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next @ (',' | ':' | '{' | '}' | '[' | ']' | '\\')) => out.push(next),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::config::OUTPUT_FILE_PATH;

    #[rstest]
    #[case("out.html", json!("out.html"))]
    #[case("outputFilePath:out.html", json!({"outputFilePath": "out.html"}))]
    #[case(
        "outputFilePath:a.ndjson,theme:dark",
        json!({"outputFilePath": "a.ndjson", "theme": "dark"})
    )]
    #[case(
        "attachmentHandlingOptions:{attachmentHandling:External,externalAttachmentsStoragePath:att}",
        json!({"attachmentHandlingOptions": {
            "attachmentHandling": "External",
            "externalAttachmentsStoragePath": "att"
        }})
    )]
    #[case(r"outputFilePath:C\:\\reports\\a.html", json!({"outputFilePath": r"C:\reports\a.html"}))]
    #[case(r"note:a\,b", json!({"note": "a,b"}))]
    fn reconstructs_nested_values(#[case] raw: &str, #[case] expected: Value) {
        assert_eq!(reconstruct_value(raw), expected);
    }

    #[test]
    fn resolves_formatters_from_parameters() {
        let resolver = HostConfigResolver::new([
            ("html", "outputFilePath:out.html"),
            ("message", "false"),
        ]);
        let resolved = resolver.resolve().expect("resolve host parameters");
        let html = resolved["html"].as_ref().expect("html enabled");
        assert_eq!(html[OUTPUT_FILE_PATH], "out.html");
        assert_eq!(resolved["message"], None);
    }

    #[test]
    fn empty_parameter_name_is_rejected() {
        let resolver = HostConfigResolver::new([(" ", "true")]);
        assert!(matches!(
            resolver.resolve(),
            Err(ConfigError::HostParameter { .. })
        ));
    }
}
