//! Access to environment variables.
//!
//! Resolvers read the environment through [`Environment`] so that tests can
//! supply a [`MapEnvironment`] instead of mutating the process environment.

use std::{collections::BTreeMap, fmt};

/// JSON object overriding the `formatters` section of the project file.
pub const FORMATTERS_ENV: &str = "REQNROLL_FORMATTERS";
/// Prefix of per-formatter key/value variables, e.g. `REQNROLL_FORMATTERS_HTML`.
pub const FORMATTER_ENV_PREFIX: &str = "REQNROLL_FORMATTERS_";
/// Global switch turning every formatter off when set to `true`.
pub const FORMATTERS_DISABLED_ENV: &str = "REQNROLL_FORMATTERS_DISABLED";

/// Read-only view of environment variables.
pub trait Environment: fmt::Debug + Send + Sync {
    /// Value of `name`, or `None` when unset or not valid Unicode.
    fn var(&self, name: &str) -> Option<String>;

    /// Every variable as `(name, value)` pairs.
    fn vars(&self) -> Vec<(String, String)>;
}

/// The real process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> { std::env::var(name).ok() }

    fn vars(&self) -> Vec<(String, String)> { std::env::vars().collect() }
}

/// In-memory environment.
#[derive(Clone, Debug, Default)]
pub struct MapEnvironment {
    vars: BTreeMap<String, String>,
}

impl MapEnvironment {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }
}

impl<K, V> FromIterator<(K, V)> for MapEnvironment
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl Environment for MapEnvironment {
    fn var(&self, name: &str) -> Option<String> { self.vars.get(name).cloned() }

    fn vars(&self) -> Vec<(String, String)> {
        self.vars
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

/// Whether the global disable flag is set. Only a case-insensitive `true`
/// counts; any other value leaves formatters enabled.
#[must_use]
pub fn formatters_disabled(env: &dyn Environment) -> bool {
    env.var(FORMATTERS_DISABLED_ENV)
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Some("true"), true)]
    #[case(Some("TRUE"), true)]
    #[case(Some(" True "), true)]
    #[case(Some("1"), false)]
    #[case(Some("false"), false)]
    #[case(None, false)]
    fn disable_flag_accepts_only_true(#[case] value: Option<&str>, #[case] expected: bool) {
        let mut env = MapEnvironment::new();
        if let Some(value) = value {
            env.set(FORMATTERS_DISABLED_ENV, value);
        }
        assert_eq!(formatters_disabled(&env), expected);
    }

    #[test]
    fn map_environment_lists_all_vars() {
        let env: MapEnvironment = [("A", "1"), ("B", "2")].into_iter().collect();
        assert_eq!(env.var("A").as_deref(), Some("1"));
        assert_eq!(env.vars().len(), 2);
    }
}
