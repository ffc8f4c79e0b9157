//! `{placeholder}` substitution in output path templates.
//!
//! Recognised placeholders are `{timestamp}`, `{buildNumber}`, `{revision}`,
//! `{branch}`, `{tag}` and `{env:NAME}`. Unknown or unterminated placeholders
//! are copied through unchanged.

use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};

use super::{BuildMetadata, Environment};

/// `{timestamp}` rendering, safe for file names.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Source of the current time.
pub trait Clock: fmt::Debug + Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// Clock frozen at one instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> { self.0 }
}

/// Expands placeholders in path templates.
#[derive(Clone, Debug)]
pub struct PlaceholderResolver {
    env: Arc<dyn Environment>,
    clock: Arc<dyn Clock>,
    build: BuildMetadata,
}

impl PlaceholderResolver {
    #[must_use]
    pub fn new(env: Arc<dyn Environment>, clock: Arc<dyn Clock>, build: BuildMetadata) -> Self {
        Self { env, clock, build }
    }

    /// Resolver using the wall clock and build metadata detected from `env`.
    #[must_use]
    pub fn from_environment(env: Arc<dyn Environment>) -> Self {
        let build = BuildMetadata::detect(env.as_ref());
        Self::new(env, Arc::new(SystemClock), build)
    }

    #[must_use]
    pub fn build_metadata(&self) -> &BuildMetadata { &self.build }

    /// Expand every recognised placeholder in `template`.
    #[must_use]
    pub fn resolve(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                out.push_str(&rest[open..]);
                return out;
            };
            let name = &after[..close];
            if name.contains('{') {
                // `{a{b}`: the first brace cannot start a placeholder.
                out.push('{');
                rest = after;
                continue;
            }
            match self.lookup(name) {
                Some(value) => out.push_str(&value),
                None => {
                    out.push('{');
                    out.push_str(name);
                    out.push('}');
                }
            }
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        out
    }

    fn lookup(&self, name: &str) -> Option<String> {
        if let Some(var) = name.strip_prefix("env:") {
            return Some(self.env.var(var).unwrap_or_default());
        }
        let field = match name.to_ascii_lowercase().as_str() {
            "timestamp" => return Some(self.clock.now().format(TIMESTAMP_FORMAT).to_string()),
            "buildnumber" => &self.build.build_number,
            "revision" => &self.build.revision,
            "branch" => &self.build.branch,
            "tag" => &self.build.tag,
            _ => return None,
        };
        Some(field.clone().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::config::MapEnvironment;

    #[fixture]
    fn resolver() -> PlaceholderResolver {
        let env = MapEnvironment::new().with("MY_ENV_VAR", "envValue");
        let clock = FixedClock(
            Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5)
                .single()
                .expect("valid instant"),
        );
        let build = BuildMetadata {
            build_number: Some("123".into()),
            revision: Some("rev-456".into()),
            branch: Some("main".into()),
            tag: Some("v1.0.0".into()),
            ..BuildMetadata::default()
        };
        PlaceholderResolver::new(Arc::new(env), Arc::new(clock), build)
    }

    #[rstest]
    #[case("results.txt", "results.txt")]
    #[case("", "")]
    #[case("results_{timestamp}.txt", "results_2023-01-02_03-04-05.txt")]
    #[case("results_{buildNumber}.txt", "results_123.txt")]
    #[case("results_{revision}.txt", "results_rev-456.txt")]
    #[case("results_{branch}.txt", "results_main.txt")]
    #[case("results_{tag}.txt", "results_v1.0.0.txt")]
    #[case("results_{env:MY_ENV_VAR}.txt", "results_envValue.txt")]
    #[case("results_{env:MISSING}.txt", "results_.txt")]
    #[case("results_{unknownvar}.txt", "results_{unknownvar}.txt")]
    #[case("results_{timestamp.txt", "results_{timestamp.txt")]
    #[case("a{b{tag}c", "a{bv1.0.0c")]
    #[case(
        "results_{timestamp}_{env:MY_ENV_VAR}.txt",
        "results_2023-01-02_03-04-05_envValue.txt"
    )]
    fn expands_templates(resolver: PlaceholderResolver, #[case] template: &str, #[case] expected: &str) {
        assert_eq!(resolver.resolve(template), expected);
    }

    #[test]
    fn missing_build_metadata_renders_empty() {
        let resolver = PlaceholderResolver::new(
            Arc::new(MapEnvironment::new()),
            Arc::new(SystemClock),
            BuildMetadata::default(),
        );
        assert_eq!(resolver.resolve("r_{branch}.html"), "r_.html");
    }
}
