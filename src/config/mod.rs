//! Formatter configuration.
//!
//! Configuration comes from several sources, each read by a
//! [`ConfigResolver`]. In increasing precedence:
//!
//! 1. the `formatters` section of `reqnroll.json` ([`FileConfigResolver`]);
//! 2. the JSON blob in `REQNROLL_FORMATTERS` ([`EnvJsonConfigResolver`]);
//! 3. `REQNROLL_FORMATTERS_<NAME>` variables ([`EnvKeyValueConfigResolver`]);
//! 4. parameters handed over by a host runner ([`HostConfigResolver`]).
//!
//! [`FormattersConfigProvider`] merges them once per provider and answers
//! per-formatter queries. Output path templates are expanded by
//! [`PlaceholderResolver`].

mod build_metadata;
mod env_json;
mod env_key_value;
mod environment;
mod error;
mod file;
mod host;
mod placeholders;
mod provider;
mod resolver;

pub use build_metadata::{BuildMetadata, BuildServer};
pub use env_json::EnvJsonConfigResolver;
pub use env_key_value::EnvKeyValueConfigResolver;
pub use environment::{
    Environment,
    FORMATTER_ENV_PREFIX,
    FORMATTERS_DISABLED_ENV,
    FORMATTERS_ENV,
    MapEnvironment,
    ProcessEnvironment,
    formatters_disabled,
};
pub use error::ConfigError;
pub use file::{DEFAULT_CONFIG_FILE, FileConfigResolver};
pub use host::HostConfigResolver;
pub use placeholders::{Clock, FixedClock, PlaceholderResolver, SystemClock, TIMESTAMP_FORMAT};
pub use provider::{FormatterConfiguration, FormattersConfig, FormattersConfigProvider};
pub use resolver::{ConfigResolver, FormatterSettings, OUTPUT_FILE_PATH, ResolvedFormatters};
