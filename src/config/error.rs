//! Configuration errors.

use thiserror::Error;

/// Failure resolving formatter configuration.
///
/// `Clone` so the memoized resolution result can be handed to every caller.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A per-formatter environment variable held a setting without `=`.
    #[error("invalid setting '{setting}' for formatter '{formatter}' in {variable}: expected key=value")]
    MalformedSetting {
        /// Variable the setting was read from.
        variable: String,
        /// Formatter the variable configures.
        formatter: String,
        /// Offending `;`-separated segment.
        setting: String,
    },

    /// A host-supplied parameter could not be turned into formatter settings.
    #[error("invalid host parameter '{parameter}': {reason}")]
    HostParameter {
        /// Parameter name as supplied by the host.
        parameter: String,
        /// Why the value was rejected.
        reason: String,
    },
}
