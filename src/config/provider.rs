//! Merged, memoized formatter configuration.

use std::{
    collections::BTreeMap,
    path::PathBuf,
    sync::{Arc, OnceLock},
};

use log::{debug, info};
use serde_json::Value;

use super::{
    ConfigError,
    ConfigResolver,
    EnvJsonConfigResolver,
    EnvKeyValueConfigResolver,
    Environment,
    FileConfigResolver,
    FormatterSettings,
    HostConfigResolver,
    OUTPUT_FILE_PATH,
    PlaceholderResolver,
    environment::formatters_disabled,
    resolver::normalise_formatter_name,
};

/// Settings for one formatter with the output path pulled out.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormatterConfiguration {
    /// Raw output path template, placeholders unresolved.
    pub output_file_path: Option<String>,
    /// Every other setting, passed through untouched.
    pub settings: FormatterSettings,
}

impl FormatterConfiguration {
    #[must_use]
    pub fn from_settings(mut settings: FormatterSettings) -> Self {
        let output_file_path = match settings.remove(OUTPUT_FILE_PATH) {
            Some(Value::String(path)) if !path.trim().is_empty() => Some(path),
            _ => None,
        };
        Self {
            output_file_path,
            settings,
        }
    }

    #[must_use]
    pub fn with_output_file_path(mut self, path: impl Into<String>) -> Self {
        self.output_file_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn setting(&self, key: &str) -> Option<&Value> { self.settings.get(key) }
}

/// Result of merging every resolver.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormattersConfig {
    formatters: BTreeMap<String, FormatterSettings>,
    enabled: bool,
}

impl FormattersConfig {
    /// Whether any formatter is configured and the global disable flag is
    /// unset.
    #[must_use]
    pub fn enabled(&self) -> bool { self.enabled }

    /// Settings for `name`, matched case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FormatterSettings> {
        self.formatters.get(&normalise_formatter_name(name))
    }

    pub fn formatter_names(&self) -> impl Iterator<Item = &str> {
        self.formatters.keys().map(String::as_str)
    }
}

/// Resolves formatter configuration once and serves it to every caller.
///
/// Resolvers run in the order given; a later resolver's entry for a formatter
/// replaces the earlier one as a whole, and an explicit disable removes the
/// formatter. The first call to [`Self::configuration`] performs the
/// resolution; later calls, including failed ones, see the stored result.
#[derive(Debug)]
pub struct FormattersConfigProvider {
    resolvers: Vec<Box<dyn ConfigResolver>>,
    env: Arc<dyn Environment>,
    placeholders: Arc<PlaceholderResolver>,
    resolved: OnceLock<Result<FormattersConfig, ConfigError>>,
}

impl FormattersConfigProvider {
    #[must_use]
    pub fn new(
        resolvers: Vec<Box<dyn ConfigResolver>>,
        env: Arc<dyn Environment>,
        placeholders: Arc<PlaceholderResolver>,
    ) -> Self {
        Self {
            resolvers,
            env,
            placeholders,
            resolved: OnceLock::new(),
        }
    }

    /// The standard chain: project file, then `REQNROLL_FORMATTERS`, then
    /// `REQNROLL_FORMATTERS_<NAME>`, then host parameters.
    #[must_use]
    pub fn standard(
        env: Arc<dyn Environment>,
        config_file: Option<PathBuf>,
        host: HostConfigResolver,
    ) -> Self {
        let file = config_file.map_or_else(FileConfigResolver::default, FileConfigResolver::new);
        let resolvers: Vec<Box<dyn ConfigResolver>> = vec![
            Box::new(file),
            Box::new(EnvJsonConfigResolver::new(Arc::clone(&env))),
            Box::new(EnvKeyValueConfigResolver::new(Arc::clone(&env))),
            Box::new(host),
        ];
        let placeholders = Arc::new(PlaceholderResolver::from_environment(Arc::clone(&env)));
        Self::new(resolvers, env, placeholders)
    }

    /// Merged configuration, resolved on first access.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] raised by the first failing resolver. The
    /// same error is returned on every call.
    pub fn configuration(&self) -> Result<&FormattersConfig, ConfigError> {
        self.resolved
            .get_or_init(|| self.resolve())
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Whether formatting is enabled at all.
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`].
    pub fn enabled(&self) -> Result<bool, ConfigError> { Ok(self.configuration()?.enabled()) }

    /// Configuration for `name`, or `None` when the formatter is not
    /// configured or formatting is globally disabled.
    ///
    /// # Errors
    ///
    /// See [`Self::configuration`].
    pub fn formatter_configuration(
        &self,
        name: &str,
    ) -> Result<Option<FormatterConfiguration>, ConfigError> {
        let config = self.configuration()?;
        if !config.enabled() {
            return Ok(None);
        }
        Ok(config
            .get(name)
            .cloned()
            .map(FormatterConfiguration::from_settings))
    }

    #[must_use]
    pub fn placeholders(&self) -> &Arc<PlaceholderResolver> { &self.placeholders }

    /// Expand placeholders in an output path template.
    #[must_use]
    pub fn resolve_placeholders(&self, template: &str) -> String { self.placeholders.resolve(template) }

    fn resolve(&self) -> Result<FormattersConfig, ConfigError> {
        let mut formatters: BTreeMap<String, FormatterSettings> = BTreeMap::new();
        for resolver in &self.resolvers {
            let resolved = resolver.resolve()?;
            debug!(
                "configuration source {} supplied {} formatter entries",
                resolver.name(),
                resolved.len()
            );
            for (name, entry) in resolved {
                match entry {
                    Some(settings) => {
                        formatters.insert(name, settings);
                    }
                    None => {
                        formatters.remove(&name);
                    }
                }
            }
        }

        let disabled = formatters_disabled(self.env.as_ref());
        let enabled = !formatters.is_empty() && !disabled;
        if disabled {
            info!("formatters disabled by environment override");
        }
        Ok(FormattersConfig {
            formatters,
            enabled,
        })
    }
}
