//! Environment-backed configuration.

use config::{Config, ConfigError, Environment};

use nostify_core::ConfigProvider;

const SEPARATOR: &str = "__";

/// Reads `Section:Key` settings from `SECTION__KEY` environment variables.
///
/// With a prefix the variable is `PREFIX_SECTION__KEY`. The environment is
/// captured when the provider is built.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    values: Config,
}

impl EnvConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default().separator(SEPARATOR))
    }

    pub fn with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        Self::from_environment(
            Environment::with_prefix(prefix)
                .prefix_separator("_")
                .separator(SEPARATOR),
        )
    }

    fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        let values = Config::builder().add_source(environment).build()?;
        Ok(Self { values })
    }

    /// `Inventory:SkuMaxLength` -> `inventory.skumaxlength`.
    fn path(key: &str) -> String {
        key.trim().replace(':', ".").to_lowercase()
    }
}

impl ConfigProvider for EnvConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get_string(&Self::path(key)).ok()
    }
}
