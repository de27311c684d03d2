//! Configuration provider boundary.
//!
//! The runtime only ever reads configuration to resolve numeric limits, so the
//! contract is a single lookup that reports absence instead of failing.

use std::collections::HashMap;
use std::sync::Arc;

/// Read-only key/value configuration source.
pub trait ConfigProvider: Send + Sync {
    /// Look up `key`. Missing keys return `None`; implementations never fail.
    fn get(&self, key: &str) -> Option<String>;

    /// Look up `key` and parse it as a length. Unparsable values count as absent.
    fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|raw| raw.trim().parse().ok())
    }
}

impl<C> ConfigProvider for Arc<C>
where
    C: ConfigProvider + ?Sized,
{
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

impl<C> ConfigProvider for &C
where
    C: ConfigProvider + ?Sized,
{
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

/// In-memory configuration, mainly for tests and embedded defaults.
#[derive(Debug, Clone, Default)]
pub struct MapConfig {
    values: HashMap<String, String>,
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        self.values.insert(key.into(), value.to_string());
    }
}

impl ConfigProvider for MapConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

impl<K, V> FromIterator<(K, V)> for MapConfig
where
    K: Into<String>,
    V: ToString,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut config = MapConfig::new();
        for (k, v) in iter {
            config.set(k, v);
        }
        config
    }
}
