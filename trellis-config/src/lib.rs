// Configuration management for the Trellis framework

pub mod env;
pub mod error;
pub mod loader;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Layered configuration store.
///
/// Sources are applied in the order they are loaded; later sources override
/// earlier ones key by key. Keys are case-insensitive, and a dotted key such
/// as `database.name` also reaches into nested file sections.
#[derive(Clone, Default)]
pub struct ConfigManager {
    config: Arc<RwLock<HashMap<String, Value>>>,
    env_prefix: Option<String>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only load environment variables named `PREFIX_*`
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            config: Arc::default(),
            env_prefix: Some(prefix.into()),
        }
    }

    fn insert_all(&self, entries: impl IntoIterator<Item = (String, Value)>) {
        let mut config = self.config.write();
        for (key, value) in entries {
            config.insert(key.to_lowercase(), value);
        }
    }

    /// Load configuration from environment variables
    pub fn load_env(&self) -> Result<()> {
        let loader = EnvLoader::new(self.env_prefix.clone());
        self.insert_all(
            loader
                .load()
                .into_iter()
                .map(|(key, value)| (key, Value::String(value))),
        );
        Ok(())
    }

    /// Load variables from already-read `(key, value)` pairs, applying the
    /// same prefix rules as [`load_env`](Self::load_env)
    pub fn load_vars(&self, vars: impl IntoIterator<Item = (String, String)>) {
        let loader = EnvLoader::new(self.env_prefix.clone());
        self.insert_all(
            loader
                .filter(vars)
                .into_iter()
                .map(|(key, value)| (key, Value::String(value))),
        );
    }

    /// Load a `.env` file into the process environment, then load the
    /// environment. A missing default `.env` is not an error.
    pub fn load_dotenv(&self, path: Option<&str>) -> Result<()> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        self.load_env()
    }

    /// Load configuration from file
    pub fn load_file(&self, path: impl AsRef<Path>, format: FileFormat) -> Result<()> {
        let data = ConfigLoader::new(format).load_file(path)?;
        self.merge_value(data)
    }

    /// Load a file, picking the format from its extension
    pub fn load_file_auto(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = ConfigLoader::auto(path)?.load_file(path)?;
        self.merge_value(data)
    }

    fn merge_value(&self, data: Value) -> Result<()> {
        match data {
            Value::Object(map) => {
                self.insert_all(map);
                Ok(())
            }
            other => Err(ConfigError::ParseError(format!(
                "top level of a configuration file must be a table, found {}",
                other
            ))),
        }
    }

    /// Set a configuration value
    pub fn set<T: serde::Serialize>(&self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.insert_all([(key.to_string(), json_value)]);
        Ok(())
    }

    fn lookup(&self, key: &str) -> Option<Value> {
        let key = key.to_lowercase();
        let config = self.config.read();
        if let Some(value) = config.get(&key) {
            return Some(value.clone());
        }

        let mut parts = key.split('.');
        let mut current = config.get(parts.next()?)?;
        for part in parts {
            current = current.get(part)?;
        }
        Some(current.clone())
    }

    /// Get a configuration value.
    ///
    /// String values are also read as JSON literals, so an environment
    /// variable `"8080"` can be fetched as a number.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self
            .lookup(key)
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;

        match serde_json::from_value::<T>(value.clone()) {
            Ok(parsed) => Ok(parsed),
            Err(first) => {
                let Value::String(text) = &value else {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: first.to_string(),
                    });
                };
                serde_json::from_str(text.trim()).map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: first.to_string(),
                })
            }
        }
    }

    /// Get a configuration value with default
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn get_string(&self, key: &str) -> Result<String> {
        self.get(key)
    }

    pub fn get_int(&self, key: &str) -> Result<i64> {
        self.get(key)
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.get(key)
    }

    /// Check if a key exists
    pub fn has(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Get all top-level configuration keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.config.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Copy every entry of `other` over this configuration
    pub fn merge(&self, other: &ConfigManager) {
        let entries: Vec<(String, Value)> = other
            .config
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        self.insert_all(entries);
    }
}

impl std::fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigManager")
            .field("keys", &self.keys())
            .field("env_prefix", &self.env_prefix)
            .finish()
    }
}
