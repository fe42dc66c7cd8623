//! Startup configuration for the tutorials binary.
//!
//! Read from `TRELLIS_*` environment variables (and a `.env` file when
//! present):
//!
//! | variable | default |
//! |----------|---------|
//! | `TRELLIS_PORT` (or `PORT`) | `3000` |
//! | `TRELLIS_APP` | `services` |
//! | `TRELLIS_LOG_LEVEL` | `info` |
//! | `TRELLIS_LOG_FORMAT` | `plain` |
//! | `TRELLIS_DI_RECIPE` | `class` |
//! | `TRELLIS_STORE_SCOPE` | `transient` |
//! | `TRELLIS_ENV` | `development` |
//! | `TRELLIS_LIMIT` | `2`, `none` to leave it unset |

use crate::apps::dependency_injection::{DiOptions, EnvType, Recipe};
use serde::de::DeserializeOwned;
use trellis_config::{ConfigError, ConfigManager, EnvLoader};
use trellis_core::Scope;
use trellis_core::logging::{LogConfig, LogFormat, LogLevel};

/// Which tutorial application to serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TutorialApp {
    Basics,
    #[default]
    Services,
    Pipes,
    Routing,
    DependencyInjection,
    Modules,
}

impl TutorialApp {
    pub const ALL: [TutorialApp; 6] = [
        TutorialApp::Basics,
        TutorialApp::Services,
        TutorialApp::Pipes,
        TutorialApp::Routing,
        TutorialApp::DependencyInjection,
        TutorialApp::Modules,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "basics" => Some(TutorialApp::Basics),
            "services" => Some(TutorialApp::Services),
            "pipes" => Some(TutorialApp::Pipes),
            "routing" | "routing-and-controller" => Some(TutorialApp::Routing),
            "dependency-injection" | "di" => Some(TutorialApp::DependencyInjection),
            "modules" => Some(TutorialApp::Modules),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TutorialApp::Basics => "basics",
            TutorialApp::Services => "services",
            TutorialApp::Pipes => "pipes",
            TutorialApp::Routing => "routing",
            TutorialApp::DependencyInjection => "dependency-injection",
            TutorialApp::Modules => "modules",
        }
    }
}

fn parse_scope(s: &str) -> Option<Scope> {
    match s.trim().to_lowercase().as_str() {
        "singleton" | "default" => Some(Scope::Singleton),
        "transient" => Some(Scope::Transient),
        "request" => Some(Scope::Request),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub app: TutorialApp,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
    pub di: DiOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            app: TutorialApp::default(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            di: DiOptions::default(),
        }
    }
}

/// `Ok(None)` when the key is absent, an error when it is malformed
fn optional<T: DeserializeOwned>(
    manager: &ConfigManager,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    match manager.get::<T>(key) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::KeyNotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Read a string key through `parse`, falling back to `default` when absent
fn named<T>(
    manager: &ConfigManager,
    key: &str,
    parse: fn(&str) -> Option<T>,
    default: T,
) -> Result<T, ConfigError> {
    match optional::<String>(manager, key)? {
        None => Ok(default),
        Some(raw) => parse(&raw).ok_or_else(|| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("unrecognized value '{}'", raw),
        }),
    }
}

impl AppConfig {
    pub const ENV_PREFIX: &'static str = "TRELLIS";

    /// Load from `.env` and the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let manager = ConfigManager::with_prefix(Self::ENV_PREFIX);
        manager.load_dotenv(None)?;

        if !manager.has("port")
            && let Ok(port) = EnvLoader::new(None).load_var("PORT")
        {
            manager.set("port", port)?;
        }

        Self::from_manager(&manager)
    }

    pub fn from_manager(manager: &ConfigManager) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let limit = match optional::<String>(manager, "limit")? {
            Some(raw) if raw.trim().eq_ignore_ascii_case("none") => None,
            Some(_) => Some(manager.get::<usize>("limit")?),
            None => defaults.di.limit,
        };

        let di = DiOptions {
            recipe: named(manager, "di_recipe", Recipe::parse, defaults.di.recipe)?,
            store_scope: named(manager, "store_scope", parse_scope, defaults.di.store_scope)?,
            env_type: named(manager, "env", EnvType::parse, defaults.di.env_type)?,
            limit,
            ..defaults.di
        };

        Ok(Self {
            port: optional(manager, "port")?.unwrap_or(defaults.port),
            app: named(manager, "app", TutorialApp::parse, defaults.app)?,
            log_level: named(manager, "log_level", LogLevel::parse, defaults.log_level)?,
            log_format: named(manager, "log_format", LogFormat::parse, defaults.log_format)?,
            di,
        })
    }

    pub fn logging(&self) -> LogConfig {
        LogConfig::new().level(self.log_level).format(self.log_format)
    }
}
