//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: RESOURCE_API_, nested keys split on `__`)
//! 2. Current working directory: ./config.toml
//! 3. Default values
//!
//! Built-in actions are configuration, not code: each collection lists the
//! action names it supports.
//!
//! ```toml
//! [service]
//! name = "inventory-api"
//! log_level = "debug"
//!
//! [api]
//! base_url = "https://inventory.example.com"
//! collision_policy = "custom_overrides"
//!
//! [api.builtin_actions]
//! vms = ["edit", "delete", "start", "stop"]
//! hosts = ["edit"]
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::actions::CollisionPolicy;
use crate::error::Result;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "RESOURCE_API_";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    #[serde(default)]
    pub service: ServiceConfig,

    /// API addressing and action configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Scheme, host and port used when building canonical hrefs
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path prefix the API is mounted under
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Built-in action names per collection
    #[serde(default)]
    pub builtin_actions: HashMap<String, Vec<String>>,

    /// How a custom button named like a built-in action is resolved
    #[serde(default)]
    pub collision_policy: CollisionPolicy,

    /// Message used when a successful action returns none
    #[serde(default = "default_success_message")]
    pub default_success_message: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            prefix: default_prefix(),
            builtin_actions: HashMap::new(),
            collision_policy: CollisionPolicy::default(),
            default_success_message: default_success_message(),
        }
    }
}

impl ApiConfig {
    /// Base that canonical hrefs are built under (e.g. `http://localhost:3000/api`)
    pub fn href_base(&self) -> String {
        let prefix = self.prefix.trim_matches('/');
        let base_url = self.base_url.trim_end_matches('/');
        if prefix.is_empty() {
            base_url.to_string()
        } else {
            format!("{}/{}", base_url, prefix)
        }
    }

    /// Route prefix for mounting (always starts with `/`, never ends with one)
    pub fn route_prefix(&self) -> String {
        let prefix = self.prefix.trim_matches('/');
        if prefix.is_empty() {
            String::new()
        } else {
            format!("/{}", prefix)
        }
    }

    /// Add built-in actions for a collection
    #[must_use]
    pub fn with_builtin_actions<I, S>(mut self, collection: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.builtin_actions
            .entry(collection.into())
            .or_default()
            .extend(actions.into_iter().map(Into::into));
        self
    }

    /// Set the collision policy
    #[must_use]
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }
}

// Default value functions
fn default_service_name() -> String {
    "resource-api".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_prefix() -> String {
    "/api".to_string()
}

fn default_success_message() -> String {
    "success".to_string()
}

impl Config {
    /// Load configuration from defaults, `./config.toml` and the environment
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load configuration from a specific file path
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::info!("Loading configuration from: {}", path.display());
        } else {
            tracing::debug!("No configuration file at {}, using defaults", path.display());
        }

        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.name, "resource-api");
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.api.prefix, "/api");
        assert_eq!(config.api.default_success_message, "success");
        assert_eq!(config.api.collision_policy, CollisionPolicy::BuiltinWins);
        assert!(config.api.builtin_actions.is_empty());
    }

    #[test]
    fn test_href_base() {
        let mut api = ApiConfig::default();
        assert_eq!(api.href_base(), "http://localhost:3000/api");

        api.base_url = "https://example.com/".to_string();
        api.prefix = "api/".to_string();
        assert_eq!(api.href_base(), "https://example.com/api");

        api.prefix = String::new();
        assert_eq!(api.href_base(), "https://example.com");
        assert_eq!(api.route_prefix(), "");
    }

    #[test]
    fn test_with_builtin_actions() {
        let api = ApiConfig::default()
            .with_builtin_actions("vms", ["edit", "delete"])
            .with_builtin_actions("vms", ["start"]);
        assert_eq!(api.builtin_actions["vms"], vec!["edit", "delete", "start"]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[service]
name = "inventory-api"

[api]
base_url = "https://inventory.example.com"
collision_policy = "custom_overrides"

[api.builtin_actions]
vms = ["edit", "delete"]
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.service.name, "inventory-api");
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.api.base_url, "https://inventory.example.com");
        assert_eq!(config.api.prefix, "/api");
        assert_eq!(config.api.collision_policy, CollisionPolicy::CustomOverrides);
        assert_eq!(config.api.builtin_actions["vms"], vec!["edit", "delete"]);
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[api]\ncollision_policy = \"coin_flip\"").unwrap();

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(_)));
    }
}
