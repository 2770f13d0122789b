//! Configuration types for harness-ci-lab.
//!
//! Values are layered, lowest precedence first:
//!
//! 1. Built-in defaults (the service runs with no configuration at all).
//! 2. An optional TOML file named by `HARNESS_CONFIG`.
//! 3. Environment variables, which is how CI pipelines and the Kubernetes
//!    downward API usually inject build and pod metadata.
//!
//! Config is resolved once at startup. A malformed value is rejected with a
//! [`ConfigError`] before any port is bound rather than silently replaced.
//!
//! # Example
//! ```toml
//! [service]
//! name     = "harness-ci-lab"
//! version  = "1.4.2"
//! git_sha  = "9f1c2ab"
//!
//! [server]
//! port           = 8080
//! crash_delay_ms = 2000
//! ```

use std::{num::NonZeroU64, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable holding the optional TOML config path.
pub const CONFIG_PATH_ENV: &str = "HARNESS_CONFIG";

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Build and runtime metadata reported by `/version`, `/greet` and `/metrics`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Service name (env `SERVICE_NAME`, default `harness-ci-lab`).
    #[serde(default = "defaults::name")]
    pub name: String,

    /// Application version (env `APP_VERSION`, default `dev`).
    #[serde(default = "defaults::version")]
    pub version: String,

    /// Build commit (env `GIT_SHA`, default `unknown`).
    #[serde(default = "defaults::git_sha")]
    pub git_sha: String,

    /// Pod or host name (env `HOSTNAME`, default `local`).
    ///
    /// Inside Kubernetes `HOSTNAME` is the pod name.
    #[serde(default = "defaults::pod_name")]
    pub pod_name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: defaults::name(),
            version: defaults::version(),
            git_sha: defaults::git_sha(),
            pod_name: defaults::pod_name(),
        }
    }
}

/// Listener and lifecycle settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listening port (env `PORT`, default 8080).
    #[serde(default = "defaults::port")]
    pub port: u16,

    /// Delay between answering `/chaos?action=crash` and exiting
    /// (env `CRASH_DELAY_MS`, default 2000).
    #[serde(default = "defaults::crash_delay_ms")]
    pub crash_delay_ms: u64,

    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: defaults::port(),
            crash_delay_ms: defaults::crash_delay_ms(),
            log_level: None,
        }
    }
}

impl ServerConfig {
    pub fn crash_delay(&self) -> Duration {
        Duration::from_millis(self.crash_delay_ms)
    }
}

impl Config {
    /// Resolve the process configuration from `HARNESS_CONFIG` and the
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        let env = |key: &str| std::env::var(key).ok();
        let file = env(CONFIG_PATH_ENV).filter(|p| !p.is_empty());
        Self::from_sources(file.as_deref().map(Path::new), env)
    }

    /// Layer an optional TOML file and an environment lookup over the
    /// defaults.
    ///
    /// `env` is injected so callers (and tests) control where variables come
    /// from. Empty values count as unset.
    pub fn from_sources<F>(file: Option<&Path>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| env(key).filter(|v| !v.is_empty()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that only make sense once every layer has been applied.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.crash_delay_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "server.crash_delay_ms",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env<F>(&mut self, env: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = env("SERVICE_NAME") {
            self.service.name = v;
        }
        if let Some(v) = env("APP_VERSION") {
            self.service.version = v;
        }
        if let Some(v) = env("GIT_SHA") {
            self.service.git_sha = v;
        }
        if let Some(v) = env("HOSTNAME") {
            self.service.pod_name = v;
        }
        if let Some(v) = env("PORT") {
            self.server.port = parse_env("PORT", v, "port number")?;
        }
        if let Some(v) = env("CRASH_DELAY_MS") {
            self.server.crash_delay_ms =
                parse_env::<NonZeroU64>("CRASH_DELAY_MS", v, "positive millisecond count")?.get();
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(
    var: &'static str,
    value: String,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { var, value, expected })
}

mod defaults {
    pub fn name() -> String { "harness-ci-lab".into() }
    pub fn version() -> String { "dev".into() }
    pub fn git_sha() -> String { "unknown".into() }
    pub fn pod_name() -> String { "local".into() }
    pub fn port() -> u16 { 8080 }
    pub fn crash_delay_ms() -> u64 { 2_000 }
}
