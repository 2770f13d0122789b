//! Startup error type for harness-ci-lab.
//!
//! Request handling has no failure path: malformed query parameters fall back
//! to defaults and unknown chaos actions are a defined `503` outcome. The only
//! place the service can refuse to run is configuration loading, which is
//! what [`ConfigError`] describes. `main` wraps it in [`anyhow::Error`] with
//! context before exiting.

use std::path::PathBuf;

/// A configuration source that could not be turned into a [`crate::Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file named by `HARNESS_CONFIG` could not be read.
    #[error("reading config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or does not match the schema.
    #[error("parsing config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// An environment variable holds a value of the wrong shape.
    #[error("environment variable {var}={value:?} is not a valid {expected}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        expected: &'static str,
    },

    /// The layered configuration parsed but holds an unusable value.
    #[error("invalid configuration: {field} {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_env_message_names_variable_and_value() {
        let err = ConfigError::InvalidEnv {
            var: "PORT",
            value: "eighty".into(),
            expected: "port number",
        };
        let msg = err.to_string();
        assert!(msg.contains("PORT"), "message: {msg}");
        assert!(msg.contains("\"eighty\""), "message: {msg}");
        assert!(msg.contains("port number"), "message: {msg}");
    }

    #[test]
    fn read_error_exposes_io_source() {
        let err = ConfigError::Read {
            path: PathBuf::from("/nope/config.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file missing"),
        };
        assert!(err.to_string().contains("/nope/config.toml"));
        let source = std::error::Error::source(&err).expect("io source attached");
        assert!(source.to_string().contains("file missing"));
    }

    #[test]
    fn converts_into_anyhow_with_context() {
        use anyhow::Context;

        let result: Result<(), ConfigError> = Err(ConfigError::InvalidEnv {
            var: "CRASH_DELAY_MS",
            value: "-1".into(),
            expected: "millisecond count",
        });
        let err = result.context("loading configuration").unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("loading configuration"), "chain: {chain}");
        assert!(chain.contains("CRASH_DELAY_MS"), "chain: {chain}");
    }
}
