//! Server configuration.
//!
//! Layered the usual way: defaults, then an optional TOML file, then
//! `PI_*` environment variables.
//!
//! ```toml
//! host = "127.0.0.1"     # default
//! port = 3000            # default
//! framing = "sse"        # default; "ndjson" for the pull variant
//! chunk_size = 1000      # default depends on framing (1000 sse, 10 ndjson)
//! pacing_ms = 10         # default
//! max_points = 10000000  # default
//! seed = 42              # default: unseeded
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use pi_protocol::Framing;
use serde::Deserialize;
use thiserror::Error;

use crate::producer::ProducerSettings;

/// Configuration errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment variable holds an unusable value.
    #[error("invalid value for {var}: {message}")]
    Env {
        /// Variable name.
        var: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// A setting is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for the `pi-server` binary and [`crate::AppState`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port to bind; `0` picks an ephemeral port.
    pub port: u16,
    /// Framing used when a request does not ask for one.
    pub framing: Framing,
    /// Points per chunk. `None` uses the framing's default.
    pub chunk_size: Option<usize>,
    /// Delay between chunks, in milliseconds.
    pub pacing_ms: u64,
    /// Largest `n` a request may ask for.
    pub max_points: u64,
    /// Seed for reproducible point sequences.
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            framing: Framing::Sse,
            chunk_size: None,
            pacing_ms: 10,
            max_points: 10_000_000,
            seed: None,
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Override fields from `PI_*` process environment variables.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Override fields from any key lookup (the process environment in
    /// production, a map in tests).
    pub fn apply_env_with(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup("PI_HOST") {
            self.host = host;
        }
        if let Some(v) = lookup("PI_PORT") {
            self.port = parse_env("PI_PORT", &v)?;
        }
        if let Some(v) = lookup("PI_FRAMING") {
            self.framing = v.parse().map_err(|e: pi_protocol::UnknownFraming| {
                ConfigError::Env {
                    var: "PI_FRAMING",
                    message: e.to_string(),
                }
            })?;
        }
        if let Some(v) = lookup("PI_CHUNK_SIZE") {
            self.chunk_size = Some(parse_env("PI_CHUNK_SIZE", &v)?);
        }
        if let Some(v) = lookup("PI_PACING_MS") {
            self.pacing_ms = parse_env("PI_PACING_MS", &v)?;
        }
        if let Some(v) = lookup("PI_MAX_POINTS") {
            self.max_points = parse_env("PI_MAX_POINTS", &v)?;
        }
        if let Some(v) = lookup("PI_SEED") {
            self.seed = Some(parse_env("PI_SEED", &v)?);
        }
        Ok(())
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".into()));
        }
        if self.chunk_size == Some(0) {
            return Err(ConfigError::Invalid("chunk_size must be positive".into()));
        }
        if self.max_points == 0 {
            return Err(ConfigError::Invalid("max_points must be positive".into()));
        }
        Ok(())
    }

    /// `host:port` for binding.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Producer knobs for a request streamed with `framing`.
    #[must_use]
    pub fn producer_settings(&self, framing: Framing) -> ProducerSettings {
        ProducerSettings {
            chunk_size: self
                .chunk_size
                .unwrap_or_else(|| framing.default_chunk_size()),
            pacing: Duration::from_millis(self.pacing_ms),
        }
    }
}

fn parse_env<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Env {
        var,
        message: format!("'{value}': {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_address(), "127.0.0.1:3000");
        assert_eq!(c.framing, Framing::Sse);
        assert_eq!(c.pacing_ms, 10);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(
            ServerConfig::from_toml_str("").unwrap(),
            ServerConfig::default()
        );
    }

    #[test]
    fn toml_overrides() {
        let c = ServerConfig::from_toml_str(
            r#"
            port = 8080
            framing = "ndjson"
            chunk_size = 25
            seed = 9
            "#,
        )
        .unwrap();
        assert_eq!(c.port, 8080);
        assert_eq!(c.framing, Framing::Ndjson);
        assert_eq!(c.chunk_size, Some(25));
        assert_eq!(c.seed, Some(9));
        assert_eq!(c.host, "127.0.0.1");
    }

    #[test]
    fn toml_accepts_variant_aliases() {
        let c = ServerConfig::from_toml_str(r#"framing = "pull""#).unwrap();
        assert_eq!(c.framing, Framing::Ndjson);
    }

    #[test]
    fn unknown_toml_key_is_rejected() {
        assert!(matches!(
            ServerConfig::from_toml_str("chunksize = 5"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pi.toml");
        std::fs::write(&path, "pacing_ms = 0\n").unwrap();
        let c = ServerConfig::load(&path).unwrap();
        assert_eq!(c.pacing_ms, 0);
    }

    #[test]
    fn load_missing_file_names_path() {
        let err = ServerConfig::load("/nonexistent/pi.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/pi.toml"));
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> = [
            ("PI_PORT", "0"),
            ("PI_FRAMING", "ndjson"),
            ("PI_CHUNK_SIZE", "7"),
            ("PI_PACING_MS", "1"),
        ]
        .into_iter()
        .collect();
        let mut c = ServerConfig::default();
        c.apply_env_with(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(c.port, 0);
        assert_eq!(c.framing, Framing::Ndjson);
        assert_eq!(c.chunk_size, Some(7));
        assert_eq!(c.pacing_ms, 1);
    }

    #[test]
    fn bad_env_value_names_variable() {
        let mut c = ServerConfig::default();
        let err = c
            .apply_env_with(|k| (k == "PI_PORT").then(|| "http".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "PI_PORT", .. }));
    }

    #[test]
    fn zero_chunk_size_is_invalid() {
        let c = ServerConfig {
            chunk_size: Some(0),
            ..ServerConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn settings_fall_back_to_framing_default() {
        let c = ServerConfig::default();
        assert_eq!(c.producer_settings(Framing::Sse).chunk_size, 1000);
        assert_eq!(c.producer_settings(Framing::Ndjson).chunk_size, 10);
        let c = ServerConfig {
            chunk_size: Some(3),
            ..ServerConfig::default()
        };
        assert_eq!(c.producer_settings(Framing::Ndjson).chunk_size, 3);
    }
}
