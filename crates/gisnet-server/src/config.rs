//! Process configuration for the GIS service.
//!
//! The deployment supplies `GRPC_HOST` and `GRPC_PORT` through the
//! environment; their absence is a startup fault. Worker count, codec
//! policy and simulation root have defaults. A TOML file with the
//! same fields can be used instead via `--config`.

use gisnet_codec::CodecPolicy;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error; fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable absent or empty
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    /// A setting is present but unusable
    #[error("invalid value for {var}: {reason}")]
    Invalid {
        /// Setting name
        var: String,
        /// Why it was rejected
        reason: String,
    },

    /// Failed to read config file
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Listen host (e.g. "0.0.0.0")
    pub host: String,

    /// Listen port
    pub port: u16,

    /// Worker pool size for engine invocations
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Codec policy name: "plain" or "self-describing"
    #[serde(default = "default_codec")]
    pub codec: String,

    /// Root directory for per-call simulation scratch space
    #[serde(default = "default_sim_root")]
    pub sim_root: PathBuf,
}

fn default_workers() -> usize {
    10
}

fn default_codec() -> String {
    "plain".to_string()
}

fn default_sim_root() -> PathBuf {
    env::temp_dir().join("gisnet")
}

impl ServiceConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = required_var("GRPC_HOST")?;
        let port = required_var("GRPC_PORT")?;
        let port = port.parse().map_err(|e| ConfigError::Invalid {
            var: "GRPC_PORT".to_string(),
            reason: format!("{e}"),
        })?;
        let workers = match env::var("GRPC_WORKERS") {
            Ok(value) => value.parse().map_err(|e| ConfigError::Invalid {
                var: "GRPC_WORKERS".to_string(),
                reason: format!("{e}"),
            })?,
            Err(_) => default_workers(),
        };
        let codec = env::var("GIS_CODEC").unwrap_or_else(|_| default_codec());
        let sim_root = env::var("GIS_SIM_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_sim_root());

        Ok(Self {
            host,
            port,
            workers,
            codec,
            sim_root,
        })
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Parse the configured codec policy.
    pub fn codec_policy(&self) -> Result<CodecPolicy, ConfigError> {
        CodecPolicy::parse(&self.codec).ok_or_else(|| ConfigError::Invalid {
            var: "codec".to_string(),
            reason: format!("unknown policy `{}`", self.codec),
        })
    }
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}
