//! RPC runtime configuration
//!
//! Tunable limits for the framed msgpack-RPC layer. Loaded from a JSON
//! file; any field left out takes its default.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::rpc::codec::DEFAULT_MAX_FRAME_SIZE;

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace", "off"];

/// Ceiling for `max_frame_size`: the largest length a `uint 32` prefix carries.
pub const MAX_FRAME_SIZE_LIMIT: usize = u32::MAX as usize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{field} must be at most {max}")]
    TooLarge { field: &'static str, max: usize },

    #[error("unknown log level '{0}'")]
    LogLevel(String),
}

/// Core RPC configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Largest frame payload accepted or sent, in bytes
    pub max_frame_size: usize,
    /// Default client call timeout in milliseconds (0 = wait forever)
    pub call_timeout_ms: u64,
    /// Size of the transport read buffer
    pub read_buffer_size: usize,
    /// `log` level filter for the binary
    pub log_level: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE, // 16 MiB
            call_timeout_ms: 0,
            read_buffer_size: 64 * 1024,
            log_level: "info".to_owned(),
        }
    }
}

impl RpcConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_frame_size == 0 {
            return Err(ConfigError::Zero("max_frame_size"));
        }
        if self.max_frame_size > MAX_FRAME_SIZE_LIMIT {
            return Err(ConfigError::TooLarge {
                field: "max_frame_size",
                max: MAX_FRAME_SIZE_LIMIT,
            });
        }
        if self.read_buffer_size == 0 {
            return Err(ConfigError::Zero("read_buffer_size"));
        }
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::LogLevel(self.log_level.clone()));
        }
        Ok(())
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let c: RpcConfig = serde_json::from_str(s)?;
        c.validate()?;
        Ok(c)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&s)
    }

    /// `None` when calls may wait forever.
    pub fn call_timeout(&self) -> Option<Duration> {
        (self.call_timeout_ms > 0).then(|| Duration::from_millis(self.call_timeout_ms))
    }
}
