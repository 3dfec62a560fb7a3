//! TOML configuration plumbing.
//!
//! Every autodock config document carries a `[shared]` table with the log
//! level and the instance name. Section types elsewhere in the workspace
//! derive `Deserialize` and get [`ConfigLoader`] for free.
//!
//! ```rust,no_run
//! use autodock_common::config::{ConfigError, ConfigLoader, SharedConfig};
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Debug, Deserialize)]
//! struct DockConfig {
//!     #[serde(default)]
//!     shared: SharedConfig,
//! }
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = DockConfig::load(Path::new("autocharge.toml"))?;
//!     println!("robot {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Instance name used when `[shared]` omits one.
pub const DEFAULT_SERVICE_NAME: &str = "autodock";

/// Why a configuration document was rejected.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// No file at the given path.
    #[error("config file {0} does not exist")]
    FileNotFound(PathBuf),

    /// The file exists but could not be read.
    #[error("cannot read {path}: {reason}")]
    ReadError {
        /// File that failed.
        path: PathBuf,
        /// I/O error text.
        reason: String,
    },

    /// Not valid TOML, or a field has the wrong type.
    #[error("malformed config: {0}")]
    ParseError(String),

    /// Well-formed but semantically unusable.
    #[error("invalid config: {0}")]
    ValidationError(String),
}

/// Verbosity written as `log_level` in `[shared]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Every control step.
    Trace,
    /// Bookkeeping and periodic loop statistics.
    Debug,
    /// Transitions and lifecycle.
    #[default]
    Info,
    /// Escapes, aborts and disengages only.
    Warn,
    /// Fatal problems only.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// The `[shared]` table.
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "dock-bay-2"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedConfig {
    /// Default log verbosity. `RUST_LOG` overrides it.
    pub log_level: LogLevel,
    /// Robot instance name, shown in the startup banner.
    pub service_name: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            service_name: DEFAULT_SERVICE_NAME.to_owned(),
        }
    }
}

impl SharedConfig {
    /// Reject blank instance names.
    ///
    /// # Errors
    /// `ConfigError::ValidationError` if `service_name` is empty or whitespace.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "shared.service_name is blank".into(),
            ));
        }
        Ok(())
    }
}

/// TOML loading for any deserializable config type.
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Read and parse `path`.
    ///
    /// # Errors
    /// `FileNotFound` for a missing file, `ReadError` for other I/O failures,
    /// `ParseError` for bad TOML.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
            _ => ConfigError::ReadError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })?;
        Self::from_toml(&text)
    }

    /// Parse an in-memory document.
    ///
    /// # Errors
    /// `ParseError` for bad TOML.
    fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
