//! Scheduler configuration loading.

use std::{
    env, fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::TaskType;

/// Default location on disk where the scheduler looks for its JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/cadence.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "CADENCE_CONFIG_PATH";

/// Tunables shared by the scheduler and its worker group.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Stage type that marks the end of a game. Nothing is scheduled past it.
    pub terminal_task_type: TaskType,
    /// Upper bound on synchronous post-transition hops in one call.
    pub max_cascade_depth: usize,
    /// Number of workers consuming fired jobs.
    pub workers: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            terminal_task_type: TaskType::new("quit"),
            max_cascade_depth: 256,
            workers: 2,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config `{}`", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SchedulerConfig {
    /// Load the configuration from disk, falling back to the built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match Self::from_path(&path) {
            Ok(config) => {
                info!(
                    path = %path.display(),
                    terminal_task_type = %config.terminal_task_type,
                    workers = config.workers,
                    "loaded scheduler config"
                );
                config
            }
            Err(ConfigError::Read { source, .. }) if source.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to load config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Strict variant of [`SchedulerConfig::load`] for an explicit file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
