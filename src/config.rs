//! Layered configuration for the `restack` application.

use crate::{
    constants::{DEFAULT_REMOTE, DEFAULT_STACK_PATH, RESTACK_CFG_FILE_NAME},
    errors::{RestackError, RestackResult},
    plan::RestackMode,
};
use serde::{Deserialize, Serialize};
use std::{
    env,
    path::{Path, PathBuf},
};
use tracing::debug;

/// The optional, user-level configuration file, `~/.restack.toml`.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    /// The integration strategy used when `--rebase` is not passed.
    pub mode: Option<RestackMode>,
    /// The path of the branch tree store.
    pub stack_path: Option<PathBuf>,
    /// The remote consulted before pulling or fetching.
    pub remote: Option<String>,
}

impl FileConfig {
    /// Loads the [FileConfig] at `path`. A missing file yields the default configuration.
    pub fn load(path: &Path) -> RestackResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No configuration file found");
            return Ok(Self::default());
        }

        let config_error = |message: String| RestackError::Config {
            path: path.to_path_buf(),
            message,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        toml::from_str(&raw).map_err(|e| config_error(e.to_string()))
    }

    /// Loads the [FileConfig] from the user's home directory, if one can be located.
    pub fn load_default() -> RestackResult<Self> {
        match default_config_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }
}

/// The fully-resolved configuration for a single run.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Config {
    /// The integration strategy.
    pub mode: RestackMode,
    /// The path of the branch tree store.
    pub stack_path: PathBuf,
    /// The remote consulted before pulling or fetching.
    pub remote: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: RestackMode::default(),
            stack_path: PathBuf::from(DEFAULT_STACK_PATH),
            remote: DEFAULT_REMOTE.to_string(),
        }
    }
}

impl Config {
    /// Resolves the configuration. Command-line values take precedence over the file, which takes
    /// precedence over the defaults.
    ///
    /// ## Takes
    /// - `file` - The user's [FileConfig].
    /// - `rebase` - Whether `--rebase` was passed.
    /// - `stack_path` - The `--stack-path` override, if any.
    pub fn resolve(file: FileConfig, rebase: bool, stack_path: Option<PathBuf>) -> Self {
        let defaults = Self::default();
        Self {
            mode: if rebase {
                RestackMode::Rebase
            } else {
                file.mode.unwrap_or(defaults.mode)
            },
            stack_path: stack_path
                .or(file.stack_path)
                .unwrap_or(defaults.stack_path),
            remote: file.remote.unwrap_or(defaults.remote),
        }
    }
}

/// Returns the path of the user's configuration file.
///
/// ## Returns
/// - `Some(PathBuf)` - `$HOME/.restack.toml`.
/// - `None` - If `$HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| PathBuf::from(home).join(RESTACK_CFG_FILE_NAME))
}
