//! Constants for the `restack` application.

/// Default location of the persisted branch tree, relative to the working directory.
pub(crate) const DEFAULT_STACK_PATH: &str = ".stack";

/// Name of the optional user configuration file, looked up in `$HOME`.
pub(crate) const RESTACK_CFG_FILE_NAME: &str = ".restack.toml";

/// Remote consulted before pulling or fetching.
pub(crate) const DEFAULT_REMOTE: &str = "origin";

/// The external version-control binary.
pub(crate) const GIT_BIN: &str = "git";

pub(crate) const LEFT_ARROW: &str = "<-";
