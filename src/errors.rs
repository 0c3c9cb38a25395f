//! Error types for the `restack` application.

use nu_ansi_term::Color;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while planning or executing a restack.
#[derive(Error, Debug)]
pub enum RestackError {
    /// The persisted branch tree could not be read, parsed, or written.
    #[error("Branch tree store `{}` is unusable: {message}", .path.display())]
    Storage { path: PathBuf, message: String },
    /// The configuration file could not be read or parsed.
    #[error("Configuration file `{}` is invalid: {message}", .path.display())]
    Config { path: PathBuf, message: String },
    /// A version-control command exited unsuccessfully.
    #[error("`{command}` failed:\n{output}")]
    Vcs { command: String, output: String },
    /// The ancestor walk revisited a branch.
    #[error("Cycle detected in branch tree: {chain}")]
    Cycle { chain: String },
    /// A plan step failed part-way through; the working branch is left where the failure occurred.
    ///
    /// The tool output lives in `source` only, so error reporters walking the chain print it once.
    #[error(
        "Failed to restack `{}` onto `{}`. Resolve the problem and run again.",
        Color::Green.paint(.branch),
        Color::Yellow.paint(.base)
    )]
    StepFailed {
        branch: String,
        base: String,
        #[source]
        source: Box<RestackError>,
    },
    /// `HEAD` does not point at a local branch.
    #[error("HEAD is detached; check out a branch first.")]
    DetachedHead,
    /// The repository has no working directory.
    #[error("Repository has no working directory.")]
    NoWorkdir,
    /// A [git2::Error] occurred.
    #[error("libgit2 error: {}", .0)]
    Git2Error(#[from] git2::Error),
    /// An [inquire::InquireError] occurred.
    #[error("inquire error: {}", .0)]
    InquireError(#[from] inquire::InquireError),
}

/// A [Result] with [RestackError] as the error type.
pub type RestackResult<T> = Result<T, RestackError>;
