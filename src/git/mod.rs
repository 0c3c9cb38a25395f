//! Utilities for interacting with `git` repositories for the `restack` application.

use crate::{
    constants::GIT_BIN,
    errors::{RestackError, RestackResult},
    plan::RestackMode,
};
use git2::{BranchType, Repository};
use std::{
    path::{Path, PathBuf},
    process::Command,
};
use tracing::{debug, trace, warn};

#[cfg(test)]
pub(crate) mod fake;

/// The version-control capabilities the planner and executor depend on.
///
/// Every operation blocks until the underlying tool has finished. Implementors provide the raw
/// primitives; the provided methods layer the remote and no-op policies on top of them.
pub trait Vcs {
    /// Returns the name of the checked-out branch.
    fn current_branch(&self) -> RestackResult<String>;

    /// Returns `true` if a local branch named `branch_name` exists.
    fn branch_exists(&self, branch_name: &str) -> RestackResult<bool>;

    /// Returns the URL of the configured remote, if any.
    fn remote_url(&self) -> RestackResult<Option<String>>;

    /// Switches the working tree to `branch_name`, unconditionally.
    fn checkout_branch(&self, branch_name: &str) -> RestackResult<()>;

    /// Creates `branch_name` at `HEAD` and checks it out.
    fn create_branch(&self, branch_name: &str) -> RestackResult<()>;

    /// Pulls the checked-out branch from the remote.
    fn pull(&self) -> RestackResult<()>;

    /// Fetches from the remote.
    fn fetch(&self) -> RestackResult<()>;

    /// Rebases the checked-out branch onto `onto`.
    fn rebase(&self, onto: &str) -> RestackResult<()>;

    /// Merges `onto` into the checked-out branch.
    fn merge(&self, onto: &str) -> RestackResult<()>;

    /// Returns `true` if a remote with a non-empty URL is configured.
    fn has_remote(&self) -> RestackResult<bool> {
        Ok(self
            .remote_url()?
            .is_some_and(|url| !url.trim().is_empty()))
    }

    /// Checks out `branch_name`, doing nothing if it is already checked out.
    fn checkout(&self, branch_name: &str) -> RestackResult<()> {
        if self.current_branch()? == branch_name {
            trace!(branch_name, "Already checked out");
            return Ok(());
        }
        self.checkout_branch(branch_name)
    }

    /// Pulls only when a remote is configured.
    fn pull_if_remote(&self) -> RestackResult<()> {
        if self.has_remote()? {
            self.pull()
        } else {
            trace!("No remote configured, skipping pull");
            Ok(())
        }
    }

    /// Fetches only when a remote is configured.
    fn fetch_if_remote(&self) -> RestackResult<()> {
        if self.has_remote()? {
            self.fetch()
        } else {
            trace!("No remote configured, skipping fetch");
            Ok(())
        }
    }

    /// Integrates `onto` into the checked-out branch using the strategy selected by `mode`.
    fn integrate(&self, onto: &str, mode: RestackMode) -> RestackResult<()> {
        match mode {
            RestackMode::Rebase => self.rebase(onto),
            RestackMode::Merge => self.merge(onto),
        }
    }
}

/// A [Vcs] backed by a local `git` repository.
///
/// Queries are answered through `libgit2`; operations that move branches shell out to the `git`
/// binary, since `git2` has no porcelain for pulling, merging, or rebasing with conflict handling.
pub struct GitCli {
    /// The repository.
    repository: Repository,
    /// The working directory `git` is invoked in.
    workdir: PathBuf,
    /// The name of the remote consulted before pulling or fetching.
    remote: String,
}

impl GitCli {
    /// Opens the repository containing `path`.
    ///
    /// ## Takes
    /// - `path` - Any path within the repository.
    /// - `remote` - The name of the remote to pull and fetch from.
    pub fn discover(path: impl AsRef<Path>, remote: impl Into<String>) -> RestackResult<Self> {
        let repository = Repository::discover(path)?;
        let workdir = repository
            .workdir()
            .ok_or(RestackError::NoWorkdir)?
            .to_path_buf();

        Ok(Self {
            repository,
            workdir,
            remote: remote.into(),
        })
    }

    /// Returns `true` if the checked-out branch tracks an upstream branch.
    fn current_has_upstream(&self) -> RestackResult<bool> {
        let name = self.current_branch()?;
        let branch = self.repository.find_branch(&name, BranchType::Local)?;
        Ok(branch.upstream().is_ok())
    }

    /// Runs `git` with `args` in the working directory, capturing its output.
    ///
    /// ## Returns
    /// - `Ok(stdout)` - If `git` exited with status 0.
    /// - `Err(RestackError::Vcs)` - Otherwise, carrying the raw stderr and stdout.
    fn run(&self, args: &[&str]) -> RestackResult<String> {
        let command = format!("{} {}", GIT_BIN, args.join(" "));
        debug!(%command, "Running");

        let output = Command::new(GIT_BIN)
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| RestackError::Vcs {
                command: command.clone(),
                output: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RestackError::Vcs {
                command,
                output: format!("{}{}", stderr, stdout).trim_end().to_string(),
            });
        }

        trace!(%command, %stdout, "Finished");
        Ok(stdout)
    }
}

impl Vcs for GitCli {
    fn current_branch(&self) -> RestackResult<String> {
        let head = self.repository.head()?;
        if !head.is_branch() {
            return Err(RestackError::DetachedHead);
        }
        head.shorthand()
            .map(ToOwned::to_owned)
            .ok_or(RestackError::DetachedHead)
    }

    fn branch_exists(&self, branch_name: &str) -> RestackResult<bool> {
        match self.repository.find_branch(branch_name, BranchType::Local) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(false),
            Err(e) if e.code() == git2::ErrorCode::InvalidSpec => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn remote_url(&self) -> RestackResult<Option<String>> {
        match self.repository.find_remote(&self.remote) {
            Ok(remote) => Ok(remote.url().map(ToOwned::to_owned)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn checkout_branch(&self, branch_name: &str) -> RestackResult<()> {
        self.run(&["checkout", branch_name]).map(|_| ())
    }

    fn create_branch(&self, branch_name: &str) -> RestackResult<()> {
        self.run(&["checkout", "-b", branch_name]).map(|_| ())
    }

    fn pull(&self) -> RestackResult<()> {
        // `git pull` cannot succeed on a branch that was never pushed.
        if !self.current_has_upstream()? {
            warn!(
                branch = %self.current_branch()?,
                "Branch has no upstream, skipping pull"
            );
            return Ok(());
        }
        // Merge explicitly so the result doesn't depend on `pull.rebase`/`pull.ff`. A branch rebased
        // earlier in the run has diverged from its upstream, which git refuses to reconcile without a strategy.
        self.run(&["pull", "--no-rebase", "--no-edit"]).map(|_| ())
    }

    fn fetch(&self) -> RestackResult<()> {
        self.run(&["fetch", self.remote.as_str()]).map(|_| ())
    }

    fn rebase(&self, onto: &str) -> RestackResult<()> {
        self.run(&["rebase", onto]).map(|_| ())
    }

    fn merge(&self, onto: &str) -> RestackResult<()> {
        self.run(&["merge", onto]).map(|_| ())
    }
}
