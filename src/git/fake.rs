//! A call-recording [Vcs] for tests.

use super::Vcs;
use crate::errors::{RestackError, RestackResult};
use std::{cell::RefCell, collections::BTreeSet};

/// An in-memory [Vcs] that records every primitive invocation as a `git`-like string.
#[derive(Debug, Default)]
pub(crate) struct FakeVcs {
    current: RefCell<String>,
    branches: RefCell<BTreeSet<String>>,
    remote: Option<String>,
    fail_on: Option<String>,
    calls: RefCell<Vec<String>>,
}

impl FakeVcs {
    pub(crate) fn new<const N: usize>(current: &str, branches: [&str; N]) -> Self {
        Self {
            current: RefCell::new(current.to_string()),
            branches: RefCell::new(branches.iter().map(|b| b.to_string()).collect()),
            ..Default::default()
        }
    }

    pub(crate) fn with_remote(mut self, url: &str) -> Self {
        self.remote = Some(url.to_string());
        self
    }

    /// Makes the invocation rendered as `call` fail with a conflict.
    pub(crate) fn failing_on(mut self, call: &str) -> Self {
        self.fail_on = Some(call.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub(crate) fn count(&self, verb: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.split_whitespace().next() == Some(verb))
            .count()
    }

    fn record(&self, call: String) -> RestackResult<()> {
        self.calls.borrow_mut().push(call.clone());
        if self.fail_on.as_deref() == Some(call.as_str()) {
            return Err(RestackError::Vcs {
                command: format!("git {}", call),
                output: "CONFLICT (content): Merge conflict in lib.rs".to_string(),
            });
        }
        Ok(())
    }
}

impl Vcs for FakeVcs {
    fn current_branch(&self) -> RestackResult<String> {
        Ok(self.current.borrow().clone())
    }

    fn branch_exists(&self, branch_name: &str) -> RestackResult<bool> {
        Ok(self.branches.borrow().contains(branch_name))
    }

    fn remote_url(&self) -> RestackResult<Option<String>> {
        Ok(self.remote.clone())
    }

    fn checkout_branch(&self, branch_name: &str) -> RestackResult<()> {
        self.record(format!("checkout {}", branch_name))?;
        if !self.branches.borrow().contains(branch_name) {
            return Err(RestackError::Vcs {
                command: format!("git checkout {}", branch_name),
                output: format!(
                    "error: pathspec '{}' did not match any file(s) known to git",
                    branch_name
                ),
            });
        }
        *self.current.borrow_mut() = branch_name.to_string();
        Ok(())
    }

    fn create_branch(&self, branch_name: &str) -> RestackResult<()> {
        self.record(format!("checkout -b {}", branch_name))?;
        self.branches.borrow_mut().insert(branch_name.to_string());
        *self.current.borrow_mut() = branch_name.to_string();
        Ok(())
    }

    fn pull(&self) -> RestackResult<()> {
        self.record("pull".to_string())
    }

    fn fetch(&self) -> RestackResult<()> {
        self.record("fetch".to_string())
    }

    fn rebase(&self, onto: &str) -> RestackResult<()> {
        self.record(format!("rebase {}", onto))
    }

    fn merge(&self, onto: &str) -> RestackResult<()> {
        self.record(format!("merge {}", onto))
    }
}
