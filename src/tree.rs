//! Structured, [Serialize] + [Deserialize] representation of the branch forest.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A forest of branches, represented as a flat map of branch name to parent branch name.
///
/// A branch without an entry is a root. By itself, [BranchTree] has no context of its relationship with the
/// local repository; see [RestackContext] for that.
///
/// [RestackContext]: crate::ctx::RestackContext
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchTree {
    /// A map of branch names to the names of their parents.
    branches: BTreeMap<String, String>,
}

impl BranchTree {
    /// Gets the parent of a branch.
    ///
    /// ## Takes
    /// - `branch_name` - The name of the branch to look up.
    ///
    /// ## Returns
    /// - `Some(parent)` - The name of the parent branch.
    /// - `None` - The branch has no recorded parent, and is therefore a root.
    pub fn parent(&self, branch_name: &str) -> Option<&str> {
        self.branches.get(branch_name).map(String::as_str)
    }

    /// Removes the entry for `branch_name`, returning its parent if it was tracked.
    pub fn untrack(&mut self, branch_name: &str) -> Option<String> {
        self.branches.remove(branch_name)
    }

    /// Points every child of `old_parent` at `new_parent`.
    ///
    /// ## Returns
    /// - The names of the children that were re-parented, in sorted order.
    pub fn reparent_children(&mut self, old_parent: &str, new_parent: &str) -> Vec<String> {
        self.branches
            .iter_mut()
            .filter(|(_, parent)| parent.as_str() == old_parent)
            .map(|(child, parent)| {
                *parent = new_parent.to_string();
                child.clone()
            })
            .collect()
    }

    /// Returns the number of branches with a recorded parent.
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// Returns `true` if no branch has a recorded parent.
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}

impl<B: Into<String>, P: Into<String>> FromIterator<(B, P)> for BranchTree {
    fn from_iter<T: IntoIterator<Item = (B, P)>>(iter: T) -> Self {
        Self {
            branches: iter
                .into_iter()
                .map(|(branch, parent)| (branch.into(), parent.into()))
                .collect(),
        }
    }
}
