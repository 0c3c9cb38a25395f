//! Planning of a restack: the ordered chain from the root of the current stack down to a branch.

use crate::{
    errors::{RestackError, RestackResult},
    tree::BranchTree,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

mod fmt;
pub use fmt::Preview;

/// The strategy used to integrate a parent's changes into a child branch.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestackMode {
    /// `git rebase <parent>`.
    Rebase,
    /// `git merge <parent>`.
    #[default]
    Merge,
}

/// A single unit of work within a [RestackPlan].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RestackStep {
    /// The branch to restack.
    pub branch: String,
    /// The parent `branch` is integrated against.
    pub base: String,
    /// Whether `branch` still exists locally. Deleted branches are re-parented instead of restacked.
    pub exists: bool,
}

/// An ordered, ancestor-first list of [RestackStep]s.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RestackPlan {
    /// The most upstream branch of the stack. It has no step of its own.
    root: String,
    /// The steps, from the root's child down to the starting branch.
    steps: Vec<RestackStep>,
}

impl RestackPlan {
    /// Returns the root branch of the stack.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Returns the steps in the order they must be applied.
    pub fn steps(&self) -> &[RestackStep] {
        &self.steps
    }

    /// Returns `true` if there is nothing to restack.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns a [std::fmt::Display]able preview of the plan.
    pub fn preview(&self, mode: RestackMode) -> Preview<'_> {
        Preview { plan: self, mode }
    }
}

/// Builds the [RestackPlan] for `start_branch`.
///
/// Walks parent links from `start_branch` until a branch without a parent is reached, then reverses
/// the walk so that every branch is integrated only after its parent has been. `exists` is consulted
/// once for every branch that receives a step; no other side effects happen during planning.
///
/// ## Takes
/// - `tree` - The branch tree to walk.
/// - `start_branch` - The branch to begin the walk at, usually the checked-out branch.
/// - `exists` - Predicate reporting whether a branch still exists locally.
///
/// ## Returns
/// - `Ok(RestackPlan)` - The plan. Empty if `start_branch` is untracked.
/// - `Err(RestackError::Cycle)` - If the walk revisits a branch.
pub fn build_plan<F>(
    tree: &BranchTree,
    start_branch: &str,
    mut exists: F,
) -> RestackResult<RestackPlan>
where
    F: FnMut(&str) -> RestackResult<bool>,
{
    // Leaf-to-root walk.
    let mut chain = vec![start_branch];
    let mut seen = HashSet::from([start_branch]);
    let mut current = start_branch;
    while let Some(parent) = tree.parent(current) {
        chain.push(parent);
        if !seen.insert(parent) {
            return Err(RestackError::Cycle {
                chain: chain.iter().join(" -> "),
            });
        }
        current = parent;
    }
    chain.reverse();
    debug!(chain = %chain.iter().join(" -> "), "Resolved stack");

    let steps = chain
        .iter()
        .copied()
        .tuple_windows()
        .map(|(base, branch)| {
            Ok(RestackStep {
                branch: branch.to_string(),
                base: base.to_string(),
                exists: exists(branch)?,
            })
        })
        .collect::<RestackResult<Vec<_>>>()?;

    Ok(RestackPlan {
        root: chain[0].to_string(),
        steps,
    })
}
