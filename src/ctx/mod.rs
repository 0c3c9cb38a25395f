//! The in-memory context of the `restack` application.

use crate::{
    errors::RestackResult,
    git::Vcs,
    plan::{build_plan, RestackPlan},
    store::BranchTreeStore,
    tree::BranchTree,
};

mod fmt;
mod restack;
pub use restack::{RestackOutcome, RestackReport, StepAction};

/// The in-memory context of the `restack` application: the version-control adapter, and the branch tree
/// loaded from its store.
pub struct RestackContext<'a, V> {
    /// The version-control adapter.
    pub vcs: &'a V,
    /// The store the tree was loaded from, and is persisted back to.
    pub store: BranchTreeStore,
    /// The tree of tracked branches.
    pub tree: BranchTree,
}

impl<'a, V: Vcs> RestackContext<'a, V> {
    /// Loads the [BranchTree] from `store`, and assembles a [RestackContext].
    pub fn load(vcs: &'a V, store: BranchTreeStore) -> RestackResult<Self> {
        let tree = store.load()?;
        Ok(Self { vcs, store, tree })
    }

    /// Builds the [RestackPlan] for `start_branch`, checking each planned branch against the local branch
    /// listing.
    pub fn plan(&self, start_branch: &str) -> RestackResult<RestackPlan> {
        build_plan(&self.tree, start_branch, |branch| {
            self.vcs.branch_exists(branch)
        })
    }

    /// Persists the [BranchTree] to its store.
    pub fn persist(&self) -> RestackResult<()> {
        self.store.save(&self.tree)
    }
}
