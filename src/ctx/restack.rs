//! Execution of a [RestackPlan].

use super::RestackContext;
use crate::{
    errors::{RestackError, RestackResult},
    git::Vcs,
    plan::{RestackMode, RestackPlan, RestackStep},
};
use nu_ansi_term::Color;
use tracing::{debug, error, info};

/// How a restack run ended.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RestackOutcome {
    /// The operator declined the preview. Nothing was changed.
    Aborted,
    /// Every step of the plan was applied.
    Completed,
}

/// What was done for a single [RestackStep].
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum StepAction {
    /// The branch no longer existed; its children were moved onto `base` and it was untracked.
    Reparented {
        branch: String,
        base: String,
        children: Vec<String>,
    },
    /// The branch was integrated with `base`.
    Restacked { branch: String, base: String },
}

/// The result of a restack run that did not fail.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RestackReport {
    /// How the run ended.
    pub outcome: RestackOutcome,
    /// The actions taken, in order.
    pub actions: Vec<StepAction>,
    /// The branch checked out once the run finished.
    pub final_branch: String,
}

impl<V: Vcs> RestackContext<'_, V> {
    /// Restacks the checked-out branch and all of its ancestors.
    ///
    /// Fetches from the remote (if one is configured), plans from the checked-out branch, and executes the
    /// plan after `confirm` approves it.
    pub fn restack_current<C>(
        &mut self,
        mode: RestackMode,
        confirm: C,
    ) -> RestackResult<RestackReport>
    where
        C: FnOnce(&RestackPlan) -> RestackResult<bool>,
    {
        self.vcs.fetch_if_remote()?;

        let initial = self.vcs.current_branch()?;
        let plan = self.plan(&initial)?;

        if plan.is_empty() {
            println!(
                "Nothing to restack: `{}` has no tracked parent.",
                Color::Green.paint(&initial)
            );
            return Ok(RestackReport {
                outcome: RestackOutcome::Completed,
                actions: Vec::new(),
                final_branch: initial,
            });
        }

        debug!(root = plan.root(), steps = plan.steps().len(), "Planned restack");
        self.execute(&plan, mode, confirm)
    }

    /// Executes `plan`, root to leaf.
    ///
    /// The preview is printed and `confirm` consulted before anything is touched. On completion or abort the
    /// branch that was checked out beforehand is checked out again. If a step fails, the run halts with
    /// [RestackError::StepFailed] and the working branch is left where the failure happened so the operator
    /// can resolve it in place.
    pub fn execute<C>(
        &mut self,
        plan: &RestackPlan,
        mode: RestackMode,
        confirm: C,
    ) -> RestackResult<RestackReport>
    where
        C: FnOnce(&RestackPlan) -> RestackResult<bool>,
    {
        let initial = self.vcs.current_branch()?;

        print!("{}", plan.preview(mode));
        if !confirm(plan)? {
            println!("Aborting restack");
            return self.finish(&initial, RestackOutcome::Aborted, Vec::new());
        }

        let mut actions = Vec::with_capacity(plan.steps().len());
        for step in plan.steps() {
            // An earlier re-parent in this run may have moved the branch onto a new base.
            let base = self
                .tree
                .parent(&step.branch)
                .unwrap_or(step.base.as_str())
                .to_string();

            let action = self.apply_step(step, &base, mode).map_err(|e| {
                error!(branch = %step.branch, %base, "Restack step failed");
                RestackError::StepFailed {
                    branch: step.branch.clone(),
                    base: base.clone(),
                    source: Box::new(e),
                }
            })?;
            actions.push(action);
        }

        self.finish(&initial, RestackOutcome::Completed, actions)
    }

    /// Applies a single step against `base`.
    fn apply_step(
        &mut self,
        step: &RestackStep,
        base: &str,
        mode: RestackMode,
    ) -> RestackResult<StepAction> {
        // A deleted branch cannot be checked out; move its children up instead.
        if !step.exists {
            let children = self.tree.reparent_children(&step.branch, base);
            self.tree.untrack(&step.branch);
            self.persist()?;

            let action = StepAction::Reparented {
                branch: step.branch.clone(),
                base: base.to_string(),
                children,
            };
            info!(branch = %step.branch, base, "Re-parented children of deleted branch");
            println!("{}", action);
            return Ok(action);
        }

        let action = StepAction::Restacked {
            branch: step.branch.clone(),
            base: base.to_string(),
        };
        println!("{}", action);
        info!(branch = %step.branch, base, %mode, "Restacking");

        self.vcs.checkout(base)?;
        self.vcs.pull_if_remote()?;
        self.vcs.checkout(&step.branch)?;
        self.vcs.pull_if_remote()?;
        self.vcs.integrate(base, mode)?;

        Ok(action)
    }

    /// Returns to `initial` and assembles the [RestackReport].
    fn finish(
        &self,
        initial: &str,
        outcome: RestackOutcome,
        actions: Vec<StepAction>,
    ) -> RestackResult<RestackReport> {
        self.vcs.checkout(initial)?;
        let final_branch = self.vcs.current_branch()?;

        if outcome == RestackOutcome::Completed {
            println!(
                "Restack complete. You are on `{}` now.",
                Color::Green.paint(&final_branch)
            );
        }

        Ok(RestackReport {
            outcome,
            actions,
            final_branch,
        })
    }
}

#[cfg(test)]
mod test {
    use crate::{
        ctx::{RestackContext, RestackOutcome, StepAction},
        errors::RestackError,
        git::{fake::FakeVcs, Vcs},
        plan::RestackMode,
        store::BranchTreeStore,
        tree::BranchTree,
    };
    use std::fs;
    use tempfile::TempDir;

    const REMOTE: &str = "git@example.com:org/repo.git";

    /// Seeds a store in a fresh temporary directory with `tree`.
    fn seeded_store(tree: &BranchTree) -> (TempDir, BranchTreeStore) {
        let dir = TempDir::new().unwrap();
        let store = BranchTreeStore::new(dir.path().join(".stack"));
        store.save(tree).unwrap();
        (dir, store)
    }

    fn feature_stack() -> BranchTree {
        BranchTree::from_iter([("feature-b", "feature-a"), ("feature-a", "main")])
    }

    #[test]
    fn restacks_feature_stack_in_order() {
        let (_dir, store) = seeded_store(&feature_stack());
        let vcs =
            FakeVcs::new("feature-b", ["main", "feature-a", "feature-b"]).with_remote(REMOTE);
        let mut ctx = RestackContext::load(&vcs, store).unwrap();

        let report = ctx
            .restack_current(RestackMode::Rebase, |_| Ok(true))
            .unwrap();

        assert_eq!(
            vcs.calls(),
            vec![
                "fetch",
                "checkout main",
                "pull",
                "checkout feature-a",
                "pull",
                "rebase main",
                "pull",
                "checkout feature-b",
                "pull",
                "rebase feature-a",
            ]
        );
        assert_eq!(report.outcome, RestackOutcome::Completed);
        assert_eq!(report.final_branch, "feature-b");
        assert_eq!(
            report.actions,
            vec![
                StepAction::Restacked {
                    branch: "feature-a".to_string(),
                    base: "main".to_string(),
                },
                StepAction::Restacked {
                    branch: "feature-b".to_string(),
                    base: "feature-a".to_string(),
                },
            ]
        );
    }

    #[test]
    fn merge_mode_merges() {
        let (_dir, store) = seeded_store(&feature_stack());
        let vcs = FakeVcs::new("feature-b", ["main", "feature-a", "feature-b"]);
        let mut ctx = RestackContext::load(&vcs, store).unwrap();

        ctx.restack_current(RestackMode::Merge, |_| Ok(true))
            .unwrap();

        assert_eq!(vcs.count("merge"), 2);
        assert_eq!(vcs.count("rebase"), 0);
        assert!(vcs.calls().contains(&"merge main".to_string()));
        assert!(vcs.calls().contains(&"merge feature-a".to_string()));
    }

    #[test]
    fn no_remote_means_no_pull_or_fetch() {
        let (_dir, store) = seeded_store(&feature_stack());
        let vcs = FakeVcs::new("feature-b", ["main", "feature-a", "feature-b"]);
        let mut ctx = RestackContext::load(&vcs, store).unwrap();

        let report = ctx
            .restack_current(RestackMode::Rebase, |_| Ok(true))
            .unwrap();

        assert_eq!(report.outcome, RestackOutcome::Completed);
        assert_eq!(vcs.count("pull"), 0);
        assert_eq!(vcs.count("fetch"), 0);
        assert_eq!(vcs.count("rebase"), 2);
    }

    #[test]
    fn returns_to_starting_branch_from_middle_of_stack() {
        let tree = BranchTree::from_iter([("c", "b"), ("b", "a"), ("a", "main")]);
        let (_dir, store) = seeded_store(&tree);
        let vcs = FakeVcs::new("b", ["main", "a", "b", "c"]);
        let mut ctx = RestackContext::load(&vcs, store).unwrap();

        let report = ctx
            .restack_current(RestackMode::Rebase, |_| Ok(true))
            .unwrap();

        // `c` sits above the starting branch and is left alone.
        assert!(!vcs.calls().contains(&"checkout c".to_string()));
        assert_eq!(report.actions.len(), 2);
        assert_eq!(report.final_branch, "b");
        assert_eq!(vcs.current_branch().unwrap(), "b");
    }

    #[test]
    fn deleted_branch_is_reparented_not_checked_out() {
        let (_dir, store) = seeded_store(&BranchTree::from_iter([("A", "root"), ("B", "A")]));
        let vcs = FakeVcs::new("B", ["root", "B"]);
        let mut ctx = RestackContext::load(&vcs, store.clone()).unwrap();

        let report = ctx
            .restack_current(RestackMode::Rebase, |_| Ok(true))
            .unwrap();

        assert_eq!(ctx.tree, BranchTree::from_iter([("B", "root")]));
        assert_eq!(store.load().unwrap(), BranchTree::from_iter([("B", "root")]));
        assert!(!vcs.calls().iter().any(|c| c == "checkout A"));
        assert_eq!(vcs.calls(), vec!["checkout root", "checkout B", "rebase root"]);
        assert_eq!(
            report.actions,
            vec![
                StepAction::Reparented {
                    branch: "A".to_string(),
                    base: "root".to_string(),
                    children: vec!["B".to_string()],
                },
                StepAction::Restacked {
                    branch: "B".to_string(),
                    base: "root".to_string(),
                },
            ]
        );
        assert_eq!(report.final_branch, "B");
    }

    #[test]
    fn consecutive_deleted_branches_collapse_onto_root() {
        let tree = BranchTree::from_iter([("a", "main"), ("b", "a"), ("c", "b")]);
        let (_dir, store) = seeded_store(&tree);
        let vcs = FakeVcs::new("c", ["main", "c"]);
        let mut ctx = RestackContext::load(&vcs, store).unwrap();

        ctx.restack_current(RestackMode::Merge, |_| Ok(true))
            .unwrap();

        assert_eq!(ctx.tree, BranchTree::from_iter([("c", "main")]));
        assert_eq!(vcs.calls(), vec!["checkout main", "checkout c", "merge main"]);
    }

    #[test]
    fn abort_changes_nothing() {
        let (dir, store) = seeded_store(&feature_stack());
        let before = fs::read_to_string(dir.path().join(".stack")).unwrap();
        let vcs = FakeVcs::new("feature-b", ["main", "feature-b"]);
        let mut ctx = RestackContext::load(&vcs, store).unwrap();

        let mut shown = 0;
        let report = ctx
            .restack_current(RestackMode::Rebase, |plan| {
                shown = plan.steps().len();
                Ok(false)
            })
            .unwrap();

        assert_eq!(shown, 2);
        assert_eq!(report.outcome, RestackOutcome::Aborted);
        assert!(report.actions.is_empty());
        assert_eq!(report.final_branch, "feature-b");
        assert!(vcs.calls().is_empty());
        assert_eq!(ctx.tree, feature_stack());
        assert_eq!(fs::read_to_string(dir.path().join(".stack")).unwrap(), before);
    }

    #[test]
    fn failed_step_halts_and_stays_in_place() {
        let (_dir, store) = seeded_store(&feature_stack());
        let vcs = FakeVcs::new("feature-b", ["main", "feature-a", "feature-b"])
            .failing_on("rebase main");
        let mut ctx = RestackContext::load(&vcs, store).unwrap();

        let err = ctx
            .restack_current(RestackMode::Rebase, |_| Ok(true))
            .unwrap_err();

        match err {
            RestackError::StepFailed {
                branch,
                base,
                source,
            } => {
                assert_eq!(branch, "feature-a");
                assert_eq!(base, "main");
                assert!(source.to_string().contains("CONFLICT"));
            }
            e => panic!("unexpected error: {e}"),
        }
        assert_eq!(vcs.calls().last().unwrap(), "rebase main");
        assert_eq!(vcs.current_branch().unwrap(), "feature-a");
    }

    #[test]
    fn running_twice_is_repeatable() {
        let (_dir, store) = seeded_store(&feature_stack());
        let vcs =
            FakeVcs::new("feature-b", ["main", "feature-a", "feature-b"]).with_remote(REMOTE);

        let first = RestackContext::load(&vcs, store.clone())
            .unwrap()
            .restack_current(RestackMode::Rebase, |_| Ok(true))
            .unwrap();
        let first_calls = vcs.calls();
        let second = RestackContext::load(&vcs, store.clone())
            .unwrap()
            .restack_current(RestackMode::Rebase, |_| Ok(true))
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(vcs.calls()[first_calls.len()..], first_calls[..]);
        assert_eq!(store.load().unwrap(), feature_stack());
    }

    #[test]
    fn untracked_branch_skips_confirmation() {
        let (_dir, store) = seeded_store(&feature_stack());
        let vcs = FakeVcs::new("main", ["main", "feature-a", "feature-b"]);
        let mut ctx = RestackContext::load(&vcs, store).unwrap();

        let report = ctx
            .restack_current(RestackMode::Rebase, |_| panic!("nothing to confirm"))
            .unwrap();

        assert_eq!(report.outcome, RestackOutcome::Completed);
        assert_eq!(report.final_branch, "main");
        assert!(vcs.calls().is_empty());
    }

    #[test]
    fn cycle_is_rejected_before_any_checkout() {
        let (_dir, store) = seeded_store(&BranchTree::from_iter([("a", "b"), ("b", "a")]));
        let vcs = FakeVcs::new("a", ["a", "b"]);
        let mut ctx = RestackContext::load(&vcs, store).unwrap();

        let err = ctx
            .restack_current(RestackMode::Rebase, |_| Ok(true))
            .unwrap_err();

        assert!(matches!(err, RestackError::Cycle { .. }));
        assert!(vcs.calls().is_empty());
    }

    #[test]
    fn confirmation_errors_propagate() {
        let (_dir, store) = seeded_store(&feature_stack());
        let vcs = FakeVcs::new("feature-b", ["main", "feature-a", "feature-b"]);
        let mut ctx = RestackContext::load(&vcs, store).unwrap();

        let err = ctx
            .restack_current(RestackMode::Rebase, |_| {
                Err(RestackError::InquireError(inquire::InquireError::NotTTY))
            })
            .unwrap_err();

        assert!(matches!(err, RestackError::InquireError(_)));
        assert!(vcs.calls().is_empty());
    }
}
