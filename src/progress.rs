//! The progress state machine.
//!
//! [`Progress`] owns a [`CourseTree`] and is its only status mutator. Two verbs
//! drive it: [`Progress::select_node`] opens a chapter and makes it the focus,
//! [`Progress::complete_node`] finishes one and re-derives every other status
//! from the prerequisite resolver.
//!
//! ```text
//! Locked ──(prerequisites complete)──▶ Upcoming ──select──▶ Active ──complete──▶ Completed
//! ```
//!
//! `Completed` is terminal. Unlocking is monotonic: the completion set only
//! grows, so a node that has left `Locked` never returns to it.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{CourseError, Result};
use crate::model::{ChapterNode, CourseTree, NodeStatus, Plan};
use crate::resolver;

/// A learner's session over one course tree.
#[derive(Debug, Clone)]
pub struct Progress {
    tree: CourseTree,
    focus: Option<String>,
    auto_advance: bool,
}

/// What a successful `complete_node` changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    /// Nodes that left `Locked`, in depth-first order.
    pub unlocked: Vec<String>,

    /// The focus after the operation.
    pub focus: Option<String>,
}

/// Completed vs. total chapter counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub completed: usize,
    pub total: usize,
}

impl Summary {
    /// Whole-number percentage, rounded to nearest.
    pub fn percent(self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let pct = (self.completed * 100 + self.total / 2) / self.total;
        u8::try_from(pct.min(100)).unwrap_or(100)
    }
}

impl Progress {
    /// Starts a session over an existing tree with no focus.
    pub fn new(tree: CourseTree) -> Self {
        Self {
            tree,
            focus: None,
            auto_advance: false,
        }
    }

    /// Builds the tree from a plan and starts a session over it.
    pub fn from_plan(plan: &Plan) -> Result<Self> {
        let tree = CourseTree::from_plan(plan)?;
        info!(chapters = tree.len(), root = tree.root_id(), "course built from plan");
        Ok(Self::new(tree))
    }

    /// Resumes a persisted session.
    ///
    /// The tree is re-validated. A focus that names a missing node is an
    /// error. A focus on a locked node is dropped.
    pub fn restore(tree: CourseTree, focus: Option<String>) -> Result<Self> {
        tree.validate()?;
        let focus = match focus {
            Some(id) => match tree.node(&id) {
                None => return Err(CourseError::UnknownNode(id)),
                Some(node) if node.status == NodeStatus::Locked => {
                    warn!(node = %id, "dropping focus on locked chapter");
                    None
                }
                Some(_) => Some(id),
            },
            None => None,
        };
        Ok(Self {
            tree,
            focus,
            auto_advance: false,
        })
    }

    /// Move focus to the next open chapter after each completion.
    ///
    /// The pick is the first eligible chapter in depth-first order. A root
    /// synthesized from the plan title is skipped, so with several
    /// top-level chapters the focus lands on the first of them.
    #[must_use]
    pub fn with_auto_advance(mut self, enabled: bool) -> Self {
        self.auto_advance = enabled;
        self
    }

    pub fn tree(&self) -> &CourseTree {
        &self.tree
    }

    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    pub fn node(&self, id: &str) -> Option<&ChapterNode> {
        self.tree.node(id)
    }

    /// Consumes the session, returning the tree and focus for persistence.
    pub fn into_parts(self) -> (CourseTree, Option<String>) {
        (self.tree, self.focus)
    }

    pub fn summary(&self) -> Summary {
        Summary {
            completed: self.tree.nodes().filter(|n| n.status.is_completed()).count(),
            total: self.tree.len(),
        }
    }

    /// The first `Upcoming` or `Active` chapter in depth-first order.
    /// A synthesized root is never returned.
    pub fn next_eligible(&self) -> Option<&ChapterNode> {
        self.tree
            .depth_first()
            .into_iter()
            .map(|(node, _)| node)
            .filter(|n| !self.tree.is_synthetic_root(&n.id))
            .find(|n| matches!(n.status, NodeStatus::Upcoming | NodeStatus::Active))
    }

    /// Replaces the whole tree with one built from `plan`.
    ///
    /// On error the current tree and focus are kept.
    pub fn rebuild_from_plan(&mut self, plan: &Plan) -> Result<()> {
        let tree = CourseTree::from_plan(plan)?;
        info!(chapters = tree.len(), root = tree.root_id(), "course rebuilt from plan");
        self.tree = tree;
        self.focus = None;
        Ok(())
    }

    /// Opens a chapter and makes it the focus.
    ///
    /// `Upcoming` becomes `Active`. `Active` and `Completed` nodes keep their
    /// status. No other node changes.
    pub fn select_node(&mut self, id: &str) -> Result<&ChapterNode> {
        let status = self
            .tree
            .node(id)
            .ok_or_else(|| CourseError::UnknownNode(id.to_string()))?
            .status;

        match status {
            NodeStatus::Locked => return Err(CourseError::NodeLocked(id.to_string())),
            NodeStatus::Upcoming => {
                self.tree.set_status(id, NodeStatus::Active);
                debug!(node = id, from = %status, to = %NodeStatus::Active, "status changed");
            }
            NodeStatus::Active | NodeStatus::Completed => {}
        }

        if self.focus.as_deref() != Some(id) {
            debug!(node = id, "focus changed");
            self.focus = Some(id.to_string());
        }

        self.tree
            .node(id)
            .ok_or_else(|| CourseError::UnknownNode(id.to_string()))
    }

    /// Marks a chapter completed and re-derives every other status.
    ///
    /// Every non-completed node is re-checked against the new completion set,
    /// not only the completed node's children: eligible nodes become `Active`
    /// if they hold the focus afterwards and `Upcoming` otherwise, the rest
    /// `Locked`. Completing an already-completed node is a no-op rescan.
    pub fn complete_node(&mut self, id: &str) -> Result<Completion> {
        let status = self
            .tree
            .node(id)
            .ok_or_else(|| CourseError::UnknownNode(id.to_string()))?
            .status;
        if status == NodeStatus::Locked {
            return Err(CourseError::NodeLocked(id.to_string()));
        }

        if status != NodeStatus::Completed {
            self.tree.set_status(id, NodeStatus::Completed);
            info!(node = id, "chapter completed");
        }

        // Depth-first so the auto-advance pick is the first open chapter on screen.
        let eligibility: Vec<(String, NodeStatus, bool)> = {
            let completed = self.tree.completed_ids();
            self.tree
                .depth_first()
                .into_iter()
                .filter(|(n, _)| !n.status.is_completed())
                .map(|(n, _)| {
                    let eligible = resolver::is_eligible(n, &self.tree, &completed);
                    (n.id.clone(), n.status, eligible)
                })
                .collect()
        };

        let focus = if self.auto_advance {
            eligibility
                .iter()
                .find(|(id, _, eligible)| *eligible && !self.tree.is_synthetic_root(id))
                .map(|(id, _, _)| id.clone())
        } else {
            self.focus.clone().filter(|f| f != id)
        };

        let mut unlocked = Vec::new();
        for (node_id, before, eligible) in &eligibility {
            let after = match (*eligible, focus.as_deref() == Some(node_id.as_str())) {
                (false, _) => NodeStatus::Locked,
                (true, true) => NodeStatus::Active,
                (true, false) => NodeStatus::Upcoming,
            };
            if after != *before {
                debug!(node = %node_id, from = %before, to = %after, "status changed");
                self.tree.set_status(node_id, after);
            }
            if *before == NodeStatus::Locked && after != NodeStatus::Locked {
                unlocked.push(node_id.clone());
            }
        }

        // A focus that ended up locked can't stay focused.
        let focus = focus.filter(|f| {
            self.tree
                .node(f)
                .is_some_and(|n| n.status != NodeStatus::Locked)
        });
        if focus != self.focus {
            debug!(from = ?self.focus, to = ?focus, "focus changed");
            self.focus.clone_from(&focus);
        }

        Ok(Completion { unlocked, focus })
    }
}
