//! Prerequisite resolution.
//!
//! A node is eligible when every prerequisite that names a node in the tree
//! is completed. Ids that name nothing are treated as satisfied so that a
//! sloppy plan can't lock a chapter forever.

use std::collections::HashSet;

use crate::model::{ChapterNode, CourseTree};

/// Whether `node`'s prerequisites are satisfied by `completed`.
///
/// Pure and total. An empty prerequisite list is always satisfied.
pub fn is_eligible(node: &ChapterNode, tree: &CourseTree, completed: &HashSet<&str>) -> bool {
    node.prerequisites
        .iter()
        .all(|id| completed.contains(id.as_str()) || !tree.contains(id))
}

/// Prerequisites of `node` that still block it.
///
/// Empty exactly when [`is_eligible`] is true.
pub fn missing_prerequisites<'a>(
    node: &'a ChapterNode,
    tree: &CourseTree,
    completed: &HashSet<&str>,
) -> Vec<&'a str> {
    node.prerequisites
        .iter()
        .filter(|id| tree.contains(id) && !completed.contains(id.as_str()))
        .map(String::as_str)
        .collect()
}
