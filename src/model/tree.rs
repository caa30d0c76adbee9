//! Course trees: the display tree of chapters plus an id index.
//!
//! Nodes live in a single id-keyed map. The display tree is expressed through
//! each node's `children` ids, starting from `root`. The prerequisite relation
//! is a separate DAG over the same ids and may cross branches.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CourseError, Result};
use crate::resolver;

use super::{ChapterNode, NodeStatus, Plan};

/// Base id for a synthesized root when a plan has several top-level chapters.
const SYNTHETIC_ROOT_ID: &str = "root";

/// A rooted tree of chapters with current statuses.
///
/// Shape, titles, and prerequisites are fixed after construction.
/// Only statuses change, and only through the progress state machine.
/// Deserialization runs [`CourseTree::validate`], so a tree read back from
/// storage is as well-formed as one built from a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCourseTree", rename_all = "camelCase")]
pub struct CourseTree {
    root: String,
    nodes: BTreeMap<String, ChapterNode>,

    /// The root was made up from the plan's title, not taken from a chapter.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    synthetic_root: bool,
}

/// Wire shape of a [`CourseTree`] before validation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCourseTree {
    root: String,
    nodes: BTreeMap<String, ChapterNode>,
    #[serde(default)]
    synthetic_root: bool,
}

impl TryFrom<RawCourseTree> for CourseTree {
    type Error = CourseError;

    fn try_from(raw: RawCourseTree) -> Result<Self> {
        let tree = Self {
            root: raw.root,
            nodes: raw.nodes,
            synthetic_root: raw.synthetic_root,
        };
        tree.validate()?;
        Ok(tree)
    }
}

impl CourseTree {
    /// Builds a tree from a plan, assigning initial statuses.
    ///
    /// Each chapter hangs under its last listed prerequisite that names a
    /// known chapter. Chapters without one are top-level: a single top-level
    /// chapter becomes the root, several get a synthesized root carrying the
    /// plan's title. Nodes whose prerequisites are satisfied by an empty
    /// completion set start `Upcoming`, the rest `Locked`.
    pub fn from_plan(plan: &Plan) -> Result<Self> {
        if plan.chapters.is_empty() {
            return Err(CourseError::MalformedPlan("plan has no chapters".into()));
        }

        let mut order: Vec<String> = Vec::with_capacity(plan.chapters.len());
        let mut nodes: BTreeMap<String, ChapterNode> = BTreeMap::new();

        for (index, chapter) in plan.chapters.iter().enumerate() {
            let id = chapter
                .id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .ok_or_else(|| {
                    CourseError::MalformedPlan(format!("chapter {} has no id", index + 1))
                })?
                .to_string();

            if nodes.contains_key(&id) {
                return Err(CourseError::MalformedPlan(format!(
                    "duplicate chapter id '{id}'"
                )));
            }

            let mut prerequisites: Vec<String> = Vec::new();
            for prereq in chapter.prerequisites() {
                let prereq = prereq.trim();
                if prereq == id {
                    return Err(CourseError::MalformedPlan(format!(
                        "chapter '{id}' lists itself as a prerequisite"
                    )));
                }
                if !prereq.is_empty() && !prerequisites.iter().any(|p| p == prereq) {
                    prerequisites.push(prereq.to_string());
                }
            }

            let mut node = ChapterNode::new(id.clone(), chapter.title.clone());
            node.description.clone_from(&chapter.description);
            node.prerequisites = prerequisites;
            node.content.clone_from(&chapter.content);

            order.push(id.clone());
            nodes.insert(id, node);
        }

        for node in nodes.values() {
            for prereq in &node.prerequisites {
                if !nodes.contains_key(prereq) {
                    warn!(
                        chapter = %node.id,
                        prerequisite = %prereq,
                        "unknown prerequisite treated as satisfied"
                    );
                }
            }
        }

        check_acyclic(&order, &nodes)?;

        // Display parent: last known prerequisite. Children keep plan order.
        let mut top_level: Vec<String> = Vec::new();
        for id in &order {
            let parent = nodes[id]
                .prerequisites
                .iter()
                .rev()
                .find(|p| nodes.contains_key(p.as_str()))
                .cloned();
            match parent {
                Some(parent) => {
                    if let Some(p) = nodes.get_mut(&parent) {
                        p.children.push(id.clone());
                    }
                }
                None => top_level.push(id.clone()),
            }
        }

        let synthetic_root = top_level.len() != 1;
        let root = if let [only] = top_level.as_slice() {
            only.clone()
        } else {
            let root_id = synthetic_root_id(&nodes);
            let mut root = ChapterNode::new(root_id.clone(), plan.title.clone());
            root.description.clone_from(&plan.description);
            root.children = top_level;
            nodes.insert(root_id.clone(), root);
            root_id
        };

        let mut tree = Self {
            root,
            nodes,
            synthetic_root,
        };
        let completed: HashSet<&str> = HashSet::new();
        let eligible: Vec<String> = tree
            .nodes
            .values()
            .filter(|n| resolver::is_eligible(n, &tree, &completed))
            .map(|n| n.id.clone())
            .collect();
        for id in eligible {
            tree.set_status(&id, NodeStatus::Upcoming);
        }

        Ok(tree)
    }

    /// Reassembles a tree from persisted parts, checking its structure.
    pub fn from_parts(root: String, nodes: BTreeMap<String, ChapterNode>) -> Result<Self> {
        let tree = Self {
            root,
            nodes,
            synthetic_root: false,
        };
        tree.validate()?;
        Ok(tree)
    }

    /// Checks that every node is reachable from the root exactly once and
    /// that every child id resolves.
    pub fn validate(&self) -> Result<()> {
        let malformed = |msg: String| Err(CourseError::MalformedPlan(msg));

        if !self.nodes.contains_key(&self.root) {
            return malformed(format!("root '{}' is not a node", self.root));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut stack = vec![self.root.as_str()];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                return malformed(format!("node '{id}' has more than one parent"));
            }
            let Some(node) = self.nodes.get(id) else {
                return malformed(format!("child '{id}' is not a node"));
            };
            stack.extend(node.children.iter().map(String::as_str));
        }

        if seen.len() != self.nodes.len() {
            let orphan = self
                .nodes
                .keys()
                .find(|id| !seen.contains(id.as_str()))
                .map_or("?", String::as_str);
            return malformed(format!("node '{orphan}' is unreachable from the root"));
        }

        Ok(())
    }

    /// The root node.
    pub fn root(&self) -> &ChapterNode {
        &self.nodes[&self.root]
    }

    pub fn root_id(&self) -> &str {
        &self.root
    }

    /// Whether `id` is a root made up from the plan title.
    ///
    /// Such a root is a heading, not a chapter: it is never picked as the
    /// next chapter to study.
    pub fn is_synthetic_root(&self, id: &str) -> bool {
        self.synthetic_root && id == self.root
    }

    pub fn node(&self, id: &str) -> Option<&ChapterNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// All nodes, ordered by id.
    pub fn nodes(&self) -> impl Iterator<Item = &ChapterNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of every `Completed` node.
    pub fn completed_ids(&self) -> HashSet<&str> {
        self.nodes
            .values()
            .filter(|n| n.status.is_completed())
            .map(|n| n.id.as_str())
            .collect()
    }

    /// Nodes in depth-first display order with their depth.
    ///
    /// The root comes first, then each child subtree in `children` order.
    /// A node reached a second time is not walked again.
    pub fn depth_first(&self) -> Vec<(&ChapterNode, usize)> {
        let mut visited = Vec::with_capacity(self.nodes.len());
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root.as_str(), 0)];
        while let Some((id, depth)) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            visited.push((node, depth));
            stack.extend(
                node.children
                    .iter()
                    .rev()
                    .map(|child| (child.as_str(), depth + 1)),
            );
        }
        visited
    }

    /// Sets one node's status. Unknown ids are ignored.
    pub(crate) fn set_status(&mut self, id: &str, status: NodeStatus) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.status = status;
        }
    }
}

/// Rejects prerequisite cycles among known chapters.
fn check_acyclic(order: &[String], nodes: &BTreeMap<String, ChapterNode>) -> Result<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }

    fn visit<'a>(
        id: &'a str,
        nodes: &'a BTreeMap<String, ChapterNode>,
        marks: &mut HashMap<&'a str, Mark>,
    ) -> Result<()> {
        match marks.get(id) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                return Err(CourseError::MalformedPlan(format!(
                    "prerequisite cycle involving '{id}'"
                )));
            }
            None => {}
        }
        marks.insert(id, Mark::Visiting);
        if let Some(node) = nodes.get(id) {
            for prereq in &node.prerequisites {
                if nodes.contains_key(prereq) {
                    visit(prereq, nodes, marks)?;
                }
            }
        }
        marks.insert(id, Mark::Done);
        Ok(())
    }

    let mut marks = HashMap::new();
    for id in order {
        visit(id, nodes, &mut marks)?;
    }
    Ok(())
}

fn synthetic_root_id(nodes: &BTreeMap<String, ChapterNode>) -> String {
    if !nodes.contains_key(SYNTHETIC_ROOT_ID) {
        return SYNTHETIC_ROOT_ID.to_string();
    }
    (1..)
        .map(|n| format!("{SYNTHETIC_ROOT_ID}-{n}"))
        .find(|id| !nodes.contains_key(id))
        .unwrap_or_default()
}
