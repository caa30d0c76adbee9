//! Chapter nodes: one unit of learning content.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::NodeStatus;

/// A single chapter in a course tree.
///
/// `children` is the display order used for traversal and layout only.
/// Gating is decided by `prerequisites` alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterNode {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: NodeStatus,

    /// Ids that must be `Completed` before this node leaves `Locked`.
    #[serde(default)]
    pub prerequisites: Vec<String>,

    /// Child ids in display order.
    #[serde(default)]
    pub children: Vec<String>,

    /// Opaque chapter content supplied by the planning service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
}

impl ChapterNode {
    /// A locked node with no prerequisites, children, or content.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status: NodeStatus::Locked,
            prerequisites: Vec::new(),
            children: Vec::new(),
            content: None,
        }
    }
}
