//! Learning paths: a stored course and where the learner is in it.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CourseTree;

/// A persisted learning path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPath {
    pub id: Uuid,

    /// What the learner said they wanted to learn.
    pub goal: String,

    /// Learner context the plan was generated for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    pub tree: CourseTree,
    pub focus: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

impl LearningPath {
    /// The first eight characters of the id, for display.
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }
}
