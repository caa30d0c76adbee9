//! Course plans as produced by the planning service.
//!
//! These types mirror the planning service's JSON. Most fields are optional
//! because the service is an LLM and routinely omits them; validation happens
//! when the plan is turned into a [`CourseTree`](super::CourseTree).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A hierarchical course plan: title plus chapters with prerequisite lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,

    /// Learner context the plan was generated for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    #[serde(default)]
    pub chapters: Vec<PlanChapter>,
}

/// One chapter entry in a plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanChapter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,

    /// Absent and empty both mean "no gating".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerequisites: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
}

impl PlanChapter {
    /// A chapter with the given id, title, and prerequisites.
    pub fn new(id: &str, title: &str, prerequisites: &[&str]) -> Self {
        Self {
            id: Some(id.to_string()),
            title: title.to_string(),
            prerequisites: Some(prerequisites.iter().map(ToString::to_string).collect()),
            ..Self::default()
        }
    }

    /// The prerequisite ids, treating an absent list as empty.
    pub fn prerequisites(&self) -> &[String] {
        self.prerequisites.as_deref().unwrap_or_default()
    }
}
