//! Node status: where a chapter stands in the learner's progress.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The gating status of a single chapter.
///
/// `Completed` is terminal: once reached, nothing moves a node out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeStatus {
    /// Prerequisites are not yet satisfied. The node cannot be opened.
    Locked,

    /// Prerequisites are satisfied but the learner hasn't opened it.
    Upcoming,

    /// Opened and in progress.
    Active,

    /// Finished.
    Completed,
}

impl NodeStatus {
    /// Whether the learner may open a node in this status.
    pub fn is_open(self) -> bool {
        !matches!(self, Self::Locked)
    }

    pub fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
