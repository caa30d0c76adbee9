//! Journal entries: the append-only history of a learning path.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A single journal record, serialized as tagged JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub event: JournalEvent,
    pub recorded_at: Timestamp,
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum JournalEvent {
    /// The path was built from a plan.
    Created { chapters: usize },

    /// A chapter was opened.
    Selected { node: String },

    /// A chapter was finished, unlocking `unlocked`.
    Completed { node: String, unlocked: Vec<String> },

    /// A note was added to a chapter's conversation.
    Noted { node: String },

    /// An operation was refused, e.g. opening a locked chapter.
    Rejected { node: String, reason: String },
}

impl JournalEntry {
    /// An entry stamped with the current time.
    pub fn now(event: JournalEvent) -> Self {
        Self {
            event,
            recorded_at: Timestamp::now(),
        }
    }
}
