//! Chapter conversations: messages kept per learning path and chapter.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The learner.
    User,

    /// The tutoring assistant.
    Ai,
}

impl Sender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Ai => "ai",
        }
    }

    /// Parses the stored form written by [`Sender::as_str`].
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "ai" => Some(Self::Ai),
            _ => None,
        }
    }
}

/// One message in a chapter's conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// The chapter the conversation belongs to.
    pub node: String,
    pub sender: Sender,
    pub content: String,
    pub sent_at: Timestamp,
}

impl Message {
    /// A message stamped with the current time.
    pub fn now(node: impl Into<String>, sender: Sender, content: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            sender,
            content: content.into(),
            sent_at: Timestamp::now(),
        }
    }
}
