//! Core data model for Sapling.
//!
//! Plans come in from the planning service, course trees hold chapters and
//! their statuses, and learning paths wrap a tree for storage.

mod journal;
mod message;
mod node;
mod path;
mod plan;
mod status;
mod tree;

pub use journal::{JournalEntry, JournalEvent};
pub use message::{Message, Sender};
pub use node::ChapterNode;
pub use path::LearningPath;
pub use plan::{Plan, PlanChapter};
pub use status::NodeStatus;
pub use tree::CourseTree;
