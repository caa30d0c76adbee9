//! Error types for course progress.

use thiserror::Error;

/// Result type for course operations.
pub type Result<T> = std::result::Result<T, CourseError>;

/// Errors raised by plan ingestion and the progress state machine.
///
/// A failing operation leaves the tree exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CourseError {
    /// The learner tried to open or finish a chapter whose prerequisites
    /// aren't complete. Recoverable: surface it as a notice.
    #[error("chapter '{0}' is locked: complete its prerequisites first")]
    NodeLocked(String),

    /// An operation named an id that isn't in the tree.
    #[error("unknown chapter: {0}")]
    UnknownNode(String),

    /// The plan (or a persisted tree) has an invalid shape.
    #[error("malformed plan: {0}")]
    MalformedPlan(String),
}

impl CourseError {
    /// Whether the error is an expected user-facing rejection rather than a defect.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NodeLocked(_))
    }
}
