//! Sapling: learning-path course progress.
//!
//! A course plan becomes a [`CourseTree`] of chapters gated by prerequisites.
//! [`Progress`] is the state machine over that tree, and [`layout::project`]
//! turns it into a positioned graph for rendering.

pub mod cli;
pub mod config;
pub mod error;
pub mod home;
pub mod ingest;
pub mod layout;
pub mod model;
pub mod progress;
pub mod resolver;
pub mod storage;

pub use error::{CourseError, Result};
pub use layout::{Graph, LayoutPolicy};
pub use model::{ChapterNode, CourseTree, NodeStatus, Plan, PlanChapter};
pub use progress::{Completion, Progress, Summary};
