//! Output formatting for CLI display.

use std::fmt::Write as _;

use crate::model::{CourseTree, JournalEvent, NodeStatus};
use crate::progress::Summary;

fn status_marker(status: NodeStatus) -> &'static str {
    match status {
        NodeStatus::Completed => "[x]",
        NodeStatus::Active => "[>]",
        NodeStatus::Upcoming => "[ ]",
        NodeStatus::Locked => "[#]",
    }
}

/// Render the tree depth-first, two spaces per level, focus starred.
pub(super) fn format_tree(tree: &CourseTree, focus: Option<&str>) -> String {
    let mut out = String::new();
    for (node, depth) in tree.depth_first() {
        let star = if focus == Some(node.id.as_str()) { " *" } else { "" };
        let _ = writeln!(
            out,
            "{:indent$}{} {}  ({}){star}",
            "",
            status_marker(node.status),
            node.title,
            node.id,
            indent = depth * 2,
        );
    }
    out
}

pub(super) fn format_summary(summary: Summary) -> String {
    format!(
        "{}/{} completed, {}%",
        summary.completed,
        summary.total,
        summary.percent()
    )
}

/// Format a journal event for human-readable display.
pub(super) fn format_event(event: &JournalEvent) -> String {
    match event {
        JournalEvent::Created { chapters } => format!("created with {chapters} chapter(s)"),
        JournalEvent::Selected { node } => format!("opened {node}"),
        JournalEvent::Completed { node, unlocked } if unlocked.is_empty() => {
            format!("completed {node}")
        }
        JournalEvent::Completed { node, unlocked } => {
            format!("completed {node}, unlocked {}", unlocked.join(", "))
        }
        JournalEvent::Noted { node } => format!("noted on {node}"),
        JournalEvent::Rejected { node, reason } => format!("rejected {node}: {reason}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{Plan, PlanChapter};
    use crate::progress::Progress;

    #[test]
    fn tree_shows_markers_indent_and_focus() {
        let plan = Plan {
            title: "Learn Rust".into(),
            chapters: vec![
                PlanChapter::new("c1", "Basics", &[]),
                PlanChapter::new("c2", "Ownership", &["c1"]),
                PlanChapter::new("c3", "Traits", &["c2"]),
            ],
            ..Plan::default()
        };
        let mut progress = Progress::from_plan(&plan).unwrap();
        progress.select_node("c1").unwrap();
        progress.complete_node("c1").unwrap();
        progress.select_node("c2").unwrap();

        let text = format_tree(progress.tree(), progress.focus());
        assert_eq!(
            text,
            "[x] Basics  (c1)\n  [>] Ownership  (c2) *\n    [#] Traits  (c3)\n"
        );
    }

    #[test]
    fn summary_shows_counts_and_percent() {
        let summary = Summary {
            completed: 1,
            total: 3,
        };
        assert_eq!(format_summary(summary), "1/3 completed, 33%");
    }

    #[test]
    fn completion_event_lists_unlocked() {
        let event = JournalEvent::Completed {
            node: "c1".into(),
            unlocked: vec!["c2".into(), "c3".into()],
        };
        assert_eq!(format_event(&event), "completed c1, unlocked c2, c3");

        let event = JournalEvent::Completed {
            node: "c4".into(),
            unlocked: vec![],
        };
        assert_eq!(format_event(&event), "completed c4");
    }
}
