//! Commands within a learning path: show, select, complete, note, layout, export, journal.

use std::path::Path;

use jiff::Timestamp;
use serde::Serialize;

use crate::{
    config::Config,
    error::CourseError,
    layout::{self, DEFAULT_PADDING, Graph, Transform, Viewport},
    model::{JournalEntry, JournalEvent, LearningPath, Message, Sender},
    progress::Progress,
    storage::Storage,
};

use super::emit_json;
use super::format::{format_event, format_summary, format_tree};

/// Graph plus an optional fit transform, as printed by `layout`.
#[derive(Serialize)]
struct LayoutOutput<'a> {
    #[serde(flatten)]
    graph: &'a Graph,
    #[serde(skip_serializing_if = "Option::is_none")]
    transform: Option<Transform>,
}

pub(super) fn cmd_show(path: &LearningPath) -> Result<(), String> {
    let progress = restore(path)?;

    println!("{}  {}", path.short_id(), path.goal);
    if let Some(context) = &path.context {
        println!("Context: {context}");
    }
    print!("{}", format_tree(progress.tree(), progress.focus()));
    println!("{}", format_summary(progress.summary()));
    if let Some(next) = progress.next_eligible() {
        println!("Next: {} ({})", next.title, next.id);
    }
    Ok(())
}

pub(super) fn cmd_select(
    config: &Config,
    storage: &Storage,
    path: LearningPath,
    node: &str,
) -> Result<(), String> {
    let mut progress = restore(&path)?.with_auto_advance(config.auto_advance);

    let title = match progress.select_node(node) {
        Ok(n) => n.title.clone(),
        Err(e) => return Err(reject(storage, &path, node, &e)),
    };

    save(storage, path, progress, JournalEvent::Selected { node: node.to_string() })?;
    println!("Opened {title}");
    Ok(())
}

pub(super) fn cmd_complete(
    config: &Config,
    storage: &Storage,
    path: LearningPath,
    node: &str,
) -> Result<(), String> {
    let mut progress = restore(&path)?.with_auto_advance(config.auto_advance);

    let completion = match progress.complete_node(node) {
        Ok(c) => c,
        Err(e) => return Err(reject(storage, &path, node, &e)),
    };

    let summary = progress.summary();
    let titles: Vec<String> = completion
        .unlocked
        .iter()
        .map(|id| progress.node(id).map_or_else(|| id.clone(), |n| n.title.clone()))
        .collect();

    let event = JournalEvent::Completed {
        node: node.to_string(),
        unlocked: completion.unlocked.clone(),
    };
    save(storage, path, progress, event)?;

    println!("Completed {node}");
    for (id, title) in completion.unlocked.iter().zip(&titles) {
        println!("Unlocked {title} ({id})");
    }
    if let Some(focus) = &completion.focus {
        println!("Focus: {focus}");
    }
    eprintln!("{}", format_summary(summary));
    Ok(())
}

pub(super) fn cmd_note(
    config: &Config,
    storage: &Storage,
    path: LearningPath,
    node: &str,
    text: &str,
) -> Result<(), String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("note text is empty".to_string());
    }

    let mut progress = restore(&path)?.with_auto_advance(config.auto_advance);

    // Writing in a conversation opens the chapter, so locked ones are refused.
    if let Err(e) = progress.select_node(node) {
        return Err(reject(storage, &path, node, &e));
    }

    let path_id = path.id;
    save(storage, path, progress, JournalEvent::Noted { node: node.to_string() })?;
    storage
        .append_message(path_id, &Message::now(node, Sender::User, text))
        .map_err(|e| format!("failed to save note: {e}"))?;

    eprintln!("Noted on {node}");
    Ok(())
}

pub(super) fn cmd_notes(storage: &Storage, path: &LearningPath, node: &str) -> Result<(), String> {
    if !path.tree.contains(node) {
        return Err(CourseError::UnknownNode(node.to_string()).to_string());
    }

    let messages = storage
        .load_messages(path.id, node)
        .map_err(|e| format!("failed to load conversation: {e}"))?;

    if messages.is_empty() {
        println!("No messages");
        return Ok(());
    }

    for message in &messages {
        println!(
            "{}  {:<4}  {}",
            message.sent_at,
            message.sender.as_str(),
            message.content
        );
    }
    Ok(())
}

pub(super) fn cmd_layout(
    config: &Config,
    path: &LearningPath,
    viewport: Option<(f64, f64)>,
    out: Option<&Path>,
) -> Result<(), String> {
    let graph = layout::project(&path.tree, path.focus.as_deref(), &config.layout);
    let transform = viewport.map(|(width, height)| {
        layout::fit_to_viewport(&graph, Viewport { width, height }, DEFAULT_PADDING)
    });

    let output = LayoutOutput {
        graph: &graph,
        transform,
    };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| format!("failed to serialize layout: {e}"))?;

    let what = format!("{} nodes, {} edges", graph.nodes.len(), graph.edges.len());
    emit_json(&json, out, &what)
}

pub(super) fn cmd_export(path: &LearningPath, out: Option<&Path>) -> Result<(), String> {
    let json = serde_json::to_string_pretty(&path.tree)
        .map_err(|e| format!("failed to serialize course tree: {e}"))?;
    emit_json(&json, out, "course tree")
}

pub(super) fn cmd_journal(storage: &Storage, path: &LearningPath) -> Result<(), String> {
    let entries = storage
        .load_journal(path.id)
        .map_err(|e| format!("failed to load journal: {e}"))?;

    if entries.is_empty() {
        println!("No journal entries");
        return Ok(());
    }

    for entry in &entries {
        println!("{}  {}", entry.recorded_at, format_event(&entry.event));
    }
    Ok(())
}

fn restore(path: &LearningPath) -> Result<Progress, String> {
    Progress::restore(path.tree.clone(), path.focus.clone())
        .map_err(|e| format!("learning path {} is inconsistent: {e}", path.short_id()))
}

/// Journal a recoverable rejection and turn the error into a message.
fn reject(storage: &Storage, path: &LearningPath, node: &str, err: &CourseError) -> String {
    if err.is_recoverable() {
        let event = JournalEvent::Rejected {
            node: node.to_string(),
            reason: err.to_string(),
        };
        if let Err(e) = storage.append_entry(path.id, &JournalEntry::now(event)) {
            eprintln!("warning: failed to write journal: {e}");
        }
    }
    err.to_string()
}

/// Persist the session's tree and focus, then journal `event`.
fn save(
    storage: &Storage,
    mut path: LearningPath,
    progress: Progress,
    event: JournalEvent,
) -> Result<(), String> {
    let (tree, focus) = progress.into_parts();
    path.tree = tree;
    path.focus = focus;
    path.updated_at = Some(Timestamp::now());

    storage
        .update_path(&path)
        .map_err(|e| format!("failed to save learning path: {e}"))?;
    storage
        .append_entry(path.id, &JournalEntry::now(event))
        .map_err(|e| format!("failed to write journal: {e}"))
}
