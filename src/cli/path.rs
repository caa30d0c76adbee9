//! Learning path lifecycle commands: new, list, delete.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use clap::Subcommand;
use jiff::Timestamp;
use uuid::Uuid;

use crate::{
    ingest,
    model::{JournalEntry, JournalEvent, LearningPath},
    progress::Progress,
    storage::Storage,
};

use super::format::format_summary;

#[derive(Debug, Subcommand)]
pub enum PathCommand {
    /// Create a learning path from a plan. Prints the path ID.
    ///
    /// The plan is planning-service output: raw JSON, or prose with a
    /// fenced ```json block.
    New {
        /// What the learner wants to learn. Defaults to the plan's title.
        #[arg(long)]
        goal: Option<String>,

        /// Plan file, or `-` for stdin.
        plan: String,
    },

    /// List learning paths.
    List,

    /// Delete a learning path and its journal. Requires `--path`.
    Delete,
}

pub(super) fn cmd_new(storage: &Storage, goal: Option<&str>, source: &str) -> Result<(), String> {
    let text = read_plan_text(source)?;
    let plan = ingest::parse_plan(&text).map_err(|e| e.to_string())?;
    let progress = Progress::from_plan(&plan).map_err(|e| e.to_string())?;
    let chapters = progress.tree().len();
    let (tree, focus) = progress.into_parts();

    let path = LearningPath {
        id: Uuid::new_v4(),
        goal: goal.map_or_else(|| plan.title.clone(), String::from),
        context: plan.context.clone(),
        tree,
        focus,
        created_at: Timestamp::now(),
        updated_at: None,
    };

    storage
        .create_path(&path)
        .map_err(|e| format!("failed to create learning path: {e}"))?;
    storage
        .append_entry(path.id, &JournalEntry::now(JournalEvent::Created { chapters }))
        .map_err(|e| format!("failed to write journal: {e}"))?;

    println!("{}", path.id);
    Ok(())
}

pub(super) fn cmd_list(storage: &Storage) -> Result<(), String> {
    let paths = storage
        .list_paths()
        .map_err(|e| format!("failed to list learning paths: {e}"))?;

    if paths.is_empty() {
        println!("No learning paths");
        return Ok(());
    }

    for p in &paths {
        let progress = Progress::new(p.tree.clone());
        println!(
            "{}  [{}]  {}",
            p.short_id(),
            format_summary(progress.summary()),
            p.goal
        );
    }

    Ok(())
}

pub(super) fn cmd_delete(storage: &Storage, path: &LearningPath) -> Result<(), String> {
    storage
        .delete_path(path.id)
        .map_err(|e| format!("failed to delete learning path: {e}"))?;

    eprintln!("Learning path {} deleted", path.short_id());
    Ok(())
}

/// Read plan text from a file, or stdin for `-`.
fn read_plan_text(source: &str) -> Result<String, String> {
    if source == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| format!("failed to read plan from stdin: {e}"))?;
        return Ok(text);
    }

    let file = Path::new(source);
    fs::read_to_string(file).map_err(|e| format!("failed to read {}: {e}", file.display()))
}
