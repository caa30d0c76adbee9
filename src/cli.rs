//! CLI interface for Sapling.
//!
//! Each subcommand is non-interactive: arguments in, text or JSON out.
//! Notices and summaries go to stderr so stdout stays machine-readable.
//!
//! Commands split into two groups:
//!
//! - `sapling path new|list|delete`: lifecycle management.
//! - `sapling --path <id> <command>`: everything else, operating within a path.
//!
//! The `--path` flag takes a full UUID or unambiguous prefix.

mod course;
mod format;
mod path;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::config::Config;
use crate::model::LearningPath;
use crate::storage::Storage;

use path::PathCommand;

/// Sapling: grow through a course one chapter at a time.
#[derive(Debug, Parser)]
#[command(name = "sapling", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Learning path ID: full UUID or unambiguous prefix (e.g. `a3b`).
    #[arg(long, global = true)]
    path: Option<String>,

    /// Sapling home directory. Defaults to `SAPLING_HOME`, then `~/.sapling`.
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r"Workflow: following a course
  1. sapling path new --goal 'Learn Rust' plan.json
     → prints a path ID (e.g. a3b0fc12)
  2. sapling --path a3b show
  3. sapling --path a3b select c1
  4. sapling --path a3b note c1 'Why does a move invalidate the source?'
  5. sapling --path a3b complete c1
  6. sapling --path a3b layout --width 1280 --height 720 --out graph.json";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage learning paths: create, list, delete.
    Path {
        #[command(subcommand)]
        command: PathCommand,
    },

    /// Print the course tree with statuses and progress.
    Show,

    /// Open a chapter and make it the focus.
    ///
    /// Fails with a notice if the chapter is locked.
    Select {
        /// Chapter id.
        node: String,
    },

    /// Mark a chapter completed and unlock what depends on it.
    Complete {
        /// Chapter id.
        node: String,
    },

    /// Add to or read a chapter's conversation.
    ///
    /// With text, appends it as a learner message and opens the chapter.
    /// Fails with a notice if the chapter is locked. Without text, prints
    /// the conversation.
    Note {
        /// Chapter id.
        node: String,

        /// Message text.
        text: Option<String>,
    },

    /// Project the course onto a positioned graph and print it as JSON.
    ///
    /// With both `--width` and `--height`, a fit-to-viewport transform is
    /// included.
    Layout {
        #[arg(long, requires = "height")]
        width: Option<f64>,

        #[arg(long, requires = "width")]
        height: Option<f64>,

        /// Write the JSON to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the course tree as JSON.
    Export {
        /// Write the JSON to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the path's event history.
    Journal,
}

impl Cli {
    /// The `--home` override, if given.
    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }
}

/// Run the CLI, returning an error message on failure.
pub fn run(cli: Cli, config: &Config, storage: &Storage) -> Result<(), String> {
    match cli.command {
        Command::Path { command } => match command {
            PathCommand::New { goal, plan } => path::cmd_new(storage, goal.as_deref(), &plan),
            PathCommand::List => path::cmd_list(storage),
            PathCommand::Delete => {
                let path = require_path(storage, cli.path.as_deref())?;
                path::cmd_delete(storage, &path)
            }
        },
        Command::Show => {
            let path = require_path(storage, cli.path.as_deref())?;
            course::cmd_show(&path)
        }
        Command::Select { node } => {
            let path = require_path(storage, cli.path.as_deref())?;
            course::cmd_select(config, storage, path, &node)
        }
        Command::Complete { node } => {
            let path = require_path(storage, cli.path.as_deref())?;
            course::cmd_complete(config, storage, path, &node)
        }
        Command::Note { node, text } => {
            let path = require_path(storage, cli.path.as_deref())?;
            match text {
                Some(text) => course::cmd_note(config, storage, path, &node, &text),
                None => course::cmd_notes(storage, &path, &node),
            }
        }
        Command::Layout { width, height, out } => {
            let path = require_path(storage, cli.path.as_deref())?;
            let viewport = width.zip(height);
            course::cmd_layout(config, &path, viewport, out.as_deref())
        }
        Command::Export { out } => {
            let path = require_path(storage, cli.path.as_deref())?;
            course::cmd_export(&path, out.as_deref())
        }
        Command::Journal => {
            let path = require_path(storage, cli.path.as_deref())?;
            course::cmd_journal(storage, &path)
        }
    }
}

/// Require that `--path` was provided and resolve it.
fn require_path(storage: &Storage, path_ref: Option<&str>) -> Result<LearningPath, String> {
    let path_ref = path_ref.ok_or("this command requires --path <id>")?;
    resolve_path(storage, path_ref)
}

/// Resolve a path reference (full UUID or unambiguous prefix) to a learning path.
fn resolve_path(storage: &Storage, reference: &str) -> Result<LearningPath, String> {
    // Try full UUID first.
    if let Ok(id) = reference.parse::<Uuid>() {
        return storage
            .load_path(id)
            .map_err(|e| format!("learning path not found: {e}"));
    }

    let paths = storage
        .list_paths()
        .map_err(|e| format!("failed to list learning paths: {e}"))?;

    let matches: Vec<&LearningPath> = paths
        .iter()
        .filter(|p| p.id.to_string().starts_with(reference))
        .collect();

    match matches.len() {
        0 => Err(format!("no learning path matching '{reference}'")),
        1 => Ok(matches[0].clone()),
        n => {
            let ids: Vec<String> = matches.iter().map(|p| p.short_id()).collect();
            Err(format!(
                "'{reference}' is ambiguous: matches {n} learning paths: {}",
                ids.join(", ")
            ))
        }
    }
}

/// Write JSON to `out` (with a note on stderr) or to stdout.
fn emit_json(json: &str, out: Option<&Path>, what: &str) -> Result<(), String> {
    match out {
        Some(file) => {
            fs::write(file, json).map_err(|e| format!("failed to write {}: {e}", file.display()))?;
            eprintln!("Wrote {what} → {}", file.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;
    use tempfile::TempDir;

    use crate::model::{CourseTree, Plan, PlanChapter};

    fn test_storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("paths")).unwrap();
        (dir, storage)
    }

    fn stored_path(storage: &Storage, id: &str) -> LearningPath {
        let plan = Plan {
            title: "Learn Rust".into(),
            chapters: vec![PlanChapter::new("c1", "Basics", &[])],
            ..Plan::default()
        };
        let path = LearningPath {
            id: id.parse().unwrap(),
            goal: "Learn Rust".into(),
            context: None,
            tree: CourseTree::from_plan(&plan).unwrap(),
            focus: None,
            created_at: Timestamp::now(),
            updated_at: None,
        };
        storage.create_path(&path).unwrap();
        path
    }

    #[test]
    fn resolves_full_id_and_prefix() {
        let (_dir, storage) = test_storage();
        let path = stored_path(&storage, "a3b0fc12-0000-4000-8000-000000000001");

        assert_eq!(resolve_path(&storage, &path.id.to_string()).unwrap().id, path.id);
        assert_eq!(resolve_path(&storage, "a3b").unwrap().id, path.id);
    }

    #[test]
    fn ambiguous_prefix_is_an_error() {
        let (_dir, storage) = test_storage();
        stored_path(&storage, "a3b0fc12-0000-4000-8000-000000000001");
        stored_path(&storage, "a3b1dd34-0000-4000-8000-000000000002");

        let err = resolve_path(&storage, "a3b").unwrap_err();
        assert!(err.contains("ambiguous"));
        assert!(resolve_path(&storage, "a3b0").is_ok());
    }

    #[test]
    fn unknown_prefix_is_an_error() {
        let (_dir, storage) = test_storage();
        let err = resolve_path(&storage, "fff").unwrap_err();
        assert_eq!(err, "no learning path matching 'fff'");
    }

    #[test]
    fn missing_path_flag_is_an_error() {
        let (_dir, storage) = test_storage();
        let err = require_path(&storage, None).unwrap_err();
        assert_eq!(err, "this command requires --path <id>");
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["sapling", "select", "c1", "--path", "a3b", "--home", "/tmp/s"])
            .unwrap();
        assert_eq!(cli.path.as_deref(), Some("a3b"));
        assert_eq!(cli.home(), Some(Path::new("/tmp/s")));
        assert!(matches!(cli.command, Command::Select { ref node } if node == "c1"));
    }

    #[test]
    fn note_text_is_optional() {
        let cli = Cli::try_parse_from(["sapling", "note", "c1", "Moves are cheap"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Note { ref node, text: Some(ref t) } if node == "c1" && t == "Moves are cheap"
        ));

        let cli = Cli::try_parse_from(["sapling", "note", "c1"]).unwrap();
        assert!(matches!(cli.command, Command::Note { text: None, .. }));
    }

    #[test]
    fn layout_viewport_needs_both_dimensions() {
        assert!(Cli::try_parse_from(["sapling", "layout", "--width", "800"]).is_err());
        assert!(
            Cli::try_parse_from(["sapling", "layout", "--width", "800", "--height", "600"]).is_ok()
        );
    }
}
