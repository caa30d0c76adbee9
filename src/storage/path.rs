//! Learning path storage: create, load, update, list, and delete paths.

use std::{fs, io};

use jiff::Timestamp;
use rusqlite::Connection;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::model::{CourseTree, LearningPath};

use super::{Result, Storage, StorageError};

impl Storage {
    /// Creates a new learning path in its own `SQLite` file.
    pub fn create_path(&self, path: &LearningPath) -> Result<()> {
        let conn = self.create_db(path.id)?;
        conn.execute(
            "INSERT INTO path (id, goal, context, tree, focus, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                path.id.to_string(),
                &path.goal,
                path.context,
                serde_json::to_string(&path.tree)?,
                path.focus,
                path.created_at.to_string(),
                path.updated_at.map(|t| t.to_string()),
            ],
        )?;
        debug!(path = %path.id, "learning path created");
        Ok(())
    }

    /// Writes a learning path's tree, focus, and update time.
    pub fn update_path(&self, path: &LearningPath) -> Result<()> {
        let conn = self.open_db(path.id)?;
        let rows = conn.execute(
            "UPDATE path
             SET goal = ?1, context = ?2, tree = ?3, focus = ?4, updated_at = ?5
             WHERE id = ?6",
            rusqlite::params![
                &path.goal,
                path.context,
                serde_json::to_string(&path.tree)?,
                path.focus,
                path.updated_at.map(|t| t.to_string()),
                path.id.to_string(),
            ],
        )?;
        if rows == 0 {
            return Err(StorageError::PathNotFound(path.id));
        }
        debug!(path = %path.id, "learning path updated");
        Ok(())
    }

    /// Loads a single learning path.
    pub fn load_path(&self, id: Uuid) -> Result<LearningPath> {
        let conn = self.open_db(id)?;
        load_path_row(&conn)
    }

    /// Lists all learning paths, oldest first.
    ///
    /// Unreadable or malformed files are skipped.
    pub fn list_paths(&self) -> Result<Vec<LearningPath>> {
        let mut paths = Vec::new();
        let entries = match fs::read_dir(&self.root) {
            Ok(e) => e,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(paths),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let file = entry?.path();
            if file.extension().and_then(|e| e.to_str()) != Some("sqlite") {
                continue;
            }
            let Ok(conn) = Connection::open(&file) else {
                continue;
            };
            match load_path_row(&conn) {
                Ok(p) => paths.push(p),
                Err(e) => warn!(file = %file.display(), error = %e, "skipping unreadable path"),
            }
        }
        paths.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(paths)
    }

    /// Deletes a learning path and its journal.
    pub fn delete_path(&self, id: Uuid) -> Result<()> {
        let file = self.db_path(id);
        if !file.exists() {
            return Err(StorageError::PathNotFound(id));
        }
        fs::remove_file(file)?;
        debug!(path = %id, "learning path deleted");
        Ok(())
    }
}

/// Reads the single path row from an open connection.
fn load_path_row(conn: &Connection) -> Result<LearningPath> {
    let (id_str, goal, context, tree_json, focus, created_at_str, updated_at_opt) = conn
        .query_row(
            "SELECT id, goal, context, tree, focus, created_at, updated_at FROM path LIMIT 1",
            [],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, Option<String>>(6)?,
                ))
            },
        )?;

    let id = id_str
        .parse::<Uuid>()
        .map_err(|e| StorageError::Corrupt(format!("invalid path id: {e}")))?;
    let created_at = created_at_str
        .parse::<Timestamp>()
        .map_err(|e| StorageError::Corrupt(format!("invalid created_at: {e}")))?;
    let updated_at = updated_at_opt
        .map(|s| s.parse::<Timestamp>())
        .transpose()
        .map_err(|e| StorageError::Corrupt(format!("invalid updated_at: {e}")))?;

    // Deserializing validates the tree's structure.
    let tree: CourseTree = serde_json::from_str(&tree_json)
        .map_err(|e| StorageError::Corrupt(format!("invalid course tree: {e}")))?;

    Ok(LearningPath {
        id,
        goal,
        context,
        tree,
        focus,
        created_at,
        updated_at,
    })
}
