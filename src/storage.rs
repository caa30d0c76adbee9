//! Local persistence for learning paths.
//!
//! Each learning path lives in its own `SQLite` file under the storage root:
//!
//! ```text
//! <root>/<uuid>.sqlite
//!   path      # one row: goal, context, serialized course tree, focus, timestamps
//!   journal   # append-only journal entries, one JSON document per row
//!   messages  # per-chapter conversation messages
//! ```

mod journal;
mod message;
mod path;

use std::{fs, io, path::PathBuf};

use rusqlite::{Connection, OpenFlags};
use uuid::Uuid;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("learning path not found: {0}")]
    PathNotFound(Uuid),

    #[error("learning path already exists: {0}")]
    PathAlreadyExists(Uuid),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("corrupt learning path: {0}")]
    Corrupt(String),
}

pub type Result<T> = core::result::Result<T, StorageError>;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS path (
        id          TEXT PRIMARY KEY,
        goal        TEXT NOT NULL,
        context     TEXT,
        tree        TEXT NOT NULL,
        focus       TEXT,
        created_at  TEXT NOT NULL,
        updated_at  TEXT
    );
    CREATE TABLE IF NOT EXISTS journal (
        seq    INTEGER PRIMARY KEY AUTOINCREMENT,
        entry  TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS messages (
        seq      INTEGER PRIMARY KEY AUTOINCREMENT,
        node     TEXT NOT NULL,
        sender   TEXT NOT NULL,
        content  TEXT NOT NULL,
        sent_at  TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS messages_node ON messages (node, seq);
";

/// File-based storage for learning paths, their journals, and chapter conversations.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Creates a new storage instance rooted at the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn db_path(&self, id: Uuid) -> PathBuf {
        self.root.join(format!("{id}.sqlite"))
    }

    /// Creates a fresh database file for a new learning path.
    fn create_db(&self, id: Uuid) -> Result<Connection> {
        let path = self.db_path(id);
        if path.exists() {
            return Err(StorageError::PathAlreadyExists(id));
        }
        let conn = Connection::open(&path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }

    /// Opens an existing learning path's database without creating one.
    fn open_db(&self, id: Uuid) -> Result<Connection> {
        let path = self.db_path(id);
        if !path.exists() {
            return Err(StorageError::PathNotFound(id));
        }
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }
}
