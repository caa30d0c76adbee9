//! Journal storage: append and load journal entries.

use uuid::Uuid;

use crate::model::JournalEntry;

use super::{Result, Storage};

impl Storage {
    /// Appends an entry to a learning path's journal.
    pub fn append_entry(&self, path_id: Uuid, entry: &JournalEntry) -> Result<()> {
        let conn = self.open_db(path_id)?;
        conn.execute(
            "INSERT INTO journal (entry) VALUES (?1)",
            [serde_json::to_string(entry)?],
        )?;
        Ok(())
    }

    /// Loads a learning path's journal in append order.
    pub fn load_journal(&self, path_id: Uuid) -> Result<Vec<JournalEntry>> {
        let conn = self.open_db(path_id)?;
        let mut stmt = conn.prepare("SELECT entry FROM journal ORDER BY seq")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(serde_json::from_str(&row?)?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;
    use tempfile::TempDir;

    use crate::model::{CourseTree, JournalEvent, LearningPath, Plan, PlanChapter};
    use crate::storage::StorageError;

    fn test_storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("paths")).unwrap();
        (dir, storage)
    }

    fn sample_path() -> LearningPath {
        let plan = Plan {
            title: "Learn Rust".into(),
            chapters: vec![PlanChapter::new("c1", "Basics", &[])],
            ..Plan::default()
        };
        LearningPath {
            id: Uuid::new_v4(),
            goal: "Learn Rust".into(),
            context: None,
            tree: CourseTree::from_plan(&plan).unwrap(),
            focus: None,
            created_at: Timestamp::now(),
            updated_at: None,
        }
    }

    #[test]
    fn append_and_load_journal_entries() {
        let (_dir, storage) = test_storage();
        let path = sample_path();
        storage.create_path(&path).unwrap();

        storage
            .append_entry(path.id, &JournalEntry::now(JournalEvent::Created { chapters: 1 }))
            .unwrap();
        storage
            .append_entry(
                path.id,
                &JournalEntry::now(JournalEvent::Completed {
                    node: "c1".into(),
                    unlocked: vec![],
                }),
            )
            .unwrap();

        let entries = storage.load_journal(path.id).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0].event, JournalEvent::Created { chapters: 1 }));
        assert!(matches!(entries[1].event, JournalEvent::Completed { .. }));
    }

    #[test]
    fn load_journal_empty() {
        let (_dir, storage) = test_storage();
        let path = sample_path();
        storage.create_path(&path).unwrap();

        assert!(storage.load_journal(path.id).unwrap().is_empty());
    }

    #[test]
    fn journal_of_nonexistent_path_fails() {
        let (_dir, storage) = test_storage();
        let entry = JournalEntry::now(JournalEvent::Selected { node: "c1".into() });

        assert!(matches!(
            storage.append_entry(Uuid::new_v4(), &entry).unwrap_err(),
            StorageError::PathNotFound(_)
        ));
        assert!(matches!(
            storage.load_journal(Uuid::new_v4()).unwrap_err(),
            StorageError::PathNotFound(_)
        ));
    }
}
