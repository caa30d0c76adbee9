//! Conversation storage: append and load per-chapter messages.

use jiff::Timestamp;
use uuid::Uuid;

use crate::model::{Message, Sender};

use super::{Result, Storage, StorageError};

impl Storage {
    /// Appends a message to a chapter's conversation.
    pub fn append_message(&self, path_id: Uuid, message: &Message) -> Result<()> {
        let conn = self.open_db(path_id)?;
        conn.execute(
            "INSERT INTO messages (node, sender, content, sent_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                &message.node,
                message.sender.as_str(),
                &message.content,
                message.sent_at.to_string(),
            ],
        )?;
        Ok(())
    }

    /// Loads one chapter's conversation in append order.
    pub fn load_messages(&self, path_id: Uuid, node: &str) -> Result<Vec<Message>> {
        let conn = self.open_db(path_id)?;
        let mut stmt = conn.prepare(
            "SELECT node, sender, content, sent_at FROM messages WHERE node = ?1 ORDER BY seq",
        )?;
        let rows = stmt.query_map([node], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut messages = Vec::new();
        for row in rows {
            let (node, sender_str, content, sent_at_str) = row?;
            let sender = Sender::parse(&sender_str)
                .ok_or_else(|| StorageError::Corrupt(format!("invalid sender: {sender_str}")))?;
            let sent_at = sent_at_str
                .parse::<Timestamp>()
                .map_err(|e| StorageError::Corrupt(format!("invalid sent_at: {e}")))?;
            messages.push(Message {
                node,
                sender,
                content,
                sent_at,
            });
        }
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    use crate::model::{CourseTree, LearningPath, Plan, PlanChapter};

    fn test_storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("paths")).unwrap();
        (dir, storage)
    }

    fn sample_path() -> LearningPath {
        let plan = Plan {
            title: "Learn Rust".into(),
            chapters: vec![
                PlanChapter::new("c1", "Basics", &[]),
                PlanChapter::new("c2", "Ownership", &["c1"]),
            ],
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
    fn messages_are_kept_per_chapter_in_order() {
        let (_dir, storage) = test_storage();
        let path = sample_path();
        storage.create_path(&path).unwrap();

        storage
            .append_message(path.id, &Message::now("c1", Sender::User, "What is a move?"))
            .unwrap();
        storage
            .append_message(path.id, &Message::now("c2", Sender::User, "Borrowing?"))
            .unwrap();
        storage
            .append_message(path.id, &Message::now("c1", Sender::Ai, "Ownership transfer."))
            .unwrap();

        let c1 = storage.load_messages(path.id, "c1").unwrap();
        let contents: Vec<&str> = c1.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["What is a move?", "Ownership transfer."]);
        assert_eq!(c1[1].sender, Sender::Ai);

        assert_eq!(storage.load_messages(path.id, "c2").unwrap().len(), 1);
    }

    #[test]
    fn empty_conversation_loads_empty() {
        let (_dir, storage) = test_storage();
        let path = sample_path();
        storage.create_path(&path).unwrap();

        assert!(storage.load_messages(path.id, "c1").unwrap().is_empty());
    }

    #[test]
    fn messages_of_nonexistent_path_fail() {
        let (_dir, storage) = test_storage();
        let message = Message::now("c1", Sender::User, "hi");

        assert!(matches!(
            storage.append_message(Uuid::new_v4(), &message).unwrap_err(),
            StorageError::PathNotFound(_)
        ));
        assert!(matches!(
            storage.load_messages(Uuid::new_v4(), "c1").unwrap_err(),
            StorageError::PathNotFound(_)
        ));
    }
}
