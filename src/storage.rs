use crate::error::{ApiError, Result};
use crate::types::{ChatMessage, Note, Psychologist};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

/// Storage trait for the document collections behind the API.
///
/// `create_*` methods assign the document id and, where the record carries
/// one, the server timestamp, writing both back into the passed record.
#[async_trait]
pub trait Storage: Send + Sync {
    // Note operations
    async fn create_note(&self, note: &mut Note) -> Result<()>;
    /// Notes whose `email` equals `owner`, in no particular order
    async fn list_notes_by_owner(&self, owner: &str) -> Result<Vec<Note>>;
    async fn get_note(&self, id: &str) -> Result<Option<Note>>;
    /// Deleting a missing note is not an error
    async fn delete_note(&self, id: &str) -> Result<()>;

    // Chat operations
    async fn create_chat_message(&self, message: &mut ChatMessage) -> Result<()>;
    /// Up to `limit` messages for `user_id`, newest first
    async fn recent_chat_messages(&self, user_id: &str, limit: usize) -> Result<Vec<ChatMessage>>;
    /// Returns the number of messages removed
    async fn clear_chat_messages(&self, user_id: &str) -> Result<usize>;

    // Directory operations
    async fn list_psychologists(&self) -> Result<Vec<Psychologist>>;
    async fn create_psychologist(&self, psychologist: &mut Psychologist) -> Result<()>;
    async fn delete_psychologist(&self, id: &str) -> Result<()>;
}

/// Generate an opaque document id
pub fn new_document_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// In-memory storage implementation for development/testing
#[derive(Default)]
pub struct InMemoryStorage {
    notes: Arc<Mutex<HashMap<String, Note>>>,
    // Per-user message logs kept in insertion order
    conversations: Arc<Mutex<HashMap<String, Vec<ChatMessage>>>>,
    psychologists: Arc<Mutex<HashMap<String, Psychologist>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total messages stored for a user
    pub fn chat_message_count(&self, user_id: &str) -> usize {
        lock(&self.conversations)
            .map(|c| c.get(user_id).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    /// Total notes across all owners
    pub fn note_count(&self) -> usize {
        lock(&self.notes).map(|n| n.len()).unwrap_or(0)
    }

    pub fn psychologist_count(&self) -> usize {
        lock(&self.psychologists).map(|p| p.len()).unwrap_or(0)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| ApiError::Store("in-memory store lock poisoned".to_string()))
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn create_note(&self, note: &mut Note) -> Result<()> {
        let id = new_document_id();
        note.id = Some(id.clone());
        note.timestamp = Some(Utc::now());

        lock(&self.notes)?.insert(id.clone(), note.clone());

        debug!("Created note '{}' with id {}", note.title, id);
        Ok(())
    }

    async fn list_notes_by_owner(&self, owner: &str) -> Result<Vec<Note>> {
        let notes = lock(&self.notes)?;
        Ok(notes.values().filter(|n| n.email == owner).cloned().collect())
    }

    async fn get_note(&self, id: &str) -> Result<Option<Note>> {
        Ok(lock(&self.notes)?.get(id).cloned())
    }

    async fn delete_note(&self, id: &str) -> Result<()> {
        if lock(&self.notes)?.remove(id).is_some() {
            debug!("Deleted note {}", id);
        }
        Ok(())
    }

    async fn create_chat_message(&self, message: &mut ChatMessage) -> Result<()> {
        message.timestamp = Some(Utc::now());

        lock(&self.conversations)?
            .entry(message.user_id.clone())
            .or_default()
            .push(message.clone());

        debug!("Stored chat message for {}", message.user_id);
        Ok(())
    }

    async fn recent_chat_messages(&self, user_id: &str, limit: usize) -> Result<Vec<ChatMessage>> {
        let conversations = lock(&self.conversations)?;
        let recent = conversations
            .get(user_id)
            .map(|log| log.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default();
        Ok(recent)
    }

    async fn clear_chat_messages(&self, user_id: &str) -> Result<usize> {
        let removed = lock(&self.conversations)?
            .remove(user_id)
            .map_or(0, |log| log.len());
        debug!("Cleared {} chat messages for {}", removed, user_id);
        Ok(removed)
    }

    async fn list_psychologists(&self) -> Result<Vec<Psychologist>> {
        Ok(lock(&self.psychologists)?.values().cloned().collect())
    }

    async fn create_psychologist(&self, psychologist: &mut Psychologist) -> Result<()> {
        let id = new_document_id();
        psychologist.id = Some(id.clone());

        lock(&self.psychologists)?.insert(id.clone(), psychologist.clone());

        debug!("Created psychologist '{}' with id {}", psychologist.nombre, id);
        Ok(())
    }

    async fn delete_psychologist(&self, id: &str) -> Result<()> {
        lock(&self.psychologists)?.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_note_assigns_id_and_timestamp() {
        let store = InMemoryStorage::new();
        let before = Utc::now();
        let mut note = Note::new("a@example.com", "t", "c", "Feliz", "😊");

        store.create_note(&mut note).await.unwrap();

        assert!(note.id.is_some());
        assert!(note.timestamp.unwrap() >= before);
        let listed = store.list_notes_by_owner("a@example.com").await.unwrap();
        assert_eq!(listed, vec![note]);
        assert!(store.list_notes_by_owner("b@example.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn recent_messages_are_newest_first_and_limited() {
        let store = InMemoryStorage::new();
        for i in 0..4 {
            let mut m = ChatMessage::from_user("u1", format!("m{i}"));
            store.create_chat_message(&mut m).await.unwrap();
        }
        let mut other = ChatMessage::from_user("u2", "elsewhere");
        store.create_chat_message(&mut other).await.unwrap();

        let recent = store.recent_chat_messages("u1", 2).await.unwrap();
        let texts: Vec<_> = recent.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["m3", "m2"]);

        assert_eq!(store.clear_chat_messages("u1").await.unwrap(), 4);
        assert_eq!(store.chat_message_count("u1"), 0);
        assert_eq!(store.chat_message_count("u2"), 1);
    }

    #[tokio::test]
    async fn deleting_missing_documents_is_ok() {
        let store = InMemoryStorage::new();
        store.delete_note("nope").await.unwrap();
        store.delete_psychologist("nope").await.unwrap();
    }
}
