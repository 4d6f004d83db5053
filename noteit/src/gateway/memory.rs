//! In-process note source
//!
//! Keeps notes in an insertion-ordered map and answers list calls with the
//! keyed shape, the same way a document store would.

use super::NoteSource;
use crate::database::{Category, CreateNoteRequest, NotePatch, NoteRecord, RawNote, RawPayload};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct MemorySource {
    name: String,
    notes: RwLock<IndexMap<String, NoteRecord>>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            notes: RwLock::new(IndexMap::new()),
        }
    }

    /// Insert a note directly into a given category
    pub async fn create_with(&self, title: &str, content: &str, category: Category) -> NoteRecord {
        let note = NoteRecord {
            id: Uuid::new_v4().to_string(),
            title: Some(title.to_string()),
            content: Some(content.to_string()),
            category: Some(category),
            created: Some(Utc::now()),
        };

        self.notes.write().await.insert(note.id.clone(), note.clone());
        note
    }

    /// Current contents in insertion order
    pub async fn snapshot(&self) -> Vec<NoteRecord> {
        self.notes.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl NoteSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_all(&self) -> Result<RawPayload> {
        let notes = self.notes.read().await;

        // Stored without the id inside the value, like a document map
        let entries = notes
            .iter()
            .map(|(id, note)| {
                let mut raw = RawNote::from(note.clone());
                raw.id = None;
                (id.clone(), raw)
            })
            .collect();

        Ok(RawPayload::Keyed(entries))
    }

    async fn insert(&self, req: CreateNoteRequest) -> Result<NoteRecord> {
        let note = NoteRecord {
            id: Uuid::new_v4().to_string(),
            title: Some(req.title),
            content: Some(req.content),
            category: Some(req.category),
            created: Some(req.created),
        };

        self.notes.write().await.insert(note.id.clone(), note.clone());
        tracing::debug!("Stored note {} in memory source '{}'", note.id, self.name);

        Ok(note)
    }

    async fn patch(&self, id: &str, patch: NotePatch) -> Result<()> {
        let mut notes = self.notes.write().await;
        let note = notes
            .get_mut(id)
            .ok_or_else(|| AppError::NoteNotFound(id.to_string()))?;

        match patch {
            NotePatch::Category { category } => note.category = Some(category),
            NotePatch::Text { title, content } => {
                note.title = Some(title);
                note.content = Some(content);
            }
        }

        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.notes
            .write()
            .await
            .shift_remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::NoteNotFound(id.to_string()))
    }
}
