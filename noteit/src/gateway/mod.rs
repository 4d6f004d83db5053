//! Persistence gateway
//!
//! Uniform CRUD over one or more note sources. Reads walk the configured
//! sources in priority order and stop at the first one that answers;
//! writes go to a single write source with no fallback.

pub mod memory;
pub mod rest;
pub mod sqlite;

pub use memory::MemorySource;
pub use rest::{RestFlavor, RestSource};
pub use sqlite::SqliteSource;

use crate::database::{Category, CreateNoteRequest, NotePatch, NoteRecord, RawPayload};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

/// A concrete backend the gateway can read from or write to
#[async_trait]
pub trait NoteSource: Send + Sync {
    /// Name used in logs and in the settings file
    fn name(&self) -> &str;

    /// Fetch every stored note in whatever shape the backend uses
    async fn fetch_all(&self) -> Result<RawPayload>;

    /// Store a new note; the backend assigns the id
    async fn insert(&self, req: CreateNoteRequest) -> Result<NoteRecord>;

    /// Apply a partial update
    async fn patch(&self, id: &str, patch: NotePatch) -> Result<()>;

    /// Remove a note permanently. Missing ids should yield `NoteNotFound`.
    async fn remove(&self, id: &str) -> Result<()>;
}

/// Fallback-aware facade over the configured note sources
#[derive(Clone)]
pub struct PersistenceGateway {
    readers: Vec<Arc<dyn NoteSource>>,
    writer: Arc<dyn NoteSource>,
}

impl PersistenceGateway {
    /// `readers` are tried in the given order; `writer` receives every mutation
    pub fn new(readers: Vec<Arc<dyn NoteSource>>, writer: Arc<dyn NoteSource>) -> Self {
        Self { readers, writer }
    }

    /// Gateway over a single source used for both reads and writes
    pub fn single(source: Arc<dyn NoteSource>) -> Self {
        Self::new(vec![source.clone()], source)
    }

    pub fn reader_names(&self) -> Vec<&str> {
        self.readers.iter().map(|s| s.name()).collect()
    }

    pub fn writer_name(&self) -> &str {
        self.writer.name()
    }

    /// Read all notes from the first source that responds
    pub async fn list(&self) -> Result<RawPayload> {
        for source in &self.readers {
            match source.fetch_all().await {
                Ok(payload) => {
                    tracing::debug!(
                        "Fetched {} notes from source '{}'",
                        payload.len(),
                        source.name()
                    );
                    return Ok(payload);
                }
                Err(e) => {
                    tracing::warn!("Source '{}' failed, trying next: {}", source.name(), e);
                }
            }
        }

        tracing::warn!("All {} note sources failed", self.readers.len());
        Err(AppError::Unavailable {
            attempted: self.readers.len(),
        })
    }

    /// Create a note in the active category
    pub async fn create(&self, title: String, content: String) -> Result<NoteRecord> {
        let req = CreateNoteRequest {
            title,
            content,
            category: Category::Active,
            created: Utc::now(),
        };

        let note = self
            .writer
            .insert(req)
            .await
            .map_err(|e| AppError::write_failed("create note", e))?;

        tracing::info!("Note created in '{}': {}", self.writer.name(), note.id);
        Ok(note)
    }

    /// Move a note to another category without touching its text
    pub async fn set_category(&self, id: &str, category: Category) -> Result<()> {
        self.writer
            .patch(id, NotePatch::Category { category })
            .await
            .map_err(|e| AppError::write_failed("change category", e))?;

        tracing::info!("Note {} moved to {}", id, category);
        Ok(())
    }

    /// Replace a note's title and content without touching its category
    pub async fn update(&self, id: &str, title: String, content: String) -> Result<()> {
        self.writer
            .patch(id, NotePatch::Text { title, content })
            .await
            .map_err(|e| AppError::write_failed("update note", e))?;

        tracing::info!("Note {} updated", id);
        Ok(())
    }

    /// Permanently delete a note. Deleting an unknown id succeeds.
    pub async fn delete(&self, id: &str) -> Result<()> {
        match self.writer.remove(id).await {
            Ok(()) => {
                tracing::info!("Note {} deleted", id);
                Ok(())
            }
            Err(AppError::NoteNotFound(_)) => {
                tracing::debug!("Note {} already absent", id);
                Ok(())
            }
            Err(e) => Err(AppError::write_failed("delete note", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Source that fails every call
    struct DownSource;

    #[async_trait]
    impl NoteSource for DownSource {
        fn name(&self) -> &str {
            "down"
        }

        async fn fetch_all(&self) -> Result<RawPayload> {
            Err(AppError::Generic("connection refused".to_string()))
        }

        async fn insert(&self, _req: CreateNoteRequest) -> Result<NoteRecord> {
            Err(AppError::Generic("connection refused".to_string()))
        }

        async fn patch(&self, _id: &str, _patch: NotePatch) -> Result<()> {
            Err(AppError::Generic("connection refused".to_string()))
        }

        async fn remove(&self, _id: &str) -> Result<()> {
            Err(AppError::Generic("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_list_falls_back_to_next_source() {
        let backup = Arc::new(MemorySource::new("backup"));
        backup.create_with("hi", "x", Category::Active).await;

        let readers: Vec<Arc<dyn NoteSource>> = vec![Arc::new(DownSource), backup.clone()];
        let gateway = PersistenceGateway::new(readers, backup.clone());

        let payload = gateway.list().await.unwrap();
        assert_eq!(payload.len(), 1);
    }

    #[tokio::test]
    async fn test_list_reports_exhaustion() {
        let readers: Vec<Arc<dyn NoteSource>> = vec![Arc::new(DownSource), Arc::new(DownSource)];
        let gateway = PersistenceGateway::new(readers, Arc::new(DownSource));

        let result = gateway.list().await;
        assert!(matches!(result, Err(AppError::Unavailable { attempted: 2 })));
    }

    #[tokio::test]
    async fn test_list_without_readers_is_unavailable() {
        let gateway = PersistenceGateway::new(Vec::new(), Arc::new(DownSource));

        let result = gateway.list().await;
        assert!(matches!(result, Err(AppError::Unavailable { attempted: 0 })));
    }

    #[tokio::test]
    async fn test_create_forces_active_category() {
        let source = Arc::new(MemorySource::new("mem"));
        let gateway = PersistenceGateway::single(source.clone());

        let note = gateway
            .create("Title".to_string(), "Body".to_string())
            .await
            .unwrap();

        assert_eq!(note.category, Some(Category::Active));
        assert!(note.created.is_some());
        assert!(!note.id.is_empty());
    }

    #[tokio::test]
    async fn test_writes_do_not_fall_back() {
        let healthy = Arc::new(MemorySource::new("healthy"));
        let readers: Vec<Arc<dyn NoteSource>> = vec![healthy.clone()];
        let gateway = PersistenceGateway::new(readers, Arc::new(DownSource));

        let result = gateway.create("T".to_string(), "C".to_string()).await;

        assert!(matches!(result, Err(AppError::WriteFailed { .. })));
        assert!(healthy.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_note_is_success() {
        let gateway = PersistenceGateway::single(Arc::new(MemorySource::new("mem")));

        gateway.delete("never-existed").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_failure_is_write_failed() {
        let gateway = PersistenceGateway::single(Arc::new(DownSource));

        let result = gateway.delete("id").await;
        assert!(matches!(result, Err(AppError::WriteFailed { op: "delete note", .. })));
    }
}
