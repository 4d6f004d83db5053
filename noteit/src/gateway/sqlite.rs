//! SQLite note source
//!
//! Adapts the local database repository to the gateway contract.

use super::NoteSource;
use crate::database::{CreateNoteRequest, NotePatch, NoteRecord, RawPayload, Repository};
use crate::error::Result;
use async_trait::async_trait;

pub struct SqliteSource {
    name: String,
    repo: Repository,
}

impl SqliteSource {
    pub fn new(name: impl Into<String>, repo: Repository) -> Self {
        Self {
            name: name.into(),
            repo,
        }
    }
}

#[async_trait]
impl NoteSource for SqliteSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_all(&self) -> Result<RawPayload> {
        let notes = self.repo.list_notes().await?;
        Ok(RawPayload::from(notes))
    }

    async fn insert(&self, req: CreateNoteRequest) -> Result<NoteRecord> {
        self.repo.create_note(req).await
    }

    async fn patch(&self, id: &str, patch: NotePatch) -> Result<()> {
        match patch {
            NotePatch::Category { category } => self.repo.set_category(id, category).await,
            NotePatch::Text { title, content } => {
                self.repo.update_text(id, &title, &content).await
            }
        }
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.repo.delete_note(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_pool, Category};
    use chrono::Utc;
    use tempfile::TempDir;

    async fn create_test_source() -> (SqliteSource, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = create_pool(&temp_dir.path().join("notes.db")).await.unwrap();

        (SqliteSource::new("local", Repository::new(pool)), temp_dir)
    }

    #[tokio::test]
    async fn test_content_round_trips_exactly() {
        let (source, _temp) = create_test_source().await;
        let content = "first line\nsecond <b>line</b>\r\n\ttabbed \"quoted\" 'single' & done";

        source
            .insert(CreateNoteRequest {
                title: "Escapes".to_string(),
                content: content.to_string(),
                category: Category::Active,
                created: Utc::now(),
            })
            .await
            .unwrap();

        let RawPayload::List(items) = source.fetch_all().await.unwrap() else {
            panic!("expected list payload");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content.as_deref(), Some(content));
        assert!(items[0].id.is_some());
    }

    #[tokio::test]
    async fn test_patch_dispatches_by_kind() {
        let (source, _temp) = create_test_source().await;
        let note = source
            .insert(CreateNoteRequest {
                title: "T".to_string(),
                content: "C".to_string(),
                category: Category::Active,
                created: Utc::now(),
            })
            .await
            .unwrap();

        source
            .patch(&note.id, NotePatch::Category { category: Category::Trash })
            .await
            .unwrap();

        let RawPayload::List(items) = source.fetch_all().await.unwrap() else {
            panic!("expected list payload");
        };
        assert_eq!(items[0].category, Some(Category::Trash));
        assert_eq!(items[0].title.as_deref(), Some("T"));
    }
}
