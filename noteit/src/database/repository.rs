//! Repository layer for database operations
//!
//! CRUD operations for notes in the local SQLite store.
//! Updates only touch the columns they are given.

use super::models::*;
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

/// Row layout of the `notes` table
#[derive(Debug, FromRow)]
struct NoteRow {
    id: String,
    title: String,
    content: String,
    category: String,
    created: DateTime<Utc>,
}

impl From<NoteRow> for NoteRecord {
    fn from(row: NoteRow) -> Self {
        let category = row.category.parse().ok();
        if category.is_none() {
            tracing::warn!("Note {} has unknown category '{}'", row.id, row.category);
        }

        NoteRecord {
            id: row.id,
            title: Some(row.title),
            content: Some(row.content),
            category,
            created: Some(row.created),
        }
    }
}

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new note
    pub async fn create_note(&self, req: CreateNoteRequest) -> Result<NoteRecord> {
        let id = Uuid::new_v4().to_string();

        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            INSERT INTO notes (id, title, content, category, created)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&req.title)
        .bind(&req.content)
        .bind(req.category.as_str())
        .bind(req.created)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created note: {}", id);
        Ok(row.into())
    }

    /// Get a note by ID
    pub async fn get_note(&self, id: &str) -> Result<NoteRecord> {
        let row = sqlx::query_as::<_, NoteRow>("SELECT * FROM notes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NoteNotFound(id.to_string()))?;

        Ok(row.into())
    }

    /// List all notes, oldest first
    pub async fn list_notes(&self) -> Result<Vec<NoteRecord>> {
        let rows = sqlx::query_as::<_, NoteRow>(
            r#"
            SELECT * FROM notes
            ORDER BY created ASC, rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(NoteRecord::from).collect())
    }

    /// Move a note to another category
    pub async fn set_category(&self, id: &str, category: Category) -> Result<()> {
        let rows = sqlx::query("UPDATE notes SET category = ? WHERE id = ?")
            .bind(category.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::NoteNotFound(id.to_string()));
        }

        tracing::debug!("Moved note {} to {}", id, category);
        Ok(())
    }

    /// Replace title and content, leaving category and creation time alone
    pub async fn update_text(&self, id: &str, title: &str, content: &str) -> Result<()> {
        let rows = sqlx::query("UPDATE notes SET title = ?, content = ? WHERE id = ?")
            .bind(title)
            .bind(content)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::NoteNotFound(id.to_string()));
        }

        tracing::debug!("Updated note text: {}", id);
        Ok(())
    }

    /// Permanently delete a note
    pub async fn delete_note(&self, id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::NoteNotFound(id.to_string()));
        }

        tracing::debug!("Deleted note: {}", id);
        Ok(())
    }
}
