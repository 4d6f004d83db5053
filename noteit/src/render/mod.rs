//! Render pipeline
//!
//! Projects filtered notes into view-models and defines the sink that
//! presents them. Rendering is a pure function of its input; the sink owns
//! all presentation.

pub mod console;
pub mod format;

pub use console::ConsoleSink;

use crate::database::{Category, NoteRecord};
use serde::Serialize;

/// Per-note action offered by the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoteAction {
    Edit,
    Archive,
    Trash,
    Restore,
    Delete,
}

impl NoteAction {
    pub fn label(&self) -> &'static str {
        match self {
            NoteAction::Edit => "Edit note",
            NoteAction::Archive => "Archive note",
            NoteAction::Trash => "Move note to trash",
            NoteAction::Restore => "Restore note",
            NoteAction::Delete => "Permanently delete note",
        }
    }
}

/// Actions available for a note in the given category
pub fn actions_for(category: Category) -> &'static [NoteAction] {
    match category {
        Category::Active => &[NoteAction::Edit, NoteAction::Archive, NoteAction::Trash],
        Category::Archive => &[NoteAction::Edit, NoteAction::Restore, NoteAction::Trash],
        Category::Trash => &[NoteAction::Restore, NoteAction::Delete],
    }
}

/// One note ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteView {
    pub id: String,
    pub title_html: String,
    pub content_html: String,
    pub created_label: String,
    pub actions: Vec<NoteAction>,
}

/// Prefilled values for the edit form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditForm {
    pub id: String,
    pub title_html: String,
    pub content_html: String,
    pub created_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyReason {
    /// The category has no notes
    NoNotes,
    /// No source could be read
    Unavailable,
}

impl EmptyReason {
    pub fn message(&self) -> &'static str {
        match self {
            EmptyReason::NoNotes => "No Notes in Category",
            EmptyReason::Unavailable => "Error loading notes.",
        }
    }
}

/// Everything the sink needs to draw the note list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RenderFrame {
    Notes {
        category: Category,
        notes: Vec<NoteView>,
    },
    Empty {
        category: Category,
        reason: EmptyReason,
    },
}

impl RenderFrame {
    pub fn category(&self) -> Category {
        match self {
            RenderFrame::Notes { category, .. } | RenderFrame::Empty { category, .. } => *category,
        }
    }

    pub fn notes(&self) -> &[NoteView] {
        match self {
            RenderFrame::Notes { notes, .. } => notes,
            RenderFrame::Empty { .. } => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RenderFrame::Empty { .. })
    }
}

/// Receiver of everything the orchestrator wants shown
pub trait RenderSink: Send + Sync {
    /// Replace the note list
    fn render(&self, frame: RenderFrame);

    /// Show or hide the loading indicator
    fn set_busy(&self, busy: bool);

    /// Show or hide the create-form validation message; while shown,
    /// submission is disabled
    fn set_validation_error(&self, visible: bool);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderPipeline;

impl RenderPipeline {
    pub fn new() -> Self {
        Self
    }

    /// Frame for the already filtered notes of `category`
    pub fn render(&self, category: Category, records: &[NoteRecord]) -> RenderFrame {
        if records.is_empty() {
            return RenderFrame::Empty {
                category,
                reason: EmptyReason::NoNotes,
            };
        }

        RenderFrame::Notes {
            category,
            notes: records.iter().map(|record| self.note_view(record)).collect(),
        }
    }

    /// Frame shown when no source could be read
    pub fn unavailable(&self, category: Category) -> RenderFrame {
        RenderFrame::Empty {
            category,
            reason: EmptyReason::Unavailable,
        }
    }

    pub fn note_view(&self, record: &NoteRecord) -> NoteView {
        NoteView {
            id: record.id.clone(),
            title_html: format::escape_html(record.title_or_empty()),
            content_html: format::content_to_html(record.content_or_empty()),
            created_label: format::format_created(record.created),
            actions: record
                .category
                .map(|c| actions_for(c).to_vec())
                .unwrap_or_default(),
        }
    }

    pub fn edit_form(&self, record: &NoteRecord) -> EditForm {
        EditForm {
            id: record.id.clone(),
            title_html: format::escape_html(record.title_or_empty()),
            content_html: format::escape_html(record.content_or_empty()),
            created_label: format::format_created(record.created),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn note(id: &str, category: Category) -> NoteRecord {
        NoteRecord {
            id: id.to_string(),
            title: Some("<b>Title</b>".to_string()),
            content: Some("line 1\nline 2".to_string()),
            category: Some(category),
            created: Some(Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_empty_input_renders_marker() {
        let frame = RenderPipeline::new().render(Category::Archive, &[]);

        assert_eq!(
            frame,
            RenderFrame::Empty {
                category: Category::Archive,
                reason: EmptyReason::NoNotes
            }
        );
    }

    #[test]
    fn test_note_view_escapes_and_formats() {
        let view = RenderPipeline::new().note_view(&note("n1", Category::Active));

        assert_eq!(view.title_html, "&lt;b&gt;Title&lt;/b&gt;");
        assert_eq!(view.content_html, "line 1<br>line 2");
        assert_eq!(view.created_label, "07.03.2025");
        assert_eq!(
            view.actions,
            vec![NoteAction::Edit, NoteAction::Archive, NoteAction::Trash]
        );
    }

    #[test]
    fn test_action_sets_per_category() {
        assert_eq!(
            actions_for(Category::Archive),
            &[NoteAction::Edit, NoteAction::Restore, NoteAction::Trash]
        );
        assert_eq!(
            actions_for(Category::Trash),
            &[NoteAction::Restore, NoteAction::Delete]
        );
    }

    #[test]
    fn test_render_keeps_order_and_input() {
        let records = vec![note("b", Category::Trash), note("a", Category::Trash)];
        let before = records.clone();

        let frame = RenderPipeline::new().render(Category::Trash, &records);

        let ids: Vec<&str> = frame.notes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(records, before);
    }

    #[test]
    fn test_missing_fields_render_empty() {
        let bare = NoteRecord {
            id: "bare".to_string(),
            title: None,
            content: None,
            category: Some(Category::Active),
            created: None,
        };

        let view = RenderPipeline::new().note_view(&bare);
        assert_eq!(view.title_html, "");
        assert_eq!(view.content_html, "");
        assert_eq!(view.created_label, "");
    }

    #[test]
    fn test_edit_form_keeps_raw_line_breaks() {
        let form = RenderPipeline::new().edit_form(&note("n1", Category::Active));

        assert_eq!(form.content_html, "line 1\nline 2");
    }
}
