//! Notes orchestrator
//!
//! Sequences every user action as: show busy → write and/or read → refresh
//! the view → hide busy. The view is always rebuilt from a full read, even
//! after a failed write, so it shows what the backend actually holds.
//!
//! Actions are not serialized against each other. Two actions started
//! together interleave their gateway calls and whichever refresh finishes
//! last determines what is on screen.

use crate::app::AppState;
use crate::database::Category;
use crate::error::{AppError, Result};
use crate::gateway::PersistenceGateway;
use crate::render::{EditForm, NoteView, RenderPipeline, RenderSink};
use crate::services::{normalize, CategoryStore};
use std::sync::Arc;

/// What the last refresh put on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus {
    /// This many notes are shown
    Listed(usize),
    /// The category has no notes
    Empty,
    /// No source could be read; the empty-state marker is shown
    Unavailable,
}

/// Result of a user action, after its refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed(ViewStatus),
    /// The write was rejected or never reached the backend
    WriteFailed(ViewStatus),
    /// Create input was empty; nothing was sent
    ValidationFailed,
}

impl ActionOutcome {
    pub fn view(&self) -> Option<ViewStatus> {
        match self {
            ActionOutcome::Completed(view) | ActionOutcome::WriteFailed(view) => Some(*view),
            ActionOutcome::ValidationFailed => None,
        }
    }
}

/// Trim and check create input; both fields are required
pub fn validate_draft(title: &str, content: &str) -> Result<(String, String)> {
    let title = title.trim();
    let content = content.trim();

    match (title.is_empty(), content.is_empty()) {
        (false, false) => Ok((title.to_string(), content.to_string())),
        (true, true) => Err(AppError::ValidationFailed("title and content are empty".to_string())),
        (true, false) => Err(AppError::ValidationFailed("title is empty".to_string())),
        (false, true) => Err(AppError::ValidationFailed("content is empty".to_string())),
    }
}

/// Keeps the busy indicator up for the lifetime of one action.
/// Released on drop, so every exit path hides it again.
struct BusyGuard<'a> {
    state: &'a AppState,
    sink: &'a dyn RenderSink,
    action: &'static str,
}

impl<'a> BusyGuard<'a> {
    fn acquire(state: &'a AppState, sink: &'a dyn RenderSink, action: &'static str) -> Self {
        tracing::debug!("Busy: {} started", action);
        if state.enter_busy() {
            sink.set_busy(true);
        }
        Self {
            state,
            sink,
            action,
        }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if self.state.leave_busy() {
            self.sink.set_busy(false);
        }
        tracing::debug!("Busy: {} finished", self.action);
    }
}

/// Coordinates the gateway, the category store and the render pipeline
#[derive(Clone)]
pub struct NotesOrchestrator {
    gateway: PersistenceGateway,
    state: Arc<AppState>,
    pipeline: RenderPipeline,
    sink: Arc<dyn RenderSink>,
}

impl NotesOrchestrator {
    pub fn new(gateway: PersistenceGateway, state: Arc<AppState>, sink: Arc<dyn RenderSink>) -> Self {
        Self {
            gateway,
            state,
            pipeline: RenderPipeline::new(),
            sink,
        }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn current_category(&self) -> Category {
        self.state.categories.current()
    }

    fn busy(&self, action: &'static str) -> BusyGuard<'_> {
        BusyGuard::acquire(&self.state, self.sink.as_ref(), action)
    }

    /// Re-read every note and redraw the current category
    pub async fn refresh(&self) -> ViewStatus {
        let _busy = self.busy("refresh");
        self.reload().await
    }

    /// Switch the visible category and redraw
    pub async fn show_category(&self, category: Category) -> ViewStatus {
        let _busy = self.busy("show category");
        self.state.categories.set(category);
        self.reload().await
    }

    /// Create a note in the active category.
    ///
    /// Empty input raises the validation flag and never reaches the gateway.
    pub async fn create(&self, title: &str, content: &str) -> ActionOutcome {
        let (title, content) = match validate_draft(title, content) {
            Ok(draft) => draft,
            Err(e) => {
                tracing::info!("Create rejected: {}", e);
                self.state.set_validation_error(true);
                self.sink.set_validation_error(true);
                return ActionOutcome::ValidationFailed;
            }
        };

        let _busy = self.busy("create");
        let write = self.gateway.create(title, content).await.map(|_| ());
        let view = self.reload().await;
        self.dismiss_validation();

        settle("create", write, view)
    }

    /// Move a note to another category; same-to-same still refreshes
    pub async fn change_category(&self, id: &str, category: Category) -> ActionOutcome {
        let _busy = self.busy("change category");
        let write = self.gateway.set_category(id, category).await;
        let view = self.reload().await;

        settle("change category", write, view)
    }

    /// Replace a note's title and content.
    ///
    /// Unlike create, empty fields are accepted and sent as they are.
    pub async fn edit(&self, id: &str, title: &str, content: &str) -> ActionOutcome {
        let _busy = self.busy("edit");
        let write = self
            .gateway
            .update(id, title.to_string(), content.to_string())
            .await;
        let view = self.reload().await;

        settle("edit", write, view)
    }

    /// Permanently delete a note
    pub async fn delete(&self, id: &str) -> ActionOutcome {
        let _busy = self.busy("delete");
        let write = self.gateway.delete(id).await;
        let view = self.reload().await;

        settle("delete", write, view)
    }

    /// Hide the validation message and re-enable submission
    pub fn dismiss_validation(&self) {
        if self.state.set_validation_error(false) {
            self.sink.set_validation_error(false);
        }
    }

    /// Detail view of a note currently on screen
    pub fn open_note(&self, id: &str) -> Option<NoteView> {
        self.state
            .rendered_note(id)
            .map(|note| self.pipeline.note_view(&note))
    }

    /// Prefilled edit form for a note currently on screen
    pub fn edit_form(&self, id: &str) -> Option<EditForm> {
        self.state
            .rendered_note(id)
            .map(|note| self.pipeline.edit_form(&note))
    }

    /// list → normalize → filter → render, without touching the busy state
    async fn reload(&self) -> ViewStatus {
        let payload = self.gateway.list().await;
        let category = self.state.categories.current();

        match payload {
            Ok(raw) => {
                let records = normalize(raw);
                let visible = CategoryStore::filter_for(category, &records);
                let status = if visible.is_empty() {
                    ViewStatus::Empty
                } else {
                    ViewStatus::Listed(visible.len())
                };

                tracing::debug!(
                    "Rendering {} of {} notes in {}",
                    visible.len(),
                    records.len(),
                    category
                );

                let frame = self.pipeline.render(category, &visible);
                self.state.store_rendered(visible);
                self.sink.render(frame);
                status
            }
            Err(e) => {
                tracing::warn!("Failed to load notes: {}", e);
                self.state.store_rendered(Vec::new());
                self.sink.render(self.pipeline.unavailable(category));
                ViewStatus::Unavailable
            }
        }
    }
}

fn settle(action: &str, write: Result<()>, view: ViewStatus) -> ActionOutcome {
    match write {
        Ok(()) => ActionOutcome::Completed(view),
        Err(e) => {
            tracing::warn!("{} failed, view refreshed from backend: {}", action, e);
            ActionOutcome::WriteFailed(view)
        }
    }
}
