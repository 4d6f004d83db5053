//! Services module
//!
//! Business logic that sits between the gateway and the render sink.

pub mod category_store;
pub mod normalizer;
pub mod orchestrator;
pub mod settings;

pub use category_store::CategoryStore;
pub use normalizer::normalize;
pub use orchestrator::{validate_draft, ActionOutcome, NotesOrchestrator, ViewStatus};
pub use settings::{AppSettings, SettingsService, SourceSettings};
