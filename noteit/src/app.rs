//! Application state and initialization
//!
//! `AppState` is the only mutable state shared between actions: the current
//! category, the busy depth, the validation flag and the notes last rendered.
//! `setup` wires settings into sources, the gateway and the orchestrator.

use crate::config;
use crate::database::{create_pool, NoteRecord, Repository};
use crate::error::{AppError, Result};
use crate::gateway::{MemorySource, NoteSource, PersistenceGateway, RestSource, SqliteSource};
use crate::render::RenderSink;
use crate::services::{AppSettings, CategoryStore, NotesOrchestrator, SourceSettings};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Central view state, owned by the orchestrator
#[derive(Debug, Default)]
pub struct AppState {
    pub categories: CategoryStore,
    busy_depth: AtomicUsize,
    validation_error: AtomicBool,
    rendered: RwLock<Vec<NoteRecord>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any action is still in flight
    pub fn is_busy(&self) -> bool {
        self.busy_depth.load(Ordering::SeqCst) > 0
    }

    pub fn validation_error(&self) -> bool {
        self.validation_error.load(Ordering::SeqCst)
    }

    /// Whether the create form currently accepts submissions
    pub fn can_submit(&self) -> bool {
        !self.validation_error()
    }

    /// Returns true when this call made the state busy
    pub(crate) fn enter_busy(&self) -> bool {
        self.busy_depth.fetch_add(1, Ordering::SeqCst) == 0
    }

    /// Returns true when this call made the state idle
    pub(crate) fn leave_busy(&self) -> bool {
        self.busy_depth.fetch_sub(1, Ordering::SeqCst) == 1
    }

    /// Returns true when the flag actually changed
    pub(crate) fn set_validation_error(&self, visible: bool) -> bool {
        self.validation_error.swap(visible, Ordering::SeqCst) != visible
    }

    pub(crate) fn store_rendered(&self, notes: Vec<NoteRecord>) {
        *self.rendered.write().unwrap_or_else(PoisonError::into_inner) = notes;
    }

    /// Notes on screen after the last completed refresh
    pub fn rendered(&self) -> Vec<NoteRecord> {
        self.rendered
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Look up one note from the last rendered view
    pub fn rendered_note(&self, id: &str) -> Option<NoteRecord> {
        self.rendered
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|note| note.id == id)
            .cloned()
    }
}

/// Default data directory under the platform data root
/// (`~/.local/share/noteit` on Linux, `%APPDATA%\noteit` on Windows)
pub fn default_data_dir() -> Result<PathBuf> {
    let data_root = dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .ok_or_else(|| {
            AppError::Config("No data directory found; pass --data-dir".to_string())
        })?;
    Ok(data_root.join(config::APP_DIR_NAME))
}

/// Instantiate one configured source
async fn open_source(settings: &SourceSettings, data_dir: &Path) -> Result<Arc<dyn NoteSource>> {
    let source: Arc<dyn NoteSource> = match settings {
        SourceSettings::Rest {
            name,
            url,
            flavor,
            timeout_secs,
        } => Arc::new(RestSource::new(
            name.as_str(),
            url,
            *flavor,
            Duration::from_secs(*timeout_secs),
        )?),
        SourceSettings::Sqlite { name, path } => {
            let path = if path.is_absolute() {
                path.clone()
            } else {
                data_dir.join(path)
            };
            let pool = create_pool(&path).await?;
            Arc::new(SqliteSource::new(name.as_str(), Repository::new(pool)))
        }
        SourceSettings::Memory { name } => Arc::new(MemorySource::new(name.as_str())),
    };

    tracing::info!("Opened note source '{}'", source.name());
    Ok(source)
}

/// Build the gateway described by the settings
pub async fn build_gateway(settings: &AppSettings, data_dir: &Path) -> Result<PersistenceGateway> {
    settings.validate()?;

    let writer_name = settings
        .write_source_name()
        .ok_or_else(|| AppError::Config("No write source configured".to_string()))?;

    // Only the write source is required; a reader that fails to open is
    // left out and reads fall back to the others
    let mut readers = Vec::with_capacity(settings.sources.len());
    for source in &settings.sources {
        match open_source(source, data_dir).await {
            Ok(opened) => readers.push(opened),
            Err(e) if source.name().trim() != writer_name => {
                tracing::warn!("Skipping read source '{}': {}", source.name(), e);
            }
            Err(e) => return Err(e),
        }
    }

    let writer = readers
        .iter()
        .find(|source| source.name().trim() == writer_name)
        .cloned()
        .ok_or_else(|| AppError::Config(format!("Unknown write source: {}", writer_name)))?;

    Ok(PersistenceGateway::new(readers, writer))
}

/// Application setup - called once on startup
pub async fn setup(
    settings: &AppSettings,
    data_dir: &Path,
    sink: Arc<dyn RenderSink>,
) -> Result<NotesOrchestrator> {
    tracing::info!("Initializing application");
    tracing::info!("App data directory: {:?}", data_dir);

    tokio::fs::create_dir_all(data_dir).await?;

    let gateway = build_gateway(settings, data_dir).await?;
    tracing::info!(
        "Reading from {:?}, writing to '{}'",
        gateway.reader_names(),
        gateway.writer_name()
    );

    let orchestrator = NotesOrchestrator::new(gateway, Arc::new(AppState::new()), sink);

    tracing::info!("Application initialized successfully");

    Ok(orchestrator)
}
