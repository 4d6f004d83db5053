//! Settings service
//!
//! Manages the note source configuration using JSON file storage.
//! Sources are listed in read priority order; one of them is the write target.

use crate::config;
use crate::error::{AppError, Result};
use crate::gateway::RestFlavor;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use tokio::fs;

/// One configured note source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceSettings {
    Rest {
        name: String,
        url: String,
        #[serde(default)]
        flavor: RestFlavor,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    Sqlite {
        name: String,
        /// Relative paths resolve against the data directory
        #[serde(default = "default_database_path")]
        path: PathBuf,
    },
    Memory {
        name: String,
    },
}

fn default_timeout_secs() -> u64 {
    config::DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_database_path() -> PathBuf {
    PathBuf::from(config::DEFAULT_DATABASE_FILE)
}

impl SourceSettings {
    pub fn name(&self) -> &str {
        match self {
            SourceSettings::Rest { name, .. }
            | SourceSettings::Sqlite { name, .. }
            | SourceSettings::Memory { name } => name,
        }
    }
}

fn default_sources() -> Vec<SourceSettings> {
    vec![SourceSettings::Sqlite {
        name: "local".to_string(),
        path: default_database_path(),
    }]
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Read priority order
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceSettings>,
    /// Name of the source receiving writes; the first source when unset
    #[serde(default)]
    pub write_source: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            write_source: None,
        }
    }
}

impl AppSettings {
    /// Check source names, limits and the write target
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(AppError::Config("At least one note source is required".to_string()));
        }
        if self.sources.len() > config::MAX_SOURCES {
            return Err(AppError::Config(format!(
                "At most {} note sources are supported",
                config::MAX_SOURCES
            )));
        }

        let mut seen = HashSet::new();
        for source in &self.sources {
            let name = source.name().trim();
            if name.is_empty() {
                return Err(AppError::Config("Source names must not be empty".to_string()));
            }
            if !seen.insert(name) {
                return Err(AppError::Config(format!("Duplicate source name: {}", name)));
            }

            if let SourceSettings::Rest {
                url, timeout_secs, ..
            } = source
            {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(AppError::Config(format!(
                        "Source '{}' needs an http(s) URL, got '{}'",
                        name, url
                    )));
                }
                if *timeout_secs == 0 || *timeout_secs > config::MAX_REQUEST_TIMEOUT_SECS {
                    return Err(AppError::Config(format!(
                        "Source '{}' timeout must be between 1 and {} seconds",
                        name,
                        config::MAX_REQUEST_TIMEOUT_SECS
                    )));
                }
            }
        }

        if let Some(writer) = &self.write_source {
            if !seen.contains(writer.trim()) {
                return Err(AppError::Config(format!(
                    "Write source '{}' is not a configured source",
                    writer
                )));
            }
        }

        Ok(())
    }

    /// Name of the source that receives writes
    pub fn write_source_name(&self) -> Option<&str> {
        self.write_source
            .as_deref()
            .map(str::trim)
            .or_else(|| self.sources.first().map(SourceSettings::name))
    }
}

/// Service for loading and saving settings
#[derive(Clone)]
pub struct SettingsService {
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new(app_data_dir: PathBuf) -> Self {
        Self {
            settings_path: app_data_dir.join(config::SETTINGS_FILE_NAME),
        }
    }

    /// Service reading an explicit settings file
    pub fn from_file(settings_path: PathBuf) -> Self {
        Self { settings_path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.settings_path
    }

    /// Load settings from disk or create default if not exists
    pub async fn load(&self) -> Result<AppSettings> {
        if !self.settings_path.exists() {
            tracing::info!("Settings file not found, creating default settings");
            let default = AppSettings::default();
            self.save(&default).await?;
            return Ok(default);
        }

        let content = fs::read_to_string(&self.settings_path).await?;
        let settings: AppSettings = serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse settings: {}", e)))?;

        settings.validate()?;

        Ok(settings)
    }

    /// Save settings to disk
    pub async fn save(&self, settings: &AppSettings) -> Result<()> {
        settings.validate()?;

        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.settings_path, content).await?;
        tracing::info!("Settings saved to {:?}", self.settings_path);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_service() -> (SettingsService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let service = SettingsService::new(temp_dir.path().to_path_buf());
        (service, temp_dir)
    }

    #[tokio::test]
    async fn test_default_settings_created_on_load() {
        let (service, _temp) = create_test_service();

        let settings = service.load().await.unwrap();

        assert_eq!(settings.sources.len(), 1);
        assert_eq!(settings.write_source_name(), Some("local"));
        assert!(service.path().exists());
    }

    #[tokio::test]
    async fn test_settings_persistence() {
        let (service, _temp) = create_test_service();

        let settings = AppSettings {
            sources: vec![
                SourceSettings::Rest {
                    name: "firebase".to_string(),
                    url: "https://example.firebaseio.com/notes".to_string(),
                    flavor: RestFlavor::Firebase,
                    timeout_secs: 10,
                },
                SourceSettings::Sqlite {
                    name: "local".to_string(),
                    path: PathBuf::from("cache.db"),
                },
            ],
            write_source: Some("firebase".to_string()),
        };
        service.save(&settings).await.unwrap();

        let loaded = service.load().await.unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_parses_minimal_json() {
        let json = r#"{
            "sources": [
                {"kind": "rest", "name": "api", "url": "http://127.0.0.1:3000/api/notes"},
                {"kind": "memory", "name": "scratch"}
            ]
        }"#;

        let settings: AppSettings = serde_json::from_str(json).unwrap();
        settings.validate().unwrap();

        assert_eq!(
            settings.sources[0],
            SourceSettings::Rest {
                name: "api".to_string(),
                url: "http://127.0.0.1:3000/api/notes".to_string(),
                flavor: RestFlavor::Plain,
                timeout_secs: config::DEFAULT_REQUEST_TIMEOUT_SECS,
            }
        );
        assert_eq!(settings.write_source_name(), Some("api"));
    }

    #[test]
    fn test_rejects_unknown_write_source() {
        let settings = AppSettings {
            write_source: Some("cloud".to_string()),
            ..AppSettings::default()
        };

        assert!(matches!(settings.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let settings = AppSettings {
            sources: vec![
                SourceSettings::Memory {
                    name: "a".to_string(),
                },
                SourceSettings::Memory {
                    name: "a".to_string(),
                },
            ],
            write_source: None,
        };

        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let settings = AppSettings {
            sources: vec![SourceSettings::Rest {
                name: "api".to_string(),
                url: "https://example.com/notes".to_string(),
                flavor: RestFlavor::Plain,
                timeout_secs: 0,
            }],
            write_source: None,
        };

        assert!(settings.validate().is_err());
    }
}
