//! Note models
//!
//! Rust structs for notes as they travel between backends and the view.
//! Wire shapes are permissive (`RawNote`, `RawPayload`); `NoteRecord` is the
//! canonical form handed to the category store and render pipeline.

use crate::error::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle category of a note
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Active,
    Archive,
    Trash,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Active, Category::Archive, Category::Trash];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Active => "active",
            Category::Archive => "archive",
            Category::Trash => "trash",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Category::Active),
            "archive" => Ok(Category::Archive),
            "trash" => Ok(Category::Trash),
            other => Err(format!(
                "Invalid category '{}'. Use 'active', 'archive' or 'trash'",
                other
            )),
        }
    }
}

/// Canonical note as seen by the rest of the application.
///
/// Only `id` is guaranteed. Backends disagree on which fields they return,
/// so everything else is optional and rendered as empty when missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteRecord {
    pub id: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<Category>,
    pub created: Option<DateTime<Utc>>,
}

impl NoteRecord {
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn content_or_empty(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

/// A note exactly as a backend delivered it
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawNote {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient_category")]
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created: Option<DateTime<Utc>>,
}

impl RawNote {
    /// Merge an externally supplied id with the record's own fields
    pub fn with_id(self, id: String) -> NoteRecord {
        NoteRecord {
            id,
            title: self.title,
            content: self.content,
            category: self.category,
            created: self.created,
        }
    }
}

impl From<NoteRecord> for RawNote {
    fn from(record: NoteRecord) -> Self {
        Self {
            id: Some(record.id),
            title: record.title,
            content: record.content,
            category: record.category,
            created: record.created,
        }
    }
}

/// Response body of a list call, tagged by shape
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RawPayload {
    /// Ordered collection, every element carries its own id
    List(Vec<RawNote>),
    /// Map from id to record, in document order
    Keyed(IndexMap<String, RawNote>),
    /// `null` or empty body
    #[default]
    Absent,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WirePayload {
    List(Vec<Option<RawNote>>),
    Keyed(IndexMap<String, Option<RawNote>>),
}

impl RawPayload {
    /// Decode a JSON list response of either shape
    pub fn from_json(body: &str) -> Result<Self> {
        if body.trim().is_empty() {
            return Ok(RawPayload::Absent);
        }

        // Sparse arrays and deleted map entries come back as null holes
        let wire: Option<WirePayload> = serde_json::from_str(body)?;
        Ok(match wire {
            None => RawPayload::Absent,
            Some(WirePayload::List(items)) => RawPayload::List(items.into_iter().flatten().collect()),
            Some(WirePayload::Keyed(entries)) => RawPayload::Keyed(
                entries
                    .into_iter()
                    .filter_map(|(id, note)| note.map(|n| (id, n)))
                    .collect(),
            ),
        })
    }

    pub fn len(&self) -> usize {
        match self {
            RawPayload::List(items) => items.len(),
            RawPayload::Keyed(entries) => entries.len(),
            RawPayload::Absent => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<NoteRecord>> for RawPayload {
    fn from(records: Vec<NoteRecord>) -> Self {
        RawPayload::List(records.into_iter().map(RawNote::from).collect())
    }
}

/// Create note request; category and timestamp are fixed by the gateway
#[derive(Debug, Clone, Serialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
    pub category: Category,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created: DateTime<Utc>,
}

/// Partial update; only the listed fields are sent to the backend
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NotePatch {
    Category { category: Category },
    Text { title: String, content: String },
}

/// Parse a creation timestamp the way backends tend to send it:
/// RFC 3339, a bare date/time, or epoch milliseconds as text.
pub fn parse_created(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    value
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}

fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_category<'de, D>(deserializer: D) -> std::result::Result<Option<Category>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_str().and_then(|s| s.parse().ok())))
}

fn lenient_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        Some(serde_json::Value::String(s)) => parse_created(&s),
        _ => None,
    })
}
