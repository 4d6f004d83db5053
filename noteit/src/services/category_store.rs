//! Category store
//!
//! Holds the single category currently on screen and filters notes by it.

use crate::database::{Category, NoteRecord};
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Default)]
pub struct CategoryStore {
    current: RwLock<Category>,
}

impl CategoryStore {
    /// Store starting on the active category
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Category {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the current category
    pub fn set(&self, category: Category) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = category;
        tracing::debug!("Current category set to {}", category);
    }

    /// Notes belonging to the current category, in their original order.
    /// Records without a recognised category never match.
    pub fn filter(&self, records: &[NoteRecord]) -> Vec<NoteRecord> {
        Self::filter_for(self.current(), records)
    }

    /// Same as `filter` for an explicit category
    pub fn filter_for(category: Category, records: &[NoteRecord]) -> Vec<NoteRecord> {
        records
            .iter()
            .filter(|note| note.category == Some(category))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: &str, category: Option<Category>) -> NoteRecord {
        NoteRecord {
            id: id.to_string(),
            title: None,
            content: None,
            category,
            created: None,
        }
    }

    #[test]
    fn test_defaults_to_active() {
        assert_eq!(CategoryStore::new().current(), Category::Active);
    }

    #[test]
    fn test_filter_preserves_order() {
        let store = CategoryStore::new();
        let records = vec![
            note("1", Some(Category::Active)),
            note("2", Some(Category::Trash)),
            note("3", Some(Category::Active)),
            note("4", None),
        ];

        let active: Vec<String> = store.filter(&records).into_iter().map(|n| n.id).collect();
        assert_eq!(active, vec!["1", "3"]);

        store.set(Category::Trash);
        let trash: Vec<String> = store.filter(&records).into_iter().map(|n| n.id).collect();
        assert_eq!(trash, vec!["2"]);
    }

    #[test]
    fn test_set_replaces_without_history() {
        let store = CategoryStore::new();
        store.set(Category::Archive);
        store.set(Category::Trash);

        assert_eq!(store.current(), Category::Trash);
    }
}
