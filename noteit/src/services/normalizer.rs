//! Note normalizer
//!
//! Converts whichever payload shape a source returned into the canonical
//! ordered sequence of `NoteRecord`. Never fails.

use crate::database::{NoteRecord, RawPayload};

/// Flatten a list payload into canonical records.
///
/// Keyed payloads take their id from the map key, which wins over any id
/// stored inside the value. List elements without an id are skipped.
pub fn normalize(raw: RawPayload) -> Vec<NoteRecord> {
    match raw {
        RawPayload::List(items) => items
            .into_iter()
            .enumerate()
            .filter_map(|(index, mut item)| match item.id.take() {
                Some(id) => Some(item.with_id(id)),
                None => {
                    tracing::warn!("Dropping note at position {} without an id", index);
                    None
                }
            })
            .collect(),
        RawPayload::Keyed(entries) => entries
            .into_iter()
            .map(|(id, item)| item.with_id(id))
            .collect(),
        RawPayload::Absent => Vec::new(),
    }
}
