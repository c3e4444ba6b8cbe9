//! Deterministic fingerprint over a deck's note and card content.
//!
//! The hash decides whether republishing a shared deck produces a new
//! version. It must not depend on row fetch order, so both lists are sorted
//! before they are serialized, and object keys are always emitted in
//! lexicographic order.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::hashing::sha256_hex_prefix;
use crate::types::DbId;

/// Number of hex characters kept from the SHA-256 digest (128 bits).
pub const CONTENT_HASH_LEN: usize = 32;

/// Hashed projection of a note: `{guid, fields, tags}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteContent {
    pub guid: String,
    pub fields: BTreeMap<String, String>,
    pub tags: Vec<String>,
}

/// Hashed projection of a card: `{note_id, card_template_id, ord}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardContent {
    pub note_id: DbId,
    pub card_template_id: DbId,
    pub ord: i32,
}

/// A 32-character lowercase hex content fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// True when `stored` (a previously persisted hash) equals this one.
    pub fn matches(&self, stored: Option<&str>) -> bool {
        stored == Some(self.0.as_str())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn cmp_notes(a: &NoteContent, b: &NoteContent) -> Ordering {
    a.guid
        .cmp(&b.guid)
        .then_with(|| a.fields.cmp(&b.fields))
        .then_with(|| a.tags.cmp(&b.tags))
}

fn cmp_cards(a: &CardContent, b: &CardContent) -> Ordering {
    a.note_id
        .cmp(&b.note_id)
        .then_with(|| a.ord.cmp(&b.ord))
        .then_with(|| a.card_template_id.cmp(&b.card_template_id))
}

/// Render the canonical byte form hashed by [`compute_content_hash`].
///
/// The layout is compact JSON of `{"cards": [...], "notes": [...]}` with keys
/// written in sorted order at every level.
pub fn canonical_bytes(notes: &[NoteContent], cards: &[CardContent]) -> Vec<u8> {
    let mut notes: Vec<&NoteContent> = notes.iter().collect();
    notes.sort_by(|a, b| cmp_notes(a, b));

    let mut cards: Vec<&CardContent> = cards.iter().collect();
    cards.sort_by(|a, b| cmp_cards(a, b));

    // Keys are listed alphabetically; `fields` is a BTreeMap and so is
    // already ordered.
    let notes: Vec<serde_json::Value> = notes
        .into_iter()
        .map(|n| json!({ "fields": n.fields, "guid": n.guid, "tags": n.tags }))
        .collect();
    let cards: Vec<serde_json::Value> = cards
        .into_iter()
        .map(|c| {
            json!({
                "card_template_id": c.card_template_id,
                "note_id": c.note_id,
                "ord": c.ord,
            })
        })
        .collect();

    json!({ "cards": cards, "notes": notes })
        .to_string()
        .into_bytes()
}

/// Compute the content hash for one deck's notes and cards.
pub fn compute_content_hash(notes: &[NoteContent], cards: &[CardContent]) -> ContentHash {
    ContentHash(sha256_hex_prefix(
        &canonical_bytes(notes, cards),
        CONTENT_HASH_LEN,
    ))
}
