//! Publish and republish rules for shared decks.
//!
//! A shared deck moves `unpublished -> v1 -> v2 -> ...`; a version is only
//! ever added when the deck's content hash changes. This module holds the
//! validation and version arithmetic. Persistence lives in the repository
//! layer and runs these checks before opening its transaction.

use crate::content_hash::{compute_content_hash, CardContent, ContentHash, NoteContent};
use crate::error::CoreError;

/// Schema version of the exported deck payload referenced by snapshots.
pub const EXPORT_FORMAT_VERSION: i32 = 1;

/// Version assigned on first publish.
pub const INITIAL_VERSION: i32 = 1;

pub const MAX_SLUG_LEN: usize = 100;
pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_LANGUAGE_LEN: usize = 10;
pub const MAX_TAGS: usize = 20;
pub const MAX_TAG_LEN: usize = 50;

/// Language used when a publish request does not name one.
pub const DEFAULT_LANGUAGE: &str = "zh-CN";

// ---------------------------------------------------------------------------
// Content summary
// ---------------------------------------------------------------------------

/// Counts and fingerprint recomputed from a deck's current content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckContentSummary {
    pub note_count: i32,
    pub card_count: i32,
    pub content_hash: ContentHash,
}

impl DeckContentSummary {
    pub fn from_content(notes: &[NoteContent], cards: &[CardContent]) -> Self {
        Self {
            note_count: count_as_i32(notes.len()),
            card_count: count_as_i32(cards.len()),
            content_hash: compute_content_hash(notes, cards),
        }
    }

    /// Reject decks without notes. Publishing an empty deck is an error,
    /// not a silent no-op.
    pub fn ensure_publishable(&self) -> Result<(), CoreError> {
        if self.note_count == 0 {
            return Err(CoreError::Validation(
                "Deck has no notes and cannot be published".into(),
            ));
        }
        Ok(())
    }
}

fn count_as_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

// ---------------------------------------------------------------------------
// Versioning
// ---------------------------------------------------------------------------

/// Decide the version number a republish should write.
///
/// Returns `current_version + 1` when `fresh` differs from `stored_hash`,
/// and a validation error when the content is unchanged.
pub fn next_version(
    current_version: i32,
    stored_hash: Option<&str>,
    fresh: &ContentHash,
) -> Result<i32, CoreError> {
    if fresh.matches(stored_hash) {
        return Err(CoreError::Validation(
            "Deck content is unchanged since the last published version; nothing to publish"
                .into(),
        ));
    }
    current_version
        .checked_add(1)
        .ok_or_else(|| CoreError::Internal("Shared deck version overflow".into()))
}

/// Stable export URL recorded on every snapshot of the shared deck.
///
/// Slugs are never reused, even after a listing is deleted, so the URL keeps
/// identifying the listing that produced the snapshot.
pub fn export_file_url(slug: &str) -> String {
    format!("/api/v1/shared-decks/{slug}/export")
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a marketplace slug (1..=100 chars of `[a-z0-9-]`).
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() {
        return Err(CoreError::Validation("Slug must not be empty".into()));
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(CoreError::Validation(format!(
            "Slug must be at most {MAX_SLUG_LEN} characters"
        )));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(CoreError::Validation(
            "Slug must contain only lowercase alphanumeric characters and hyphens".into(),
        ));
    }
    Ok(())
}

/// Validate a shared deck title (non-blank, <= 200 chars).
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title must not be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_language(language: &str) -> Result<(), CoreError> {
    if language.trim().is_empty() || language.len() > MAX_LANGUAGE_LEN {
        return Err(CoreError::Validation(format!(
            "Language must be 1 to {MAX_LANGUAGE_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate marketplace tags (each non-blank, <= 50 chars, at most 20).
pub fn validate_tags(tags: &[String]) -> Result<(), CoreError> {
    if tags.len() > MAX_TAGS {
        return Err(CoreError::Validation(format!(
            "A maximum of {MAX_TAGS} tags is allowed"
        )));
    }
    for tag in tags {
        if tag.trim().is_empty() {
            return Err(CoreError::Validation("Tags must not be empty".into()));
        }
        if tag.chars().count() > MAX_TAG_LEN {
            return Err(CoreError::Validation(format!(
                "Each tag must be at most {MAX_TAG_LEN} characters"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use assert_matches::assert_matches;

    use super::*;

    fn one_note() -> Vec<NoteContent> {
        vec![NoteContent {
            guid: "a".into(),
            fields: BTreeMap::from([("Front".into(), "Q1".into())]),
            tags: vec![],
        }]
    }

    #[test]
    fn summary_counts_rows() {
        let cards = vec![CardContent {
            note_id: 1,
            card_template_id: 1,
            ord: 0,
        }];
        let summary = DeckContentSummary::from_content(&one_note(), &cards);
        assert_eq!(summary.note_count, 1);
        assert_eq!(summary.card_count, 1);
        assert!(summary.ensure_publishable().is_ok());
    }

    #[test]
    fn empty_deck_is_not_publishable() {
        let summary = DeckContentSummary::from_content(&[], &[]);
        assert_matches!(summary.ensure_publishable(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn changed_hash_bumps_version_by_one() {
        let fresh = compute_content_hash(&one_note(), &[]);
        assert_eq!(next_version(1, Some("stale"), &fresh).unwrap(), 2);
        assert_eq!(next_version(7, None, &fresh).unwrap(), 8);
    }

    #[test]
    fn unchanged_hash_is_rejected() {
        let fresh = compute_content_hash(&one_note(), &[]);
        let stored = fresh.to_string();
        assert_matches!(
            next_version(3, Some(&stored), &fresh),
            Err(CoreError::Validation(msg)) if msg.contains("nothing to publish")
        );
    }

    #[test]
    fn version_overflow_is_internal_error() {
        let fresh = compute_content_hash(&one_note(), &[]);
        assert_matches!(
            next_version(i32::MAX, None, &fresh),
            Err(CoreError::Internal(_))
        );
    }

    #[test]
    fn export_url_embeds_slug() {
        assert_eq!(export_file_url("demo"), "/api/v1/shared-decks/demo/export");
    }

    #[test]
    fn slug_rules() {
        assert!(validate_slug("spanish-101").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("Has Caps").is_err());
        assert!(validate_slug("under_score").is_err());
        assert!(validate_slug(&"a".repeat(MAX_SLUG_LEN)).is_ok());
        assert!(validate_slug(&"a".repeat(MAX_SLUG_LEN + 1)).is_err());
    }

    #[test]
    fn title_rules() {
        assert!(validate_title("Kanji N5").is_ok());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"t".repeat(MAX_TITLE_LEN + 1)).is_err());
    }

    #[test]
    fn tag_rules() {
        assert!(validate_tags(&["jp".into(), "n5".into()]).is_ok());
        assert!(validate_tags(&[" ".into()]).is_err());
        assert!(validate_tags(&vec!["t".to_string(); MAX_TAGS + 1]).is_err());
    }

    #[test]
    fn language_rules() {
        assert!(validate_language(DEFAULT_LANGUAGE).is_ok());
        assert!(validate_language("").is_err());
        assert!(validate_language("far-too-long-tag").is_err());
    }
}
