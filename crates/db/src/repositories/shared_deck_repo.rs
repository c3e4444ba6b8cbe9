//! Repository for the `shared_decks` table.
//!
//! Every write that changes a listing's version also appends the matching
//! snapshot row in the same transaction, so a version never exists without
//! its snapshot.

use deckhub_core::publish::INITIAL_VERSION;
use deckhub_core::search::{
    clamp_limit, clamp_offset, contains_pattern, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT,
};
use deckhub_core::types::DbId;
use sqlx::PgPool;

use crate::models::shared_deck::{
    NewSharedDeck, PublishedDeck, SharedDeck, SharedDeckPage, SharedDeckSearchParams,
    UpdateSharedDeck, UpdateSharedDeckFlags, VersionBump,
};
use crate::repositories::shared_deck_snapshot_repo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, author_id, source_deck_id, slug, title, description, language, \
    tags, note_count, card_count, download_count, version, content_hash, \
    is_featured, is_official, is_active, deleted_at, created_at, updated_at";

/// Search predicate shared by the page and count queries.
///
/// `$1` language, `$2` tag, `$3` ILIKE pattern, `$4` featured, `$5` official,
/// `$6` include inactive listings.
const SEARCH_FILTER: &str = "deleted_at IS NULL
       AND ($6 OR is_active)
       AND ($1::TEXT IS NULL OR language = $1)
       AND ($2::TEXT IS NULL OR $2 = ANY(tags))
       AND ($3::TEXT IS NULL OR title ILIKE $3 OR description ILIKE $3)
       AND ($4::BOOL IS NULL OR is_featured = $4)
       AND ($5::BOOL IS NULL OR is_official = $5)";

/// Provides publish, versioning and marketplace queries for shared decks.
pub struct SharedDeckRepo;

impl SharedDeckRepo {
    // ── Publishing ───────────────────────────────────────────────────

    /// Insert a shared deck at version 1 together with its first snapshot.
    ///
    /// A duplicate slug (or a second live listing for the same source deck)
    /// fails with a unique violation and leaves nothing behind.
    pub async fn create_with_snapshot(
        pool: &PgPool,
        input: &NewSharedDeck,
    ) -> Result<PublishedDeck, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO shared_decks
                (author_id, source_deck_id, slug, title, description, language, tags,
                 note_count, card_count, version, content_hash)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        let shared_deck = sqlx::query_as::<_, SharedDeck>(&query)
            .bind(input.author_id)
            .bind(input.source_deck_id)
            .bind(&input.slug)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.language)
            .bind(&input.tags)
            .bind(input.note_count)
            .bind(input.card_count)
            .bind(INITIAL_VERSION)
            .bind(&input.content_hash)
            .fetch_one(&mut *tx)
            .await?;

        let snapshot = shared_deck_snapshot_repo::insert(
            &mut *tx,
            shared_deck.id,
            INITIAL_VERSION,
            input.export_format_version,
            &input.file_url,
            &input.content_hash,
        )
        .await?;

        tx.commit().await?;
        Ok(PublishedDeck {
            shared_deck,
            snapshot,
        })
    }

    /// Move a shared deck to `bump.new_version` and append its snapshot.
    ///
    /// The update is guarded by `version = bump.expected_version`; if another
    /// writer got there first, nothing is written and `None` is returned. A
    /// snapshot that already exists for the new version fails the whole
    /// transaction with a unique violation.
    pub async fn bump_version(
        pool: &PgPool,
        id: DbId,
        bump: &VersionBump,
    ) -> Result<Option<PublishedDeck>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE shared_decks SET
                version = $3,
                note_count = $4,
                card_count = $5,
                content_hash = $6
             WHERE id = $1 AND version = $2 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, SharedDeck>(&query)
            .bind(id)
            .bind(bump.expected_version)
            .bind(bump.new_version)
            .bind(bump.note_count)
            .bind(bump.card_count)
            .bind(&bump.content_hash)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(shared_deck) = updated else {
            tracing::debug!(
                shared_deck_id = id,
                expected_version = bump.expected_version,
                "Version guard failed, rolling back"
            );
            return Ok(None);
        };

        let snapshot = shared_deck_snapshot_repo::insert(
            &mut *tx,
            shared_deck.id,
            bump.new_version,
            bump.export_format_version,
            &bump.file_url,
            &bump.content_hash,
        )
        .await?;

        tx.commit().await?;
        Ok(Some(PublishedDeck {
            shared_deck,
            snapshot,
        }))
    }

    // ── Lookups ──────────────────────────────────────────────────────

    /// Find a shared deck by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SharedDeck>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM shared_decks WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, SharedDeck>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a shared deck by slug. Excludes soft-deleted rows.
    pub async fn find_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<SharedDeck>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM shared_decks WHERE slug = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, SharedDeck>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Find the live listing published from `deck_id`, if any.
    pub async fn find_by_source_deck(
        pool: &PgPool,
        deck_id: DbId,
    ) -> Result<Option<SharedDeck>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM shared_decks
             WHERE source_deck_id = $1 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, SharedDeck>(&query)
            .bind(deck_id)
            .fetch_optional(pool)
            .await
    }

    /// Whether any listing, including a deleted one, has used `slug`.
    pub async fn slug_exists(pool: &PgPool, slug: &str) -> Result<bool, sqlx::Error> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM shared_decks WHERE slug = $1)")
                .bind(slug)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    /// Search listings.
    ///
    /// Ordered by featured, official, download count, then newest first.
    /// Inactive listings are only returned when `include_inactive` is set.
    pub async fn search(
        pool: &PgPool,
        params: &SharedDeckSearchParams,
        include_inactive: bool,
    ) -> Result<SharedDeckPage, sqlx::Error> {
        let limit = clamp_limit(params.limit, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT);
        let offset = clamp_offset(params.offset);
        let pattern = params
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(contains_pattern);

        let count_query = format!("SELECT COUNT(*) FROM shared_decks WHERE {SEARCH_FILTER}");
        let (total,): (i64,) = sqlx::query_as(&count_query)
            .bind(&params.language)
            .bind(&params.tag)
            .bind(&pattern)
            .bind(params.is_featured)
            .bind(params.is_official)
            .bind(include_inactive)
            .fetch_one(pool)
            .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM shared_decks
             WHERE {SEARCH_FILTER}
             ORDER BY is_featured DESC, is_official DESC, download_count DESC,
                      created_at DESC, id DESC
             LIMIT $7 OFFSET $8"
        );
        let items = sqlx::query_as::<_, SharedDeck>(&query)
            .bind(&params.language)
            .bind(&params.tag)
            .bind(&pattern)
            .bind(params.is_featured)
            .bind(params.is_official)
            .bind(include_inactive)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Ok(SharedDeckPage {
            items,
            total,
            limit,
            offset,
        })
    }

    // ── Metadata ─────────────────────────────────────────────────────

    /// Update listing metadata. Version, hash and counts are untouched.
    ///
    /// Returns `None` if no row with the given `id` exists (or is soft-deleted).
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSharedDeck,
    ) -> Result<Option<SharedDeck>, sqlx::Error> {
        let query = format!(
            "UPDATE shared_decks SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                language = COALESCE($4, language),
                tags = COALESCE($5, tags),
                is_active = COALESCE($6, is_active)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SharedDeck>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.language)
            .bind(&input.tags)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Toggle the admin-controlled flags.
    pub async fn set_flags(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSharedDeckFlags,
    ) -> Result<Option<SharedDeck>, sqlx::Error> {
        let query = format!(
            "UPDATE shared_decks SET
                is_featured = COALESCE($2, is_featured),
                is_official = COALESCE($3, is_official),
                is_active = COALESCE($4, is_active)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SharedDeck>(&query)
            .bind(id)
            .bind(input.is_featured)
            .bind(input.is_official)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Count one download. Returns `true` if a live listing was updated.
    pub async fn increment_download_count(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE shared_decks SET download_count = download_count + 1 \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Soft-delete a shared deck. Returns `true` if a row was marked deleted.
    ///
    /// Snapshots are kept.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE shared_decks SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
