//! Integration tests for publishing and versioning shared decks.
//!
//! Exercises `SharedDeckRepo` and `SharedDeckSnapshotRepo` against a real
//! database:
//! - First publish writes the listing at version 1 plus snapshot 1
//! - Each bump adds exactly one version and one snapshot
//! - A stale expected version writes nothing
//! - A conflicting snapshot row rolls the whole bump back
//! - Duplicate slugs and double listings of one deck are rejected
//! - Soft delete hides the listing but keeps its slug reserved

use std::collections::BTreeMap;

use assert_matches::assert_matches;

use deckhub_core::publish::{export_file_url, DeckContentSummary, EXPORT_FORMAT_VERSION};
use deckhub_db::models::deck::CreateDeck;
use deckhub_db::models::note::NewNote;
use deckhub_db::models::note_model::{CreateCardTemplate, CreateNoteModel, NoteModelWithTemplates};
use deckhub_db::models::shared_deck::{
    NewSharedDeck, SharedDeckSearchParams, UpdateSharedDeck, UpdateSharedDeckFlags, VersionBump,
};
use deckhub_db::models::user::CreateUser;
use deckhub_db::repositories::{
    CardRepo, DeckRepo, NoteModelRepo, NoteRepo, SharedDeckRepo, SharedDeckSnapshotRepo, UserRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Fixture {
    user_id: i64,
    deck_id: i64,
    model: NoteModelWithTemplates,
}

async fn fixture(pool: &PgPool, username: &str) -> Fixture {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            role: None,
        },
    )
    .await
    .unwrap();

    let model = NoteModelRepo::create_with_templates(
        pool,
        user.id,
        &CreateNoteModel {
            name: "Basic".to_string(),
            fields_schema: vec!["Front".to_string(), "Back".to_string()],
            css: None,
            templates: vec![CreateCardTemplate {
                name: "Card 1".to_string(),
                ord: 0,
                question_template: "{{Front}}".to_string(),
                answer_template: "{{Back}}".to_string(),
            }],
        },
    )
    .await
    .unwrap();

    let deck = DeckRepo::create(
        pool,
        user.id,
        &CreateDeck {
            name: "Spanish".to_string(),
            description: None,
            note_model_id: Some(model.model.id),
            scheduler: None,
        },
    )
    .await
    .unwrap();

    Fixture {
        user_id: user.id,
        deck_id: deck.id,
        model,
    }
}

async fn add_note(pool: &PgPool, fx: &Fixture, guid: &str, front: &str) -> i64 {
    let created = NoteRepo::create_with_cards(
        pool,
        &NewNote {
            user_id: fx.user_id,
            deck_id: fx.deck_id,
            note_model_id: fx.model.model.id,
            guid: guid.to_string(),
            fields: BTreeMap::from([
                ("Front".to_string(), front.to_string()),
                ("Back".to_string(), "answer".to_string()),
            ]),
            tags: vec![],
            source_type: "manual".to_string(),
            source_meta: None,
        },
    )
    .await
    .unwrap();
    created.note.id
}

async fn summarize(pool: &PgPool, deck_id: i64) -> DeckContentSummary {
    let notes = NoteRepo::list_content_by_deck(pool, deck_id).await.unwrap();
    let cards = CardRepo::list_content_by_deck(pool, deck_id).await.unwrap();
    DeckContentSummary::from_content(&notes, &cards)
}

fn new_listing(fx: &Fixture, slug: &str, summary: &DeckContentSummary) -> NewSharedDeck {
    NewSharedDeck {
        author_id: fx.user_id,
        source_deck_id: fx.deck_id,
        slug: slug.to_string(),
        title: "Spanish basics".to_string(),
        description: Some("Common words".to_string()),
        language: "es".to_string(),
        tags: vec!["spanish".to_string(), "beginner".to_string()],
        note_count: summary.note_count,
        card_count: summary.card_count,
        content_hash: summary.content_hash.to_string(),
        export_format_version: EXPORT_FORMAT_VERSION,
        file_url: export_file_url(slug),
    }
}

fn bump_for(expected_version: i32, slug: &str, summary: &DeckContentSummary) -> VersionBump {
    VersionBump {
        expected_version,
        new_version: expected_version + 1,
        note_count: summary.note_count,
        card_count: summary.card_count,
        content_hash: summary.content_hash.to_string(),
        export_format_version: EXPORT_FORMAT_VERSION,
        file_url: export_file_url(slug),
    }
}

/// Name of the unique constraint `err` violated, if it is a unique violation.
fn violated_unique(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => db.constraint(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_first_publish_writes_version_one_and_snapshot(pool: PgPool) {
    let fx = fixture(&pool, "author").await;
    add_note(&pool, &fx, "g1", "hola").await;
    add_note(&pool, &fx, "g2", "adios").await;
    let summary = summarize(&pool, fx.deck_id).await;

    let published = SharedDeckRepo::create_with_snapshot(&pool, &new_listing(&fx, "spanish", &summary))
        .await
        .unwrap();

    let deck = &published.shared_deck;
    assert_eq!(deck.version, 1);
    assert_eq!(deck.note_count, 2);
    assert_eq!(deck.card_count, 2);
    assert_eq!(deck.source_deck_id, Some(fx.deck_id));
    assert_eq!(deck.content_hash.as_deref(), Some(summary.content_hash.as_str()));
    assert_eq!(deck.tags, vec!["spanish", "beginner"]);
    assert!(deck.is_active);

    let snap = &published.snapshot;
    assert_eq!(snap.version, 1);
    assert_eq!(snap.export_format_version, 1);
    assert_eq!(snap.file_url, "/api/v1/shared-decks/spanish/export");
    assert_eq!(snap.content_hash, summary.content_hash.as_str());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_republish_versions_are_monotonic(pool: PgPool) {
    let fx = fixture(&pool, "author").await;
    add_note(&pool, &fx, "g1", "hola").await;
    let summary = summarize(&pool, fx.deck_id).await;
    let published = SharedDeckRepo::create_with_snapshot(&pool, &new_listing(&fx, "mono", &summary))
        .await
        .unwrap();
    let id = published.shared_deck.id;

    for n in 1..=3 {
        add_note(&pool, &fx, &format!("extra-{n}"), &format!("word {n}")).await;
        let summary = summarize(&pool, fx.deck_id).await;
        let bumped = SharedDeckRepo::bump_version(&pool, id, &bump_for(n, "mono", &summary))
            .await
            .unwrap()
            .expect("guard should hold");
        assert_eq!(bumped.shared_deck.version, n + 1);
        assert_eq!(bumped.snapshot.version, n + 1);
        assert_eq!(bumped.shared_deck.note_count, 1 + n);
    }

    let snapshots = SharedDeckSnapshotRepo::list_by_shared_deck(&pool, id).await.unwrap();
    let versions: Vec<i32> = snapshots.iter().map(|s| s.version).collect();
    assert_eq!(versions, vec![4, 3, 2, 1]);

    let latest = SharedDeckSnapshotRepo::find_latest(&pool, id).await.unwrap().unwrap();
    assert_eq!(latest.version, 4);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stale_expected_version_writes_nothing(pool: PgPool) {
    let fx = fixture(&pool, "author").await;
    add_note(&pool, &fx, "g1", "hola").await;
    let summary = summarize(&pool, fx.deck_id).await;
    let published = SharedDeckRepo::create_with_snapshot(&pool, &new_listing(&fx, "race", &summary))
        .await
        .unwrap();
    let id = published.shared_deck.id;

    add_note(&pool, &fx, "g2", "adios").await;
    let summary = summarize(&pool, fx.deck_id).await;

    // Winner moves 1 -> 2.
    SharedDeckRepo::bump_version(&pool, id, &bump_for(1, "race", &summary))
        .await
        .unwrap()
        .unwrap();
    // Loser still believes the listing is at version 1.
    let lost = SharedDeckRepo::bump_version(&pool, id, &bump_for(1, "race", &summary))
        .await
        .unwrap();
    assert!(lost.is_none());

    let snapshots = SharedDeckSnapshotRepo::list_by_shared_deck(&pool, id).await.unwrap();
    assert_eq!(snapshots.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_conflicting_snapshot_rolls_back_bump(pool: PgPool) {
    let fx = fixture(&pool, "author").await;
    add_note(&pool, &fx, "g1", "hola").await;
    let summary_v1 = summarize(&pool, fx.deck_id).await;
    let published =
        SharedDeckRepo::create_with_snapshot(&pool, &new_listing(&fx, "atomic", &summary_v1))
            .await
            .unwrap();
    let id = published.shared_deck.id;

    // Inject a row that collides with the snapshot the bump will write.
    sqlx::query(
        "INSERT INTO shared_deck_snapshots
            (shared_deck_id, version, export_format_version, file_url, content_hash)
         VALUES ($1, 2, 1, 'injected', 'injected')",
    )
    .bind(id)
    .execute(&pool)
    .await
    .unwrap();

    add_note(&pool, &fx, "g2", "adios").await;
    let summary_v2 = summarize(&pool, fx.deck_id).await;

    let err = SharedDeckRepo::bump_version(&pool, id, &bump_for(1, "atomic", &summary_v2))
        .await
        .unwrap_err();
    assert_matches!(violated_unique(&err), Some("uq_shared_deck_snapshots_version"));

    let after = SharedDeckRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(after.version, 1);
    assert_eq!(after.note_count, 1);
    assert_eq!(
        after.content_hash.as_deref(),
        Some(summary_v1.content_hash.as_str())
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_slug_is_rejected(pool: PgPool) {
    let first = fixture(&pool, "first").await;
    add_note(&pool, &first, "g1", "hola").await;
    let summary = summarize(&pool, first.deck_id).await;
    let original = SharedDeckRepo::create_with_snapshot(&pool, &new_listing(&first, "taken", &summary))
        .await
        .unwrap();

    let second = fixture(&pool, "second").await;
    add_note(&pool, &second, "g9", "otro").await;
    let summary2 = summarize(&pool, second.deck_id).await;
    let err = SharedDeckRepo::create_with_snapshot(&pool, &new_listing(&second, "taken", &summary2))
        .await
        .unwrap_err();
    assert_matches!(violated_unique(&err), Some("uq_shared_decks_slug"));

    let still = SharedDeckRepo::find_by_slug(&pool, "taken").await.unwrap().unwrap();
    assert_eq!(still.id, original.shared_deck.id);
    assert_eq!(still.author_id, first.user_id);

    // No orphaned listing for the second deck.
    assert!(SharedDeckRepo::find_by_source_deck(&pool, second.deck_id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deck_can_only_have_one_live_listing(pool: PgPool) {
    let fx = fixture(&pool, "author").await;
    add_note(&pool, &fx, "g1", "hola").await;
    let summary = summarize(&pool, fx.deck_id).await;
    SharedDeckRepo::create_with_snapshot(&pool, &new_listing(&fx, "one", &summary))
        .await
        .unwrap();

    let err = SharedDeckRepo::create_with_snapshot(&pool, &new_listing(&fx, "two", &summary))
        .await
        .unwrap_err();
    assert_matches!(violated_unique(&err), Some("uq_shared_decks_source_deck"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_soft_delete_hides_listing_and_keeps_slug(pool: PgPool) {
    let fx = fixture(&pool, "author").await;
    add_note(&pool, &fx, "g1", "hola").await;
    let summary = summarize(&pool, fx.deck_id).await;
    let published = SharedDeckRepo::create_with_snapshot(&pool, &new_listing(&fx, "gone", &summary))
        .await
        .unwrap();
    let id = published.shared_deck.id;

    assert!(SharedDeckRepo::soft_delete(&pool, id).await.unwrap());
    assert!(!SharedDeckRepo::soft_delete(&pool, id).await.unwrap());
    assert!(SharedDeckRepo::find_by_id(&pool, id).await.unwrap().is_none());
    assert!(SharedDeckRepo::slug_exists(&pool, "gone").await.unwrap());
    assert!(SharedDeckRepo::find_by_slug(&pool, "gone").await.unwrap().is_none());

    // Snapshots survive the listing.
    assert_eq!(
        SharedDeckSnapshotRepo::list_by_shared_deck(&pool, id)
            .await
            .unwrap()
            .len(),
        1
    );

    // The deck itself can be listed again, under a new slug only.
    let err = SharedDeckRepo::create_with_snapshot(&pool, &new_listing(&fx, "gone", &summary))
        .await
        .unwrap_err();
    assert_matches!(violated_unique(&err), Some("uq_shared_decks_slug"));
    SharedDeckRepo::create_with_snapshot(&pool, &new_listing(&fx, "back", &summary))
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_metadata_update_does_not_touch_version(pool: PgPool) {
    let fx = fixture(&pool, "author").await;
    add_note(&pool, &fx, "g1", "hola").await;
    let summary = summarize(&pool, fx.deck_id).await;
    let published = SharedDeckRepo::create_with_snapshot(&pool, &new_listing(&fx, "meta", &summary))
        .await
        .unwrap();

    let updated = SharedDeckRepo::update(
        &pool,
        published.shared_deck.id,
        &UpdateSharedDeck {
            title: Some("Renamed".to_string()),
            tags: Some(vec!["es".to_string()]),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.tags, vec!["es"]);
    assert_eq!(updated.version, 1);
    assert_eq!(updated.content_hash, published.shared_deck.content_hash);
    assert_eq!(updated.description.as_deref(), Some("Common words"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_filters_and_orders(pool: PgPool) {
    let a = fixture(&pool, "a").await;
    add_note(&pool, &a, "g1", "hola").await;
    let sa = summarize(&pool, a.deck_id).await;
    let plain = SharedDeckRepo::create_with_snapshot(&pool, &new_listing(&a, "plain", &sa))
        .await
        .unwrap();

    let b = fixture(&pool, "b").await;
    add_note(&pool, &b, "g1", "hola").await;
    let sb = summarize(&pool, b.deck_id).await;
    let mut listing = new_listing(&b, "featured-100", &sb);
    listing.title = "Featured 100% words".to_string();
    listing.language = "fr".to_string();
    let featured = SharedDeckRepo::create_with_snapshot(&pool, &listing).await.unwrap();
    SharedDeckRepo::set_flags(
        &pool,
        featured.shared_deck.id,
        &UpdateSharedDeckFlags {
            is_featured: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let c = fixture(&pool, "c").await;
    add_note(&pool, &c, "g1", "hola").await;
    let sc = summarize(&pool, c.deck_id).await;
    let hidden = SharedDeckRepo::create_with_snapshot(&pool, &new_listing(&c, "hidden", &sc))
        .await
        .unwrap();
    SharedDeckRepo::set_flags(
        &pool,
        hidden.shared_deck.id,
        &UpdateSharedDeckFlags {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    // Public search: inactive listing excluded, featured first.
    let page = SharedDeckRepo::search(&pool, &SharedDeckSearchParams::default(), false)
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.limit, 20);
    let ids: Vec<i64> = page.items.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![featured.shared_deck.id, plain.shared_deck.id]);

    // Admin view includes inactive listings.
    let all = SharedDeckRepo::search(&pool, &SharedDeckSearchParams::default(), true)
        .await
        .unwrap();
    assert_eq!(all.total, 3);

    // Language, tag and keyword filters. `%` in the keyword is literal.
    let fr = SharedDeckRepo::search(
        &pool,
        &SharedDeckSearchParams {
            language: Some("fr".to_string()),
            ..Default::default()
        },
        false,
    )
    .await
    .unwrap();
    assert_eq!(fr.total, 1);

    let tagged = SharedDeckRepo::search(
        &pool,
        &SharedDeckSearchParams {
            tag: Some("beginner".to_string()),
            ..Default::default()
        },
        false,
    )
    .await
    .unwrap();
    assert_eq!(tagged.total, 2);

    let keyword = SharedDeckRepo::search(
        &pool,
        &SharedDeckSearchParams {
            q: Some("100%".to_string()),
            ..Default::default()
        },
        false,
    )
    .await
    .unwrap();
    assert_eq!(keyword.total, 1);
    assert_eq!(keyword.items[0].id, featured.shared_deck.id);

    // Paging is clamped.
    let capped = SharedDeckRepo::search(
        &pool,
        &SharedDeckSearchParams {
            limit: Some(1000),
            offset: Some(-4),
            ..Default::default()
        },
        false,
    )
    .await
    .unwrap();
    assert_eq!(capped.limit, 100);
    assert_eq!(capped.offset, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_download_count_increments(pool: PgPool) {
    let fx = fixture(&pool, "author").await;
    add_note(&pool, &fx, "g1", "hola").await;
    let summary = summarize(&pool, fx.deck_id).await;
    let published = SharedDeckRepo::create_with_snapshot(&pool, &new_listing(&fx, "dl", &summary))
        .await
        .unwrap();
    let id = published.shared_deck.id;

    assert!(SharedDeckRepo::increment_download_count(&pool, id).await.unwrap());
    assert!(SharedDeckRepo::increment_download_count(&pool, id).await.unwrap());

    let after = SharedDeckRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(after.download_count, 2);
}
