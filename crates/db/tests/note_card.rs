//! Integration tests for notes, generated cards and reviews.

use std::collections::BTreeMap;

use deckhub_core::scheduler::{schedule, Rating, SchedulerKind};
use deckhub_db::models::card::CardListParams;
use deckhub_db::models::deck::CreateDeck;
use deckhub_db::models::note::{NewNote, NotePatch};
use deckhub_db::models::note_model::{
    CreateCardTemplate, CreateNoteModel, NewCardTemplate, UpdateCardTemplate,
};
use deckhub_db::models::review_log::{NewReviewLog, ReviewLogListParams};
use deckhub_db::models::user::CreateUser;
use deckhub_db::repositories::{
    CardRepo, DeckRepo, NoteModelRepo, NoteRepo, ReviewLogRepo, UserRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const NOW: i64 = 1_790_000_000_000;

/// Creates a user, a two-template model and a deck; returns their ids.
async fn seed(pool: &PgPool) -> (i64, i64, i64) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: "learner".to_string(),
            role: None,
        },
    )
    .await
    .unwrap();

    let template = |name: &str, ord: i32| CreateCardTemplate {
        name: name.to_string(),
        ord,
        question_template: "{{Front}}".to_string(),
        answer_template: "{{Back}}".to_string(),
    };
    let model = NoteModelRepo::create_with_templates(
        pool,
        user.id,
        &CreateNoteModel {
            name: "Basic (and reversed)".to_string(),
            fields_schema: vec!["Front".to_string(), "Back".to_string()],
            css: None,
            // Inserted out of order on purpose.
            templates: vec![template("Reverse", 1), template("Forward", 0)],
        },
    )
    .await
    .unwrap();
    assert_eq!(model.templates[0].ord, 0);

    let deck = DeckRepo::create(
        pool,
        user.id,
        &CreateDeck {
            name: "Vocab".to_string(),
            description: None,
            note_model_id: Some(model.model.id),
            scheduler: Some("fsrs".to_string()),
        },
    )
    .await
    .unwrap();

    (user.id, model.model.id, deck.id)
}

fn new_note(user_id: i64, model_id: i64, deck_id: i64, guid: &str) -> NewNote {
    NewNote {
        user_id,
        deck_id,
        note_model_id: model_id,
        guid: guid.to_string(),
        fields: BTreeMap::from([
            ("Front".to_string(), format!("front {guid}")),
            ("Back".to_string(), "back".to_string()),
        ]),
        tags: vec!["t".to_string()],
        source_type: "manual".to_string(),
        source_meta: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_note_creation_generates_one_card_per_template(pool: PgPool) {
    let (user_id, model_id, deck_id) = seed(&pool).await;

    let created = NoteRepo::create_with_cards(&pool, &new_note(user_id, model_id, deck_id, "a"))
        .await
        .unwrap();

    assert_eq!(created.cards.len(), 2);
    assert_eq!(created.cards[0].ord, 0);
    assert_eq!(created.cards[1].ord, 1);
    for card in &created.cards {
        assert_eq!(card.state, "new");
        assert_eq!(card.queue, "new");
        assert_eq!(card.due, 0);
        assert_eq!(card.interval_days, 0);
        assert_eq!(card.ease_factor, 2500);
        assert_eq!(card.note_id, created.note.id);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_batch_create_skips_duplicate_guids(pool: PgPool) {
    let (user_id, model_id, deck_id) = seed(&pool).await;
    NoteRepo::create_with_cards(&pool, &new_note(user_id, model_id, deck_id, "dup"))
        .await
        .unwrap();

    let batch = vec![
        new_note(user_id, model_id, deck_id, "dup"),
        new_note(user_id, model_id, deck_id, "fresh"),
        new_note(user_id, model_id, deck_id, "fresh"),
    ];
    let result = NoteRepo::create_batch(&pool, deck_id, &batch).await.unwrap();

    assert_eq!(result.created, 1);
    assert_eq!(result.skipped, 2);
    assert_eq!(result.notes[0].guid, "fresh");

    let notes = NoteRepo::list_by_deck(&pool, deck_id, 100, 0).await.unwrap();
    assert_eq!(notes.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_note_soft_delete_cascades_to_cards_and_content(pool: PgPool) {
    let (user_id, model_id, deck_id) = seed(&pool).await;
    let keep = NoteRepo::create_with_cards(&pool, &new_note(user_id, model_id, deck_id, "keep"))
        .await
        .unwrap();
    let drop = NoteRepo::create_with_cards(&pool, &new_note(user_id, model_id, deck_id, "drop"))
        .await
        .unwrap();

    assert!(NoteRepo::soft_delete(&pool, drop.note.id).await.unwrap());
    assert!(NoteRepo::find_by_id(&pool, drop.note.id).await.unwrap().is_none());
    assert!(CardRepo::find_by_id(&pool, drop.cards[0].id)
        .await
        .unwrap()
        .is_none());

    let notes = NoteRepo::list_content_by_deck(&pool, deck_id).await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].guid, "keep");

    let cards = CardRepo::list_content_by_deck(&pool, deck_id).await.unwrap();
    assert_eq!(cards.len(), 2);
    assert!(cards.iter().all(|c| c.note_id == keep.note.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_note_patch_updates_fields_and_guid(pool: PgPool) {
    let (user_id, model_id, deck_id) = seed(&pool).await;
    let created = NoteRepo::create_with_cards(&pool, &new_note(user_id, model_id, deck_id, "old"))
        .await
        .unwrap();

    let patch = NotePatch {
        fields: Some(BTreeMap::from([("Front".to_string(), "new".to_string())])),
        guid: Some("new-guid".to_string()),
        tags: None,
    };
    let updated = NoteRepo::update(&pool, created.note.id, &patch)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.guid, "new-guid");
    assert_eq!(updated.fields.0.get("Front").map(String::as_str), Some("new"));
    assert_eq!(updated.tags, vec!["t"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deck_soft_delete_cascades(pool: PgPool) {
    let (user_id, model_id, deck_id) = seed(&pool).await;
    let created = NoteRepo::create_with_cards(&pool, &new_note(user_id, model_id, deck_id, "x"))
        .await
        .unwrap();

    assert!(DeckRepo::soft_delete(&pool, deck_id).await.unwrap());
    assert!(DeckRepo::find_by_id(&pool, deck_id).await.unwrap().is_none());
    assert!(NoteRepo::find_by_id(&pool, created.note.id).await.unwrap().is_none());
    assert!(!DeckRepo::soft_delete(&pool, deck_id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_card_filters_and_queue_update(pool: PgPool) {
    let (user_id, model_id, deck_id) = seed(&pool).await;
    let created = NoteRepo::create_with_cards(&pool, &new_note(user_id, model_id, deck_id, "q"))
        .await
        .unwrap();

    let suspended = CardRepo::update_queue(&pool, created.cards[0].id, "suspended")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(suspended.queue, "suspended");

    let params = CardListParams {
        queue: Some("suspended".to_string()),
        ..Default::default()
    };
    let found = CardRepo::list_by_deck(&pool, deck_id, &params, 50, 0).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, created.cards[0].id);

    let due = CardRepo::list_by_deck(
        &pool,
        deck_id,
        &CardListParams {
            due_before: Some(0),
            ..Default::default()
        },
        50,
        0,
    )
    .await
    .unwrap();
    assert_eq!(due.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_due_list_and_state_counts_skip_suspended(pool: PgPool) {
    let (user_id, model_id, deck_id) = seed(&pool).await;
    let created = NoteRepo::create_with_cards(&pool, &new_note(user_id, model_id, deck_id, "d"))
        .await
        .unwrap();
    CardRepo::update_queue(&pool, created.cards[1].id, "suspended")
        .await
        .unwrap();

    let due = CardRepo::list_due(&pool, user_id, Some(deck_id), Some(NOW), 100)
        .await
        .unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, created.cards[0].id);

    let other_user_due = CardRepo::list_due(&pool, user_id + 1, None, None, 100)
        .await
        .unwrap();
    assert!(other_user_due.is_empty());

    let counts = CardRepo::count_by_state(&pool, user_id, None).await.unwrap();
    assert_eq!(counts.total, 2);
    assert_eq!(counts.new, 2);
    assert_eq!(counts.suspended, 1);
    assert_eq!(counts.review, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleted_template_frees_ord_and_stops_generating_cards(pool: PgPool) {
    let (user_id, model_id, deck_id) = seed(&pool).await;
    let templates = NoteModelRepo::list_templates(&pool, model_id).await.unwrap();
    let reverse = &templates[1];

    assert!(NoteModelRepo::soft_delete_template(&pool, model_id, reverse.id)
        .await
        .unwrap());
    assert_eq!(NoteModelRepo::count_templates(&pool, model_id).await.unwrap(), 1);
    assert_eq!(NoteModelRepo::max_template_ord(&pool, model_id).await.unwrap(), Some(0));
    assert!(NoteModelRepo::find_template(&pool, model_id, reverse.id)
        .await
        .unwrap()
        .is_none());

    let created = NoteRepo::create_with_cards(&pool, &new_note(user_id, model_id, deck_id, "t"))
        .await
        .unwrap();
    assert_eq!(created.cards.len(), 1);

    // Ordinal 1 is free again.
    let replacement = NoteModelRepo::create_template(
        &pool,
        model_id,
        &NewCardTemplate {
            name: "Cloze".to_string(),
            ord: 1,
            question_template: "{{Front}}".to_string(),
            answer_template: "{{Back}}".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(replacement.ord, 1);

    let renamed = NoteModelRepo::update_template(
        &pool,
        model_id,
        replacement.id,
        &UpdateCardTemplate {
            name: Some("Cloze deletion".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(renamed.name, "Cloze deletion");
    assert_eq!(renamed.ord, 1);

    // Templates belong to their model.
    assert!(NoteModelRepo::find_template(&pool, model_id + 1, replacement.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_apply_review_updates_card_and_logs(pool: PgPool) {
    let (user_id, model_id, deck_id) = seed(&pool).await;
    let created = NoteRepo::create_with_cards(&pool, &new_note(user_id, model_id, deck_id, "r"))
        .await
        .unwrap();
    let card = &created.cards[0];

    let prev = card.scheduling_state().unwrap();
    let next = schedule(SchedulerKind::Sm2, &prev, Rating::Good, NOW).unwrap();
    let log = NewReviewLog {
        user_id,
        card_id: card.id,
        review_time: NOW,
        rating: Rating::Good.value(),
        prev: prev.clone(),
        next: next.clone(),
        duration_ms: Some(4200),
    };

    let (updated, entry) = CardRepo::apply_review(&pool, card.id, &next, &log)
        .await
        .unwrap()
        .expect("first review should apply");
    assert_eq!(updated.state, "review");
    assert_eq!(updated.reps, 1);
    assert_eq!(updated.interval_days, 1);
    assert_eq!(updated.last_review, Some(NOW));
    assert_eq!(entry.prev_state.as_deref(), Some("new"));
    assert_eq!(entry.new_state.as_deref(), Some("review"));
    assert_eq!(entry.rating, 3);

    // Replaying the same review is rejected by the reps guard.
    let replay = CardRepo::apply_review(&pool, card.id, &next, &log).await.unwrap();
    assert!(replay.is_none());

    let logs = ReviewLogRepo::list_by_user(&pool, user_id, &ReviewLogListParams::default(), 50, 0)
        .await
        .unwrap();
    assert_eq!(logs.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_review_stats(pool: PgPool) {
    let (user_id, model_id, deck_id) = seed(&pool).await;
    let created = NoteRepo::create_with_cards(&pool, &new_note(user_id, model_id, deck_id, "s"))
        .await
        .unwrap();

    let mut state = created.cards[0].scheduling_state().unwrap();
    let ratings = [(Rating::Again, NOW - 3 * 86_400_000), (Rating::Good, NOW), (Rating::Easy, NOW)];
    for (rating, at) in ratings {
        let next = schedule(SchedulerKind::Sm2, &state, rating, at).unwrap();
        let log = NewReviewLog {
            user_id,
            card_id: created.cards[0].id,
            review_time: at,
            rating: rating.value(),
            prev: state.clone(),
            next: next.clone(),
            duration_ms: None,
        };
        CardRepo::apply_review(&pool, created.cards[0].id, &next, &log)
            .await
            .unwrap()
            .unwrap();
        state = next;
    }

    let stats = ReviewLogRepo::stats(&pool, user_id, NOW - 1000, NOW - 7 * 86_400_000)
        .await
        .unwrap();
    assert_eq!(stats.total_reviews, 3);
    assert_eq!(stats.reviews_today, 2);
    assert_eq!(stats.reviews_this_week, 3);
    assert!((stats.average_rating - 8.0 / 3.0).abs() < 1e-9);
    assert!((stats.retention_rate - 2.0 / 3.0).abs() < 1e-9);
}
