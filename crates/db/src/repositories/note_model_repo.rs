//! Repository for the `note_models` and `card_templates` tables.

use deckhub_core::types::DbId;
use sqlx::PgPool;

use crate::models::note_model::{
    CardTemplate, CreateNoteModel, NewCardTemplate, NoteModel, NoteModelWithTemplates,
    UpdateCardTemplate, UpdateNoteModel,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, name, fields_schema, css, deleted_at, created_at, updated_at";

const TEMPLATE_COLUMNS: &str = "id, note_model_id, name, ord, question_template, \
    answer_template, deleted_at, created_at, updated_at";

/// Provides CRUD operations for note models and their card templates.
pub struct NoteModelRepo;

impl NoteModelRepo {
    // ── Note models ──────────────────────────────────────────────────

    /// Insert a note model and all of its templates in one transaction.
    pub async fn create_with_templates(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateNoteModel,
    ) -> Result<NoteModelWithTemplates, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO note_models (user_id, name, fields_schema, css)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let model = sqlx::query_as::<_, NoteModel>(&query)
            .bind(user_id)
            .bind(&input.name)
            .bind(&input.fields_schema)
            .bind(&input.css)
            .fetch_one(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO card_templates
                (note_model_id, name, ord, question_template, answer_template)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {TEMPLATE_COLUMNS}"
        );
        let mut templates = Vec::with_capacity(input.templates.len());
        for template in &input.templates {
            let row = sqlx::query_as::<_, CardTemplate>(&query)
                .bind(model.id)
                .bind(&template.name)
                .bind(template.ord)
                .bind(&template.question_template)
                .bind(&template.answer_template)
                .fetch_one(&mut *tx)
                .await?;
            templates.push(row);
        }
        templates.sort_by_key(|t| t.ord);

        tx.commit().await?;
        Ok(NoteModelWithTemplates { model, templates })
    }

    /// Find a note model by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<NoteModel>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM note_models WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, NoteModel>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's note models by name.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<NoteModel>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM note_models
             WHERE user_id = $1 AND deleted_at IS NULL
             ORDER BY name, id"
        );
        sqlx::query_as::<_, NoteModel>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update a note model. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists (or is soft-deleted).
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateNoteModel,
    ) -> Result<Option<NoteModel>, sqlx::Error> {
        let query = format!(
            "UPDATE note_models SET
                name = COALESCE($2, name),
                fields_schema = COALESCE($3, fields_schema),
                css = COALESCE($4, css)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NoteModel>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.fields_schema)
            .bind(&input.css)
            .fetch_optional(pool)
            .await
    }

    // ── Templates ────────────────────────────────────────────────────

    /// List the live templates of a note model ordered by `ord`.
    pub async fn list_templates(
        pool: &PgPool,
        note_model_id: DbId,
    ) -> Result<Vec<CardTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {TEMPLATE_COLUMNS} FROM card_templates
             WHERE note_model_id = $1 AND deleted_at IS NULL
             ORDER BY ord"
        );
        sqlx::query_as::<_, CardTemplate>(&query)
            .bind(note_model_id)
            .fetch_all(pool)
            .await
    }

    /// Find one live template of a note model.
    pub async fn find_template(
        pool: &PgPool,
        note_model_id: DbId,
        template_id: DbId,
    ) -> Result<Option<CardTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {TEMPLATE_COLUMNS} FROM card_templates
             WHERE id = $1 AND note_model_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, CardTemplate>(&query)
            .bind(template_id)
            .bind(note_model_id)
            .fetch_optional(pool)
            .await
    }

    /// Highest live template ordinal of a note model, if it has any.
    pub async fn max_template_ord(
        pool: &PgPool,
        note_model_id: DbId,
    ) -> Result<Option<i32>, sqlx::Error> {
        let row: (Option<i32>,) = sqlx::query_as(
            "SELECT MAX(ord) FROM card_templates WHERE note_model_id = $1 AND deleted_at IS NULL",
        )
        .bind(note_model_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Number of live templates of a note model.
    pub async fn count_templates(pool: &PgPool, note_model_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM card_templates WHERE note_model_id = $1 AND deleted_at IS NULL",
        )
        .bind(note_model_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Add a template to a note model. Existing notes get no new cards.
    ///
    /// A live template already at `input.ord` fails with a unique violation.
    pub async fn create_template(
        pool: &PgPool,
        note_model_id: DbId,
        input: &NewCardTemplate,
    ) -> Result<CardTemplate, sqlx::Error> {
        let query = format!(
            "INSERT INTO card_templates
                (note_model_id, name, ord, question_template, answer_template)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {TEMPLATE_COLUMNS}"
        );
        sqlx::query_as::<_, CardTemplate>(&query)
            .bind(note_model_id)
            .bind(&input.name)
            .bind(input.ord)
            .bind(&input.question_template)
            .bind(&input.answer_template)
            .fetch_one(pool)
            .await
    }

    /// Update a template. Only non-`None` fields are applied.
    pub async fn update_template(
        pool: &PgPool,
        note_model_id: DbId,
        template_id: DbId,
        input: &UpdateCardTemplate,
    ) -> Result<Option<CardTemplate>, sqlx::Error> {
        let query = format!(
            "UPDATE card_templates SET
                name = COALESCE($3, name),
                ord = COALESCE($4, ord),
                question_template = COALESCE($5, question_template),
                answer_template = COALESCE($6, answer_template)
             WHERE id = $1 AND note_model_id = $2 AND deleted_at IS NULL
             RETURNING {TEMPLATE_COLUMNS}"
        );
        sqlx::query_as::<_, CardTemplate>(&query)
            .bind(template_id)
            .bind(note_model_id)
            .bind(&input.name)
            .bind(input.ord)
            .bind(&input.question_template)
            .bind(&input.answer_template)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a template. Cards already generated from it are kept.
    pub async fn soft_delete_template(
        pool: &PgPool,
        note_model_id: DbId,
        template_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE card_templates SET deleted_at = NOW()
             WHERE id = $1 AND note_model_id = $2 AND deleted_at IS NULL",
        )
        .bind(template_id)
        .bind(note_model_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Deletion ─────────────────────────────────────────────────────

    /// Soft-delete a note model. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE note_models SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether any live note still uses this model.
    pub async fn has_notes(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM notes WHERE note_model_id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
