//! Note, note model and card template rules.

use std::collections::{BTreeMap, HashSet};

use crate::error::CoreError;
use crate::hashing::sha256_hex_prefix;

/// Length of a generated note GUID in hex characters.
pub const GUID_LEN: usize = 32;

pub const MAX_FIELD_NAME_LEN: usize = 50;
pub const MAX_MODEL_NAME_LEN: usize = 100;
pub const MAX_TEMPLATE_NAME_LEN: usize = 100;
pub const MAX_NOTE_TAGS: usize = 50;

/// Default field names for a note model created without a schema.
pub const DEFAULT_FIELDS: &[&str] = &["Front", "Back"];

pub const DEFAULT_QUESTION_TEMPLATE: &str = "{{Front}}";
pub const DEFAULT_ANSWER_TEMPLATE: &str = "{{FrontSide}}<hr>{{Back}}";

/// Note origin, stored in `notes.source_type`.
pub const SOURCE_MANUAL: &str = "manual";
pub const SOURCE_AI: &str = "ai";
pub const SOURCE_IMPORT: &str = "import";

pub const VALID_SOURCE_TYPES: &[&str] = &[SOURCE_MANUAL, SOURCE_AI, SOURCE_IMPORT];

/// Derive a note's GUID from its content.
///
/// The GUID is the SHA-256 prefix of the first non-empty field value, taken
/// in schema order. Two notes with the same leading content in a deck are
/// treated as duplicates by batch import.
pub fn generate_guid(schema: &[String], fields: &BTreeMap<String, String>) -> String {
    let content = schema
        .iter()
        .filter_map(|name| fields.get(name))
        .find(|value| !value.is_empty())
        .map(String::as_str)
        .unwrap_or("");
    sha256_hex_prefix(content.as_bytes(), GUID_LEN)
}

/// Validate a note model's ordered field names.
pub fn validate_field_schema(names: &[String]) -> Result<(), CoreError> {
    if names.is_empty() {
        return Err(CoreError::Validation(
            "A note model needs at least one field".into(),
        ));
    }
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(CoreError::Validation("Field names must not be empty".into()));
        }
        if name.chars().count() > MAX_FIELD_NAME_LEN {
            return Err(CoreError::Validation(format!(
                "Field names must be at most {MAX_FIELD_NAME_LEN} characters"
            )));
        }
        if !seen.insert(name.as_str()) {
            return Err(CoreError::Validation(format!(
                "Duplicate field name '{name}'"
            )));
        }
    }
    Ok(())
}

pub fn validate_model_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() || name.chars().count() > MAX_MODEL_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Note model name must be 1 to {MAX_MODEL_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate card templates as `(name, ord)` pairs: at least one, names
/// non-blank, ordinals non-negative and unique.
pub fn validate_templates(templates: &[(&str, i32)]) -> Result<(), CoreError> {
    if templates.is_empty() {
        return Err(CoreError::Validation(
            "A note model needs at least one card template".into(),
        ));
    }
    let mut ords = HashSet::new();
    for (name, ord) in templates {
        validate_template(name, *ord)?;
        if !ords.insert(*ord) {
            return Err(CoreError::Validation(format!(
                "Duplicate template ord {ord}"
            )));
        }
    }
    Ok(())
}

/// Validate one template's name and ordinal.
pub fn validate_template(name: &str, ord: i32) -> Result<(), CoreError> {
    if name.trim().is_empty() || name.chars().count() > MAX_TEMPLATE_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Template name must be 1 to {MAX_TEMPLATE_NAME_LEN} characters"
        )));
    }
    if ord < 0 {
        return Err(CoreError::Validation(
            "Template ord must be non-negative".into(),
        ));
    }
    Ok(())
}

/// Ordinal for a template added to a model whose highest live ordinal is
/// `max_ord`. A requested ordinal above every existing one is kept;
/// anything else appends after the last template.
pub fn next_template_ord(requested: Option<i32>, max_ord: Option<i32>) -> i32 {
    match (requested, max_ord) {
        (Some(ord), Some(max)) if ord > max => ord,
        (_, Some(max)) => max + 1,
        (Some(ord), None) => ord.max(0),
        (None, None) => 0,
    }
}

/// Validate note field values against the model schema.
///
/// Every key must be a schema field and at least one value must be non-empty.
pub fn validate_fields(
    schema: &[String],
    fields: &BTreeMap<String, String>,
) -> Result<(), CoreError> {
    if let Some(unknown) = fields.keys().find(|k| !schema.contains(k)) {
        return Err(CoreError::Validation(format!(
            "Unknown field '{unknown}' for this note model"
        )));
    }
    if fields.values().all(|v| v.trim().is_empty()) {
        return Err(CoreError::Validation(
            "A note needs at least one non-empty field".into(),
        ));
    }
    Ok(())
}

pub fn validate_note_tags(tags: &[String]) -> Result<(), CoreError> {
    if tags.len() > MAX_NOTE_TAGS {
        return Err(CoreError::Validation(format!(
            "A note can have at most {MAX_NOTE_TAGS} tags"
        )));
    }
    if tags.iter().any(|t| t.trim().is_empty()) {
        return Err(CoreError::Validation("Tags must not be empty".into()));
    }
    Ok(())
}

pub fn validate_source_type(source_type: &str) -> Result<(), CoreError> {
    if !VALID_SOURCE_TYPES.contains(&source_type) {
        return Err(CoreError::Validation(format!(
            "Invalid source type '{}'. Valid types: {}",
            source_type,
            VALID_SOURCE_TYPES.join(", ")
        )));
    }
    Ok(())
}
