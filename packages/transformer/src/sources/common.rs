//! Base layers and helpers shared by every source family.
//!
//! `XML_BASE` reads identity from the OAI-PMH header wrapped around each
//! harvested record; `JSON_BASE` reads it from the `id` key of a JSON
//! record. Both provide the default source, source link and record
//! identifier handlers.

use roxmltree::Node;
use tracing::debug;

use crate::error::FieldError;
use crate::models::{AlternateTitle, Field, FieldValue};
use crate::registry::{FieldContext, FieldResult, Layer, SourceRecord};
use crate::xml::{find_by_path, find_child, get_attribute, non_empty_text};

/// Display name of the source.
pub(crate) fn source_name(_: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    Ok(Some(FieldValue::Text(ctx.source.name.to_string())))
}

/// Source base URL followed by the source record identifier.
pub(crate) fn base_url_link(_: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    Ok(ctx
        .source
        .base_url
        .map(|base| FieldValue::Text(format!("{base}{}", ctx.source_record_id))))
}

/// Record identifier in `label:id` form.
pub(crate) fn timdex_record_id(_: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    Ok(Some(FieldValue::Text(ctx.timdex_record_id())))
}

/// The OAI-PMH `<header>` of a harvested record.
pub(crate) fn header<'a, 'input>(record: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    find_child(record, "header")
}

/// Text of `header/identifier`, if present and non-blank.
pub(crate) fn header_identifier(record: Node<'_, '_>) -> Option<String> {
    find_by_path(record, "header/identifier").and_then(non_empty_text)
}

/// The `<metadata>` element of a harvested record.
///
/// # Errors
/// Returns `FieldError::Structural` when the record has no metadata.
pub(crate) fn metadata<'a, 'input>(
    record: Node<'a, 'input>,
) -> Result<Node<'a, 'input>, FieldError> {
    find_child(record, "metadata").ok_or_else(|| {
        FieldError::Structural(
            "Record skipped because key information is missing: <metadata>.".to_string(),
        )
    })
}

fn oai_identifier(record: &SourceRecord<'_, '_>) -> Result<Option<String>, FieldError> {
    Ok(header_identifier(record.xml()?))
}

fn oai_deleted(record: &SourceRecord<'_, '_>) -> Result<bool, FieldError> {
    Ok(header(record.xml()?).and_then(|h| get_attribute(h, "status")) == Some("deleted"))
}

fn json_identifier(record: &SourceRecord<'_, '_>) -> Result<Option<String>, FieldError> {
    let map = record.json()?;
    Ok(match map.get("id") {
        Some(serde_json::Value::String(id)) => {
            Some(id.trim().to_string()).filter(|s| !s.is_empty())
        }
        Some(serde_json::Value::Number(id)) => Some(id.to_string()),
        _ => None,
    })
}

fn never_deleted(record: &SourceRecord<'_, '_>) -> Result<bool, FieldError> {
    record.json().map(|_| false)
}

/// Identity and defaults for OAI-PMH harvested XML records.
pub(crate) static XML_BASE: Layer = Layer {
    name: "xml-base",
    fields: &[
        (Field::Source, source_name),
        (Field::SourceLink, base_url_link),
        (Field::TimdexRecordId, timdex_record_id),
    ],
    record_id: Some(oai_identifier),
    is_deleted: Some(oai_deleted),
};

/// Identity and defaults for JSON records.
pub(crate) static JSON_BASE: Layer = Layer {
    name: "json-base",
    fields: &[
        (Field::Source, source_name),
        (Field::SourceLink, base_url_link),
        (Field::TimdexRecordId, timdex_record_id),
    ],
    record_id: Some(json_identifier),
    is_deleted: Some(never_deleted),
};

/// The first main title; extra titles become alternate titles.
pub(crate) fn first_title(titles: Vec<String>, ctx: &FieldContext<'_>) -> FieldResult {
    if titles.len() > 1 {
        debug!(
            record_id = ctx.source_record_id,
            ?titles,
            "Record has multiple titles, using the first"
        );
    }
    Ok(titles.into_iter().next().map(FieldValue::Text))
}

/// Main titles after the first, as untyped alternate titles.
pub(crate) fn extra_titles(titles: Vec<String>) -> Vec<AlternateTitle> {
    titles
        .into_iter()
        .skip(1)
        .map(|title| AlternateTitle::new(title, None))
        .collect()
}

/// Wrap a list in a field value; `None` when it is empty.
pub(crate) fn list<T>(items: Vec<T>, wrap: fn(Vec<T>) -> FieldValue) -> FieldResult {
    Ok((!items.is_empty()).then(|| wrap(items)))
}

/// Wrap an optional string in a text field value.
pub(crate) fn text(value: Option<String>) -> FieldResult {
    Ok(value.map(FieldValue::Text))
}

/// Collapse runs of whitespace into single spaces.
pub(crate) fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim trailing characters from `chars`, the way catalogers' punctuation is
/// removed from MARC values.
pub(crate) fn trim_end_chars<'a>(value: &'a str, chars: &str) -> &'a str {
    value.trim_end_matches(|c: char| chars.contains(c))
}
