//! Generic OAI Dublin Core records.
//!
//! Expected to be extended by a source specific layer; on its own it already
//! yields a complete record.

use super::common::{first_title, header_identifier, list, metadata};
use super::dspace_mets::electronic_resource;
use crate::dates::validate_date;
use crate::error::FieldError;
use crate::models::{Contributor, Date, Field, FieldValue, Identifier, Publisher, Subject};
use crate::registry::{FieldContext, FieldResult, Layer, SourceRecord};
use crate::xml::{find_descendants, non_empty_text};

/// Direct text of every `dc:<tag>` in the metadata.
pub(crate) fn dc_values(
    record: &SourceRecord<'_, '_>,
    tag: &str,
) -> Result<Vec<String>, FieldError> {
    Ok(find_descendants(metadata(record.xml()?)?, tag)
        .filter_map(non_empty_text)
        .collect())
}

fn title(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    first_title(dc_values(record, "title")?, ctx)
}

fn content_type(_: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    list(vec![ctx.source.label.to_string()], FieldValue::Texts)
}

fn contributors(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let creators = dc_values(record, "creator")?
        .into_iter()
        .map(|value| Contributor::new(value, Some("Creator")))
        .collect();
    list(creators, FieldValue::Contributors)
}

fn dates(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    let dates = dc_values(record, "date")?
        .into_iter()
        .filter(|value| validate_date(value, ctx.source_record_id))
        .map(|value| Date::single(value, Some("Unknown")))
        .collect();
    list(dates, FieldValue::Dates)
}

fn identifiers(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let identifiers = header_identifier(record.xml()?)
        .map(|id| Identifier::new(id, Some("OAI-PMH")))
        .into_iter()
        .collect();
    list(identifiers, FieldValue::Identifiers)
}

fn publishers(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let publishers = dc_values(record, "publisher")?
        .into_iter()
        .map(Publisher::named)
        .collect();
    list(publishers, FieldValue::Publishers)
}

fn subjects(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let subjects = dc_values(record, "subject")?;
    let subjects = if subjects.is_empty() {
        Vec::new()
    } else {
        vec![Subject::new(subjects, Some("Subject scheme not provided"))]
    };
    list(subjects, FieldValue::Subjects)
}

fn summary(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    list(dc_values(record, "description")?, FieldValue::Texts)
}

/// Last colon-separated part of the OAI identifier.
fn record_id(record: &SourceRecord<'_, '_>) -> Result<Option<String>, FieldError> {
    Ok(header_identifier(record.xml()?)
        .and_then(|id| id.rsplit(':').next().map(String::from))
        .filter(|id| !id.is_empty()))
}

pub(crate) static OAI_DC: Layer = Layer {
    name: "oai-dc",
    fields: &[
        (Field::Title, title),
        (Field::ContentType, content_type),
        (Field::Contributors, contributors),
        (Field::Dates, dates),
        (Field::Format, electronic_resource),
        (Field::Identifiers, identifiers),
        (Field::Publishers, publishers),
        (Field::Subjects, subjects),
        (Field::Summary, summary),
    ],
    record_id: Some(record_id),
    is_deleted: None,
};
