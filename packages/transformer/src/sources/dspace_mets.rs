//! DSpace deposit records harvested as METS wrapping MODS.
//!
//! Only elements with direct text content are read; MODS wrappers such as a
//! `relatedItem` holding a nested `titleInfo` are skipped.

use std::sync::LazyLock;

use regex::Regex;
use roxmltree::Node;

use super::common::{extra_titles, first_title, header_identifier, list, metadata, text};
use crate::dates::validate_date;
use crate::error::FieldError;
use crate::models::{
    AlternateTitle, Contributor, Date, Field, FieldValue, Identifier, Link, Publisher,
    RelatedItem, Rights, Subject,
};
use crate::registry::{FieldContext, FieldResult, Layer, SourceRecord};
use crate::xml::{find_descendant, find_descendants, get_attribute, non_empty_text};

/// A handle such as `1721.1/142832`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static HANDLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)*/\d+$").expect("valid regex"));

/// Elements named `tag` with direct text, paired with that text.
fn texts<'a, 'input>(
    record: &SourceRecord<'a, 'input>,
    tag: &'a str,
) -> Result<Vec<(Node<'a, 'input>, String)>, FieldError> {
    Ok(find_descendants(metadata(record.xml()?)?, tag)
        .filter_map(|node| non_empty_text(node).map(|value| (node, value)))
        .collect())
}

fn main_titles(record: &SourceRecord<'_, '_>) -> Result<Vec<String>, FieldError> {
    Ok(texts(record, "title")?
        .into_iter()
        .filter(|(node, _)| get_attribute(*node, "type").is_none())
        .map(|(_, value)| value)
        .collect())
}

fn title(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    first_title(main_titles(record)?, ctx)
}

fn alternate_titles(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let mut titles: Vec<AlternateTitle> = texts(record, "title")?
        .into_iter()
        .filter_map(|(node, value)| {
            get_attribute(node, "type").map(|kind| AlternateTitle::new(value, Some(kind)))
        })
        .collect();
    titles.extend(extra_titles(main_titles(record)?));
    list(titles, FieldValue::AlternateTitles)
}

fn citation(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    text(
        texts(record, "identifier")?
            .into_iter()
            .find(|(node, _)| get_attribute(*node, "type") == Some("citation"))
            .map(|(_, value)| value),
    )
}

fn content_type(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let genres = texts(record, "genre")?.into_iter().map(|(_, v)| v).collect();
    list(genres, FieldValue::Texts)
}

fn contributors(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let names = find_descendants(metadata(record.xml()?)?, "name")
        .filter_map(|name| {
            let value = find_descendants(name, "namePart").find_map(non_empty_text)?;
            let role = find_descendants(name, "roleTerm").find_map(non_empty_text);
            Some(Contributor::new(
                value,
                Some(role.as_deref().unwrap_or("Not specified")),
            ))
        })
        .collect();
    list(names, FieldValue::Contributors)
}

/// Only the issue date is exposed in the METS output.
fn dates(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    let dates = texts(record, "dateIssued")?
        .into_iter()
        .next()
        .filter(|(_, value)| validate_date(value, ctx.source_record_id))
        .map(|(_, value)| Date::single(value, Some("Publication date")))
        .into_iter()
        .collect();
    list(dates, FieldValue::Dates)
}

/// MIME types of the public `ORIGINAL` bitstreams.
fn file_formats(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let formats = find_descendants(metadata(record.xml()?)?, "fileGrp")
        .filter(|group| get_attribute(*group, "USE") == Some("ORIGINAL"))
        .filter_map(|group| find_descendant(group, "file"))
        .filter_map(|file| get_attribute(file, "MIMETYPE").map(String::from))
        .collect();
    list(formats, FieldValue::Texts)
}

/// Fixed format for born-digital repository content.
pub(crate) fn electronic_resource(
    _: &SourceRecord<'_, '_>,
    _: &FieldContext<'_>,
) -> FieldResult {
    text(Some("electronic resource".to_string()))
}

fn identifiers(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let identifiers = texts(record, "identifier")?
        .into_iter()
        .filter(|(node, _)| get_attribute(*node, "type") != Some("citation"))
        .map(|(node, value)| {
            Identifier::new(
                value,
                Some(get_attribute(node, "type").unwrap_or("Not specified")),
            )
        })
        .collect();
    list(identifiers, FieldValue::Identifiers)
}

fn languages(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let languages = texts(record, "languageTerm")?
        .into_iter()
        .map(|(_, v)| v)
        .collect();
    list(languages, FieldValue::Texts)
}

fn uri_identifiers(record: &SourceRecord<'_, '_>) -> Result<Vec<String>, FieldError> {
    Ok(texts(record, "identifier")?
        .into_iter()
        .filter(|(node, _)| get_attribute(*node, "type") == Some("uri"))
        .map(|(_, value)| value)
        .collect())
}

fn links(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let links = uri_identifiers(record)?
        .into_iter()
        .map(|url| Link::new(url, Some("Digital object URL"), Some("Digital object URL")))
        .collect();
    list(links, FieldValue::Links)
}

fn numbering(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    text(
        texts(record, "relatedItem")?
            .into_iter()
            .find(|(node, _)| get_attribute(*node, "type") == Some("series"))
            .map(|(_, value)| value),
    )
}

fn publishers(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let publishers = texts(record, "publisher")?
        .into_iter()
        .map(|(_, name)| Publisher::named(name))
        .collect();
    list(publishers, FieldValue::Publishers)
}

fn related_items(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let items = texts(record, "relatedItem")?
        .into_iter()
        .filter(|(node, _)| get_attribute(*node, "type") != Some("series"))
        .map(|(node, description)| RelatedItem {
            description: Some(description),
            relationship: Some(
                get_attribute(node, "type")
                    .unwrap_or("Not specified")
                    .to_string(),
            ),
            ..RelatedItem::default()
        })
        .collect();
    list(items, FieldValue::RelatedItems)
}

fn rights(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let rights = texts(record, "accessCondition")?
        .into_iter()
        .map(|(node, description)| Rights {
            description: Some(description),
            kind: get_attribute(node, "type").map(String::from),
            ..Rights::default()
        })
        .collect();
    list(rights, FieldValue::Rights)
}

/// All topics as one subject; schemes are not exposed in the METS output.
fn subjects(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let topics: Vec<String> = texts(record, "topic")?.into_iter().map(|(_, v)| v).collect();
    let subjects = if topics.is_empty() {
        Vec::new()
    } else {
        vec![Subject::new(topics, Some("Subject scheme not provided"))]
    };
    list(subjects, FieldValue::Subjects)
}

fn summary(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let summary = texts(record, "abstract")?
        .into_iter()
        .map(|(_, v)| v)
        .collect();
    list(summary, FieldValue::Texts)
}

/// Handle URL when the record id is a handle, otherwise the first URI
/// identifier.
fn source_link(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    if let Some(base) = ctx.source.base_url {
        if HANDLE_PATTERN.is_match(ctx.source_record_id) {
            return text(Some(format!("{base}{}", ctx.source_record_id)));
        }
    }
    text(uri_identifiers(record)?.into_iter().next())
}

/// Third colon-separated part of the OAI identifier.
pub(crate) fn dspace_record_id(
    record: &SourceRecord<'_, '_>,
) -> Result<Option<String>, FieldError> {
    Ok(header_identifier(record.xml()?)
        .and_then(|id| id.split(':').nth(2).map(String::from))
        .filter(|id| !id.is_empty()))
}

pub(crate) static DSPACE_METS: Layer = Layer {
    name: "dspace-mets",
    fields: &[
        (Field::SourceLink, source_link),
        (Field::Title, title),
        (Field::AlternateTitles, alternate_titles),
        (Field::Citation, citation),
        (Field::ContentType, content_type),
        (Field::Contributors, contributors),
        (Field::Dates, dates),
        (Field::FileFormats, file_formats),
        (Field::Format, electronic_resource),
        (Field::Identifiers, identifiers),
        (Field::Languages, languages),
        (Field::Links, links),
        (Field::Numbering, numbering),
        (Field::Publishers, publishers),
        (Field::RelatedItems, related_items),
        (Field::Rights, rights),
        (Field::Subjects, subjects),
        (Field::Summary, summary),
    ],
    record_id: Some(dspace_record_id),
    is_deleted: None,
};
