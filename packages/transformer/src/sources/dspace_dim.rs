//! DSpace Intermediate Metadata (DIM) records, and the WHOAS repository
//! built on them.
//!
//! Every value is a `<dim:field element="..." qualifier="...">` with direct
//! text, so handlers select fields by element and qualifier.

use super::common::{extra_titles, first_title, list, metadata, text};
use super::dspace_mets::{dspace_record_id, electronic_resource};
use crate::dates::{validate_date, validate_date_range};
use crate::error::FieldError;
use crate::models::{
    AlternateTitle, Contributor, Date, DateRange, Field, FieldValue, Funder, Identifier, Link,
    Location, Note, Publisher, RelatedItem, Rights, Subject,
};
use crate::registry::{FieldContext, FieldResult, Layer, SourceRecord};
use crate::xml::{find_descendants, get_attribute, non_empty_text};

/// Content types that alone do not qualify a WHOAS record for the index.
const WHOAS_INVALID_CONTENT_TYPES: &[&str] = &[
    "article",
    "authority list",
    "book",
    "book chapter",
    "course",
    "no content type in source record",
    "other",
    "preprint",
    "presentation",
    "technical report",
    "thesis",
    "text",
    "working paper",
];

/// A `dim:field` with text.
struct DimField<'a> {
    qualifier: Option<&'a str>,
    value: String,
}

/// All `dim:field` elements for an element name, in document order.
fn dim_fields<'a>(
    record: &SourceRecord<'a, '_>,
    element: &str,
) -> Result<Vec<DimField<'a>>, FieldError> {
    Ok(find_descendants(metadata(record.xml()?)?, "field")
        .filter(|field| get_attribute(*field, "element") == Some(element))
        .filter_map(|field| {
            Some(DimField {
                qualifier: get_attribute(field, "qualifier"),
                value: non_empty_text(field)?,
            })
        })
        .collect())
}

/// Values for an element and exact qualifier.
fn qualified(
    record: &SourceRecord<'_, '_>,
    element: &str,
    qualifier: &str,
) -> Result<Vec<String>, FieldError> {
    Ok(dim_fields(record, element)?
        .into_iter()
        .filter(|f| f.qualifier == Some(qualifier))
        .map(|f| f.value)
        .collect())
}

fn values(record: &SourceRecord<'_, '_>, element: &str) -> Result<Vec<String>, FieldError> {
    Ok(dim_fields(record, element)?
        .into_iter()
        .map(|f| f.value)
        .collect())
}

fn main_titles(record: &SourceRecord<'_, '_>) -> Result<Vec<String>, FieldError> {
    Ok(dim_fields(record, "title")?
        .into_iter()
        .filter(|f| f.qualifier.is_none())
        .map(|f| f.value)
        .collect())
}

fn title(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    first_title(main_titles(record)?, ctx)
}

fn alternate_titles(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let mut titles: Vec<AlternateTitle> = dim_fields(record, "title")?
        .into_iter()
        .filter_map(|f| {
            f.qualifier
                .map(|kind| AlternateTitle::new(f.value, Some(kind)))
        })
        .collect();
    titles.extend(extra_titles(main_titles(record)?));
    list(titles, FieldValue::AlternateTitles)
}

fn citation(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    text(qualified(record, "identifier", "citation")?.into_iter().next())
}

fn content_type(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    list(values(record, "type")?, FieldValue::Texts)
}

fn contents(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    list(
        qualified(record, "description", "tableofcontents")?,
        FieldValue::Texts,
    )
}

fn contributors(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let mut contributors: Vec<Contributor> = values(record, "creator")?
        .into_iter()
        .map(|value| Contributor::new(value, Some("Creator")))
        .collect();
    contributors.extend(dim_fields(record, "contributor")?.into_iter().map(|f| {
        Contributor::new(f.value, Some(f.qualifier.unwrap_or("Not specified")))
    }));
    list(contributors, FieldValue::Contributors)
}

/// Typed dates, then temporal coverage as a range or a free-text note.
fn dates(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    let record_id = ctx.source_record_id;
    let mut dates: Vec<Date> = dim_fields(record, "date")?
        .into_iter()
        .filter(|f| validate_date(&f.value, record_id))
        .map(|f| {
            let kind = match f.qualifier {
                Some("issued") => Some("Publication date"),
                other => other,
            };
            Date::single(f.value, kind)
        })
        .collect();

    for coverage in qualified(record, "coverage", "temporal")? {
        match coverage.split_once('/') {
            Some((start, end)) => {
                if validate_date_range(start, end, record_id) {
                    dates.push(Date::ranged(
                        DateRange::inclusive(start, end),
                        Some("coverage"),
                    ));
                }
            }
            None => dates.push(Date {
                kind: Some("coverage".to_string()),
                note: Some(coverage),
                ..Date::default()
            }),
        }
    }
    list(dates, FieldValue::Dates)
}

fn file_formats(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    list(qualified(record, "format", "mimetype")?, FieldValue::Texts)
}

fn funding_information(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let funders = qualified(record, "description", "sponsorship")?
        .into_iter()
        .map(|name| Funder {
            funder_name: Some(name),
            ..Funder::default()
        })
        .collect();
    list(funders, FieldValue::Funders)
}

fn identifiers(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let identifiers = dim_fields(record, "identifier")?
        .into_iter()
        .filter(|f| f.qualifier != Some("citation"))
        .map(|f| Identifier::new(f.value, Some(f.qualifier.unwrap_or("Not specified"))))
        .collect();
    list(identifiers, FieldValue::Identifiers)
}

fn languages(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    list(values(record, "language")?, FieldValue::Texts)
}

fn links(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let links = qualified(record, "identifier", "uri")?
        .into_iter()
        .map(|url| Link::new(url, Some("Digital object URL"), Some("Digital object URL")))
        .collect();
    list(links, FieldValue::Links)
}

fn locations(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let locations = qualified(record, "coverage", "spatial")?
        .into_iter()
        .map(|place| Location::named(place, None))
        .collect();
    list(locations, FieldValue::Locations)
}

fn notes(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let notes = dim_fields(record, "description")?
        .into_iter()
        .filter(|f| {
            !matches!(
                f.qualifier,
                Some("abstract" | "provenance" | "sponsorship" | "tableofcontents")
            )
        })
        .map(|f| Note::new(vec![f.value], f.qualifier))
        .collect();
    list(notes, FieldValue::Notes)
}

fn publishers(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let publishers = values(record, "publisher")?
        .into_iter()
        .map(Publisher::named)
        .collect();
    list(publishers, FieldValue::Publishers)
}

fn related_items(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let items = dim_fields(record, "relation")?
        .into_iter()
        .map(|f| match f.qualifier {
            Some("uri") => RelatedItem {
                uri: Some(f.value),
                relationship: Some("Not specified".to_string()),
                ..RelatedItem::default()
            },
            qualifier => RelatedItem {
                description: Some(f.value),
                relationship: Some(qualifier.unwrap_or("Not specified").to_string()),
                ..RelatedItem::default()
            },
        })
        .collect();
    list(items, FieldValue::RelatedItems)
}

fn rights(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let rights = dim_fields(record, "rights")?
        .into_iter()
        .map(|f| match f.qualifier {
            Some("uri") => Rights {
                uri: Some(f.value),
                ..Rights::default()
            },
            qualifier => Rights {
                description: Some(f.value),
                kind: qualifier.map(String::from),
                ..Rights::default()
            },
        })
        .collect();
    list(rights, FieldValue::Rights)
}

/// Subjects grouped by scheme, in order of first appearance.
fn subjects(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let mut subjects: Vec<Subject> = Vec::new();
    for f in dim_fields(record, "subject")? {
        let scheme = f.qualifier.unwrap_or("Subject scheme not provided");
        match subjects
            .iter_mut()
            .find(|s| s.kind.as_deref() == Some(scheme))
        {
            Some(subject) => subject.value.push(f.value),
            None => subjects.push(Subject::new(vec![f.value], Some(scheme))),
        }
    }
    list(subjects, FieldValue::Subjects)
}

fn summary(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    list(
        qualified(record, "description", "abstract")?,
        FieldValue::Texts,
    )
}

pub(crate) static DSPACE_DIM: Layer = Layer {
    name: "dspace-dim",
    fields: &[
        (Field::Title, title),
        (Field::AlternateTitles, alternate_titles),
        (Field::Citation, citation),
        (Field::ContentType, content_type),
        (Field::Contents, contents),
        (Field::Contributors, contributors),
        (Field::Dates, dates),
        (Field::FileFormats, file_formats),
        (Field::Format, electronic_resource),
        (Field::FundingInformation, funding_information),
        (Field::Identifiers, identifiers),
        (Field::Languages, languages),
        (Field::Links, links),
        (Field::Locations, locations),
        (Field::Notes, notes),
        (Field::Publishers, publishers),
        (Field::RelatedItems, related_items),
        (Field::Rights, rights),
        (Field::Subjects, subjects),
        (Field::Summary, summary),
    ],
    record_id: Some(dspace_record_id),
    is_deleted: None,
};

/// Content types, rejecting records whose types are all excluded.
fn whoas_content_type(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let mut content_types = values(record, "type")?;
    if content_types.is_empty() {
        content_types.push("no content type in source record".to_string());
    }
    let all_invalid = content_types
        .iter()
        .all(|t| WHOAS_INVALID_CONTENT_TYPES.contains(&t.to_lowercase().as_str()));
    if all_invalid {
        return Err(FieldError::Excluded(format!(
            "Record skipped based on content type: \"{}\"",
            content_types.join(", ")
        )));
    }
    list(content_types, FieldValue::Texts)
}

pub(crate) static WHOAS: Layer = Layer::fields(
    "whoas",
    &[(Field::ContentType, whoas_content_type)],
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceName;
    use crate::registry::FieldFn;
    use pretty_assertions::assert_eq;

    fn wrap(fields: &str) -> String {
        format!(
            r#"<record xmlns="http://www.openarchives.org/OAI/2.0/">
  <header><identifier>oai:darchive.mblwhoilibrary.org:1912/2641</identifier></header>
  <metadata>
    <dim:dim xmlns:dim="http://www.dspace.org/xmlns/dspace/dim">{fields}</dim:dim>
  </metadata>
</record>"#
        )
    }

    fn field(element: &str, qualifier: Option<&str>, value: &str) -> String {
        match qualifier {
            Some(q) => format!(
                r#"<dim:field mdschema="dc" element="{element}" qualifier="{q}">{value}</dim:field>"#
            ),
            None => format!(r#"<dim:field mdschema="dc" element="{element}">{value}</dim:field>"#),
        }
    }

    fn run(xml: &str, handler: FieldFn) -> FieldResult {
        let doc = roxmltree::Document::parse(xml).unwrap();
        let source = SourceName::Whoas.config();
        let ctx = FieldContext {
            source: &source,
            source_record_id: "1912/2641",
        };
        handler(&SourceRecord::Xml(doc.root_element()), &ctx)
    }

    #[test]
    fn test_record_id() {
        let xml = wrap("");
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let id = dspace_record_id(&SourceRecord::Xml(doc.root_element())).unwrap();
        assert_eq!(id.as_deref(), Some("1912/2641"));
    }

    #[test]
    fn test_titles_by_qualifier() {
        let xml = wrap(
            &[
                field("title", None, "Woods Hole currents"),
                field("title", Some("alternative"), "Currents"),
            ]
            .concat(),
        );
        assert_eq!(
            run(&xml, title).unwrap(),
            Some(FieldValue::Text("Woods Hole currents".into()))
        );
        assert_eq!(
            run(&xml, alternate_titles).unwrap(),
            Some(FieldValue::AlternateTitles(vec![AlternateTitle::new(
                "Currents",
                Some("alternative")
            )]))
        );
    }

    #[test]
    fn test_dates_and_coverage() {
        let xml = wrap(
            &[
                field("date", Some("issued"), "2006-03"),
                field("date", Some("accessioned"), "2006-04-05T12:00:00Z"),
                field("date", Some("available"), "not a date 1"),
                field("coverage", Some("temporal"), "1990-01-01/1995-12-31"),
                field("coverage", Some("temporal"), "1999/1990"),
                field("coverage", Some("temporal"), "Holocene"),
            ]
            .concat(),
        );
        assert_eq!(
            run(&xml, dates).unwrap(),
            Some(FieldValue::Dates(vec![
                Date::single("2006-03", Some("Publication date")),
                Date::single("2006-04-05T12:00:00Z", Some("accessioned")),
                Date::ranged(
                    DateRange::inclusive("1990-01-01", "1995-12-31"),
                    Some("coverage")
                ),
                Date {
                    kind: Some("coverage".into()),
                    note: Some("Holocene".into()),
                    ..Date::default()
                },
            ]))
        );
    }

    #[test]
    fn test_contributors_creators_first() {
        let xml = wrap(
            &[
                field("contributor", Some("advisor"), "Lee, Ann"),
                field("contributor", None, "Woods, Tom"),
                field("creator", None, "Ocean Lab"),
            ]
            .concat(),
        );
        assert_eq!(
            run(&xml, contributors).unwrap(),
            Some(FieldValue::Contributors(vec![
                Contributor::new("Ocean Lab", Some("Creator")),
                Contributor::new("Lee, Ann", Some("advisor")),
                Contributor::new("Woods, Tom", Some("Not specified")),
            ]))
        );
    }

    #[test]
    fn test_descriptions_split_by_qualifier() {
        let xml = wrap(
            &[
                field("description", Some("abstract"), "An abstract."),
                field("description", Some("sponsorship"), "NSF"),
                field("description", Some("provenance"), "Submitted by x"),
                field("description", None, "A general note."),
                field("description", Some("tableofcontents"), "Part 1"),
            ]
            .concat(),
        );
        assert_eq!(
            run(&xml, summary).unwrap(),
            Some(FieldValue::Texts(vec!["An abstract.".into()]))
        );
        assert_eq!(
            run(&xml, notes).unwrap(),
            Some(FieldValue::Notes(vec![Note::new(
                vec!["A general note.".into()],
                None
            )]))
        );
        assert_eq!(
            run(&xml, funding_information).unwrap(),
            Some(FieldValue::Funders(vec![Funder {
                funder_name: Some("NSF".into()),
                ..Funder::default()
            }]))
        );
        assert_eq!(
            run(&xml, contents).unwrap(),
            Some(FieldValue::Texts(vec!["Part 1".into()]))
        );
    }

    #[test]
    fn test_subjects_grouped_by_scheme() {
        let xml = wrap(
            &[
                field("subject", None, "Currents"),
                field("subject", Some("lcsh"), "Oceanography"),
                field("subject", None, "Tides"),
            ]
            .concat(),
        );
        assert_eq!(
            run(&xml, subjects).unwrap(),
            Some(FieldValue::Subjects(vec![
                Subject::new(
                    vec!["Currents".into(), "Tides".into()],
                    Some("Subject scheme not provided")
                ),
                Subject::new(vec!["Oceanography".into()], Some("lcsh")),
            ]))
        );
    }

    #[test]
    fn test_relations_and_rights_by_uri_qualifier() {
        let xml = wrap(
            &[
                field("relation", Some("uri"), "https://doi.org/10.1/x"),
                field("relation", Some("ispartof"), "Series A"),
                field("rights", Some("uri"), "https://creativecommons.org/licenses/by/4.0/"),
                field("rights", None, "CC BY"),
            ]
            .concat(),
        );
        assert_eq!(
            run(&xml, related_items).unwrap(),
            Some(FieldValue::RelatedItems(vec![
                RelatedItem {
                    uri: Some("https://doi.org/10.1/x".into()),
                    relationship: Some("Not specified".into()),
                    ..RelatedItem::default()
                },
                RelatedItem {
                    description: Some("Series A".into()),
                    relationship: Some("ispartof".into()),
                    ..RelatedItem::default()
                },
            ]))
        );
        assert_eq!(
            run(&xml, rights).unwrap(),
            Some(FieldValue::Rights(vec![
                Rights {
                    uri: Some("https://creativecommons.org/licenses/by/4.0/".into()),
                    ..Rights::default()
                },
                Rights {
                    description: Some("CC BY".into()),
                    ..Rights::default()
                },
            ]))
        );
    }

    #[test]
    fn test_whoas_accepts_mixed_content_types() {
        let xml = wrap(
            &[
                field("type", None, "Article"),
                field("type", None, "Dataset"),
            ]
            .concat(),
        );
        assert_eq!(
            run(&xml, whoas_content_type).unwrap(),
            Some(FieldValue::Texts(vec!["Article".into(), "Dataset".into()]))
        );
    }

    #[test]
    fn test_whoas_rejects_invalid_content_types() {
        let xml = wrap(&field("type", None, "Thesis"));
        assert_eq!(
            run(&xml, whoas_content_type).unwrap_err(),
            FieldError::Excluded("Record skipped based on content type: \"Thesis\"".into())
        );
        assert!(matches!(
            run(&wrap(""), whoas_content_type),
            Err(FieldError::Excluded(_))
        ));
    }
}
