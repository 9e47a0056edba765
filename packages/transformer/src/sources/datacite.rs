//! DataCite kernel records harvested as `oai_datacite`.
//!
//! Used directly for the J-PAL Dataverse and, with a narrower content type
//! rule, for Zenodo.

use roxmltree::Node;
use tracing::warn;

use super::common::{extra_titles, first_title, header_identifier, list, metadata, text};
use super::dspace_mets::electronic_resource;
use crate::dates::{validate_date, validate_date_range};
use crate::error::FieldError;
use crate::models::{
    AlternateTitle, Contributor, Date, DateRange, Field, FieldValue, Funder, Identifier, Link,
    Location, Note, Publisher, RelatedItem, Rights, Subject,
};
use crate::registry::{FieldContext, FieldResult, Layer, SourceRecord};
use crate::xml::{find_descendant, find_descendants, get_attribute, non_empty_text};

const NOT_SPECIFIED: &str = "Not specified";

/// Resource types Zenodo records may carry to be kept.
const ZENODO_CONTENT_TYPES: &[&str] = &[
    "dataset",
    "diagram",
    "drawing",
    "figure",
    "image",
    "other",
    "photo",
    "physicalobject",
    "plot",
    "software",
    "taxonomictreatment",
    "video",
];

fn resource<'a, 'input>(
    record: &SourceRecord<'a, 'input>,
) -> Result<Node<'a, 'input>, FieldError> {
    metadata(record.xml()?)
}

/// Elements with the given tag under the metadata, paired with their text.
fn texts<'a, 'input>(
    record: &SourceRecord<'a, 'input>,
    tag: &'static str,
) -> Result<Vec<(Node<'a, 'input>, String)>, FieldError> {
    Ok(find_descendants(resource(record)?, tag)
        .filter_map(|node| non_empty_text(node).map(|value| (node, value)))
        .collect())
}

fn first_text(
    record: &SourceRecord<'_, '_>,
    tag: &'static str,
) -> Result<Option<String>, FieldError> {
    Ok(texts(record, tag)?.into_iter().next().map(|(_, value)| value))
}

fn attribute(node: Node<'_, '_>, name: &str) -> Option<String> {
    get_attribute(node, name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn main_titles(record: &SourceRecord<'_, '_>) -> Result<Vec<String>, FieldError> {
    Ok(texts(record, "title")?
        .into_iter()
        .filter(|(node, _)| attribute(*node, "titleType").is_none())
        .map(|(_, title)| title)
        .collect())
}

fn name_identifier_url(node: Node<'_, '_>, value: &str) -> String {
    match get_attribute(node, "nameIdentifierScheme") {
        Some("ORCID") => format!("https://orcid.org/{value}"),
        _ => value.to_string(),
    }
}

fn related_identifier_url(node: Node<'_, '_>, value: &str) -> String {
    match get_attribute(node, "relatedIdentifierType") {
        Some("DOI") => format!("https://doi.org/{value}"),
        _ => value.to_string(),
    }
}

fn optional_list(values: Vec<String>) -> Option<Vec<String>> {
    (!values.is_empty()).then_some(values)
}

/// A creator or contributor with its affiliations and name identifiers.
fn agent(node: Node<'_, '_>, name_tag: &str, kind: String) -> Option<Contributor> {
    let value = find_descendant(node, name_tag).and_then(non_empty_text)?;
    let affiliation = find_descendants(node, "affiliation")
        .filter_map(non_empty_text)
        .collect();
    let identifier = find_descendants(node, "nameIdentifier")
        .filter_map(|n| non_empty_text(n).map(|v| name_identifier_url(n, &v)))
        .collect();
    Some(Contributor {
        value,
        affiliation: optional_list(affiliation),
        identifier: optional_list(identifier),
        kind: Some(kind),
        mit_affiliated: None,
    })
}

fn resource_type<'a, 'input>(
    record: &SourceRecord<'a, 'input>,
    ctx: &FieldContext<'_>,
) -> Result<Option<Node<'a, 'input>>, FieldError> {
    let node = find_descendant(resource(record)?, "resourceType");
    if node.is_none() {
        warn!(
            record_id = ctx.source_record_id,
            "DataCite record is missing required field resourceType"
        );
    }
    Ok(node)
}

fn title(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    first_title(main_titles(record)?, ctx)
}

fn alternate_titles(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let mut titles: Vec<AlternateTitle> = texts(record, "title")?
        .into_iter()
        .filter_map(|(node, title)| {
            attribute(node, "titleType").map(|kind| AlternateTitle::new(title, Some(&kind)))
        })
        .collect();
    titles.extend(extra_titles(main_titles(record)?));
    list(titles, FieldValue::AlternateTitles)
}

fn content_type(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    let general = resource_type(record, ctx)?.and_then(|n| attribute(n, "resourceTypeGeneral"));
    list(general.into_iter().collect(), FieldValue::Texts)
}

fn contributors(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let root = resource(record)?;
    let creators = find_descendants(root, "creator")
        .filter_map(|node| agent(node, "creatorName", "Creator".to_string()));
    let contributors = find_descendants(root, "contributor").filter_map(|node| {
        let kind = attribute(node, "contributorType").unwrap_or_else(|| NOT_SPECIFIED.to_string());
        agent(node, "contributorName", kind)
    });
    list(creators.chain(contributors).collect(), FieldValue::Contributors)
}

/// A typed `<date>`; `None` when nothing valid is left.
fn typed_date(node: Node<'_, '_>, record_id: &str) -> Option<Date> {
    let mut date = Date {
        note: attribute(node, "dateInformation"),
        ..Date::default()
    };
    if let Some(value) = non_empty_text(node) {
        match value.split_once('/') {
            Some((start, end)) => {
                let (start, end) = (start.trim(), end.trim());
                if validate_date_range(start, end, record_id) {
                    date.range = Some(DateRange::inclusive(start, end));
                }
            }
            None if validate_date(&value, record_id) => date.value = Some(value),
            None => {}
        }
    }
    if date.note.is_none() && date.range.is_none() && date.value.is_none() {
        return None;
    }
    date.kind = attribute(node, "dateType");
    Some(date)
}

fn dates(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    let record_id = ctx.source_record_id;
    let mut dates = Vec::new();
    match first_text(record, "publicationYear")? {
        Some(year) if validate_date(&year, record_id) => {
            dates.push(Date::single(year, Some("Publication date")));
        }
        Some(_) => {}
        None => warn!(
            record_id,
            "DataCite record is missing required field publicationYear"
        ),
    }
    dates.extend(
        find_descendants(resource(record)?, "date").filter_map(|node| typed_date(node, record_id)),
    );
    list(dates, FieldValue::Dates)
}

fn edition(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    text(first_text(record, "version")?)
}

fn file_formats(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let formats = texts(record, "format")?.into_iter().map(|(_, v)| v).collect();
    list(formats, FieldValue::Texts)
}

fn funding_information(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let funders = find_descendants(resource(record)?, "fundingReference")
        .map(|reference| {
            let mut funder = Funder {
                funder_name: find_descendant(reference, "funderName").and_then(non_empty_text),
                ..Funder::default()
            };
            if let Some(award) = find_descendant(reference, "awardNumber") {
                funder.award_number = non_empty_text(award);
                funder.award_uri = attribute(award, "awardURI");
            }
            if let Some(id) = find_descendant(reference, "funderIdentifier") {
                funder.funder_identifier = non_empty_text(id);
                if funder.funder_identifier.is_some() {
                    funder.funder_identifier_type = attribute(id, "funderIdentifierType");
                }
            }
            funder
        })
        .filter(|funder| *funder != Funder::default())
        .collect();
    list(funders, FieldValue::Funders)
}

fn related_identifiers<'a, 'input>(
    record: &SourceRecord<'a, 'input>,
) -> Result<Vec<(Node<'a, 'input>, String)>, FieldError> {
    texts(record, "relatedIdentifier")
}

fn is_identical(node: Node<'_, '_>) -> bool {
    get_attribute(node, "relationType") == Some("IsIdenticalTo")
}

fn identifiers(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let typed = |node: Node<'_, '_>, value: String, attr: &str| {
        let kind = attribute(node, attr).unwrap_or_else(|| NOT_SPECIFIED.to_string());
        Identifier::new(value, Some(&kind))
    };
    let mut identifiers: Vec<Identifier> = texts(record, "identifier")?
        .into_iter()
        .take(1)
        .map(|(node, value)| typed(node, value, "identifierType"))
        .collect();
    identifiers.extend(
        texts(record, "alternateIdentifier")?
            .into_iter()
            .map(|(node, value)| typed(node, value, "alternateIdentifierType")),
    );
    identifiers.extend(
        related_identifiers(record)?
            .into_iter()
            .filter(|(node, _)| is_identical(*node))
            .map(|(node, value)| {
                Identifier::new(related_identifier_url(node, &value), Some("IsIdenticalTo"))
            }),
    );
    list(identifiers, FieldValue::Identifiers)
}

fn languages(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    list(
        first_text(record, "language")?.into_iter().collect(),
        FieldValue::Texts,
    )
}

fn links(_: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    let links = ctx
        .source
        .base_url
        .map(|base| {
            Link::new(
                format!("{base}{}", ctx.source_record_id),
                Some("Digital object URL"),
                Some("Digital object URL"),
            )
        })
        .into_iter()
        .collect();
    list(links, FieldValue::Links)
}

fn locations(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let places = texts(record, "geoLocationPlace")?
        .into_iter()
        .map(|(_, place)| Location::named(place, None))
        .collect();
    list(places, FieldValue::Locations)
}

fn is_abstract(node: Node<'_, '_>) -> bool {
    get_attribute(node, "descriptionType") == Some("Abstract")
}

fn notes(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    let mut notes: Vec<Note> = resource_type(record, ctx)?
        .and_then(non_empty_text)
        .map(|value| Note::new(vec![value], Some("Datacite resource type")))
        .into_iter()
        .collect();
    for (node, description) in texts(record, "description")? {
        let kind = attribute(node, "descriptionType");
        if kind.is_none() {
            warn!(
                record_id = ctx.source_record_id,
                "DataCite record is missing required attribute @descriptionType"
            );
        }
        if !is_abstract(node) {
            notes.push(Note::new(vec![description], kind.as_deref()));
        }
    }
    list(notes, FieldValue::Notes)
}

fn publishers(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    let publisher = first_text(record, "publisher")?;
    if publisher.is_none() {
        warn!(
            record_id = ctx.source_record_id,
            "DataCite record is missing required field publisher"
        );
    }
    list(
        publisher.map(Publisher::named).into_iter().collect(),
        FieldValue::Publishers,
    )
}

fn related_items(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let items = related_identifiers(record)?
        .into_iter()
        .filter(|(node, _)| !is_identical(*node))
        .map(|(node, value)| RelatedItem {
            uri: Some(related_identifier_url(node, &value)),
            relationship: Some(
                attribute(node, "relationType").unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            ),
            ..RelatedItem::default()
        })
        .collect();
    list(items, FieldValue::RelatedItems)
}

fn rights(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let rights = find_descendants(resource(record)?, "rights")
        .map(|node| Rights {
            description: non_empty_text(node),
            uri: attribute(node, "rightsURI"),
            ..Rights::default()
        })
        .filter(|r| r.description.is_some() || r.uri.is_some())
        .collect();
    list(rights, FieldValue::Rights)
}

fn subjects(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let mut schemes: Vec<(String, Vec<String>)> = Vec::new();
    for (node, subject) in texts(record, "subject")? {
        let scheme = attribute(node, "subjectScheme")
            .unwrap_or_else(|| "Subject scheme not provided".to_string());
        match schemes.iter_mut().find(|(name, _)| *name == scheme) {
            Some((_, values)) => values.push(subject),
            None => schemes.push((scheme, vec![subject])),
        }
    }
    let subjects = schemes
        .into_iter()
        .map(|(scheme, values)| Subject::new(values, Some(&scheme)))
        .collect();
    list(subjects, FieldValue::Subjects)
}

fn summary(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let abstracts = texts(record, "description")?
        .into_iter()
        .filter(|(node, _)| is_abstract(*node))
        .map(|(_, value)| value)
        .collect();
    list(abstracts, FieldValue::Texts)
}

pub(crate) static DATACITE: Layer = Layer::fields(
    "datacite",
    &[
        (Field::Title, title),
        (Field::AlternateTitles, alternate_titles),
        (Field::ContentType, content_type),
        (Field::Contributors, contributors),
        (Field::Dates, dates),
        (Field::Edition, edition),
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
);

/// Content type, rejecting records whose resource type is not allowed.
fn zenodo_content_type(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    let value = content_type(record, ctx)?;
    if let Some(FieldValue::Texts(types)) = &value {
        if !types
            .iter()
            .any(|t| ZENODO_CONTENT_TYPES.contains(&t.to_lowercase().as_str()))
        {
            return Err(FieldError::Excluded(format!(
                "Record skipped based on content type: \"{}\"",
                types.join(", ")
            )));
        }
    }
    Ok(value)
}

fn zenodo_record_id(record: &SourceRecord<'_, '_>) -> Result<Option<String>, FieldError> {
    Ok(header_identifier(record.xml()?)
        .map(|id| id.replace("oai:zenodo.org:", ""))
        .filter(|id| !id.is_empty()))
}

pub(crate) static ZENODO: Layer = Layer {
    name: "zenodo",
    fields: &[(Field::ContentType, zenodo_content_type)],
    record_id: Some(zenodo_record_id),
    is_deleted: None,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceName;
    use crate::registry::FieldFn;
    use pretty_assertions::assert_eq;

    const RECORD: &str = r#"<record xmlns="http://www.openarchives.org/OAI/2.0/">
  <header><identifier>oai:zenodo.org:4291646</identifier></header>
  <metadata>
    <oai_datacite xmlns="http://schema.datacite.org/oai/oai-1.1/">
      <payload>
        <resource xmlns="http://datacite.org/schema/kernel-4">
          <identifier identifierType="DOI">10.5281/zenodo.4291646</identifier>
          <creators>
            <creator>
              <creatorName>Stroh, Ruth</creatorName>
              <nameIdentifier nameIdentifierScheme="ORCID">0000-0001-9876-5432</nameIdentifier>
              <affiliation>MIT</affiliation>
            </creator>
          </creators>
          <titles>
            <title>Coral growth measurements</title>
            <title>Second main title</title>
            <title titleType="Subtitle">Gulf of Maine</title>
          </titles>
          <publisher>Zenodo</publisher>
          <publicationYear>2020</publicationYear>
          <subjects>
            <subject>coral</subject>
            <subject subjectScheme="LCSH">Marine biology</subject>
            <subject>reef</subject>
          </subjects>
          <contributors>
            <contributor contributorType="DataCurator">
              <contributorName>Lee, Kim</contributorName>
            </contributor>
            <contributor><contributorName>Doe, Jo</contributorName></contributor>
          </contributors>
          <dates>
            <date dateType="Collected">2019-01-01/2019-06-30</date>
            <date dateType="Valid" dateInformation="embargo lifted">not a date</date>
            <date dateType="Created">2021-13-45</date>
          </dates>
          <language>en</language>
          <resourceType resourceTypeGeneral="Dataset">Measurements</resourceType>
          <alternateIdentifiers>
            <alternateIdentifier alternateIdentifierType="url">https://zenodo.org/record/4291646</alternateIdentifier>
          </alternateIdentifiers>
          <relatedIdentifiers>
            <relatedIdentifier relatedIdentifierType="DOI" relationType="IsIdenticalTo">10.5281/zenodo.1</relatedIdentifier>
            <relatedIdentifier relatedIdentifierType="DOI" relationType="IsPartOf">10.5281/zenodo.2</relatedIdentifier>
            <relatedIdentifier relatedIdentifierType="URL">https://example.org/x</relatedIdentifier>
          </relatedIdentifiers>
          <formats><format>text/csv</format></formats>
          <version>1.2</version>
          <rightsList>
            <rights rightsURI="https://creativecommons.org/licenses/by/4.0/">CC BY 4.0</rights>
            <rights rightsURI="info:eu-repo/semantics/openAccess"/>
            <rights/>
          </rightsList>
          <descriptions>
            <description descriptionType="Abstract">Growth rates of coral.</description>
            <description descriptionType="Methods">Calipers.</description>
          </descriptions>
          <geoLocations>
            <geoLocation><geoLocationPlace>Gulf of Maine</geoLocationPlace></geoLocation>
          </geoLocations>
          <fundingReferences>
            <fundingReference>
              <funderName>National Science Foundation</funderName>
              <funderIdentifier funderIdentifierType="Crossref Funder ID">10.13039/100000001</funderIdentifier>
              <awardNumber awardURI="https://nsf.gov/award/1">OCE-1</awardNumber>
            </fundingReference>
            <fundingReference><funderName> </funderName></fundingReference>
          </fundingReferences>
        </resource>
      </payload>
    </oai_datacite>
  </metadata>
</record>"#;

    fn run_as(source: SourceName, xml: &str, handler: FieldFn) -> FieldResult {
        let doc = roxmltree::Document::parse(xml).unwrap();
        let source = source.config();
        let ctx = FieldContext {
            source: &source,
            source_record_id: "4291646",
        };
        handler(&SourceRecord::Xml(doc.root_element()), &ctx)
    }

    fn run(handler: FieldFn) -> FieldResult {
        run_as(SourceName::Zenodo, RECORD, handler)
    }

    #[test]
    fn test_titles() {
        assert_eq!(
            run(title).unwrap(),
            Some(FieldValue::Text("Coral growth measurements".into()))
        );
        assert_eq!(
            run(alternate_titles).unwrap(),
            Some(FieldValue::AlternateTitles(vec![
                AlternateTitle::new("Gulf of Maine", Some("Subtitle")),
                AlternateTitle::new("Second main title", None),
            ]))
        );
    }

    #[test]
    fn test_contributors_with_orcid_and_default_kind() {
        let Some(FieldValue::Contributors(contributors)) = run(contributors).unwrap() else {
            panic!("expected contributors");
        };
        assert_eq!(contributors.len(), 3);
        assert_eq!(
            contributors[0],
            Contributor {
                value: "Stroh, Ruth".into(),
                affiliation: Some(vec!["MIT".into()]),
                identifier: Some(vec!["https://orcid.org/0000-0001-9876-5432".into()]),
                kind: Some("Creator".into()),
                mit_affiliated: None,
            }
        );
        assert_eq!(contributors[1].kind.as_deref(), Some("DataCurator"));
        assert_eq!(contributors[2].kind.as_deref(), Some(NOT_SPECIFIED));
    }

    #[test]
    fn test_dates_keep_notes_and_drop_invalid_values() {
        assert_eq!(
            run(dates).unwrap(),
            Some(FieldValue::Dates(vec![
                Date::single("2020", Some("Publication date")),
                Date::ranged(DateRange::inclusive("2019-01-01", "2019-06-30"), Some("Collected")),
                Date {
                    kind: Some("Valid".into()),
                    note: Some("embargo lifted".into()),
                    ..Date::default()
                },
            ]))
        );
    }

    #[test]
    fn test_identifiers_include_identical_related_identifier() {
        assert_eq!(
            run(identifiers).unwrap(),
            Some(FieldValue::Identifiers(vec![
                Identifier::new("10.5281/zenodo.4291646", Some("DOI")),
                Identifier::new("https://zenodo.org/record/4291646", Some("url")),
                Identifier::new("https://doi.org/10.5281/zenodo.1", Some("IsIdenticalTo")),
            ]))
        );
    }

    #[test]
    fn test_related_items_exclude_identical() {
        assert_eq!(
            run(related_items).unwrap(),
            Some(FieldValue::RelatedItems(vec![
                RelatedItem {
                    uri: Some("https://doi.org/10.5281/zenodo.2".into()),
                    relationship: Some("IsPartOf".into()),
                    ..RelatedItem::default()
                },
                RelatedItem {
                    uri: Some("https://example.org/x".into()),
                    relationship: Some(NOT_SPECIFIED.into()),
                    ..RelatedItem::default()
                },
            ]))
        );
    }

    #[test]
    fn test_notes_and_summary_split_descriptions() {
        assert_eq!(
            run(notes).unwrap(),
            Some(FieldValue::Notes(vec![
                Note::new(vec!["Measurements".into()], Some("Datacite resource type")),
                Note::new(vec!["Calipers.".into()], Some("Methods")),
            ]))
        );
        assert_eq!(
            run(summary).unwrap(),
            Some(FieldValue::Texts(vec!["Growth rates of coral.".into()]))
        );
    }

    #[test]
    fn test_subjects_grouped_by_scheme() {
        assert_eq!(
            run(subjects).unwrap(),
            Some(FieldValue::Subjects(vec![
                Subject::new(
                    vec!["coral".into(), "reef".into()],
                    Some("Subject scheme not provided")
                ),
                Subject::new(vec!["Marine biology".into()], Some("LCSH")),
            ]))
        );
    }

    #[test]
    fn test_funding_and_rights() {
        assert_eq!(
            run(funding_information).unwrap(),
            Some(FieldValue::Funders(vec![Funder {
                funder_name: Some("National Science Foundation".into()),
                funder_identifier: Some("10.13039/100000001".into()),
                funder_identifier_type: Some("Crossref Funder ID".into()),
                award_number: Some("OCE-1".into()),
                award_uri: Some("https://nsf.gov/award/1".into()),
            }]))
        );
        let Some(FieldValue::Rights(rights)) = run(rights).unwrap() else {
            panic!("expected rights");
        };
        assert_eq!(rights.len(), 2);
        assert_eq!(rights[1].description, None);
    }

    #[test]
    fn test_link_uses_base_url() {
        assert_eq!(
            run(links).unwrap(),
            Some(FieldValue::Links(vec![Link::new(
                "https://zenodo.org/record/4291646",
                Some("Digital object URL"),
                Some("Digital object URL")
            )]))
        );
    }

    #[test]
    fn test_zenodo_identity_and_content_type_filter() {
        let doc = roxmltree::Document::parse(RECORD).unwrap();
        let id = zenodo_record_id(&SourceRecord::Xml(doc.root_element())).unwrap();
        assert_eq!(id.as_deref(), Some("4291646"));

        assert_eq!(
            run(zenodo_content_type).unwrap(),
            Some(FieldValue::Texts(vec!["Dataset".into()]))
        );
        let xml = RECORD.replace("\"Dataset\"", "\"Text\"");
        assert_eq!(
            run_as(SourceName::Zenodo, &xml, zenodo_content_type),
            Err(FieldError::Excluded(
                "Record skipped based on content type: \"Text\"".into()
            ))
        );
        // Plain DataCite accepts any resource type.
        assert_eq!(
            run_as(SourceName::Jpal, &xml, content_type).unwrap(),
            Some(FieldValue::Texts(vec!["Text".into()]))
        );
    }

    #[test]
    fn test_missing_resource_type_is_absent() {
        let xml = RECORD.replace(
            r#"<resourceType resourceTypeGeneral="Dataset">Measurements</resourceType>"#,
            "",
        );
        assert_eq!(run_as(SourceName::Zenodo, &xml, zenodo_content_type).unwrap(), None);
    }
}
