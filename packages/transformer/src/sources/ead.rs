//! Archival finding aids (EAD) harvested from ArchivesSpace.
//!
//! Everything is read from the collection-level description,
//! `<archdesc level="collection">`, and its `<did>`. A record without either
//! is structurally unusable and is rejected.

use roxmltree::Node;

use super::common::{extra_titles, first_title, header_identifier, list, metadata, text};
use super::crosswalks::aspace_type;
use crate::dates::{validate_date, validate_date_range};
use crate::error::FieldError;
use crate::models::{
    Contributor, Date, DateRange, Field, FieldValue, Identifier, Location, Note, Publisher,
    RelatedItem, Rights, Subject,
};
use crate::registry::{FieldContext, FieldResult, Layer, SourceRecord};
use crate::xml::{
    element_children, find_child, find_children, find_children_any, find_descendant,
    find_descendants, flatten_text, flatten_text_pieces, get_attribute, get_tag_name,
};

/// Flatten mixed content with single spaces, `None` when blank.
fn mixed(node: Node<'_, '_>, skipped: &[&str]) -> Option<String> {
    Some(flatten_text(node, " ", skipped)).filter(|s| !s.is_empty())
}

fn collection<'a, 'input>(
    record: &SourceRecord<'a, 'input>,
) -> Result<Node<'a, 'input>, FieldError> {
    metadata(record.xml()?)?
        .descendants()
        .find(|n| {
            n.is_element()
                && get_tag_name(*n) == "archdesc"
                && get_attribute(*n, "level") == Some("collection")
        })
        .ok_or_else(|| {
            FieldError::Structural(
                "Record skipped because key information is missing: \
                 <archdesc level=\"collection\">."
                    .to_string(),
            )
        })
}

fn collection_did<'a, 'input>(
    record: &SourceRecord<'a, 'input>,
) -> Result<Node<'a, 'input>, FieldError> {
    find_descendant(collection(record)?, "did").ok_or_else(|| {
        FieldError::Structural(
            "Record skipped because key information is missing: <did>.".to_string(),
        )
    })
}

fn control_access<'a, 'input>(
    record: &SourceRecord<'a, 'input>,
) -> Result<Vec<Node<'a, 'input>>, FieldError> {
    Ok(find_children(collection(record)?, "controlaccess").collect())
}

/// Authority file URL for a name element with an `authfilenumber`.
fn name_identifier_url(name: Node<'_, '_>) -> Option<Vec<String>> {
    let identifier = get_attribute(name, "authfilenumber")?;
    let base_url = match get_attribute(name, "source") {
        Some("lcnaf" | "naf") => "https://lccn.loc.gov/",
        Some("snac") => "https://snaccooperative.org/view/",
        Some("viaf") => "http://viaf.org/viaf/",
        _ => "",
    };
    Some(vec![format!("{base_url}{identifier}")])
}

fn main_titles(record: &SourceRecord<'_, '_>) -> Result<Vec<String>, FieldError> {
    Ok(find_descendants(collection_did(record)?, "unittitle")
        .filter_map(|title| mixed(title, &["num"]))
        .collect())
}

fn title(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    first_title(main_titles(record)?, ctx)
}

fn alternate_titles(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    list(extra_titles(main_titles(record)?), FieldValue::AlternateTitles)
}

fn citation(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    text(find_child(collection(record)?, "prefercite").and_then(|c| mixed(c, &["head"])))
}

fn content_type(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let mut content_types = vec!["Archival materials".to_string()];
    for access in control_access(record)? {
        content_types.extend(find_descendants(access, "genreform").filter_map(|g| mixed(g, &[])));
    }
    list(content_types, FieldValue::Texts)
}

fn contents(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let contents = find_children(collection(record)?, "arrangement")
        .flat_map(|arrangement| flatten_text_pieces(arrangement, &["head"]))
        .collect();
    list(contents, FieldValue::Texts)
}

fn contributors(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let mut contributors = Vec::new();
    for origination in find_descendants(collection_did(record)?, "origination") {
        let kind = get_attribute(origination, "label");
        for name in element_children(origination) {
            if let Some(value) = mixed(name, &[]) {
                let mut contributor = Contributor::new(value, kind);
                contributor.identifier = name_identifier_url(name);
                contributors.push(contributor);
            }
        }
    }
    list(contributors, FieldValue::Contributors)
}

/// Dates from `unitdate/@normal`, which are ISO intervals or single dates.
fn dates(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    let record_id = ctx.source_record_id;
    let mut dates = Vec::new();
    for unitdate in find_descendants(collection_did(record)?, "unitdate") {
        let normal = get_attribute(unitdate, "normal").unwrap_or("").trim();
        if normal.is_empty() {
            continue;
        }

        let mut date = Date::default();
        match normal.split_once('/') {
            Some((start, end)) if start != end => {
                if validate_date_range(start, end, record_id) {
                    date.range = Some(DateRange::inclusive(start, end));
                }
            }
            Some((start, _)) => {
                if validate_date(start, record_id) {
                    date.value = Some(start.to_string());
                }
            }
            None => {
                if validate_date(normal, record_id) {
                    date.value = Some(normal.to_string());
                }
            }
        }

        if date.range.is_some() || date.value.is_some() {
            date.kind = get_attribute(unitdate, "datechar").map(String::from);
            date.note = get_attribute(unitdate, "certainty").map(String::from);
            dates.push(date);
        }
    }
    list(dates, FieldValue::Dates)
}

fn identifiers(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let identifiers = find_children(collection_did(record)?, "unitid")
        .filter(|unitid| get_attribute(*unitid, "type") != Some("aspace_uri"))
        .filter_map(|unitid| mixed(unitid, &[]))
        .map(|value| Identifier::new(value, Some("Collection Identifier")))
        .collect();
    list(identifiers, FieldValue::Identifiers)
}

fn languages(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let languages = find_children(collection_did(record)?, "langmaterial")
        .flat_map(|langmaterial| find_descendants(langmaterial, "language"))
        .filter_map(|language| mixed(language, &[]))
        .collect();
    list(languages, FieldValue::Texts)
}

fn locations(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let locations = control_access(record)?
        .into_iter()
        .flat_map(|access| find_descendants(access, "geogname"))
        .filter_map(|place| mixed(place, &[]))
        .map(|value| Location::named(value, None))
        .collect();
    list(locations, FieldValue::Locations)
}

fn notes(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let mut notes = Vec::new();
    for note in find_children_any(
        collection(record)?,
        &["bibliography", "bioghist", "scopecontent"],
    ) {
        let name = get_tag_name(note);
        let part = if name == "bibliography" { "bibref" } else { "p" };
        let values: Vec<String> = find_children(note, part)
            .filter_map(|p| mixed(p, &[]))
            .collect();
        if values.is_empty() {
            continue;
        }
        let kind = find_descendant(note, "head")
            .and_then(|head| mixed(head, &[]))
            .unwrap_or_else(|| aspace_type(name).to_string());
        notes.push(Note::new(values, Some(&kind)));
    }
    list(notes, FieldValue::Notes)
}

fn physical_description(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let descriptions: Vec<String> = find_children(collection_did(record)?, "physdesc")
        .filter_map(|physdesc| mixed(physdesc, &[]))
        .collect();
    text((!descriptions.is_empty()).then(|| descriptions.join("; ")))
}

fn publishers(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let publishers = find_descendant(collection_did(record)?, "repository")
        .and_then(|repository| mixed(repository, &[]))
        .map(Publisher::named)
        .into_iter()
        .collect();
    list(publishers, FieldValue::Publishers)
}

fn related_items(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let collection = collection(record)?;
    let mut items: Vec<RelatedItem> =
        find_children_any(collection, &["altformavail", "separatedmaterial"])
            .filter_map(|element| {
                mixed(element, &["head"]).map(|description| RelatedItem {
                    description: Some(description),
                    relationship: Some(aspace_type(get_tag_name(element)).to_string()),
                    ..RelatedItem::default()
                })
            })
            .collect();

    for material in find_children(collection, "relatedmaterial") {
        let parts: Vec<Node<'_, '_>> = match find_descendant(material, "list") {
            Some(list) => find_descendants(list, "defitem").collect(),
            None => find_children(material, "p").collect(),
        };
        items.extend(parts.into_iter().filter_map(|part| {
            mixed(part, &["head"]).map(|description| RelatedItem {
                description: Some(description),
                ..RelatedItem::default()
            })
        }));
    }
    list(items, FieldValue::RelatedItems)
}

fn rights(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let rights = find_children_any(collection(record)?, &["accessrestrict", "userestrict"])
        .filter_map(|element| {
            mixed(element, &["head"]).map(|description| Rights {
                description: Some(description),
                kind: Some(aspace_type(get_tag_name(element)).to_string()),
                ..Rights::default()
            })
        })
        .collect();
    list(rights, FieldValue::Rights)
}

fn subjects(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let mut subjects = Vec::new();
    for access in control_access(record)? {
        for element in element_children(access) {
            if let Some(value) = mixed(element, &[]) {
                let kind = get_attribute(element, "source").map(aspace_type);
                subjects.push(Subject::new(vec![value], kind));
            }
        }
    }
    list(subjects, FieldValue::Subjects)
}

fn summary(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let summary = find_children(collection_did(record)?, "abstract")
        .filter_map(|abstract_| mixed(abstract_, &[]))
        .collect();
    list(summary, FieldValue::Texts)
}

/// Source record id: the part of the OAI identifier after `//`.
fn record_id(record: &SourceRecord<'_, '_>) -> Result<Option<String>, FieldError> {
    Ok(header_identifier(record.xml()?)
        .and_then(|id| id.split("//").nth(1).map(String::from))
        .filter(|id| !id.is_empty()))
}

pub(crate) static EAD: Layer = Layer {
    name: "ead",
    fields: &[
        (Field::Title, title),
        (Field::AlternateTitles, alternate_titles),
        (Field::Citation, citation),
        (Field::ContentType, content_type),
        (Field::Contents, contents),
        (Field::Contributors, contributors),
        (Field::Dates, dates),
        (Field::Identifiers, identifiers),
        (Field::Languages, languages),
        (Field::Locations, locations),
        (Field::Notes, notes),
        (Field::PhysicalDescription, physical_description),
        (Field::Publishers, publishers),
        (Field::RelatedItems, related_items),
        (Field::Rights, rights),
        (Field::Subjects, subjects),
        (Field::Summary, summary),
    ],
    record_id: Some(record_id),
    is_deleted: None,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceName;
    use pretty_assertions::assert_eq;

    fn wrap(archdesc: &str) -> String {
        format!(
            r#"<record xmlns="http://www.openarchives.org/OAI/2.0/">
  <header><identifier>oai:mit//repositories/2/resources/1</identifier></header>
  <metadata>
    <ead xmlns="urn:isbn:1-931666-22-9">{archdesc}</ead>
  </metadata>
</record>"#
        )
    }

    const COLLECTION: &str = r#"<archdesc level="collection">
  <did>
    <unittitle>Charles J. Connick Stained Glass <num>MC 1</num> Papers</unittitle>
    <unittitle>Connick papers</unittitle>
    <unitid>MC-0001</unitid>
    <unitid type="aspace_uri">/repositories/2/resources/1</unitid>
    <unitdate normal="1905/2012" datechar="creation" certainty="approximate">1905-2012</unitdate>
    <unitdate normal="1950/1950">1950</unitdate>
    <unitdate normal="2012/1905">bad</unitdate>
    <origination label="Creator">
      <persname source="lcnaf" authfilenumber="n80000001">Connick, Charles J.</persname>
      <corpname>Connick Associates</corpname>
    </origination>
    <physdesc><extent>4 cubic feet</extent></physdesc>
    <physdesc>10 boxes</physdesc>
    <langmaterial><language langcode="eng">English</language></langmaterial>
    <repository>
      <corpname>Massachusetts Institute of Technology. Libraries.
        <emph render="bold">Department of Distinctive Collections</emph>
      </corpname>
    </repository>
    <abstract>Records of a stained glass studio.</abstract>
  </did>
  <prefercite><head>Citation</head><p>Connick papers, MC-0001.</p></prefercite>
  <arrangement><head>Arrangement</head><p>Series 1</p><p>Series 2</p></arrangement>
  <bioghist><head>Biography</head><p>Born 1875.</p></bioghist>
  <scopecontent><p>Drawings.</p></scopecontent>
  <bibliography><bibref>A book.</bibref></bibliography>
  <accessrestrict><head>Access</head><p>Open.</p></accessrestrict>
  <altformavail><p>Microfilm.</p></altformavail>
  <relatedmaterial><p>Other papers.</p></relatedmaterial>
  <controlaccess>
    <subject source="lcsh">Glass painting and staining</subject>
    <geogname source="tgn">Boston (Mass.)</geogname>
    <genreform source="aat">Drawings</genreform>
  </controlaccess>
</archdesc>"#;

    fn run(xml: &str, handler: crate::registry::FieldFn) -> FieldResult {
        let doc = roxmltree::Document::parse(xml).unwrap();
        let source = SourceName::Aspace.config();
        let ctx = FieldContext {
            source: &source,
            source_record_id: "repositories/2/resources/1",
        };
        handler(&SourceRecord::Xml(doc.root_element()), &ctx)
    }

    #[test]
    fn test_record_id_after_double_slash() {
        let xml = wrap(COLLECTION);
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let id = record_id(&SourceRecord::Xml(doc.root_element())).unwrap();
        assert_eq!(id.as_deref(), Some("repositories/2/resources/1"));
    }

    #[test]
    fn test_titles_skip_num_and_split_extras() {
        let xml = wrap(COLLECTION);
        assert_eq!(
            run(&xml, title).unwrap(),
            Some(FieldValue::Text("Charles J. Connick Stained Glass Papers".into()))
        );
        assert_eq!(
            run(&xml, alternate_titles).unwrap(),
            Some(FieldValue::AlternateTitles(vec![
                crate::models::AlternateTitle::new("Connick papers", None)
            ]))
        );
    }

    #[test]
    fn test_repository_with_nested_emphasis() {
        let xml = wrap(COLLECTION);
        assert_eq!(
            run(&xml, publishers).unwrap(),
            Some(FieldValue::Publishers(vec![Publisher::named(
                "Massachusetts Institute of Technology. Libraries. \
                 Department of Distinctive Collections"
            )]))
        );
    }

    #[test]
    fn test_dates_from_normal_attribute() {
        let xml = wrap(COLLECTION);
        let mut first = Date::ranged(DateRange::inclusive("1905", "2012"), Some("creation"));
        first.note = Some("approximate".into());
        assert_eq!(
            run(&xml, dates).unwrap(),
            Some(FieldValue::Dates(vec![first, Date::single("1950", None)]))
        );
    }

    #[test]
    fn test_contributors_with_authority_urls() {
        let xml = wrap(COLLECTION);
        let mut connick = Contributor::new("Connick, Charles J.", Some("Creator"));
        connick.identifier = Some(vec!["https://lccn.loc.gov/n80000001".into()]);
        assert_eq!(
            run(&xml, contributors).unwrap(),
            Some(FieldValue::Contributors(vec![
                connick,
                Contributor::new("Connick Associates", Some("Creator")),
            ]))
        );
    }

    #[test]
    fn test_identifiers_skip_aspace_uri() {
        let xml = wrap(COLLECTION);
        assert_eq!(
            run(&xml, identifiers).unwrap(),
            Some(FieldValue::Identifiers(vec![Identifier::new(
                "MC-0001",
                Some("Collection Identifier")
            )]))
        );
    }

    #[test]
    fn test_notes_use_head_or_crosswalk() {
        let xml = wrap(COLLECTION);
        assert_eq!(
            run(&xml, notes).unwrap(),
            Some(FieldValue::Notes(vec![
                Note::new(vec!["Born 1875.".into()], Some("Biography")),
                Note::new(vec!["Drawings.".into()], Some("Scope and Contents")),
                Note::new(vec!["A book.".into()], Some("Bibliography")),
            ]))
        );
    }

    #[test]
    fn test_control_access_fields() {
        let xml = wrap(COLLECTION);
        assert_eq!(
            run(&xml, content_type).unwrap(),
            Some(FieldValue::Texts(vec![
                "Archival materials".into(),
                "Drawings".into()
            ]))
        );
        assert_eq!(
            run(&xml, locations).unwrap(),
            Some(FieldValue::Locations(vec![Location::named("Boston (Mass.)", None)]))
        );
        let subjects = match run(&xml, subjects).unwrap() {
            Some(FieldValue::Subjects(subjects)) => subjects,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(subjects.len(), 3);
        assert_eq!(
            subjects[0],
            Subject::new(
                vec!["Glass painting and staining".into()],
                Some("Library of Congress Subject Headings")
            )
        );
    }

    #[test]
    fn test_scalar_fields() {
        let xml = wrap(COLLECTION);
        assert_eq!(
            run(&xml, citation).unwrap(),
            Some(FieldValue::Text("Connick papers, MC-0001.".into()))
        );
        assert_eq!(
            run(&xml, physical_description).unwrap(),
            Some(FieldValue::Text("4 cubic feet; 10 boxes".into()))
        );
        assert_eq!(
            run(&xml, contents).unwrap(),
            Some(FieldValue::Texts(vec!["Series 1".into(), "Series 2".into()]))
        );
    }

    #[test]
    fn test_related_items_and_rights() {
        let xml = wrap(COLLECTION);
        assert_eq!(
            run(&xml, related_items).unwrap(),
            Some(FieldValue::RelatedItems(vec![
                RelatedItem {
                    description: Some("Microfilm.".into()),
                    relationship: Some("Existence and Location of Copies".into()),
                    ..RelatedItem::default()
                },
                RelatedItem {
                    description: Some("Other papers.".into()),
                    ..RelatedItem::default()
                },
            ]))
        );
        assert_eq!(
            run(&xml, rights).unwrap(),
            Some(FieldValue::Rights(vec![Rights {
                description: Some("Open.".into()),
                kind: Some("Conditions Governing Access".into()),
                ..Rights::default()
            }]))
        );
    }

    #[test]
    fn test_missing_collection_is_structural() {
        let xml = wrap(r#"<archdesc level="series"><did/></archdesc>"#);
        assert!(matches!(run(&xml, title), Err(FieldError::Structural(_))));
    }

    #[test]
    fn test_missing_did_is_structural() {
        let xml = wrap(r#"<archdesc level="collection"><bioghist/></archdesc>"#);
        let err = run(&xml, summary).unwrap_err();
        assert_eq!(
            err,
            FieldError::Structural(
                "Record skipped because key information is missing: <did>.".into()
            )
        );
    }

    #[test]
    fn test_absent_optional_data_is_none() {
        let xml = wrap(r#"<archdesc level="collection"><did><unittitle>T</unittitle></did></archdesc>"#);
        assert_eq!(run(&xml, summary).unwrap(), None);
        assert_eq!(run(&xml, related_items).unwrap(), None);
        assert_eq!(run(&xml, subjects).unwrap(), None);
        assert_eq!(run(&xml, dates).unwrap(), None);
    }
}
