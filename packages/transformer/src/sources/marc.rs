//! Library catalog records (MARC21 slim XML) exported from Alma.
//!
//! Values are assembled from datafield subfields selected by code. Trailing
//! cataloging punctuation is trimmed per field. Fixed-length data comes from
//! the leader and the 008 control field; a record without either is rejected.

use roxmltree::Node;

use super::common::{first_title, header, list, text, trim_end_chars};
use super::crosswalks::{
    country_name, holding_collection, holding_format, holding_location, language_name,
    marc_content_type,
};
use crate::dates::validate_date;
use crate::error::FieldError;
use crate::models::{
    dedupe, AlternateTitle, Contributor, Date, Field, FieldValue, Holding, Identifier, Link,
    Location, Note, Publisher, RelatedItem, Subject,
};
use crate::registry::{FieldContext, FieldResult, Layer, SourceRecord};
use crate::xml::{find_child, find_children, find_descendants, get_attribute, non_empty_text};

/// A datafield selection: tag, subfield codes and the label it maps to.
type FieldSpec = (&'static str, &'static str, &'static str);

const ALTERNATE_TITLES: &[FieldSpec] = &[
    ("130", "adfghklmnoprst", "Preferred Title"),
    ("240", "adfghklmnoprs", "Preferred Title"),
    ("246", "abfghinp", "Varying Form of Title"),
    ("730", "adfghiklmnoprst", "Preferred Title"),
    ("740", "anp", "Uncontrolled Related/Analytical Title"),
];

const CONTRIBUTORS: &[(&str, &str)] = &[
    ("100", "abcq"),
    ("110", "abc"),
    ("111", "acdfgjq"),
    ("700", "abcq"),
    ("710", "abc"),
    ("711", "acdfgjq"),
];

const IDENTIFIERS: &[FieldSpec] = &[
    ("010", "a", "LCCN"),
    ("020", "aq", "ISBN"),
    ("022", "a", "ISSN"),
    ("024", "aq2", "Other Identifier"),
    ("035", "a", "OCLC Number"),
];

const NOTES: &[FieldSpec] = &[
    ("245", "c", "Title Statement of Responsibility"),
    ("500", "a", "General Note"),
    ("502", "abcdg", "Dissertation Note"),
    ("504", "a", "Bibliography Note"),
    ("508", "a", "Creation/Production Credits Note"),
    ("511", "a", "Participant or Performer Note"),
    ("515", "a", "Numbering Peculiarities Note"),
    ("522", "a", "Geographic Coverage Note"),
    ("533", "abcdefmn", "Reproduction Note"),
    ("534", "abcefklmnoptxz", "Original Version Note"),
    ("588", "a", "Source of Description Note"),
    ("590", "a", "Local Note"),
];

const LINKING_ENTRY_CODES: &str = "abcdghikmnorstuwxyz";

const RELATED_ITEMS: &[FieldSpec] = &[
    ("765", LINKING_ENTRY_CODES, "Original Language Version"),
    ("770", LINKING_ENTRY_CODES, "Has Supplement"),
    ("772", LINKING_ENTRY_CODES, "Supplement To"),
    ("780", LINKING_ENTRY_CODES, "Previous Title"),
    ("785", LINKING_ENTRY_CODES, "Subsequent Title"),
    ("787", LINKING_ENTRY_CODES, "Not Specified"),
    ("830", "adfghklmnoprstvwx", "In Series"),
    ("510", "abcx", "In Bibliography"),
];

const SUBJECTS: &[FieldSpec] = &[
    ("600", "abcdefghjklmnopqrstuvxyz", "Personal Name"),
    ("610", "abcdefghklmnoprstuvxyz", "Corporate Name"),
    ("650", "avxyz", "Topical Term"),
    ("651", "avxyz", "Geographic Name"),
];

/// The MARC `<record>`: inside the harvest metadata when OAI-wrapped,
/// otherwise the record element itself.
fn marc<'a, 'input>(record: &SourceRecord<'a, 'input>) -> Result<Node<'a, 'input>, FieldError> {
    let node = record.xml()?;
    Ok(find_child(node, "metadata").unwrap_or(node))
}

fn datafields<'a, 'input>(
    marc: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    find_descendants(marc, "datafield").filter(move |f| get_attribute(*f, "tag") == Some(tag))
}

fn controlfield<'a>(marc: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    find_descendants(marc, "controlfield")
        .find(|f| get_attribute(*f, "tag") == Some(tag))
        .and_then(|f| f.text())
}

/// Subfield values whose single-character code is listed in `codes`.
fn subfield_values(field: Node<'_, '_>, codes: &str) -> Vec<String> {
    find_children(field, "subfield")
        .filter(|sf| {
            get_attribute(*sf, "code").is_some_and(|code| code.len() == 1 && codes.contains(code))
        })
        .filter_map(non_empty_text)
        .collect()
}

/// Values of the subfields with exactly this code.
fn subfield(field: Node<'_, '_>, code: &str) -> Vec<String> {
    find_children(field, "subfield")
        .filter(|sf| get_attribute(*sf, "code") == Some(code))
        .filter_map(non_empty_text)
        .collect()
}

fn first_subfield(field: Node<'_, '_>, code: &str) -> Option<String> {
    subfield(field, code).into_iter().next()
}

/// Join the selected subfields of one datafield and trim trailing punctuation.
fn concat_subfields(
    field: Node<'_, '_>,
    codes: &str,
    separator: &str,
    trim: &str,
) -> Option<String> {
    let joined = subfield_values(field, codes).join(separator);
    Some(trim_end_chars(&joined, trim).to_string()).filter(|v| !v.is_empty())
}

/// One joined value per matching datafield.
fn field_values(
    marc: Node<'_, '_>,
    tag: &str,
    codes: &str,
    separator: &str,
    trim: &str,
) -> Vec<String> {
    datafields(marc, tag)
        .filter_map(|field| concat_subfields(field, codes, separator, trim))
        .collect()
}

fn missing(element: &str) -> FieldError {
    FieldError::Structural(format!(
        "Record skipped because key information is missing: {element}."
    ))
}

fn leader<'a>(marc: Node<'a, '_>) -> Result<&'a str, FieldError> {
    find_descendants(marc, "leader")
        .next()
        .and_then(|l| l.text())
        .ok_or_else(|| missing("<leader>"))
}

fn fixed_length_data<'a>(marc: Node<'a, '_>) -> Result<&'a str, FieldError> {
    controlfield(marc, "008").ok_or_else(|| missing("<controlfield tag=\"008\">"))
}

/// Byte positions of a fixed-length field; empty when out of range.
fn positions(data: &str, range: std::ops::Range<usize>) -> &str {
    data.get(range).unwrap_or("")
}

fn title(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    first_title(field_values(marc(record)?, "245", "abfgknps", " ", " .,/"), ctx)
}

fn alternate_titles(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let marc = marc(record)?;
    let titles = ALTERNATE_TITLES
        .iter()
        .flat_map(|&(tag, codes, kind)| {
            field_values(marc, tag, codes, " ", " .,/")
                .into_iter()
                .map(move |value| AlternateTitle::new(value, Some(kind)))
        })
        .collect();
    list(titles, FieldValue::AlternateTitles)
}

fn call_numbers(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let marc = marc(record)?;
    let mut numbers = field_values(marc, "050", "a", " ", "");
    numbers.extend(field_values(marc, "082", "a", " ", ""));
    list(numbers, FieldValue::Texts)
}

fn content_type(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    let code = positions(leader(marc(record)?)?, 6..7);
    let content_type = marc_content_type(code, ctx.source_record_id).map(String::from);
    list(content_type.into_iter().collect(), FieldValue::Texts)
}

fn contents(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let contents = field_values(marc(record)?, "505", "agrt", " ", "")
        .iter()
        .flat_map(|value| value.split(" -- "))
        .map(|item| trim_end_chars(item, " ./-").trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();
    list(contents, FieldValue::Texts)
}

/// Names with one entry per relator term (`$e`), or "Not specified".
fn contributors(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let marc = marc(record)?;
    let mut contributors: Vec<Contributor> = Vec::new();
    for (tag, codes) in CONTRIBUTORS {
        for field in datafields(marc, tag) {
            let Some(name) = concat_subfields(field, codes, " ", " .,") else {
                continue;
            };
            let roles: Vec<String> = subfield(field, "e")
                .iter()
                .map(|role| trim_end_chars(role, " .,").to_string())
                .filter(|role| !role.is_empty())
                .collect();
            if roles.is_empty() {
                if !contributors.iter().any(|c| c.value == name) {
                    contributors.push(Contributor::new(name, Some("Not specified")));
                }
                continue;
            }
            for role in roles {
                let contributor = Contributor::new(name.clone(), Some(&role));
                if !contributors.contains(&contributor) {
                    contributors.push(contributor);
                }
            }
        }
    }
    list(contributors, FieldValue::Contributors)
}

fn dates(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    let year = positions(fixed_length_data(marc(record)?)?, 7..11).trim();
    let dates = validate_date(year, ctx.source_record_id)
        .then(|| Date::single(year, Some("Publication date")))
        .into_iter()
        .collect();
    list(dates, FieldValue::Dates)
}

fn edition(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let editions = field_values(marc(record)?, "250", "ab", " ", "");
    text((!editions.is_empty()).then(|| editions.join(" ")))
}

/// Physical holdings (985) and electronic portfolios (986).
fn holdings(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    let marc = marc(record)?;
    let record_id = ctx.source_record_id;
    let mut holdings: Vec<Holding> = datafields(marc, "985")
        .map(|field| {
            let notes = subfield(field, "g");
            Holding {
                call_number: first_subfield(field, "bb"),
                collection: first_subfield(field, "aa")
                    .and_then(|code| holding_collection(&code, record_id))
                    .map(String::from),
                format: first_subfield(field, "t")
                    .and_then(|code| holding_format(&code, record_id))
                    .map(String::from),
                location: first_subfield(field, "i")
                    .and_then(|code| holding_location(&code, record_id))
                    .map(String::from),
                note: (!notes.is_empty()).then(|| notes.join(", ")),
            }
        })
        .collect();
    holdings.extend(datafields(marc, "986").map(|field| Holding {
        collection: first_subfield(field, "j"),
        format: Some("electronic resource".to_string()),
        location: portfolio_url(field),
        note: first_subfield(field, "i"),
        ..Holding::default()
    }));
    list(holdings, FieldValue::Holdings)
}

fn portfolio_url(field: Node<'_, '_>) -> Option<String> {
    first_subfield(field, "f")
        .or_else(|| first_subfield(field, "l"))
        .or_else(|| first_subfield(field, "d"))
}

fn identifiers(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let marc = marc(record)?;
    let identifiers = IDENTIFIERS
        .iter()
        .flat_map(|&(tag, codes, kind)| {
            field_values(marc, tag, codes, ". ", "")
                .into_iter()
                .map(move |value| {
                    Identifier::new(value.replace("(OCoLC)", "").trim(), Some(kind))
                })
        })
        .collect();
    list(identifiers, FieldValue::Identifiers)
}

fn languages(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    let marc = marc(record)?;
    let mut codes = vec![positions(fixed_length_data(marc)?, 35..38).trim().to_string()];
    for field in datafields(marc, "041") {
        codes.extend(subfield_values(field, "abdefghjkmn"));
    }

    let mut languages: Vec<String> = dedupe(codes)
        .iter()
        .filter(|code| !code.is_empty())
        .filter_map(|code| language_name(code, ctx.source_record_id))
        .map(String::from)
        .collect();
    languages.extend(field_values(marc, "546", "a", " ", " ."));
    list(languages, FieldValue::Texts)
}

fn links(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let marc = marc(record)?;
    let mut links: Vec<Link> = datafields(marc, "856")
        .filter(|field| {
            get_attribute(*field, "ind1") == Some("4")
                && matches!(get_attribute(*field, "ind2"), Some("0" | "1"))
        })
        .filter_map(|field| {
            let urls = subfield(field, "u");
            if urls.is_empty() {
                return None;
            }
            let kind = first_subfield(field, "3");
            let text = first_subfield(field, "y");
            let mut link = Link::new(
                urls.join(". "),
                Some(kind.as_deref().unwrap_or("Digital object URL")),
                text.as_deref(),
            );
            link.restrictions = first_subfield(field, "z");
            Some(link)
        })
        .collect();

    links.extend(datafields(marc, "986").filter_map(|field| {
        let url = portfolio_url(field)?;
        let collection = first_subfield(field, "j");
        Some(Link::new(url, Some("Digital object URL"), collection.as_deref()))
    }));
    list(links, FieldValue::Links)
}

/// Fiction or nonfiction, for books and manuscript language material only.
fn literary_form(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let marc = marc(record)?;
    let leader = leader(marc)?;
    let is_book = matches!(positions(leader, 6..7), "a" | "t")
        && matches!(positions(leader, 7..8), "a" | "c" | "d" | "m");
    if !is_book {
        return Ok(None);
    }
    let form = match positions(fixed_length_data(marc)?, 33..34) {
        "0" | "s" | "e" => "Nonfiction",
        "" => return Ok(None),
        _ => "Fiction",
    };
    text(Some(form.to_string()))
}

fn locations(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    let marc = marc(record)?;
    let code = positions(fixed_length_data(marc)?, 15..18).trim();
    let mut locations: Vec<Location> = country_name(code, ctx.source_record_id)
        .map(|name| Location::named(name, Some("Place of Publication")))
        .into_iter()
        .collect();
    locations.extend(
        field_values(marc, "751", "a", " - ", " .,/)")
            .into_iter()
            .map(|value| Location::named(value, Some("Geographic Name"))),
    );
    locations.extend(
        field_values(marc, "752", "abcdefgh", " - ", " .,/)")
            .into_iter()
            .map(|value| Location::named(value, Some("Hierarchical Place Name"))),
    );
    list(locations, FieldValue::Locations)
}

fn notes(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let marc = marc(record)?;
    let notes = NOTES
        .iter()
        .flat_map(|&(tag, codes, kind)| {
            field_values(marc, tag, codes, " ", " .")
                .into_iter()
                .map(move |value| Note::new(vec![value], Some(kind)))
        })
        .collect();
    list(notes, FieldValue::Notes)
}

fn numbering(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let values = field_values(marc(record)?, "362", "a", " ", "");
    text((!values.is_empty()).then(|| values.join(" ")))
}

fn physical_description(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let values = field_values(marc(record)?, "300", "abcefg", " ", "");
    text((!values.is_empty()).then(|| values.join(" ")))
}

fn publication_frequency(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    list(
        field_values(marc(record)?, "310", "a", " ", ""),
        FieldValue::Texts,
    )
}

fn publishers(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let marc = marc(record)?;
    let trimmed = |field: Node<'_, '_>, code: &str, chars: &str| {
        first_subfield(field, code)
            .map(|value| trim_end_chars(&value, chars).to_string())
            .filter(|value| !value.is_empty())
    };
    let publishers = datafields(marc, "260")
        .chain(datafields(marc, "264"))
        .map(|field| Publisher {
            name: trimmed(field, "b", ","),
            date: trimmed(field, "c", "."),
            location: trimmed(field, "a", " :"),
        })
        .collect();
    list(publishers, FieldValue::Publishers)
}

fn related_items(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let marc = marc(record)?;
    let items = RELATED_ITEMS
        .iter()
        .flat_map(|&(tag, codes, relationship)| {
            field_values(marc, tag, codes, " ", " .")
                .into_iter()
                .map(move |description| RelatedItem {
                    description: Some(description),
                    relationship: Some(relationship.to_string()),
                    ..RelatedItem::default()
                })
        })
        .collect();
    list(items, FieldValue::RelatedItems)
}

fn subjects(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let marc = marc(record)?;
    let subjects = SUBJECTS
        .iter()
        .flat_map(|&(tag, codes, kind)| {
            field_values(marc, tag, codes, " - ", " .")
                .into_iter()
                .map(move |value| Subject::new(vec![value], Some(kind)))
        })
        .collect();
    list(subjects, FieldValue::Subjects)
}

fn summary(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    list(
        field_values(marc(record)?, "520", "a", " ", ""),
        FieldValue::Texts,
    )
}

/// Source record id: control field 001.
fn record_id(record: &SourceRecord<'_, '_>) -> Result<Option<String>, FieldError> {
    Ok(controlfield(marc(record)?, "001")
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from))
}

/// Deleted in the harvest header, or leader/05 is `d`.
fn is_deleted(record: &SourceRecord<'_, '_>) -> Result<bool, FieldError> {
    let node = record.xml()?;
    if header(node).and_then(|h| get_attribute(h, "status")) == Some("deleted") {
        return Ok(true);
    }
    Ok(leader(marc(record)?)
        .ok()
        .is_some_and(|leader| positions(leader, 5..6) == "d"))
}

pub(crate) static MARC: Layer = Layer {
    name: "marc",
    fields: &[
        (Field::Title, title),
        (Field::AlternateTitles, alternate_titles),
        (Field::CallNumbers, call_numbers),
        (Field::ContentType, content_type),
        (Field::Contents, contents),
        (Field::Contributors, contributors),
        (Field::Dates, dates),
        (Field::Edition, edition),
        (Field::Holdings, holdings),
        (Field::Identifiers, identifiers),
        (Field::Languages, languages),
        (Field::Links, links),
        (Field::LiteraryForm, literary_form),
        (Field::Locations, locations),
        (Field::Notes, notes),
        (Field::Numbering, numbering),
        (Field::PhysicalDescription, physical_description),
        (Field::PublicationFrequency, publication_frequency),
        (Field::Publishers, publishers),
        (Field::RelatedItems, related_items),
        (Field::Subjects, subjects),
        (Field::Summary, summary),
    ],
    record_id: Some(record_id),
    is_deleted: Some(is_deleted),
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceName;
    use crate::registry::FieldFn;
    use pretty_assertions::assert_eq;

    const LEADER: &str = "03282nam  2200721Ki 4500";

    fn fixed_length(literary: char) -> String {
        format!("120613s2012    mau{}{literary} eng d", " ".repeat(15))
    }

    fn wrap(leader: &str, fixed: &str, fields: &str) -> String {
        format!(
            r#"<record xmlns="http://www.openarchives.org/OAI/2.0/">
  <header><identifier>oai:alma.01MIT_INST:990027185640106761</identifier></header>
  <metadata>
    <record xmlns="http://www.loc.gov/MARC21/slim">
      <leader>{leader}</leader>
      <controlfield tag="001">990027185640106761</controlfield>
      <controlfield tag="008">{fixed}</controlfield>
      {fields}
    </record>
  </metadata>
</record>"#
        )
    }

    fn datafield(tag: &str, ind: (&str, &str), subfields: &[(&str, &str)]) -> String {
        let subfields: String = subfields
            .iter()
            .map(|(code, value)| format!(r#"<subfield code="{code}">{value}</subfield>"#))
            .collect();
        format!(
            r#"<datafield tag="{tag}" ind1="{}" ind2="{}">{subfields}</datafield>"#,
            ind.0, ind.1
        )
    }

    fn run(xml: &str, handler: FieldFn) -> FieldResult {
        let doc = roxmltree::Document::parse(xml).unwrap();
        let source = SourceName::Alma.config();
        let ctx = FieldContext {
            source: &source,
            source_record_id: "990027185640106761",
        };
        handler(&SourceRecord::Xml(doc.root_element()), &ctx)
    }

    fn record_with(fields: &str) -> String {
        wrap(LEADER, &fixed_length('0'), fields)
    }

    #[test]
    fn test_identity_hooks() {
        let xml = record_with("");
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let record = SourceRecord::Xml(doc.root_element());
        assert_eq!(
            record_id(&record).unwrap().as_deref(),
            Some("990027185640106761")
        );
        assert!(!is_deleted(&record).unwrap());

        let xml = wrap("03282dam  2200721Ki 4500", &fixed_length('0'), "");
        let doc = roxmltree::Document::parse(&xml).unwrap();
        assert!(is_deleted(&SourceRecord::Xml(doc.root_element())).unwrap());
    }

    #[test]
    fn test_bare_marc_record() {
        let bare = |leader: &str| {
            format!(
                r#"<record xmlns="http://www.loc.gov/MARC21/slim">
  <leader>{leader}</leader>
  <controlfield tag="001">990027185640106761</controlfield>
  <controlfield tag="008">{}</controlfield>
</record>"#,
                fixed_length('0')
            )
        };
        let xml = bare(LEADER);
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let record = SourceRecord::Xml(doc.root_element());
        assert_eq!(
            record_id(&record).unwrap().as_deref(),
            Some("990027185640106761")
        );
        assert!(!is_deleted(&record).unwrap());
        assert_eq!(
            run(&xml, content_type).unwrap(),
            Some(FieldValue::Texts(vec!["Language material".into()]))
        );

        let xml = bare("03282dam  2200721Ki 4500");
        let doc = roxmltree::Document::parse(&xml).unwrap();
        assert!(is_deleted(&SourceRecord::Xml(doc.root_element())).unwrap());
    }

    #[test]
    fn test_title_trims_punctuation() {
        let xml = record_with(&datafield(
            "245",
            ("1", "0"),
            &[("a", "Main entry :"), ("b", "subtitle /"), ("c", "by someone.")],
        ));
        assert_eq!(
            run(&xml, title).unwrap(),
            Some(FieldValue::Text("Main entry : subtitle".into()))
        );
    }

    #[test]
    fn test_contributors_one_per_role() {
        let fields = [
            datafield(
                "100",
                ("1", " "),
                &[("a", "Smith, Jane,"), ("e", "author."), ("e", "illustrator.")],
            ),
            datafield("700", ("1", " "), &[("a", "Doe, John.")]),
            datafield("700", ("1", " "), &[("a", "Doe, John.")]),
        ]
        .concat();
        assert_eq!(
            run(&record_with(&fields), contributors).unwrap(),
            Some(FieldValue::Contributors(vec![
                Contributor::new("Smith, Jane", Some("author")),
                Contributor::new("Smith, Jane", Some("illustrator")),
                Contributor::new("Doe, John", Some("Not specified")),
            ]))
        );
    }

    #[test]
    fn test_fixed_length_fields() {
        let xml = record_with("");
        assert_eq!(
            run(&xml, dates).unwrap(),
            Some(FieldValue::Dates(vec![Date::single(
                "2012",
                Some("Publication date")
            )]))
        );
        assert_eq!(
            run(&xml, content_type).unwrap(),
            Some(FieldValue::Texts(vec!["Language material".into()]))
        );
        assert_eq!(
            run(&xml, languages).unwrap(),
            Some(FieldValue::Texts(vec!["English".into()]))
        );
        assert_eq!(
            run(&xml, locations).unwrap(),
            Some(FieldValue::Locations(vec![Location::named(
                "Massachusetts",
                Some("Place of Publication")
            )]))
        );
    }

    #[test]
    fn test_literary_form() {
        let nonfiction = record_with("");
        assert_eq!(
            run(&nonfiction, literary_form).unwrap(),
            Some(FieldValue::Text("Nonfiction".into()))
        );
        let fiction = wrap(LEADER, &fixed_length('1'), "");
        assert_eq!(
            run(&fiction, literary_form).unwrap(),
            Some(FieldValue::Text("Fiction".into()))
        );
        let map = wrap("03282nem  2200721Ki 4500", &fixed_length('1'), "");
        assert_eq!(run(&map, literary_form).unwrap(), None);
    }

    #[test]
    fn test_missing_leader_is_structural() {
        let xml = r#"<record><metadata><record>
            <controlfield tag="001">1</controlfield>
        </record></metadata></record>"#;
        assert_eq!(
            run(xml, content_type).unwrap_err(),
            FieldError::Structural(
                "Record skipped because key information is missing: <leader>.".into()
            )
        );
    }

    #[test]
    fn test_missing_fixed_length_data_is_structural() {
        let xml = r#"<record><metadata><record>
            <leader>03282nam  2200721Ki 4500</leader>
        </record></metadata></record>"#;
        assert!(matches!(run(xml, dates), Err(FieldError::Structural(_))));
    }

    #[test]
    fn test_identifiers_strip_oclc_prefix() {
        let fields = [
            datafield("020", (" ", " "), &[("a", "9780262033848"), ("q", "hardcover")]),
            datafield("035", (" ", " "), &[("a", "(OCoLC)123456")]),
        ]
        .concat();
        assert_eq!(
            run(&record_with(&fields), identifiers).unwrap(),
            Some(FieldValue::Identifiers(vec![
                Identifier::new("9780262033848. hardcover", Some("ISBN")),
                Identifier::new("123456", Some("OCLC Number")),
            ]))
        );
    }

    #[test]
    fn test_links_and_portfolios() {
        let fields = [
            datafield(
                "856",
                ("4", "0"),
                &[("u", "https://example.com/full"), ("z", "MIT only"), ("y", "Full text")],
            ),
            datafield("856", ("4", "2"), &[("u", "https://example.com/related")]),
            datafield(
                "986",
                (" ", " "),
                &[("j", "Wiley Online"), ("f", "https://example.com/portfolio")],
            ),
        ]
        .concat();
        let mut full = Link::new(
            "https://example.com/full",
            Some("Digital object URL"),
            Some("Full text"),
        );
        full.restrictions = Some("MIT only".into());
        assert_eq!(
            run(&record_with(&fields), links).unwrap(),
            Some(FieldValue::Links(vec![
                full,
                Link::new(
                    "https://example.com/portfolio",
                    Some("Digital object URL"),
                    Some("Wiley Online")
                ),
            ]))
        );
    }

    #[test]
    fn test_holdings_use_crosswalks() {
        let fields = [
            datafield(
                "985",
                (" ", " "),
                &[("bb", "QA76 .S6"), ("aa", "HUM"), ("t", "BOOK"), ("i", "HAYDEN"), ("g", "v.1")],
            ),
            datafield("986", (" ", " "), &[("j", "Online"), ("l", "https://example.com/e")]),
        ]
        .concat();
        assert_eq!(
            run(&record_with(&fields), holdings).unwrap(),
            Some(FieldValue::Holdings(vec![
                Holding {
                    call_number: Some("QA76 .S6".into()),
                    collection: Some("Hayden Library".into()),
                    format: Some("Print volume".into()),
                    location: Some("Hayden Library".into()),
                    note: Some("v.1".into()),
                },
                Holding {
                    collection: Some("Online".into()),
                    format: Some("electronic resource".into()),
                    location: Some("https://example.com/e".into()),
                    ..Holding::default()
                },
            ]))
        );
    }

    #[test]
    fn test_publishers_trim_each_part() {
        let fields = datafield(
            "264",
            (" ", "1"),
            &[("a", "Cambridge, Massachusetts :"), ("b", "The MIT Press,"), ("c", "2012.")],
        );
        assert_eq!(
            run(&record_with(&fields), publishers).unwrap(),
            Some(FieldValue::Publishers(vec![Publisher {
                name: Some("The MIT Press".into()),
                date: Some("2012".into()),
                location: Some("Cambridge, Massachusetts".into()),
            }]))
        );
    }

    #[test]
    fn test_contents_split_on_separator() {
        let fields = datafield(
            "505",
            ("0", " "),
            &[("a", "Intro -- Chapter one. -- Chapter two /")],
        );
        assert_eq!(
            run(&record_with(&fields), contents).unwrap(),
            Some(FieldValue::Texts(vec![
                "Intro".into(),
                "Chapter one".into(),
                "Chapter two".into()
            ]))
        );
    }

    #[test]
    fn test_subjects_notes_and_related_items() {
        let fields = [
            datafield("650", (" ", "0"), &[("a", "Computer science"), ("v", "Textbooks.")]),
            datafield("500", (" ", " "), &[("a", "Includes index.")]),
            datafield("830", (" ", "0"), &[("a", "MIT series"), ("v", "12.")]),
        ]
        .concat();
        let xml = record_with(&fields);
        assert_eq!(
            run(&xml, subjects).unwrap(),
            Some(FieldValue::Subjects(vec![Subject::new(
                vec!["Computer science - Textbooks".into()],
                Some("Topical Term")
            )]))
        );
        assert_eq!(
            run(&xml, notes).unwrap(),
            Some(FieldValue::Notes(vec![Note::new(
                vec!["Includes index".into()],
                Some("General Note")
            )]))
        );
        assert_eq!(
            run(&xml, related_items).unwrap(),
            Some(FieldValue::RelatedItems(vec![RelatedItem {
                description: Some("MIT series 12".into()),
                relationship: Some("In Series".into()),
                ..RelatedItem::default()
            }]))
        );
    }

    #[test]
    fn test_absent_fields_are_none() {
        let xml = record_with("");
        let handlers: [FieldFn; 6] = [
            alternate_titles,
            call_numbers,
            holdings,
            links,
            notes,
            summary,
        ];
        for handler in handlers {
            assert_eq!(run(&xml, handler).unwrap(), None);
        }
    }
}
