//! OpenGeoMetadata Aardvark JSON records for geospatial resources.
//!
//! Aardvark has no scheme for subjects, so the kind of a subject names the
//! Aardvark field it came from.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;

use super::common::{first_title, list, text};
use crate::config::GEODATA_BASE_URL;
use crate::dates::{normalize_date, validate_date, NormalizedDate};
use crate::error::FieldError;
use crate::models::{
    dedupe, AlternateTitle, Contributor, Date, Field, FieldValue, Identifier, Link, Location,
    Note, Publisher, Rights, Subject,
};
use crate::registry::{FieldContext, FieldResult, Layer, SourceRecord};

/// `ENVELOPE(W, E, N, S)` from Solr spatial fields.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ENVELOPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^ENVELOPE\s*\(\s*(?P<w>[-\d.]+)\s*,\s*(?P<e>[-\d.]+)\s*,\s*(?P<n>[-\d.]+)\s*,\s*(?P<s>[-\d.]+)\s*\)$",
    )
    .expect("valid regex")
});

const LOCATION_FIELDS: [(&str, &str); 2] =
    [("dcat_bbox", "Bounding Box"), ("locn_geometry", "Geometry")];

const SUBJECT_FIELDS: [(&str, &str); 6] = [
    ("dcat_keyword_sm", "DCAT; Keyword"),
    ("dcat_theme_sm", "DCAT; Theme"),
    ("dct_spatial_sm", "Dublin Core; Spatial"),
    ("dct_subject_sm", "Dublin Core; Subject"),
    ("gbl_resourceClass_sm", "Subject scheme not provided"),
    ("gbl_resourceType_sm", "Subject scheme not provided"),
];

const DOWNLOAD_KEY: &str = "https://schema.org/downloadUrl";

/// A scalar value as a trimmed, non-empty string.
fn scalar(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn string(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(scalar)
}

/// All values of a multi-valued (`_sm`, `_im`) field; a lone scalar counts as
/// one value.
fn strings(map: &Map<String, Value>, key: &str) -> Vec<String> {
    match map.get(key) {
        Some(Value::Array(values)) => values.iter().filter_map(scalar).collect(),
        Some(value) => scalar(value).into_iter().collect(),
        None => Vec::new(),
    }
}

fn title(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    first_title(string(record.json()?, "dct_title_s").into_iter().collect(), ctx)
}

fn alternate_titles(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let titles = strings(record.json()?, "dct_alternative_sm")
        .into_iter()
        .map(|title| AlternateTitle::new(title, None))
        .collect();
    list(titles, FieldValue::AlternateTitles)
}

fn content_type(_: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    list(vec!["Geospatial data".to_string()], FieldValue::Texts)
}

fn contributors(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let creators = strings(record.json()?, "dct_creator_sm")
        .into_iter()
        .map(|name| Contributor::new(name, Some("Creator")))
        .collect();
    list(creators, FieldValue::Contributors)
}

fn dates(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    let map = record.json()?;
    let record_id = ctx.source_record_id;
    let mut dates = Vec::new();

    if let Some(issued) = string(map, "dct_issued_s") {
        if validate_date(&issued, record_id) {
            dates.push(Date::single(issued, Some("Issued")));
        }
    }

    let mut coverage = strings(map, "dct_temporal_sm");
    coverage.extend(strings(map, "gbl_indexYear_im"));
    dates.extend(
        dedupe(coverage)
            .into_iter()
            .filter(|value| validate_date(value, record_id))
            .map(|value| Date::single(value, Some("Coverage"))),
    );

    for raw in strings(map, "gbl_dateRange_drsim") {
        match normalize_date(&raw, record_id) {
            Some(NormalizedDate::Range(range)) => {
                dates.push(Date::ranged(range, Some("Coverage")));
            }
            _ => warn!(record_id, date_range = %raw, "Unable to parse date range"),
        }
    }
    list(dates, FieldValue::Dates)
}

fn format(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    text(string(record.json()?, "dct_format_s"))
}

fn identifiers(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let identifiers = strings(record.json()?, "dct_identifier_sm")
        .into_iter()
        .map(|value| Identifier::new(value, None))
        .collect();
    list(identifiers, FieldValue::Identifiers)
}

fn languages(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    list(strings(record.json()?, "dct_language_sm"), FieldValue::Texts)
}

/// Download links from the JSON-encoded `dct_references_s`.
fn download_links(map: &Map<String, Value>, record_id: &str) -> Vec<Link> {
    let Some(raw) = string(map, "dct_references_s") else {
        return Vec::new();
    };
    let references: Map<String, Value> = match serde_json::from_str(&raw) {
        Ok(references) => references,
        Err(error) => {
            warn!(
                record_id,
                %error,
                "Unable to parse links string as JSON: '{raw}'"
            );
            return Vec::new();
        }
    };
    let downloads = match references.get(DOWNLOAD_KEY) {
        Some(Value::Array(items)) => items.clone(),
        Some(item) => vec![item.clone()],
        None => Vec::new(),
    };
    downloads
        .iter()
        .filter_map(|item| match item {
            Value::Object(link) => {
                let url = string(link, "url")?;
                let label = string(link, "label");
                Some(Link::new(url, Some("Download"), label.as_deref()))
            }
            other => scalar(other).map(|url| Link::new(url, Some("Download"), Some("Data"))),
        })
        .collect()
}

fn links(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    let mut links = download_links(record.json()?, ctx.source_record_id);
    links.push(Link::new(
        format!("{GEODATA_BASE_URL}{}", ctx.timdex_record_id()),
        Some("Website"),
        Some("Website"),
    ));
    list(links, FieldValue::Links)
}

/// Convert a Solr `ENVELOPE(W, E, N, S)` into `BBOX (W, E, N, S)`; other WKT
/// strings pass through.
fn geoshape(raw: &str) -> Option<String> {
    if let Some(caps) = ENVELOPE_PATTERN.captures(raw) {
        return Some(format!(
            "BBOX ({}, {}, {}, {})",
            &caps["w"], &caps["e"], &caps["n"], &caps["s"]
        ));
    }
    (!raw.trim_start().starts_with("ENVELOPE")).then(|| raw.to_string())
}

fn locations(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    let map = record.json()?;
    let mut locations = Vec::new();
    for (key, kind) in LOCATION_FIELDS {
        let Some(raw) = string(map, key) else {
            continue;
        };
        match geoshape(&raw) {
            Some(shape) => locations.push(Location {
                kind: Some(kind.to_string()),
                geoshape: Some(shape),
                ..Location::default()
            }),
            None => warn!(
                record_id = ctx.source_record_id,
                field = key,
                value = %raw,
                "Unable to parse geodata string"
            ),
        }
    }
    list(locations, FieldValue::Locations)
}

fn notes(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let notes = strings(record.json()?, "gbl_displayNote_sm")
        .into_iter()
        .map(|note| Note::new(vec![note], Some("Display note")))
        .collect();
    list(notes, FieldValue::Notes)
}

fn publishers(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let publishers = strings(record.json()?, "dct_publisher_sm")
        .into_iter()
        .map(Publisher::named)
        .collect();
    list(publishers, FieldValue::Publishers)
}

fn provider(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    text(string(record.json()?, "schema_provider_s"))
}

fn rights(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let map = record.json()?;
    let mut rights = Vec::new();
    if let Some(access) = string(map, "dct_accessRights_s") {
        rights.push(Rights {
            description: Some(access),
            kind: Some("Access rights".to_string()),
            ..Rights::default()
        });
    }
    rights.extend(strings(map, "dct_license_sm").into_iter().map(|uri| Rights {
        uri: Some(uri),
        ..Rights::default()
    }));
    for key in ["dct_rights_sm", "dct_rightsHolder_sm"] {
        let values = strings(map, key);
        if !values.is_empty() {
            rights.push(Rights {
                description: Some(values.join(". ")),
                ..Rights::default()
            });
        }
    }
    list(rights, FieldValue::Rights)
}

fn subjects(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    let map = record.json()?;
    let subjects = SUBJECT_FIELDS
        .iter()
        .flat_map(|&(key, kind)| {
            strings(map, key)
                .into_iter()
                .map(move |value| Subject::new(vec![value], Some(kind)))
        })
        .collect();
    list(subjects, FieldValue::Subjects)
}

fn summary(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    list(strings(record.json()?, "dct_description_sm"), FieldValue::Texts)
}

fn source_link(_: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    text(Some(format!("{GEODATA_BASE_URL}{}", ctx.timdex_record_id())))
}

/// Suppressed records are deletions.
fn is_suppressed(record: &SourceRecord<'_, '_>) -> Result<bool, FieldError> {
    let map = record.json()?;
    match map.get("gbl_suppressed_b") {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(suppressed)) => Ok(*suppressed),
        Some(_) => Err(FieldError::Structural(format!(
            "Record ID '{}': 'gbl_suppressed_b' value is not a boolean",
            string(map, "id").unwrap_or_default()
        ))),
    }
}

pub(crate) static AARDVARK: Layer = Layer {
    name: "aardvark",
    fields: &[
        (Field::SourceLink, source_link),
        (Field::Title, title),
        (Field::AlternateTitles, alternate_titles),
        (Field::ContentType, content_type),
        (Field::Contributors, contributors),
        (Field::Dates, dates),
        (Field::Format, format),
        (Field::Identifiers, identifiers),
        (Field::Languages, languages),
        (Field::Links, links),
        (Field::Locations, locations),
        (Field::Notes, notes),
        (Field::Provider, provider),
        (Field::Publishers, publishers),
        (Field::Rights, rights),
        (Field::Subjects, subjects),
        (Field::Summary, summary),
    ],
    record_id: None,
    is_deleted: Some(is_suppressed),
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceName;
    use crate::models::DateRange;
    use crate::registry::FieldFn;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record() -> Map<String, Value> {
        let value = json!({
            "id": "mit:123",
            "dct_title_s": "Bus stops, Boston 2018",
            "dct_alternative_sm": ["MBTA stops"],
            "dct_creator_sm": ["Massachusetts Bay Transportation Authority"],
            "dct_issued_s": "2018-06-01",
            "dct_temporal_sm": ["2018", "Summer 2018"],
            "gbl_indexYear_im": [2018, 2019],
            "gbl_dateRange_drsim": ["[2018 TO 2019]", "[2020 TO 2019]"],
            "dct_format_s": "Shapefile",
            "dct_language_sm": ["eng"],
            "dct_references_s": "{\"https://schema.org/downloadUrl\": [{\"label\": \"Source data\", \"url\": \"https://cdn.example/123.zip\"}]}",
            "dcat_bbox": "ENVELOPE(-71.19, -70.99, 42.40, 42.22)",
            "locn_geometry": "POLYGON((-71.1 42.3, -71.0 42.3, -71.0 42.4, -71.1 42.3))",
            "gbl_displayNote_sm": ["Projected to NAD83"],
            "dct_publisher_sm": ["MassGIS"],
            "schema_provider_s": "MIT",
            "dct_accessRights_s": "Public",
            "dct_license_sm": ["https://creativecommons.org/licenses/by/4.0/"],
            "dct_rights_sm": ["Use freely", "Cite the source"],
            "dct_subject_sm": ["Transportation"],
            "dct_spatial_sm": ["Boston (Mass.)"],
            "dcat_keyword_sm": ["bus"],
            "dct_description_sm": ["Point locations of bus stops."],
            "gbl_suppressed_b": false
        });
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn run_on(map: &Map<String, Value>, handler: FieldFn) -> FieldResult {
        let source = SourceName::Gismit.config();
        let ctx = FieldContext {
            source: &source,
            source_record_id: "mit:123",
        };
        handler(&SourceRecord::Json(map), &ctx)
    }

    fn run(handler: FieldFn) -> FieldResult {
        run_on(&record(), handler)
    }

    #[test]
    fn test_source_link_uses_geodata_url() {
        assert_eq!(
            run(source_link).unwrap(),
            Some(FieldValue::Text(
                "https://geodata.libraries.mit.edu/record/gismit:mit:123".into()
            ))
        );
    }

    #[test]
    fn test_dates() {
        assert_eq!(
            run(dates).unwrap(),
            Some(FieldValue::Dates(vec![
                Date::single("2018-06-01", Some("Issued")),
                Date::single("2018", Some("Coverage")),
                Date::single("2019", Some("Coverage")),
                Date::ranged(DateRange::inclusive("2018", "2019"), Some("Coverage")),
            ]))
        );
    }

    #[test]
    fn test_links_include_downloads_and_website() {
        assert_eq!(
            run(links).unwrap(),
            Some(FieldValue::Links(vec![
                Link::new(
                    "https://cdn.example/123.zip",
                    Some("Download"),
                    Some("Source data")
                ),
                Link::new(
                    "https://geodata.libraries.mit.edu/record/gismit:mit:123",
                    Some("Website"),
                    Some("Website")
                ),
            ]))
        );
    }

    #[test]
    fn test_malformed_references_keep_website_link() {
        let mut map = record();
        map.insert("dct_references_s".into(), json!("{not json"));
        let Some(FieldValue::Links(links)) = run_on(&map, links).unwrap() else {
            panic!("expected links");
        };
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].kind.as_deref(), Some("Website"));
    }

    #[test]
    fn test_envelope_becomes_bbox() {
        let Some(FieldValue::Locations(locations)) = run(locations).unwrap() else {
            panic!("expected locations");
        };
        assert_eq!(
            locations[0].geoshape.as_deref(),
            Some("BBOX (-71.19, -70.99, 42.40, 42.22)")
        );
        assert_eq!(locations[0].kind.as_deref(), Some("Bounding Box"));
        assert_eq!(locations[1].kind.as_deref(), Some("Geometry"));
        assert_eq!(geoshape("ENVELOPE(nonsense)"), None);
    }

    #[test]
    fn test_rights_order() {
        assert_eq!(
            run(rights).unwrap(),
            Some(FieldValue::Rights(vec![
                Rights {
                    description: Some("Public".into()),
                    kind: Some("Access rights".into()),
                    ..Rights::default()
                },
                Rights {
                    uri: Some("https://creativecommons.org/licenses/by/4.0/".into()),
                    ..Rights::default()
                },
                Rights {
                    description: Some("Use freely. Cite the source".into()),
                    ..Rights::default()
                },
            ]))
        );
    }

    #[test]
    fn test_subject_kinds_name_their_field() {
        assert_eq!(
            run(subjects).unwrap(),
            Some(FieldValue::Subjects(vec![
                Subject::new(vec!["bus".into()], Some("DCAT; Keyword")),
                Subject::new(vec!["Boston (Mass.)".into()], Some("Dublin Core; Spatial")),
                Subject::new(vec!["Transportation".into()], Some("Dublin Core; Subject")),
            ]))
        );
    }

    #[test]
    fn test_provider_and_publishers() {
        assert_eq!(run(provider).unwrap(), Some(FieldValue::Text("MIT".into())));
        assert_eq!(
            run(publishers).unwrap(),
            Some(FieldValue::Publishers(vec![Publisher::named("MassGIS")]))
        );
    }

    #[test]
    fn test_suppression() {
        let mut map = record();
        assert!(!is_suppressed(&SourceRecord::Json(&map)).unwrap());
        map.insert("gbl_suppressed_b".into(), json!(true));
        assert!(is_suppressed(&SourceRecord::Json(&map)).unwrap());
        map.insert("gbl_suppressed_b".into(), json!("yes"));
        assert_eq!(
            is_suppressed(&SourceRecord::Json(&map)),
            Err(FieldError::Structural(
                "Record ID 'mit:123': 'gbl_suppressed_b' value is not a boolean".into()
            ))
        );
    }

    #[test]
    fn test_absent_fields() {
        let map = Map::new();
        let handlers: [FieldFn; 5] = [title, dates, locations, rights, subjects];
        for handler in handlers {
            assert_eq!(run_on(&map, handler).unwrap(), None);
        }
    }
}
