//! Springshare OAI-DC records (LibGuides and the research database A-Z list).
//!
//! The OAI header id becomes the record identifier, while `dc:identifier`
//! is taken verbatim as the source link.

use chrono::NaiveDateTime;
use tracing::debug;

use super::common::{list, text};
use super::oai_dc::dc_values;
use crate::dates::validate_date;
use crate::error::FieldError;
use crate::models::{Date, Field, FieldValue, Link};
use crate::registry::{FieldContext, FieldResult, Layer, SourceRecord};

/// Springshare dates are `YYYY-MM-DD HH:MM:SS`; convert to ISO form.
fn iso_date(value: &str) -> Option<String> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
}

/// The single creation date.
fn dates(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    let record_id = ctx.source_record_id;
    let Some(raw) = dc_values(record, "date")?.into_iter().next() else {
        return Ok(None);
    };
    let dates = match iso_date(&raw) {
        Some(iso) if validate_date(&iso, record_id) => vec![Date::single(iso, Some("Created"))],
        Some(_) => Vec::new(),
        None => {
            debug!(record_id, date = %raw, "Record has a date that cannot be parsed");
            Vec::new()
        }
    };
    list(dates, FieldValue::Dates)
}

fn identifier(record: &SourceRecord<'_, '_>) -> Result<Option<String>, FieldError> {
    Ok(dc_values(record, "identifier")?.into_iter().next())
}

fn links(record: &SourceRecord<'_, '_>, ctx: &FieldContext<'_>) -> FieldResult {
    let Some(url) = identifier(record)? else {
        debug!(
            record_id = ctx.source_record_id,
            "Record has links that cannot be generated: missing dc:identifier"
        );
        return Ok(None);
    };
    let label = format!("{} URL", ctx.source.name.trim_end_matches('s'));
    list(
        vec![Link::new(url, Some(&label), Some(&label))],
        FieldValue::Links,
    )
}

fn source_link(record: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    match identifier(record)? {
        Some(link) => text(Some(link)),
        None => Err(FieldError::Excluded(
            "Record skipped because 'source_link' could not be derived. \
             The 'identifier' was either missing from the header element or blank."
                .to_string(),
        )),
    }
}

pub(crate) static SPRINGSHARE: Layer = Layer::fields(
    "springshare",
    &[
        (Field::SourceLink, source_link),
        (Field::Dates, dates),
        (Field::Links, links),
    ],
);

/// Guide authors are staff accounts, not contributors to the content.
fn no_contributors(_: &SourceRecord<'_, '_>, _: &FieldContext<'_>) -> FieldResult {
    Ok(None)
}

pub(crate) static LIBGUIDES: Layer =
    Layer::fields("libguides", &[(Field::Contributors, no_contributors)]);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceName;
    use crate::sources::oai_dc::tests::{run_as, RECORD};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dates_converted_to_iso() {
        assert_eq!(
            run_as(SourceName::Libguides, RECORD, dates).unwrap(),
            Some(FieldValue::Dates(vec![Date::single(
                "2008-06-19T17:55:27",
                Some("Created")
            )]))
        );
    }

    #[test]
    fn test_unparseable_date_is_dropped() {
        let xml = RECORD.replace("2008-06-19 17:55:27", "last week");
        assert_eq!(run_as(SourceName::Libguides, &xml, dates).unwrap(), None);
    }

    #[test]
    fn test_links_use_singular_source_name() {
        assert_eq!(
            run_as(SourceName::Researchdatabases, RECORD, links).unwrap(),
            Some(FieldValue::Links(vec![Link::new(
                "https://libguides.mit.edu/materials",
                Some("Research Database URL"),
                Some("Research Database URL")
            )]))
        );
    }

    #[test]
    fn test_source_link_is_dc_identifier() {
        assert_eq!(
            run_as(SourceName::Libguides, RECORD, source_link).unwrap(),
            Some(FieldValue::Text("https://libguides.mit.edu/materials".into()))
        );
        let xml = RECORD.replace(
            "<dc:identifier>https://libguides.mit.edu/materials</dc:identifier>",
            "",
        );
        assert!(matches!(
            run_as(SourceName::Libguides, &xml, source_link),
            Err(FieldError::Excluded(_))
        ));
    }

    #[test]
    fn test_libguides_suppresses_contributors() {
        assert_eq!(
            run_as(SourceName::Libguides, RECORD, no_contributors).unwrap(),
            None
        );
    }
}
