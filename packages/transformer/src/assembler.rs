//! Record assembly: one raw record in, one canonical record (or a rejection)
//! out.

use roxmltree::Document;
use serde_json::Value;
use tracing::warn;

use crate::config::{SourceConfig, SourceName};
use crate::dates::validate_date;
use crate::error::{FieldError, RecordError, Result};
use crate::models::{Date, Location, Record};
use crate::reader::Payload;
use crate::registry::{FieldContext, HandlerRegistry, SourceRecord};
use crate::sources::registry_for;

/// Subject kind whose values are also place names.
const SPATIAL_SUBJECT_KIND: &str = "Dublin Core; Spatial";

/// What a successfully interpreted raw record turned into.
#[derive(Debug, Clone, PartialEq)]
pub enum Assembled {
    /// A validated canonical record.
    Record(Box<Record>),
    /// A deletion, identified by its record identifier.
    Deleted(String),
}

/// A rejected record and the identifier it was rejected under, if one could
/// be derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Identifier of the source record, when it could be extracted.
    pub source_record_id: Option<String>,
    /// Why the record was rejected.
    pub error: RecordError,
}

impl Rejection {
    fn anonymous(error: RecordError) -> Self {
        Self {
            source_record_id: None,
            error,
        }
    }

    fn of(source_record_id: &str, error: RecordError) -> Self {
        Self {
            source_record_id: Some(source_record_id.to_string()),
            error,
        }
    }
}

/// Escalate a handler failure that must reject the record.
fn escalate(error: FieldError) -> RecordError {
    let message = error.to_string();
    error
        .into_record_error()
        .unwrap_or(RecordError::Validation(message))
}

/// Builds canonical records for one source.
#[derive(Debug)]
pub struct Assembler {
    source: SourceConfig,
    registry: HandlerRegistry,
}

impl Assembler {
    /// Resolve the handler registry for a source.
    ///
    /// # Errors
    /// Returns `TransformError::Configuration` if the source's layers are
    /// incomplete.
    pub fn new(source: SourceName) -> Result<Self> {
        Ok(Self {
            source: source.config(),
            registry: registry_for(source)?,
        })
    }

    /// Static configuration of the source being assembled.
    #[must_use]
    pub fn source(&self) -> &SourceConfig {
        &self.source
    }

    /// Interpret one raw payload.
    ///
    /// # Errors
    /// Returns a [`Rejection`] when the payload is malformed, lacks an
    /// identifier, or yields a record that fails validation.
    pub fn assemble(&self, payload: &Payload) -> std::result::Result<Assembled, Rejection> {
        match payload {
            Payload::Xml(xml) => {
                let doc = Document::parse(xml).map_err(|e| {
                    Rejection::anonymous(RecordError::Structural(format!(
                        "XML record could not be parsed: {e}"
                    )))
                })?;
                self.assemble_record(&SourceRecord::Xml(doc.root_element()))
            }
            Payload::Json(Value::Object(map)) => self.assemble_record(&SourceRecord::Json(map)),
            Payload::Json(_) => Err(Rejection::anonymous(RecordError::Structural(
                "JSON record is not an object".to_string(),
            ))),
            Payload::Malformed(message) => Err(Rejection::anonymous(RecordError::Structural(
                message.clone(),
            ))),
        }
    }

    fn assemble_record(
        &self,
        record: &SourceRecord<'_, '_>,
    ) -> std::result::Result<Assembled, Rejection> {
        let source_record_id = (self.registry.record_id_hook())(record)
            .map_err(|e| Rejection::anonymous(escalate(e)))?
            .ok_or_else(|| {
                Rejection::anonymous(RecordError::Structural(
                    "Record identifier could not be derived".to_string(),
                ))
            })?;
        let ctx = FieldContext {
            source: &self.source,
            source_record_id: &source_record_id,
        };

        let deleted = (self.registry.deletion_hook())(record)
            .map_err(|e| Rejection::of(&source_record_id, escalate(e)))?;
        if deleted {
            return Ok(Assembled::Deleted(ctx.timdex_record_id()));
        }

        self.build(record, &ctx)
            .map(|r| Assembled::Record(Box::new(r)))
            .map_err(|e| Rejection::of(&source_record_id, e))
    }

    fn build(
        &self,
        source_record: &SourceRecord<'_, '_>,
        ctx: &FieldContext<'_>,
    ) -> std::result::Result<Record, RecordError> {
        let mut record = Record::default();

        for (field, handler) in self.registry.mandatory() {
            let value = handler(source_record, ctx).map_err(escalate)?.ok_or_else(|| {
                RecordError::Validation(format!("mandatory attribute '{field}' is missing"))
            })?;
            record
                .apply(field, value)
                .map_err(|e| RecordError::Validation(format!("'{field}': {e}")))?;
        }

        for (field, handler) in self.registry.optional() {
            let outcome = handler(source_record, ctx)
                .and_then(|value| value.map_or(Ok(()), |v| record.apply(field, v)));
            if let Err(error) = outcome {
                let message = error.to_string();
                if let Some(rejection) = error.into_record_error() {
                    return Err(rejection);
                }
                warn!(
                    record_id = ctx.source_record_id,
                    field = %field,
                    error = %message,
                    "Field extraction failed, omitting attribute"
                );
            }
        }

        derive_fields(&mut record);
        record.validate()?;
        Ok(record)
    }
}

/// Fill the attributes computed from other attributes.
fn derive_fields(record: &mut Record) {
    let publishers = record.publishers.clone().unwrap_or_default();

    let dates: Vec<Date> = publishers
        .iter()
        .filter_map(|p| p.date.as_deref())
        .filter(|date| validate_date(date, &record.timdex_record_id))
        .map(|date| Date::single(date, Some("Publication date")))
        .collect();
    record.extend_dates(dates);

    let mut locations: Vec<Location> = publishers
        .iter()
        .filter_map(|p| p.location.as_deref())
        .map(|place| Location::named(place, Some("Place of Publication")))
        .collect();
    locations.extend(
        record
            .subjects
            .iter()
            .flatten()
            .filter(|s| s.kind.as_deref() == Some(SPATIAL_SUBJECT_KIND))
            .flat_map(|s| s.value.iter())
            .map(|place| Location::named(place.as_str(), Some("Place Name"))),
    );
    record.extend_locations(locations);

    if record.citation.is_none() {
        record.citation = Some(generate_citation(record));
    }
    if record.content_type.is_none() {
        record.content_type = Some(vec!["Not specified".to_string()]);
    }
}

/// A DataCite style citation built from the record's own attributes.
///
/// # Examples
/// ```
/// use crosswalk_transformer::assembler::generate_citation;
/// use crosswalk_transformer::models::Record;
///
/// let record = Record {
///     title: "Tide tables".to_string(),
///     source_link: "https://example.org/1".to_string(),
///     ..Record::default()
/// };
/// assert_eq!(generate_citation(&record), "Tide tables. https://example.org/1");
/// ```
#[must_use]
pub fn generate_citation(record: &Record) -> String {
    let title = &record.title;
    let creators: Vec<&str> = record
        .contributors
        .iter()
        .flatten()
        .filter(|c| {
            c.kind
                .as_deref()
                .is_some_and(|k| k.eq_ignore_ascii_case("author") || k.eq_ignore_ascii_case("creator"))
        })
        .map(|c| c.value.as_str())
        .collect();
    let creators = creators.join(", ");
    let year = record
        .dates
        .iter()
        .flatten()
        .filter(|d| d.kind.as_deref() == Some("Publication date"))
        .find_map(|d| d.value.as_deref());

    let mut citation = match (creators.is_empty(), year) {
        (false, Some(year)) => format!("{creators} ({year}): {title}."),
        (false, None) => format!("{}. {title}.", creators.trim_end_matches('.')),
        (true, Some(year)) => format!("{title}. {year}."),
        (true, None) => format!("{title}."),
    };

    if let Some(publisher) = record.publishers.as_ref().and_then(|p| p.first()) {
        if let Some(location) = &publisher.location {
            citation.push_str(&format!(" {location} :"));
        }
        if let Some(name) = &publisher.name {
            citation.push_str(&format!(" {name}."));
        }
    }
    if let Some(types) = record.content_type.as_ref().filter(|t| !t.is_empty()) {
        citation.push_str(&format!(" {}.", types.join(", ")));
    }
    citation.push(' ');
    citation.push_str(&record.source_link);
    citation
}
