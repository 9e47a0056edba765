//! Field handler definitions.

use roxmltree::Node;
use serde_json::{Map, Value};

use crate::config::SourceConfig;
use crate::error::FieldError;
use crate::models::FieldValue;

/// A parsed source record, as seen by field handlers.
#[derive(Debug, Clone, Copy)]
pub enum SourceRecord<'a, 'input> {
    /// The `<record>` element of an XML record.
    Xml(Node<'a, 'input>),
    /// A JSON object record.
    Json(&'a Map<String, Value>),
}

impl<'a, 'input> SourceRecord<'a, 'input> {
    /// The record as an XML element.
    ///
    /// # Errors
    /// Returns `FieldError::Structural` for JSON records.
    pub fn xml(&self) -> Result<Node<'a, 'input>, FieldError> {
        match self {
            Self::Xml(node) => Ok(*node),
            Self::Json(_) => Err(FieldError::Structural(
                "expected an XML record, got JSON".to_string(),
            )),
        }
    }

    /// The record as a JSON object.
    ///
    /// # Errors
    /// Returns `FieldError::Structural` for XML records.
    pub fn json(&self) -> Result<&'a Map<String, Value>, FieldError> {
        match self {
            Self::Json(map) => Ok(*map),
            Self::Xml(_) => Err(FieldError::Structural(
                "expected a JSON record, got XML".to_string(),
            )),
        }
    }
}

/// Per-record context passed to every handler.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    /// The source being transformed.
    pub source: &'a SourceConfig,
    /// Identifier of the record within its source.
    pub source_record_id: &'a str,
}

impl FieldContext<'_> {
    /// Record identifier in `label:id` form, with `/` replaced by `-`.
    #[must_use]
    pub fn timdex_record_id(&self) -> String {
        format!(
            "{}:{}",
            self.source.label,
            self.source_record_id.replace('/', "-")
        )
    }
}

/// Outcome of a field handler: a value, nothing, or a failure.
pub type FieldResult = Result<Option<FieldValue>, FieldError>;

/// Extracts one canonical attribute from a source record.
pub type FieldFn = fn(&SourceRecord<'_, '_>, &FieldContext<'_>) -> FieldResult;

/// Derives the source record identifier; `Ok(None)` when the record has none.
pub type RecordIdFn = fn(&SourceRecord<'_, '_>) -> Result<Option<String>, FieldError>;

/// Decides whether a record is a deletion.
pub type DeletedFn = fn(&SourceRecord<'_, '_>) -> Result<bool, FieldError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceName;

    #[test]
    fn test_timdex_record_id_replaces_slashes() {
        let source = SourceName::Dspace.config();
        let context = FieldContext {
            source: &source,
            source_record_id: "1721.1/12345",
        };
        assert_eq!(context.timdex_record_id(), "dspace:1721.1-12345");
    }

    #[test]
    fn test_source_record_kind_mismatch() {
        let doc = roxmltree::Document::parse("<record/>").unwrap();
        let record = SourceRecord::Xml(doc.root_element());
        assert!(record.xml().is_ok());
        assert!(matches!(record.json(), Err(FieldError::Structural(_))));

        let map = Map::new();
        let record = SourceRecord::Json(&map);
        assert!(record.json().is_ok());
        assert!(record.xml().is_err());
    }
}
