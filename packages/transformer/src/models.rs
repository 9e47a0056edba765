//! Canonical record model.
//!
//! Every source family is normalized into [`Record`]. Optional attributes are
//! either absent or carry at least one meaningful value: values pass through
//! [`Record::apply`], which cleans blank strings, drops empty sub-entities and
//! turns empty containers into `None`.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use url::Url;

use crate::error::{FieldError, RecordError};

/// A canonical record attribute.
///
/// The four mandatory attributes come first, followed by the optional ones in
/// canonical (alphabetical) order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    Source,
    SourceLink,
    TimdexRecordId,
    Title,
    AlternateTitles,
    CallNumbers,
    Citation,
    ContentType,
    Contents,
    Contributors,
    Dates,
    Edition,
    FileFormats,
    Format,
    FundingInformation,
    Holdings,
    Identifiers,
    Languages,
    Links,
    LiteraryForm,
    Locations,
    Notes,
    Numbering,
    PhysicalDescription,
    Provider,
    PublicationFrequency,
    Publishers,
    RelatedItems,
    Rights,
    Subjects,
    Summary,
}

impl Field {
    /// Attributes every source must be able to produce.
    pub const MANDATORY: [Field; 4] = [
        Field::Source,
        Field::SourceLink,
        Field::TimdexRecordId,
        Field::Title,
    ];

    /// Optional attributes in canonical order.
    pub const OPTIONAL: [Field; 27] = [
        Field::AlternateTitles,
        Field::CallNumbers,
        Field::Citation,
        Field::ContentType,
        Field::Contents,
        Field::Contributors,
        Field::Dates,
        Field::Edition,
        Field::FileFormats,
        Field::Format,
        Field::FundingInformation,
        Field::Holdings,
        Field::Identifiers,
        Field::Languages,
        Field::Links,
        Field::LiteraryForm,
        Field::Locations,
        Field::Notes,
        Field::Numbering,
        Field::PhysicalDescription,
        Field::Provider,
        Field::PublicationFrequency,
        Field::Publishers,
        Field::RelatedItems,
        Field::Rights,
        Field::Subjects,
        Field::Summary,
    ];

    /// Check whether the attribute is mandatory.
    #[must_use]
    pub fn is_mandatory(self) -> bool {
        Self::MANDATORY.contains(&self)
    }
}

/// Value produced by a field handler.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Texts(Vec<String>),
    AlternateTitles(Vec<AlternateTitle>),
    Contributors(Vec<Contributor>),
    Dates(Vec<Date>),
    Funders(Vec<Funder>),
    Holdings(Vec<Holding>),
    Identifiers(Vec<Identifier>),
    Links(Vec<Link>),
    Locations(Vec<Location>),
    Notes(Vec<Note>),
    Publishers(Vec<Publisher>),
    RelatedItems(Vec<RelatedItem>),
    Rights(Vec<Rights>),
    Subjects(Vec<Subject>),
}

impl FieldValue {
    fn variant_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Texts(_) => "text list",
            Self::AlternateTitles(_) => "alternate titles",
            Self::Contributors(_) => "contributors",
            Self::Dates(_) => "dates",
            Self::Funders(_) => "funders",
            Self::Holdings(_) => "holdings",
            Self::Identifiers(_) => "identifiers",
            Self::Links(_) => "links",
            Self::Locations(_) => "locations",
            Self::Notes(_) => "notes",
            Self::Publishers(_) => "publishers",
            Self::RelatedItems(_) => "related items",
            Self::Rights(_) => "rights",
            Self::Subjects(_) => "subjects",
        }
    }

    /// Take the value as a single string, if it is one.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => clean_text(Some(text)),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.variant_name())
    }
}

/// Trim a string and drop it when blank.
fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Clean a list of strings; `None` when nothing meaningful remains.
fn clean_texts(values: Option<Vec<String>>) -> Option<Vec<String>> {
    let cleaned = dedupe(
        values?
            .into_iter()
            .filter_map(|v| clean_text(Some(v)))
            .collect(),
    );
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Remove duplicates, keeping the first occurrence of each item.
pub fn dedupe<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut unique: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

/// Normalization of a sub-entity before it enters a record.
trait Clean: Sized {
    /// Trim values; `None` when the entity has no meaningful content left.
    fn clean(self) -> Option<Self>;
}

fn clean_list<T: Clean + PartialEq>(items: Vec<T>) -> Option<Vec<T>> {
    let cleaned = dedupe(items.into_iter().filter_map(Clean::clean).collect());
    (!cleaned.is_empty()).then_some(cleaned)
}

/// A title other than the main one, such as a translated or uniform title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlternateTitle {
    /// The title text.
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl AlternateTitle {
    #[must_use]
    pub fn new(value: impl Into<String>, kind: Option<&str>) -> Self {
        Self {
            value: value.into(),
            kind: kind.map(String::from),
        }
    }
}

impl Clean for AlternateTitle {
    fn clean(self) -> Option<Self> {
        Some(Self {
            value: clean_text(Some(self.value))?,
            kind: clean_text(self.kind),
        })
    }
}

/// A person or organization credited on the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contributor {
    /// Name as given in the source.
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Set when the source marks the contributor as MIT-affiliated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mit_affiliated: Option<bool>,
}

impl Contributor {
    #[must_use]
    pub fn new(value: impl Into<String>, kind: Option<&str>) -> Self {
        Self {
            value: value.into(),
            kind: kind.map(String::from),
            ..Self::default()
        }
    }
}

impl Clean for Contributor {
    fn clean(self) -> Option<Self> {
        Some(Self {
            value: clean_text(Some(self.value))?,
            affiliation: clean_texts(self.affiliation),
            identifier: clean_texts(self.identifier),
            kind: clean_text(self.kind),
            mit_affiliated: self.mit_affiliated,
        })
    }
}

/// Bounds of a date range. A range carries `gt` or `gte` (not both) and `lt`
/// or `lte` (not both).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<String>,
}

impl DateRange {
    /// Inclusive range between two bounds.
    #[must_use]
    pub fn inclusive(gte: impl Into<String>, lte: impl Into<String>) -> Self {
        Self {
            gte: Some(gte.into()),
            lte: Some(lte.into()),
            ..Self::default()
        }
    }

    fn is_empty(&self) -> bool {
        self.gt.is_none() && self.gte.is_none() && self.lt.is_none() && self.lte.is_none()
    }

    fn check(&self) -> std::result::Result<(), String> {
        if self.is_empty() {
            return Err("range has no bounds".to_string());
        }
        if self.gt.is_some() && self.gte.is_some() {
            return Err(format!(
                "range may have a 'gt' or 'gte' value, but not both; received {self:?}"
            ));
        }
        if self.lt.is_some() && self.lte.is_some() {
            return Err(format!(
                "range may have a 'lt' or 'lte' value, but not both; received {self:?}"
            ));
        }
        Ok(())
    }
}

/// A date attached to the record, given as a single value or a range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Date {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<DateRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Date {
    /// Single-valued date.
    #[must_use]
    pub fn single(value: impl Into<String>, kind: Option<&str>) -> Self {
        Self {
            kind: kind.map(String::from),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Ranged date.
    #[must_use]
    pub fn ranged(range: DateRange, kind: Option<&str>) -> Self {
        Self {
            kind: kind.map(String::from),
            range: Some(range),
            ..Self::default()
        }
    }
}

impl Clean for Date {
    fn clean(self) -> Option<Self> {
        let range = self
            .range
            .map(|r| DateRange {
                gt: clean_text(r.gt),
                gte: clean_text(r.gte),
                lt: clean_text(r.lt),
                lte: clean_text(r.lte),
            })
            .filter(|r| !r.is_empty());
        let date = Self {
            kind: clean_text(self.kind),
            note: clean_text(self.note),
            range,
            value: clean_text(self.value),
        };
        (date.value.is_some() || date.range.is_some() || date.note.is_some()).then_some(date)
    }
}

/// Grant or award that funded the resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Funder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funder_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funder_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funder_identifier_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub award_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub award_uri: Option<String>,
}

impl Clean for Funder {
    fn clean(self) -> Option<Self> {
        let funder = Self {
            funder_name: clean_text(self.funder_name),
            funder_identifier: clean_text(self.funder_identifier),
            funder_identifier_type: clean_text(self.funder_identifier_type),
            award_number: clean_text(self.award_number),
            award_uri: clean_text(self.award_uri),
        };
        (funder != Self::default()).then_some(funder)
    }
}

/// A physical or electronic copy held by the library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Holding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Clean for Holding {
    fn clean(self) -> Option<Self> {
        let holding = Self {
            call_number: clean_text(self.call_number),
            collection: clean_text(self.collection),
            format: clean_text(self.format),
            location: clean_text(self.location),
            note: clean_text(self.note),
        };
        (holding != Self::default()).then_some(holding)
    }
}

/// A standard identifier (ISBN, DOI, OCLC number, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    /// The identifier as given, without normalization.
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Identifier {
    #[must_use]
    pub fn new(value: impl Into<String>, kind: Option<&str>) -> Self {
        Self {
            value: value.into(),
            kind: kind.map(String::from),
        }
    }
}

impl Clean for Identifier {
    fn clean(self) -> Option<Self> {
        Some(Self {
            value: clean_text(Some(self.value))?,
            kind: clean_text(self.kind),
        })
    }
}

/// A URL related to the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    /// Absolute URL.
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restrictions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Link {
    #[must_use]
    pub fn new(url: impl Into<String>, kind: Option<&str>, text: Option<&str>) -> Self {
        Self {
            url: url.into(),
            kind: kind.map(String::from),
            text: text.map(String::from),
            ..Self::default()
        }
    }
}

impl Clean for Link {
    fn clean(self) -> Option<Self> {
        Some(Self {
            url: clean_text(Some(self.url))?,
            kind: clean_text(self.kind),
            restrictions: clean_text(self.restrictions),
            text: clean_text(self.text),
        })
    }
}

/// A place, given by name, by geometry, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geoshape: Option<String>,
}

impl Location {
    #[must_use]
    pub fn named(value: impl Into<String>, kind: Option<&str>) -> Self {
        Self {
            value: Some(value.into()),
            kind: kind.map(String::from),
            geoshape: None,
        }
    }
}

impl Clean for Location {
    fn clean(self) -> Option<Self> {
        let location = Self {
            value: clean_text(self.value),
            kind: clean_text(self.kind),
            geoshape: clean_text(self.geoshape),
        };
        (location.value.is_some() || location.geoshape.is_some()).then_some(location)
    }
}

/// Free-text note, optionally typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    /// One or more paragraphs of note text.
    pub value: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Note {
    #[must_use]
    pub fn new(value: Vec<String>, kind: Option<&str>) -> Self {
        Self {
            value,
            kind: kind.map(String::from),
        }
    }
}

impl Clean for Note {
    fn clean(self) -> Option<Self> {
        Some(Self {
            value: clean_texts(Some(self.value))?,
            kind: clean_text(self.kind),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Publisher {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Publisher {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl Clean for Publisher {
    fn clean(self) -> Option<Self> {
        let publisher = Self {
            name: clean_text(self.name),
            date: clean_text(self.date),
            location: clean_text(self.location),
        };
        (publisher != Self::default()).then_some(publisher)
    }
}

/// Another resource the record relates to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelatedItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl Clean for RelatedItem {
    fn clean(self) -> Option<Self> {
        let item = Self {
            description: clean_text(self.description),
            item_type: clean_text(self.item_type),
            relationship: clean_text(self.relationship),
            uri: clean_text(self.uri),
        };
        (item.description.is_some() || item.uri.is_some()).then_some(item)
    }
}

/// Access or usage rights statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rights {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl Clean for Rights {
    fn clean(self) -> Option<Self> {
        let rights = Self {
            description: clean_text(self.description),
            kind: clean_text(self.kind),
            uri: clean_text(self.uri),
        };
        (rights.description.is_some() || rights.uri.is_some()).then_some(rights)
    }
}

/// Subject terms, optionally typed by vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    /// Terms; a heading with subdivisions keeps each part.
    pub value: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Subject {
    #[must_use]
    pub fn new(value: Vec<String>, kind: Option<&str>) -> Self {
        Self {
            value,
            kind: kind.map(String::from),
        }
    }
}

impl Clean for Subject {
    fn clean(self) -> Option<Self> {
        Some(Self {
            value: clean_texts(Some(self.value))?,
            kind: clean_text(self.kind),
        })
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Invariants of one entry of a list attribute.
trait Entry {
    fn check(&self) -> std::result::Result<(), String>;
}

fn check_kind(kind: Option<&str>) -> std::result::Result<(), String> {
    match kind {
        Some(kind) if is_blank(kind) => Err("entry has an empty kind".to_string()),
        _ => Ok(()),
    }
}

fn check_texts(name: &str, values: Option<&[String]>) -> std::result::Result<(), String> {
    match values {
        Some([]) => Err(format!("'{name}' is present but empty")),
        Some(values) if values.iter().any(|v| is_blank(v)) => {
            Err(format!("'{name}' contains a blank value"))
        }
        _ => Ok(()),
    }
}

/// Entries that must carry at least one value.
fn require(present: bool, what: &str) -> std::result::Result<(), String> {
    if present {
        Ok(())
    } else {
        Err(format!("entry has no {what}"))
    }
}

impl Entry for String {
    fn check(&self) -> std::result::Result<(), String> {
        require(!is_blank(self), "value")
    }
}

impl Entry for AlternateTitle {
    fn check(&self) -> std::result::Result<(), String> {
        require(!is_blank(&self.value), "value")?;
        check_kind(self.kind.as_deref())
    }
}

impl Entry for Contributor {
    fn check(&self) -> std::result::Result<(), String> {
        require(!is_blank(&self.value), "value")?;
        check_texts("affiliation", self.affiliation.as_deref())?;
        check_texts("identifier", self.identifier.as_deref())?;
        check_kind(self.kind.as_deref())
    }
}

impl Entry for Date {
    fn check(&self) -> std::result::Result<(), String> {
        require(
            self.value.is_some() || self.range.is_some() || self.note.is_some(),
            "value, range or note",
        )?;
        if let Some(range) = &self.range {
            range.check()?;
        }
        check_kind(self.kind.as_deref())
    }
}

impl Entry for Funder {
    fn check(&self) -> std::result::Result<(), String> {
        require(*self != Self::default(), "values")
    }
}

impl Entry for Holding {
    fn check(&self) -> std::result::Result<(), String> {
        require(*self != Self::default(), "values")
    }
}

impl Entry for Identifier {
    fn check(&self) -> std::result::Result<(), String> {
        require(!is_blank(&self.value), "value")?;
        check_kind(self.kind.as_deref())
    }
}

impl Entry for Link {
    fn check(&self) -> std::result::Result<(), String> {
        require(!is_blank(&self.url), "url")?;
        check_kind(self.kind.as_deref())
    }
}

impl Entry for Location {
    fn check(&self) -> std::result::Result<(), String> {
        require(
            self.value.is_some() || self.geoshape.is_some(),
            "value or geoshape",
        )?;
        check_kind(self.kind.as_deref())
    }
}

impl Entry for Note {
    fn check(&self) -> std::result::Result<(), String> {
        check_texts("value", Some(self.value.as_slice()))?;
        check_kind(self.kind.as_deref())
    }
}

impl Entry for Publisher {
    fn check(&self) -> std::result::Result<(), String> {
        require(*self != Self::default(), "values")
    }
}

impl Entry for RelatedItem {
    fn check(&self) -> std::result::Result<(), String> {
        require(
            self.description.is_some() || self.uri.is_some(),
            "description or uri",
        )
    }
}

impl Entry for Rights {
    fn check(&self) -> std::result::Result<(), String> {
        require(
            self.description.is_some() || self.uri.is_some(),
            "description or uri",
        )?;
        check_kind(self.kind.as_deref())
    }
}

impl Entry for Subject {
    fn check(&self) -> std::result::Result<(), String> {
        check_texts("value", Some(self.value.as_slice()))?;
        check_kind(self.kind.as_deref())
    }
}

/// A list attribute is absent or holds only valid entries.
fn check_list<T: Entry>(
    field: Field,
    items: &Option<Vec<T>>,
) -> std::result::Result<(), RecordError> {
    let Some(items) = items else {
        return Ok(());
    };
    if items.is_empty() {
        return Err(RecordError::Validation(format!(
            "'{field}' is present but empty"
        )));
    }
    items
        .iter()
        .try_for_each(Entry::check)
        .map_err(|e| RecordError::Validation(format!("'{field}': {e}")))
}

/// The canonical record every source is transformed into.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Human-readable source name.
    pub source: String,
    /// Link back to the record in the source system.
    pub source_link: String,
    /// `<source>:<source record id>`, unique per source.
    pub timdex_record_id: String,
    /// Main title; never blank.
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_titles: Option<Vec<AlternateTitle>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_numbers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contributors: Option<Vec<Contributor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dates: Option<Vec<Date>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_formats: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_information: Option<Vec<Funder>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holdings: Option<Vec<Holding>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifiers: Option<Vec<Identifier>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literary_form: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<Location>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<Note>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numbering: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_frequency: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publishers: Option<Vec<Publisher>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_items: Option<Vec<RelatedItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rights: Option<Vec<Rights>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<Subject>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Vec<String>>,
}

fn mismatch(field: Field, value: &FieldValue) -> FieldError {
    FieldError::Extraction(format!("handler returned {value} for '{field}'"))
}

impl Record {
    /// Set an attribute from a handler value.
    ///
    /// Blank values leave the attribute absent. A value of the wrong shape for
    /// the attribute is reported as an extraction error.
    pub fn apply(&mut self, field: Field, value: FieldValue) -> std::result::Result<(), FieldError> {
        use FieldValue as V;

        match (field, value) {
            (Field::Source, V::Text(v)) => self.source = clean_text(Some(v)).unwrap_or_default(),
            (Field::SourceLink, V::Text(v)) => {
                self.source_link = clean_text(Some(v)).unwrap_or_default();
            }
            (Field::TimdexRecordId, V::Text(v)) => {
                self.timdex_record_id = clean_text(Some(v)).unwrap_or_default();
            }
            (Field::Title, V::Text(v)) => self.title = clean_text(Some(v)).unwrap_or_default(),

            (Field::Citation, V::Text(v)) => self.citation = clean_text(Some(v)),
            (Field::Edition, V::Text(v)) => self.edition = clean_text(Some(v)),
            (Field::Format, V::Text(v)) => self.format = clean_text(Some(v)),
            (Field::LiteraryForm, V::Text(v)) => self.literary_form = clean_text(Some(v)),
            (Field::Numbering, V::Text(v)) => self.numbering = clean_text(Some(v)),
            (Field::PhysicalDescription, V::Text(v)) => {
                self.physical_description = clean_text(Some(v));
            }
            (Field::Provider, V::Text(v)) => self.provider = clean_text(Some(v)),

            (Field::CallNumbers, V::Texts(v)) => self.call_numbers = clean_texts(Some(v)),
            (Field::ContentType, V::Texts(v)) => self.content_type = clean_texts(Some(v)),
            (Field::Contents, V::Texts(v)) => self.contents = clean_texts(Some(v)),
            (Field::FileFormats, V::Texts(v)) => self.file_formats = clean_texts(Some(v)),
            (Field::Languages, V::Texts(v)) => self.languages = clean_texts(Some(v)),
            (Field::PublicationFrequency, V::Texts(v)) => {
                self.publication_frequency = clean_texts(Some(v));
            }
            (Field::Summary, V::Texts(v)) => self.summary = clean_texts(Some(v)),

            (Field::AlternateTitles, V::AlternateTitles(v)) => {
                self.alternate_titles = clean_list(v);
            }
            (Field::Contributors, V::Contributors(v)) => self.contributors = clean_list(v),
            (Field::Dates, V::Dates(v)) => self.dates = clean_list(v),
            (Field::FundingInformation, V::Funders(v)) => {
                self.funding_information = clean_list(v);
            }
            (Field::Holdings, V::Holdings(v)) => self.holdings = clean_list(v),
            (Field::Identifiers, V::Identifiers(v)) => self.identifiers = clean_list(v),
            (Field::Links, V::Links(v)) => self.links = clean_list(v),
            (Field::Locations, V::Locations(v)) => self.locations = clean_list(v),
            (Field::Notes, V::Notes(v)) => self.notes = clean_list(v),
            (Field::Publishers, V::Publishers(v)) => self.publishers = clean_list(v),
            (Field::RelatedItems, V::RelatedItems(v)) => self.related_items = clean_list(v),
            (Field::Rights, V::Rights(v)) => self.rights = clean_list(v),
            (Field::Subjects, V::Subjects(v)) => self.subjects = clean_list(v),

            (field, value) => return Err(mismatch(field, &value)),
        }
        Ok(())
    }

    /// Append dates, keeping existing ones first.
    pub fn extend_dates(&mut self, extra: Vec<Date>) {
        let mut dates = self.dates.take().unwrap_or_default();
        dates.extend(extra);
        self.dates = clean_list(dates);
    }

    /// Append locations, keeping existing ones first.
    pub fn extend_locations(&mut self, extra: Vec<Location>) {
        let mut locations = self.locations.take().unwrap_or_default();
        locations.extend(extra);
        self.locations = clean_list(locations);
    }

    /// Check the record against the model invariants.
    ///
    /// # Errors
    /// Returns `RecordError::Validation` naming the first violated invariant.
    pub fn validate(&self) -> std::result::Result<(), RecordError> {
        for (field, value) in [
            (Field::Source, &self.source),
            (Field::SourceLink, &self.source_link),
            (Field::TimdexRecordId, &self.timdex_record_id),
            (Field::Title, &self.title),
        ] {
            if value.trim().is_empty() {
                return Err(RecordError::Validation(format!(
                    "mandatory attribute '{field}' is missing"
                )));
            }
        }

        match Url::parse(&self.source_link) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(RecordError::Validation(format!(
                    "source_link '{}' is not an http(s) URL",
                    self.source_link
                )))
            }
        }

        for (field, value) in [
            (Field::Citation, &self.citation),
            (Field::Edition, &self.edition),
            (Field::Format, &self.format),
            (Field::LiteraryForm, &self.literary_form),
            (Field::Numbering, &self.numbering),
            (Field::PhysicalDescription, &self.physical_description),
            (Field::Provider, &self.provider),
        ] {
            if value.as_deref().is_some_and(is_blank) {
                return Err(RecordError::Validation(format!(
                    "'{field}' is present but blank"
                )));
            }
        }

        check_list(Field::AlternateTitles, &self.alternate_titles)?;
        check_list(Field::CallNumbers, &self.call_numbers)?;
        check_list(Field::ContentType, &self.content_type)?;
        check_list(Field::Contents, &self.contents)?;
        check_list(Field::Contributors, &self.contributors)?;
        check_list(Field::Dates, &self.dates)?;
        check_list(Field::FileFormats, &self.file_formats)?;
        check_list(Field::FundingInformation, &self.funding_information)?;
        check_list(Field::Holdings, &self.holdings)?;
        check_list(Field::Identifiers, &self.identifiers)?;
        check_list(Field::Languages, &self.languages)?;
        check_list(Field::Links, &self.links)?;
        check_list(Field::Locations, &self.locations)?;
        check_list(Field::Notes, &self.notes)?;
        check_list(Field::PublicationFrequency, &self.publication_frequency)?;
        check_list(Field::Publishers, &self.publishers)?;
        check_list(Field::RelatedItems, &self.related_items)?;
        check_list(Field::Rights, &self.rights)?;
        check_list(Field::Subjects, &self.subjects)?;
        check_list(Field::Summary, &self.summary)?;

        Ok(())
    }
}
