//! Configuration constants, the source table and runtime settings.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::{Result, TransformError};

/// Number of records between progress reports.
pub const DEFAULT_STATUS_UPDATE_INTERVAL: usize = 1000;

/// Base URL for geospatial record pages.
pub const GEODATA_BASE_URL: &str = "https://geodata.libraries.mit.edu/record/";

/// Serialization of the raw records a source delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// An XML container holding `<record>` elements.
    Xml,
    /// One JSON object per line.
    JsonLines,
}

/// A configured source, identified by its label.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SourceName {
    Alma,
    Aspace,
    Dspace,
    Gismit,
    Gisogm,
    Jpal,
    Libguides,
    Researchdatabases,
    Whoas,
    Zenodo,
}

/// Static description of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceConfig {
    /// Short label used in record identifiers (e.g. "alma").
    pub label: &'static str,
    /// Display name stored in the canonical `source` attribute.
    pub name: &'static str,
    /// Prefix for default source links; `None` when the source builds its own.
    pub base_url: Option<&'static str>,
    /// Serialization of the input records.
    pub format: InputFormat,
}

impl SourceName {
    /// Look up a source by label.
    ///
    /// # Errors
    /// Returns `TransformError::UnknownSource` listing the valid labels.
    ///
    /// # Examples
    /// ```
    /// use crosswalk_transformer::config::SourceName;
    ///
    /// assert_eq!(SourceName::from_label("aspace").unwrap(), SourceName::Aspace);
    /// assert!(SourceName::from_label("nope").is_err());
    /// ```
    pub fn from_label(label: &str) -> Result<Self> {
        label.parse().map_err(|_| {
            let known: Vec<String> = Self::iter().map(|s| s.to_string()).collect();
            TransformError::UnknownSource(label.to_string(), known.join(", "))
        })
    }

    /// Static configuration for this source.
    #[must_use]
    pub fn config(self) -> SourceConfig {
        let (name, base_url, format) = match self {
            Self::Alma => (
                "MIT Alma",
                Some("https://mit.primo.exlibrisgroup.com/discovery/fulldisplay?vid=01MIT_INST:MIT&docid=alma"),
                InputFormat::Xml,
            ),
            Self::Aspace => (
                "MIT ArchivesSpace",
                Some("https://archivesspace.mit.edu/"),
                InputFormat::Xml,
            ),
            Self::Dspace => (
                "DSpace@MIT",
                Some("https://dspace.mit.edu/handle/"),
                InputFormat::Xml,
            ),
            Self::Gismit => ("MIT GIS Resources", None, InputFormat::JsonLines),
            Self::Gisogm => (
                "OpenGeoMetadata GIS Resources",
                None,
                InputFormat::JsonLines,
            ),
            Self::Jpal => (
                "Abdul Latif Jameel Poverty Action Lab Dataverse",
                Some("https://dataverse.harvard.edu/dataset.xhtml?persistentId="),
                InputFormat::Xml,
            ),
            Self::Libguides => (
                "LibGuides",
                Some("https://libguides.mit.edu/"),
                InputFormat::Xml,
            ),
            Self::Researchdatabases => (
                "Research Databases",
                Some("https://libguides.mit.edu/"),
                InputFormat::Xml,
            ),
            Self::Whoas => (
                "Woods Hole Open Access Server",
                Some("https://darchive.mblwhoilibrary.org/handle/"),
                InputFormat::Xml,
            ),
            Self::Zenodo => (
                "Zenodo",
                Some("https://zenodo.org/record/"),
                InputFormat::Xml,
            ),
        };
        SourceConfig {
            label: self.into(),
            name,
            base_url,
            format,
        }
    }
}

/// Settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Exception reporting endpoint; `None` disables reporting.
    pub sentry_dsn: Option<String>,
    /// Deployment tag (e.g. "dev", "prod").
    pub workspace: Option<String>,
    /// Records between progress reports.
    pub status_update_interval: usize,
    /// Log targets capped at warn level.
    pub warning_only_loggers: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            sentry_dsn: None,
            workspace: None,
            status_update_interval: DEFAULT_STATUS_UPDATE_INTERVAL,
            warning_only_loggers: Vec::new(),
        }
    }
}

impl RuntimeConfig {
    /// Read settings from the process environment.
    ///
    /// # Errors
    /// Returns `TransformError::Configuration` for malformed values.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through a lookup function.
    ///
    /// # Errors
    /// Returns `TransformError::Configuration` for malformed values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let sentry_dsn = lookup("SENTRY_DSN")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("none"));

        let workspace = lookup("WORKSPACE").filter(|v| !v.trim().is_empty());

        let status_update_interval = match lookup("STATUS_UPDATE_INTERVAL") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    TransformError::Configuration(format!(
                        "STATUS_UPDATE_INTERVAL must be a positive integer, got '{raw}'"
                    ))
                })?,
            None => DEFAULT_STATUS_UPDATE_INTERVAL,
        };

        let warning_only_loggers = lookup("WARNING_ONLY_LOGGERS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            sentry_dsn,
            workspace,
            status_update_interval,
            warning_only_loggers,
        })
    }
}

/// Harvest file naming convention:
/// `<source>-<YYYY-MM-DD>-<run-type>-<stage>-records-to-<action>[_NN].<ext>`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static RUN_FILENAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<source>[\w\-]+?)-(?P<date>\d{4}-\d{2}-\d{2})-(?P<run_type>\w+)-(?P<stage>\w+)-records-to-(?P<action>.+?)(?:_(?P<index>\d+))?\.(?P<ext>\w+)$",
    )
    .expect("valid regex")
});

/// Date and type of a run, taken from the input file name when possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunData {
    pub run_date: NaiveDate,
    pub run_type: Option<String>,
}

impl RunData {
    /// Derive run data from an input file name.
    ///
    /// # Examples
    /// ```
    /// use crosswalk_transformer::config::RunData;
    ///
    /// let run = RunData::from_filename("libguides-2024-06-03-full-extracted-records-to-index.xml");
    /// assert_eq!(run.run_date.to_string(), "2024-06-03");
    /// assert_eq!(run.run_type.as_deref(), Some("full"));
    /// ```
    #[must_use]
    pub fn from_filename(path: &str) -> Self {
        let filename = path.rsplit(['/', '\\']).next().unwrap_or(path);
        RUN_FILENAME_PATTERN
            .captures(filename)
            .and_then(|caps| {
                let run_date = NaiveDate::parse_from_str(&caps["date"], "%Y-%m-%d").ok()?;
                Some(Self {
                    run_date,
                    run_type: Some(caps["run_type"].to_string()),
                })
            })
            .unwrap_or_else(|| Self {
                run_date: chrono::Local::now().date_naive(),
                run_type: None,
            })
    }
}
