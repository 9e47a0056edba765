//! Date parsing, validation and normalization.
//!
//! Accepted date formats mirror the search index date formats: `YYYY`,
//! `YYYY-MM`, `YY-MM`, `YY-MM-DD`, `YYYY-MM-DD`, `YYMMDD`, `YYYYMMDD`,
//! `MM/DD/YY`, `MM/DD/YYYY` and `YYYY/MM/DD`. The dash-separated forms may be
//! followed by `THH[:MM[:SS[.ffffff]]][Z]`.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::{Captures, Regex};
use tracing::warn;

use crate::models::{Date, DateRange};

/// Date part pattern and whether a time suffix may follow it.
struct DatePattern {
    regex: Regex,
    allows_time: bool,
}

#[allow(clippy::expect_used)] // Static regexes that are guaranteed to be valid
static DATE_PATTERNS: LazyLock<Vec<DatePattern>> = LazyLock::new(|| {
    [
        (r"^(?P<y4>\d{4})$", true),
        (r"^(?P<y2>\d{2})$", true),
        (r"^(?P<y4>\d{4})-(?P<m>\d{1,2})$", true),
        (r"^(?P<y2>\d{2})-(?P<m>\d{1,2})$", true),
        (r"^(?P<y2>\d{2})-(?P<m>\d{1,2})-(?P<d>\d{1,2})$", true),
        (r"^(?P<y4>\d{4})-(?P<m>\d{1,2})-(?P<d>\d{1,2})$", true),
        (r"^(?P<y2>\d{2})(?P<m>\d{2})(?P<d>\d{2})$", false),
        (r"^(?P<y4>\d{4})(?P<m>\d{2})(?P<d>\d{2})$", false),
        (r"^(?P<m>\d{1,2})/(?P<d>\d{1,2})/(?P<y2>\d{2})$", false),
        (r"^(?P<m>\d{1,2})/(?P<d>\d{1,2})/(?P<y4>\d{4})$", false),
        (r"^(?P<y4>\d{4})/(?P<m>\d{1,2})/(?P<d>\d{1,2})$", false),
    ]
    .into_iter()
    .map(|(pattern, allows_time)| DatePattern {
        regex: Regex::new(pattern).expect("valid regex"),
        allows_time,
    })
    .collect()
});

/// Time suffix: `HH[:MM[:SS[.ffffff]]][Z]`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<h>\d{1,2})(?::(?P<mi>\d{1,2})(?::(?P<s>\d{1,2})(?:\.(?P<f>\d{1,6}))?)?)?Z?$")
        .expect("valid regex")
});

/// Two four-digit years separated by a dash, e.g. `1905-2012`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static YEAR_SPAN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<start>\d{4})\s*-\s*(?P<end>\d{4})$").expect("valid regex")
});

/// Solr range syntax, e.g. `[1943 TO 1946]`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SOLR_RANGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[\s*(?P<start>\S+)\s+TO\s+(?P<end>\S+)\s*\]$").expect("valid regex")
});

/// Comparator-prefixed bound, e.g. `>=1900`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static COMPARATOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<op>>=|<=|>|<)\s*(?P<bound>\S.*)$").expect("valid regex")
});

/// Strings built only from date punctuation and digits are treated as
/// attempted dates; anything else is free text.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_SHAPED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9?/:.\-\sTZ\[\]*<>=]*[0-9][0-9?/:.\-\sTZ\[\]*<>=]*$").expect("valid regex")
});

fn capture_u32(caps: &Captures<'_>, name: &str) -> Option<u32> {
    caps.name(name).and_then(|m| m.as_str().parse().ok())
}

/// Expand a two-digit year the way `strptime` does (69-99 -> 1900s).
fn expand_two_digit_year(year: i32) -> i32 {
    if year < 69 {
        2000 + year
    } else {
        1900 + year
    }
}

fn parse_date_part(value: &str, with_time: bool) -> Option<NaiveDate> {
    let pattern = DATE_PATTERNS
        .iter()
        .filter(|p| p.allows_time || !with_time)
        .find(|p| p.regex.is_match(value))?;
    let caps = pattern.regex.captures(value)?;

    // A bare two-digit year is only a date when a time follows it.
    if !with_time && caps.name("y2").is_some() && caps.name("m").is_none() {
        return None;
    }

    let year = match (caps.name("y4"), caps.name("y2")) {
        (Some(y), _) => y.as_str().parse().ok()?,
        (None, Some(y)) => expand_two_digit_year(y.as_str().parse().ok()?),
        (None, None) => return None,
    };
    let month = capture_u32(&caps, "m").unwrap_or(1);
    let day = capture_u32(&caps, "d").unwrap_or(1);

    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_time_part(value: &str) -> Option<NaiveTime> {
    let caps = TIME_PATTERN.captures(value)?;
    let hour = capture_u32(&caps, "h")?;
    let minute = capture_u32(&caps, "mi").unwrap_or(0);
    let second = capture_u32(&caps, "s").unwrap_or(0);
    let micro = caps
        .name("f")
        .map(|f| format!("{:0<6}", f.as_str()))
        .and_then(|f| f.parse().ok())
        .unwrap_or(0);

    NaiveTime::from_hms_micro_opt(hour, minute, second, micro)
}

/// Parse a date string in one of the accepted formats.
///
/// # Returns
/// The parsed date (at midnight when no time is given), or `None` when the
/// string matches no accepted format or names an impossible date.
///
/// # Examples
/// ```
/// use crosswalk_transformer::dates::parse_date;
///
/// assert!(parse_date("2020").is_some());
/// assert!(parse_date("2020-02-29T10:30Z").is_some());
/// assert!(parse_date("2021-02-29").is_none());
/// assert!(parse_date("circa 1900").is_none());
/// ```
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    match value.split_once('T') {
        Some((date, time)) => {
            let date = parse_date_part(date, true)?;
            let time = parse_time_part(time)?;
            Some(date.and_time(time))
        }
        None => parse_date_part(value, false).map(|d| d.and_time(NaiveTime::MIN)),
    }
}

/// Check that a date string parses, logging the rejected value.
pub fn validate_date(value: &str, record_id: &str) -> bool {
    if parse_date(value).is_some() {
        return true;
    }
    warn!(record_id, date = value, "Record has a date that couldn't be parsed");
    false
}

/// Check that both ends of a range parse and the start is not after the end.
pub fn validate_date_range(start: &str, end: &str, record_id: &str) -> bool {
    match (parse_date(start), parse_date(end)) {
        (Some(s), Some(e)) if s <= e => true,
        (Some(_), Some(_)) => {
            warn!(
                record_id,
                start, end, "Record has a later start date than end date"
            );
            false
        }
        _ => {
            warn!(
                record_id,
                start, end, "Record has invalid values in a date range"
            );
            false
        }
    }
}

/// Classification of a raw date string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedDate {
    /// A single parseable date, kept verbatim.
    Single(String),
    /// A validated range.
    Range(DateRange),
    /// Free text that is not an attempt at a date.
    Text(String),
}

impl NormalizedDate {
    /// Convert into a canonical [`Date`] with the given kind.
    ///
    /// Free text lands in the date's note, never in its value or range.
    #[must_use]
    pub fn into_date(self, kind: Option<&str>) -> Date {
        match self {
            Self::Single(value) => Date::single(value, kind),
            Self::Range(range) => Date::ranged(range, kind),
            Self::Text(note) => Date {
                kind: kind.map(String::from),
                note: Some(note),
                ..Date::default()
            },
        }
    }
}

/// Open bounds in intervals and Solr ranges.
fn is_open_bound(bound: &str) -> bool {
    bound.is_empty() || bound == "*" || bound == ".."
}

fn inclusive_range(start: &str, end: &str, record_id: &str) -> Option<NormalizedDate> {
    let start = start.trim();
    let end = end.trim();
    match (is_open_bound(start), is_open_bound(end)) {
        (true, true) => None,
        (false, true) => validate_date(start, record_id).then(|| {
            NormalizedDate::Range(DateRange {
                gte: Some(start.to_string()),
                ..DateRange::default()
            })
        }),
        (true, false) => validate_date(end, record_id).then(|| {
            NormalizedDate::Range(DateRange {
                lte: Some(end.to_string()),
                ..DateRange::default()
            })
        }),
        (false, false) => validate_date_range(start, end, record_id)
            .then(|| NormalizedDate::Range(DateRange::inclusive(start, end))),
    }
}

/// Classify and validate a raw date string.
///
/// Recognized shapes, in order: Solr ranges (`[a TO b]`), ISO intervals
/// (`a/b`, either side may be open), year spans (`YYYY-YYYY`),
/// comparator-prefixed bounds (`>`, `>=`, `<`, `<=`) and single dates.
/// Strings that look like dates but fail to parse are dropped; anything else
/// is returned as [`NormalizedDate::Text`].
///
/// # Examples
/// ```
/// use crosswalk_transformer::dates::{normalize_date, NormalizedDate};
/// use crosswalk_transformer::models::DateRange;
///
/// assert_eq!(
///     normalize_date("1905-2012", "rec1"),
///     Some(NormalizedDate::Range(DateRange::inclusive("1905", "2012")))
/// );
/// assert_eq!(
///     normalize_date("circa sometime", "rec1"),
///     Some(NormalizedDate::Text("circa sometime".to_string()))
/// );
/// assert_eq!(normalize_date("1933?", "rec1"), None);
/// ```
pub fn normalize_date(raw: &str, record_id: &str) -> Option<NormalizedDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(caps) = SOLR_RANGE_PATTERN.captures(value) {
        return inclusive_range(&caps["start"], &caps["end"], record_id);
    }

    if let Some((start, end)) = value.split_once('/') {
        // MM/DD/YY style dates also contain slashes.
        if parse_date(value).is_none() {
            return inclusive_range(start, end, record_id);
        }
    }

    if let Some(caps) = YEAR_SPAN_PATTERN.captures(value) {
        return inclusive_range(&caps["start"], &caps["end"], record_id);
    }

    if let Some(caps) = COMPARATOR_PATTERN.captures(value) {
        let bound = caps["bound"].trim().to_string();
        if !validate_date(&bound, record_id) {
            return None;
        }
        let range = match &caps["op"] {
            ">" => DateRange {
                gt: Some(bound),
                ..DateRange::default()
            },
            ">=" => DateRange {
                gte: Some(bound),
                ..DateRange::default()
            },
            "<" => DateRange {
                lt: Some(bound),
                ..DateRange::default()
            },
            _ => DateRange {
                lte: Some(bound),
                ..DateRange::default()
            },
        };
        return Some(NormalizedDate::Range(range));
    }

    if parse_date(value).is_some() {
        return Some(NormalizedDate::Single(value.to_string()));
    }

    if DATE_SHAPED_PATTERN.is_match(value) {
        warn!(record_id, date = value, "Dropping unparseable date");
        return None;
    }

    Some(NormalizedDate::Text(value.to_string()))
}
