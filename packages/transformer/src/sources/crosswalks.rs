//! Code and label crosswalks used by the source extraction modules.
//!
//! Each table maps a source vocabulary term to its canonical label. Lookups
//! that miss are logged at debug level with the record identifier so source
//! data problems can be traced without failing the record.

use tracing::debug;

/// An entry of a Library of Congress code list.
struct LocCode {
    code: &'static str,
    name: &'static str,
    obsolete: bool,
}

const fn current(code: &'static str, name: &'static str) -> LocCode {
    LocCode {
        code,
        name,
        obsolete: false,
    }
}

const fn obsolete(code: &'static str, name: &'static str) -> LocCode {
    LocCode {
        code,
        name,
        obsolete: true,
    }
}

/// MARC language codes.
static LANGUAGE_CODES: &[LocCode] = &[
    current("abk", "Abkhaz"),
    current("ace", "Achinese"),
    current("afr", "Afrikaans"),
    current("ara", "Arabic"),
    current("art", "Artificial (Other)"),
    current("ben", "Bengali"),
    current("bul", "Bulgarian"),
    current("cat", "Catalan"),
    current("chi", "Chinese"),
    current("cze", "Czech"),
    current("dan", "Danish"),
    current("dut", "Dutch"),
    current("eng", "English"),
    current("epo", "Esperanto"),
    current("fin", "Finnish"),
    current("fre", "French"),
    current("ger", "German"),
    current("gre", "Greek, Modern (1453- )"),
    current("grc", "Greek, Ancient (to 1453)"),
    current("heb", "Hebrew"),
    current("hin", "Hindi"),
    current("hun", "Hungarian"),
    current("ice", "Icelandic"),
    current("ind", "Indonesian"),
    current("ita", "Italian"),
    current("jpn", "Japanese"),
    current("kor", "Korean"),
    current("lat", "Latin"),
    current("mul", "Multiple languages"),
    current("nor", "Norwegian"),
    current("per", "Persian"),
    current("pol", "Polish"),
    current("por", "Portuguese"),
    current("rum", "Romanian"),
    current("rus", "Russian"),
    current("spa", "Spanish"),
    current("swe", "Swedish"),
    current("tha", "Thai"),
    current("tur", "Turkish"),
    current("ukr", "Ukrainian"),
    current("und", "Undetermined"),
    current("urd", "Urdu"),
    current("vie", "Vietnamese"),
    current("yid", "Yiddish"),
    current("zxx", "No linguistic content"),
    obsolete("ajm", "Aljamía"),
    obsolete("esk", "Eskimo languages"),
    obsolete("esp", "Esperanto"),
    obsolete("far", "Faroese"),
    obsolete("scc", "Serbian"),
    obsolete("scr", "Croatian"),
    obsolete("tag", "Tagalog"),
];

/// MARC country codes.
static COUNTRY_CODES: &[LocCode] = &[
    current("at", "Australia"),
    current("au", "Austria"),
    current("be", "Belgium"),
    current("bl", "Brazil"),
    current("cau", "California"),
    current("cc", "China"),
    current("ch", "China (Republic : 1949- )"),
    current("ctu", "Connecticut"),
    current("dcu", "District of Columbia"),
    current("dk", "Denmark"),
    current("enk", "England"),
    current("fi", "Finland"),
    current("fr", "France"),
    current("gw", "Germany"),
    current("gr", "Greece"),
    current("ie", "Ireland"),
    current("ii", "India"),
    current("ilu", "Illinois"),
    current("is", "Israel"),
    current("it", "Italy"),
    current("ja", "Japan"),
    current("ko", "Korea (South)"),
    current("mau", "Massachusetts"),
    current("mdu", "Maryland"),
    current("miu", "Michigan"),
    current("mx", "Mexico"),
    current("ne", "Netherlands"),
    current("nju", "New Jersey"),
    current("no", "Norway"),
    current("nyu", "New York (State)"),
    current("pau", "Pennsylvania"),
    current("pl", "Poland"),
    current("po", "Portugal"),
    current("riu", "Rhode Island"),
    current("ru", "Russia (Federation)"),
    current("si", "Singapore"),
    current("sp", "Spain"),
    current("stk", "Scotland"),
    current("sw", "Sweden"),
    current("sz", "Switzerland"),
    current("txu", "Texas"),
    current("vau", "Virginia"),
    current("vm", "Vietnam"),
    current("wau", "Washington (State)"),
    current("xxc", "Canada"),
    current("xxk", "United Kingdom"),
    current("xxu", "United States"),
    obsolete("cs", "Czechoslovakia"),
    obsolete("ge", "Germany (East)"),
    obsolete("ur", "Soviet Union"),
    obsolete("us", "United States"),
    obsolete("vn", "Vietnam, North"),
    obsolete("ys", "Yemen (People's Democratic Republic)"),
];

fn loc_code_to_name(
    table: &[LocCode],
    code: &str,
    record_id: &str,
    code_type: &str,
) -> Option<&'static str> {
    let Some(entry) = table.iter().find(|entry| entry.code == code) else {
        debug!(record_id, code, code_type, "Record uses an invalid code");
        return None;
    };
    if entry.obsolete {
        debug!(record_id, code, code_type, "Record uses an obsolete code");
    }
    Some(entry.name)
}

/// Name of a MARC language code.
///
/// # Examples
/// ```
/// use crosswalk_transformer::sources::crosswalks::language_name;
///
/// assert_eq!(language_name("eng", "rec1"), Some("English"));
/// assert_eq!(language_name("xyz", "rec1"), None);
/// ```
#[must_use]
pub fn language_name(code: &str, record_id: &str) -> Option<&'static str> {
    loc_code_to_name(LANGUAGE_CODES, code, record_id, "language")
}

/// Name of a MARC country code. Obsolete codes still resolve.
#[must_use]
pub fn country_name(code: &str, record_id: &str) -> Option<&'static str> {
    loc_code_to_name(COUNTRY_CODES, code, record_id, "country")
}

fn table_lookup(
    table: &[(&'static str, &'static str)],
    code: &str,
    record_id: &str,
    field: &str,
) -> Option<&'static str> {
    let name = table
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, name)| *name);
    if name.is_none() {
        debug!(record_id, field, code, "Record uses an invalid code");
    }
    name
}

/// Leader/06 "type of record" values.
static MARC_CONTENT_TYPES: &[(&str, &str)] = &[
    ("a", "Language material"),
    ("c", "Notated music"),
    ("d", "Manuscript notated music"),
    ("e", "Cartographic material"),
    ("f", "Manuscript cartographic material"),
    ("g", "Projected medium"),
    ("i", "Nonmusical sound recording"),
    ("j", "Musical sound recording"),
    ("k", "Two-dimensional nonprojectable graphic"),
    ("m", "Computer file"),
    ("o", "Kit"),
    ("p", "Mixed materials"),
    ("r", "Three-dimensional artifact or naturally occurring object"),
    ("t", "Manuscript language material"),
];

/// Content type for a MARC leader/06 code.
#[must_use]
pub fn marc_content_type(code: &str, record_id: &str) -> Option<&'static str> {
    table_lookup(MARC_CONTENT_TYPES, code, record_id, "Leader/06")
}

static HOLDINGS_COLLECTIONS: &[(&str, &str)] = &[
    ("ARC", "Archives"),
    ("BAK", "Baker Library"),
    ("BRD", "Barker Reference"),
    ("DEW", "Dewey Library"),
    ("GEN", "Stacks"),
    ("HUM", "Hayden Library"),
    ("LSA", "Library Storage Annex"),
    ("MUS", "Lewis Music Library"),
    ("NOC", "Noncirculating Collection"),
    ("OCC", "Off Campus Collection"),
    ("RTC", "Rotch Library"),
    ("SCI", "Science Library"),
];

static HOLDINGS_FORMATS: &[(&str, &str)] = &[
    ("BOOK", "Print volume"),
    ("CDROM", "CD-ROM"),
    ("DVD", "DVD"),
    ("ISSBD", "Print volume"),
    ("MAP", "Map"),
    ("MFICHE", "Microfiche"),
    ("MFILM", "Microfilm"),
    ("SCORE", "Musical score"),
    ("THESIS", "Thesis"),
];

static HOLDINGS_LOCATIONS: &[(&str, &str)] = &[
    ("ARC", "Distinctive Collections"),
    ("BAKER", "Barker Library"),
    ("DEWEY", "Dewey Library"),
    ("HAYDEN", "Hayden Library"),
    ("LSA4", "Library Storage Annex"),
    ("MUSIC", "Lewis Music Library"),
    ("ROTCH", "Rotch Library"),
];

/// Holding collection name for a MARC 985 `$aa` code.
#[must_use]
pub fn holding_collection(code: &str, record_id: &str) -> Option<&'static str> {
    table_lookup(HOLDINGS_COLLECTIONS, code, record_id, "985 $aa")
}

/// Holding format name for a MARC 985 `$t` code.
#[must_use]
pub fn holding_format(code: &str, record_id: &str) -> Option<&'static str> {
    table_lookup(HOLDINGS_FORMATS, code, record_id, "985 $t")
}

/// Holding location name for a MARC 985 `$i` code.
#[must_use]
pub fn holding_location(code: &str, record_id: &str) -> Option<&'static str> {
    table_lookup(HOLDINGS_LOCATIONS, code, record_id, "985 $i")
}

/// Finding aid element names and authority sources.
static ASPACE_TYPES: &[(&str, &str)] = &[
    ("aat", "Art & Architecture Thesaurus"),
    ("accessrestrict", "Conditions Governing Access"),
    ("altformavail", "Existence and Location of Copies"),
    ("bibliography", "Bibliography"),
    ("bioghist", "Biographical / Historical"),
    ("fast", "Faceted Application of Subject Terminology"),
    ("gmgpc", "Thesaurus for Graphic Materials"),
    ("lcgft", "Library of Congress Genre/Form Terms"),
    ("lcnaf", "Library of Congress Name Authority File"),
    ("lcsh", "Library of Congress Subject Headings"),
    ("local", "Local"),
    ("mesh", "Medical Subject Headings"),
    ("naf", "Library of Congress Name Authority File"),
    ("scopecontent", "Scope and Contents"),
    ("separatedmaterial", "Separated Materials"),
    ("snac", "Social Networks and Archival Context"),
    ("tgn", "Thesaurus of Geographic Names"),
    ("userestrict", "Conditions Governing Use"),
    ("viaf", "Virtual International Authority File"),
];

/// Label for a finding aid element name or authority source; unknown terms
/// pass through verbatim.
#[must_use]
pub fn aspace_type(term: &str) -> &str {
    ASPACE_TYPES
        .iter()
        .find(|(key, _)| *key == term)
        .map_or(term, |(_, label)| *label)
}
