//! Raw record readers.
//!
//! Readers are lazy, single-pass iterators over the records of one input
//! file. XML containers are split into standalone `<record>` fragments with
//! a streaming parser so whole harvest files are never held in memory; JSON
//! Lines files yield one object per line.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use serde_json::Value;

use crate::config::InputFormat;
use crate::error::{Result, TransformError};

/// Payload of one raw record.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A standalone XML document rooted at a `<record>` element.
    Xml(String),
    /// A decoded JSON value.
    Json(Value),
    /// A line that could not be decoded.
    Malformed(String),
}

/// One record as read from the input, before any interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// 0-based position of the record in the input stream.
    pub offset: usize,
    pub payload: Payload,
}

/// Namespace declarations (`xmlns`, `xmlns:*`) of one start tag.
type Declarations = Vec<(Vec<u8>, Vec<u8>)>;

fn namespace_declarations(start: &BytesStart<'_>) -> Declarations {
    start
        .attributes()
        .flatten()
        .filter(|attr| {
            let key = attr.key.as_ref();
            key == b"xmlns" || key.starts_with(b"xmlns:")
        })
        .map(|attr| (attr.key.as_ref().to_vec(), attr.value.to_vec()))
        .collect()
}

/// Streams `<record>` elements out of an XML container.
///
/// Namespace declarations inherited from enclosing elements are copied onto
/// each extracted record so the fragment parses on its own.
pub struct XmlRecordReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    scopes: Vec<Declarations>,
    offset: usize,
    finished: bool,
}

impl XmlRecordReader<BufReader<File>> {
    /// Open an XML file for streaming.
    ///
    /// # Errors
    /// Returns `TransformError::Io` if the file cannot be opened.
    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> XmlRecordReader<R> {
    /// Create a reader over any buffered input.
    pub fn new(input: R) -> Self {
        Self {
            reader: Reader::from_reader(input),
            buf: Vec::new(),
            scopes: Vec::new(),
            offset: 0,
            finished: false,
        }
    }

    fn stream_error(&self, message: impl ToString) -> TransformError {
        TransformError::XmlStream {
            position: self.reader.buffer_position(),
            message: message.to_string(),
        }
    }

    /// Advance to the next `<record>` and return it as a standalone document.
    fn next_record(&mut self) -> Result<Option<String>> {
        loop {
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(err) => {
                    return Err(TransformError::XmlStream {
                        position: self.reader.buffer_position(),
                        message: err.to_string(),
                    })
                }
            };
            match event {
                Event::Start(start) if start.local_name().as_ref() == b"record" => {
                    let start = start.into_owned();
                    return self.capture(start, false).map(Some);
                }
                Event::Empty(start) if start.local_name().as_ref() == b"record" => {
                    let start = start.into_owned();
                    return self.capture(start, true).map(Some);
                }
                Event::Start(start) => {
                    let declarations = namespace_declarations(&start);
                    self.scopes.push(declarations);
                }
                Event::End(_) => {
                    self.scopes.pop();
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    /// Root tag of the fragment with inherited namespace declarations added.
    fn rooted(&self, start: &BytesStart<'static>) -> BytesStart<'static> {
        let mut root = start.clone();
        let mut seen: HashSet<Vec<u8>> = namespace_declarations(start)
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        for (key, value) in self.scopes.iter().rev().flatten() {
            if seen.insert(key.clone()) {
                root.push_attribute((key.as_slice(), value.as_slice()));
            }
        }
        root
    }

    fn capture(&mut self, start: BytesStart<'static>, empty: bool) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        let root = self.rooted(&start);

        if empty {
            writer
                .write_event(Event::Empty(root))
                .map_err(|e| self.stream_error(e))?;
        } else {
            writer
                .write_event(Event::Start(root))
                .map_err(|e| self.stream_error(e))?;

            let mut depth = 1usize;
            while depth > 0 {
                self.buf.clear();
                let event = self.reader.read_event_into(&mut self.buf);
                let position = self.reader.buffer_position();
                let event = event.map_err(|err| TransformError::XmlStream {
                    position,
                    message: err.to_string(),
                })?;
                match &event {
                    Event::Start(_) => depth += 1,
                    Event::End(_) => depth -= 1,
                    Event::Eof => {
                        return Err(TransformError::XmlStream {
                            position,
                            message: "input ended inside a <record> element".to_string(),
                        })
                    }
                    _ => {}
                }
                writer
                    .write_event(event)
                    .map_err(|e| TransformError::XmlStream {
                        position,
                        message: e.to_string(),
                    })?;
            }
        }

        String::from_utf8(writer.into_inner()).map_err(|e| self.stream_error(e))
    }
}

impl<R: BufRead> Iterator for XmlRecordReader<R> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_record() {
            Ok(Some(xml)) => {
                let record = RawRecord {
                    offset: self.offset,
                    payload: Payload::Xml(xml),
                };
                self.offset += 1;
                Some(Ok(record))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

/// Yields one JSON value per non-blank line.
///
/// A line that is not valid JSON becomes a [`Payload::Malformed`] record so
/// the rest of the file is still processed.
pub struct JsonLinesReader<R: BufRead> {
    lines: std::io::Lines<R>,
    offset: usize,
}

impl JsonLinesReader<BufReader<File>> {
    /// Open a JSON Lines file.
    ///
    /// # Errors
    /// Returns `TransformError::Io` if the file cannot be opened.
    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> JsonLinesReader<R> {
    /// Create a reader over any buffered input.
    pub fn new(input: R) -> Self {
        Self {
            lines: input.lines(),
            offset: 0,
        }
    }
}

impl<R: BufRead> Iterator for JsonLinesReader<R> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            if line.trim().is_empty() {
                continue;
            }
            let payload = match serde_json::from_str::<Value>(&line) {
                Ok(value) => Payload::Json(value),
                Err(err) => Payload::Malformed(format!("invalid JSON: {err}")),
            };
            let record = RawRecord {
                offset: self.offset,
                payload,
            };
            self.offset += 1;
            return Some(Ok(record));
        }
    }
}

/// Open the reader matching a source's input format.
///
/// # Errors
/// Returns `TransformError::Io` if the file cannot be opened.
pub fn open_records(
    path: &Path,
    format: InputFormat,
) -> Result<Box<dyn Iterator<Item = Result<RawRecord>>>> {
    Ok(match format {
        InputFormat::Xml => Box::new(XmlRecordReader::from_path(path)?),
        InputFormat::JsonLines => Box::new(JsonLinesReader::from_path(path)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn xml_payloads(input: &str) -> Vec<String> {
        XmlRecordReader::new(input.as_bytes())
            .map(|r| match r.unwrap().payload {
                Payload::Xml(xml) => xml,
                other => panic!("unexpected payload {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_splits_records_in_order() {
        let input = r#"<?xml version="1.0"?>
<records>
  <record><header><identifier>a</identifier></header></record>
  <record><header><identifier>b</identifier></header></record>
</records>"#;
        let records: Vec<RawRecord> = XmlRecordReader::new(input.as_bytes())
            .map(Result::unwrap)
            .collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].offset, 0);
        assert_eq!(records[1].offset, 1);
        assert_eq!(
            records[1].payload,
            Payload::Xml("<record><header><identifier>b</identifier></header></record>".into())
        );
    }

    #[test]
    fn test_carries_inherited_namespaces() {
        let input = r#"<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <ListRecords>
    <record><metadata><dc:title>T &amp; U</dc:title></metadata></record>
  </ListRecords>
</OAI-PMH>"#;
        let payloads = xml_payloads(input);
        assert_eq!(payloads.len(), 1);

        let doc = roxmltree::Document::parse(&payloads[0]).unwrap();
        let title = doc
            .descendants()
            .find(|n| n.has_tag_name(("http://purl.org/dc/elements/1.1/", "title")))
            .unwrap();
        assert_eq!(title.text(), Some("T & U"));
        assert_eq!(
            doc.root_element().tag_name().namespace(),
            Some("http://www.openarchives.org/OAI/2.0/")
        );
    }

    #[test]
    fn test_nested_record_elements_stay_inside_outer_record() {
        let input = r#"<root><record><metadata><marc:record xmlns:marc="http://www.loc.gov/MARC21/slim"><marc:leader>x</marc:leader></marc:record></metadata></record></root>"#;
        let payloads = xml_payloads(input);
        assert_eq!(payloads.len(), 1);
        assert!(payloads[0].contains("marc:leader"));
    }

    #[test]
    fn test_truncated_input_is_stream_error() {
        let input = "<records><record><header>";
        let results: Vec<_> = XmlRecordReader::new(input.as_bytes()).collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(TransformError::XmlStream { .. })));
    }

    #[test]
    fn test_json_lines_skips_blank_and_flags_malformed() {
        let input = "{\"id\": \"a\"}\n\n not json\n{\"id\": \"b\"}\n";
        let records: Vec<RawRecord> = JsonLinesReader::new(input.as_bytes())
            .map(Result::unwrap)
            .collect();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].payload, Payload::Json(serde_json::json!({"id": "a"})));
        assert!(matches!(records[1].payload, Payload::Malformed(_)));
        assert_eq!(records[2].offset, 2);
    }
}
