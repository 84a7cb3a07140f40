//! Event-level XML document model.
//!
//! The document is kept as the flat list of events produced by the reader, so
//! serializing it writes untouched markup back byte for byte. Input in any
//! encoding is transcoded to UTF-8 first, so "byte for byte" holds for
//! UTF-8 input and up to transcoding otherwise. Translatable
//! fields are `column` elements that are direct children of a `table`
//! element below the root, identified by their `name` attribute.

use crate::domain::model::FieldSet;
use crate::utils::error::{Result, TranslatorError};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use regex::bytes::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

const CONTAINER_TAG: &[u8] = b"table";
const FIELD_TAG: &[u8] = b"column";
const NAME_ATTRIBUTE: &str = "name";

static DECLARED_ENCODING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?-u)\A<\?xml[^>]*?\bencoding\s*=\s*["']([A-Za-z0-9._:\-]+)["']"#)
        .expect("encoding pattern is valid")
});

/// A `column` element found while parsing, whatever its name.
#[derive(Debug, Clone)]
struct ColumnSlot {
    start_index: usize,
    name: String,
    text: String,
    spans: Vec<usize>,
}

/// A selected translatable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Position among the selected fields, in document order.
    pub ordinal: usize,
    pub name: String,
    /// Decoded text content preceding the first child element.
    pub text: String,
    spans: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct Document {
    events: Vec<Event<'static>>,
    columns: Vec<ColumnSlot>,
}

struct OpenColumn {
    depth: usize,
    slot: Option<ColumnSlot>,
    collecting: bool,
}

impl Document {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let text = decode_to_utf8(bytes)?;

        let mut reader = Reader::from_reader(text.as_bytes());
        reader.trim_text(false);
        reader.check_end_names(true);

        let mut events: Vec<Event<'static>> = Vec::new();
        let mut columns = Vec::new();
        let mut stack: Vec<Vec<u8>> = Vec::new();
        let mut open: Vec<OpenColumn> = Vec::new();
        let mut seen_root = false;
        let mut buf = Vec::new();

        loop {
            let event = reader.read_event_into(&mut buf).map_err(|e| {
                TranslatorError::document(format!(
                    "parse error at byte {}: {}",
                    reader.buffer_position(),
                    e
                ))
            })?;
            let index = events.len();

            match &event {
                Event::Eof => break,
                Event::Start(start) => {
                    if stack.is_empty() {
                        if seen_root {
                            return Err(TranslatorError::document(
                                "more than one root element",
                            ));
                        }
                        seen_root = true;
                    }
                    stop_collecting(&mut open, stack.len());

                    if is_field_element(start, &stack) {
                        open.push(OpenColumn {
                            depth: stack.len() + 1,
                            slot: column_slot(start, index)?,
                            collecting: true,
                        });
                    }
                    stack.push(start.name().as_ref().to_vec());
                }
                Event::Empty(_) => {
                    if stack.is_empty() {
                        if seen_root {
                            return Err(TranslatorError::document(
                                "more than one root element",
                            ));
                        }
                        seen_root = true;
                    }
                    stop_collecting(&mut open, stack.len());
                }
                Event::End(_) => {
                    if let Some(top) = open.last() {
                        if top.depth == stack.len() {
                            if let Some(column) = open.pop().and_then(|c| c.slot) {
                                columns.push(column);
                            }
                        }
                    }
                    stack.pop();
                }
                Event::Text(text) => {
                    if let Some(slot) = collecting_slot(&mut open, stack.len()) {
                        slot.text.push_str(&text.unescape()?);
                        slot.spans.push(index);
                    }
                }
                Event::CData(cdata) => {
                    if let Some(slot) = collecting_slot(&mut open, stack.len()) {
                        let content = std::str::from_utf8(cdata).map_err(|e| {
                            TranslatorError::document(format!("CDATA is not valid UTF-8: {}", e))
                        })?;
                        slot.text.push_str(content);
                        slot.spans.push(index);
                    }
                }
                _ => {}
            }

            events.push(event.into_owned());
            buf.clear();
        }

        if let Some(unclosed) = stack.last() {
            return Err(TranslatorError::document(format!(
                "unexpected end of document, <{}> is not closed",
                String::from_utf8_lossy(unclosed)
            )));
        }
        if !seen_root {
            return Err(TranslatorError::document("no root element"));
        }

        columns.sort_by_key(|c| c.start_index);
        Ok(Self { events, columns })
    }

    /// Fields whose name is in `names` and whose text is not blank, in
    /// document order.
    pub fn select(&self, names: &FieldSet) -> Vec<Field> {
        self.columns
            .iter()
            .filter(|c| names.contains(&c.name) && !c.text.trim().is_empty())
            .enumerate()
            .map(|(ordinal, c)| Field {
                ordinal,
                name: c.name.clone(),
                text: c.text.clone(),
                spans: c.spans.clone(),
            })
            .collect()
    }

    /// Replaces the text of `field` with `text`. Child elements of the
    /// column are left as they are.
    pub fn set_text(&mut self, field: &Field, text: &str) {
        let escaped = partial_escape(text).into_owned();
        let mut spans = field.spans.iter();

        if let Some(&first) = spans.next() {
            self.events[first] = Event::Text(BytesText::from_escaped(escaped));
        }
        for &rest in spans {
            self.events[rest] = Event::Text(BytesText::from_escaped(String::new()));
        }
    }

    /// Serializes the document with a UTF-8 XML declaration.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        let mut events = self.events.iter();

        match self.events.first() {
            Some(Event::Decl(decl)) => {
                events.next();
                let version = decl.version()?;
                let version = String::from_utf8_lossy(&version).into_owned();
                let standalone = decl
                    .standalone()
                    .transpose()?
                    .map(|s| String::from_utf8_lossy(&s).into_owned());
                writer.write_event(Event::Decl(BytesDecl::new(
                    &version,
                    Some("utf-8"),
                    standalone.as_deref(),
                )))?;
            }
            _ => {
                writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
                writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
            }
        }

        for event in events {
            writer.write_event(event)?;
        }

        Ok(writer.into_inner())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// Detects the document encoding from its byte order mark, then its
/// declaration, and returns the content as UTF-8 without the BOM.
fn decode_to_utf8(bytes: &[u8]) -> Result<Cow<'_, str>> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_length)) => (encoding, &bytes[bom_length..]),
        None => (sniff_encoding(bytes)?, bytes),
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or_else(|| {
            TranslatorError::document(format!(
                "content is not valid {}",
                encoding.name()
            ))
        })
}

fn sniff_encoding(bytes: &[u8]) -> Result<&'static Encoding> {
    // BOM-less UTF-16 still starts with `<` next to a zero byte.
    match bytes {
        [b'<', 0, ..] => return Ok(UTF_16LE),
        [0, b'<', ..] => return Ok(UTF_16BE),
        _ => {}
    }

    let Some(label) = DECLARED_ENCODING
        .captures(bytes)
        .and_then(|caps| caps.get(1))
    else {
        return Ok(UTF_8);
    };

    match Encoding::for_label(label.as_bytes()) {
        // A declaration readable as ASCII cannot be UTF-16 content.
        Some(encoding) if !encoding.is_ascii_compatible() => Ok(UTF_8),
        Some(encoding) => Ok(encoding),
        None => Err(TranslatorError::document(format!(
            "unsupported encoding '{}'",
            String::from_utf8_lossy(label.as_bytes())
        ))),
    }
}

fn is_field_element(start: &BytesStart<'_>, stack: &[Vec<u8>]) -> bool {
    // The container has to be nested under the root, not be the root itself.
    start.name().as_ref() == FIELD_TAG
        && stack.len() >= 2
        && stack.last().map(Vec::as_slice) == Some(CONTAINER_TAG)
}

fn column_slot(start: &BytesStart<'_>, index: usize) -> Result<Option<ColumnSlot>> {
    let Some(attribute) = start.try_get_attribute(NAME_ATTRIBUTE)? else {
        return Ok(None);
    };
    Ok(Some(ColumnSlot {
        start_index: index,
        name: attribute.unescape_value()?.into_owned(),
        text: String::new(),
        spans: Vec::new(),
    }))
}

fn stop_collecting(open: &mut [OpenColumn], depth: usize) {
    if let Some(top) = open.last_mut() {
        if top.depth == depth {
            top.collecting = false;
        }
    }
}

fn collecting_slot(open: &mut [OpenColumn], depth: usize) -> Option<&mut ColumnSlot> {
    let top = open.last_mut()?;
    if top.depth == depth && top.collecting {
        top.slot.as_mut()
    } else {
        None
    }
}
