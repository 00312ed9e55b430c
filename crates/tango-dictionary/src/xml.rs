//! Pull cursor over quick-xml events used by the recursive-descent
//! parsers.
//!
//! Empty elements are reported as a start immediately followed by an end,
//! so callers only ever deal with one shape of element.

use std::collections::HashMap;
use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Element {
    pub name: String,
    attributes: Vec<(String, String)>,
}

impl Element {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Looks an attribute up by local name, ignoring its namespace prefix.
    pub fn local_attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.rsplit(':').next() == Some(local))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Start(Element),
    End,
    /// `raw` is the undecoded text, `value` has entities expanded.
    Text { raw: String, value: String },
    DocType(String),
    Eof,
}

pub(crate) struct XmlCursor<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    depth: usize,
    pending_end: bool,
    entities: HashMap<String, String>,
}

impl<R: BufRead> XmlCursor<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: Reader::from_reader(source),
            buf: Vec::new(),
            depth: 0,
            pending_end: false,
            entities: HashMap::new(),
        }
    }

    pub fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    pub fn malformed(&self, message: impl Into<String>) -> ParseError {
        ParseError::malformed(self.position(), message)
    }

    /// Registers general entities so text containing `&name;` expands.
    pub fn set_entities(&mut self, entities: HashMap<String, String>) {
        self.entities = entities;
    }

    pub fn next(&mut self) -> Result<Node, ParseError> {
        if self.pending_end {
            self.pending_end = false;
            self.depth -= 1;
            return Ok(Node::End);
        }

        loop {
            self.buf.clear();
            let event = self.reader.read_event_into(&mut self.buf);
            let position = self.reader.buffer_position() as u64;
            let event = event.map_err(|e| ParseError::malformed(position, e.to_string()))?;

            match event {
                Event::Start(e) => {
                    let element = element(&e, position)?;
                    self.depth += 1;
                    return Ok(Node::Start(element));
                }
                Event::Empty(e) => {
                    let element = element(&e, position)?;
                    self.depth += 1;
                    self.pending_end = true;
                    return Ok(Node::Start(element));
                }
                Event::End(_) => {
                    self.depth = self.depth.saturating_sub(1);
                    return Ok(Node::End);
                }
                Event::Text(e) => {
                    let raw = utf8(&e, position)?;
                    let entities = &self.entities;
                    let value = unescape_with(&raw, |name| {
                        resolve_predefined_entity(name)
                            .or_else(|| entities.get(name).map(String::as_str))
                    })
                    .map_err(|e| ParseError::malformed(position, e.to_string()))?
                    .into_owned();
                    return Ok(Node::Text { raw, value });
                }
                Event::CData(e) => {
                    let value = utf8(&e.into_inner(), position)?;
                    return Ok(Node::Text {
                        raw: value.clone(),
                        value,
                    });
                }
                Event::DocType(e) => return Ok(Node::DocType(utf8(&e, position)?)),
                Event::Eof => {
                    if self.depth > 0 {
                        return Err(ParseError::malformed(
                            position,
                            format!(
                                "unexpected end of document with {} open element(s)",
                                self.depth
                            ),
                        ));
                    }
                    return Ok(Node::Eof);
                }
                // Declarations, comments and processing instructions.
                _ => continue,
            }
        }
    }

    /// Consumes the rest of the element whose start was just returned.
    pub fn skip(&mut self) -> Result<(), ParseError> {
        let target = self.depth.saturating_sub(1);
        loop {
            match self.next()? {
                Node::End if self.depth == target => return Ok(()),
                Node::Eof => return Err(self.malformed("unexpected end of document")),
                _ => {}
            }
        }
    }

    /// Concatenated, trimmed text of the current element. Nested elements
    /// are skipped.
    pub fn text(&mut self) -> Result<String, ParseError> {
        Ok(self.collect_text()?.1.trim().to_string())
    }

    /// Name of the entity used as the element's value, e.g. `v1` for
    /// `<pos>&v1;</pos>`. Falls back to the plain text for literal values.
    pub fn entity_text(&mut self) -> Result<String, ParseError> {
        let (raw, value) = self.collect_text()?;
        let raw = raw.trim();
        if let Some(name) = raw.strip_prefix('&').and_then(|r| r.strip_suffix(';')) {
            if !name.contains(['&', ';']) {
                return Ok(name.to_string());
            }
        }
        let value = value.trim();
        // Some readers expand entities before we see them; map back.
        if let Some((name, _)) = self.entities.iter().find(|(_, v)| v.as_str() == value) {
            return Ok(name.clone());
        }
        Ok(value.to_string())
    }

    fn collect_text(&mut self) -> Result<(String, String), ParseError> {
        let mut raw = String::new();
        let mut value = String::new();
        loop {
            match self.next()? {
                Node::Text { raw: r, value: v } => {
                    raw.push_str(&r);
                    value.push_str(&v);
                }
                Node::Start(_) => self.skip()?,
                Node::End => return Ok((raw, value)),
                Node::DocType(_) => {}
                Node::Eof => return Err(self.malformed("unexpected end of document")),
            }
        }
    }
}

fn element(e: &BytesStart<'_>, position: u64) -> Result<Element, ParseError> {
    let name = utf8(e.name().as_ref(), position)?;
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| ParseError::malformed(position, e.to_string()))?;
        let key = utf8(attr.key.as_ref(), position)?;
        let value = attr
            .unescape_value()
            .map_err(|e| ParseError::malformed(position, e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Element { name, attributes })
}

fn utf8(bytes: &[u8], position: u64) -> Result<String, ParseError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| ParseError::malformed(position, format!("invalid UTF-8: {e}")))
}

/// Collects `<!ENTITY name "expansion">` declarations from an internal
/// DTD subset. Parameter entities are ignored.
pub(crate) fn parse_entities(doctype: &str) -> HashMap<String, String> {
    let mut entities = HashMap::new();
    let mut rest = doctype;
    while let Some(start) = rest.find("<!ENTITY") {
        rest = &rest[start + "<!ENTITY".len()..];
        let body = rest.trim_start();
        if body.starts_with('%') {
            continue;
        }
        let name_end = body
            .find(|c: char| c.is_whitespace())
            .unwrap_or(body.len());
        let name = &body[..name_end];
        let after = body[name_end..].trim_start();
        let Some(quote) = after.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            continue;
        };
        let Some(close) = after[1..].find(quote) else {
            break;
        };
        entities.insert(name.to_string(), after[1..1 + close].to_string());
        rest = &after[1 + close..];
    }
    entities
}
