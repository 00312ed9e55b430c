use std::collections::{BTreeMap, HashMap};
use std::io::BufRead;

use tracing::{debug, warn};

use crate::error::ParseError;
use crate::types::{ParsedReading, ParsedSense, ParsedWord, ParsedWriting};
use crate::xml::{Node, XmlCursor, parse_entities};

/// Streaming JMdict parser.
///
/// Entries whose senses carry no gloss in one of the configured languages
/// are dropped without reaching the callback.
pub struct JmdictParser {
    languages: Vec<String>,
    entities: HashMap<String, String>,
}

impl JmdictParser {
    pub fn new(languages: Vec<String>) -> Self {
        Self {
            languages,
            entities: HashMap::new(),
        }
    }

    /// Entity name -> description, as declared in the document's DTD.
    pub fn entities(&self) -> &HashMap<String, String> {
        &self.entities
    }

    /// Parses `source`, handing each entry to `on_entry`. Returning `false`
    /// from the callback stops parsing with [`ParseError::AbortedByConsumer`].
    pub fn parse<R, F>(&mut self, source: R, mut on_entry: F) -> Result<(), ParseError>
    where
        R: BufRead,
        F: FnMut(ParsedWord) -> bool,
    {
        let mut cursor = XmlCursor::new(source);
        let mut seen_root = false;

        loop {
            match cursor.next()? {
                Node::DocType(dtd) => {
                    self.entities = parse_entities(&dtd);
                    debug!("Loaded {} JMdict entities", self.entities.len());
                    cursor.set_entities(self.entities.clone());
                }
                Node::Start(el) if el.name == "JMdict" && !seen_root => {
                    seen_root = true;
                    self.parse_root(&mut cursor, &mut on_entry)?;
                }
                Node::Start(_) => cursor.skip()?,
                Node::Eof => break,
                Node::End | Node::Text { .. } => {}
            }
        }

        if !seen_root {
            return Err(cursor.malformed("missing <JMdict> root element"));
        }
        Ok(())
    }

    fn parse_root<R, F>(&self, cursor: &mut XmlCursor<R>, on_entry: &mut F) -> Result<(), ParseError>
    where
        R: BufRead,
        F: FnMut(ParsedWord) -> bool,
    {
        loop {
            match cursor.next()? {
                Node::Start(el) if el.name == "entry" => {
                    if let Some(word) = self.parse_entry(cursor)? {
                        if !on_entry(word) {
                            return Err(ParseError::AbortedByConsumer);
                        }
                    }
                }
                Node::Start(_) => cursor.skip()?,
                Node::End => return Ok(()),
                _ => {}
            }
        }
    }

    fn parse_entry<R: BufRead>(&self, cursor: &mut XmlCursor<R>) -> Result<Option<ParsedWord>, ParseError> {
        let mut word = ParsedWord::default();
        let mut has_id = false;
        let mut inherited_pos: Vec<String> = Vec::new();

        loop {
            match cursor.next()? {
                Node::Start(el) => match el.name.as_str() {
                    "ent_seq" => {
                        let text = cursor.text()?;
                        word.id = text
                            .parse()
                            .map_err(|_| cursor.malformed(format!("invalid ent_seq {text:?}")))?;
                        has_id = true;
                    }
                    "k_ele" => word.writings.push(parse_k_ele(cursor)?),
                    "r_ele" => word.readings.push(parse_r_ele(cursor)?),
                    "sense" => {
                        let mut sense = self.parse_sense(cursor)?;
                        // A sense without part-of-speech continues the previous one.
                        if sense.pos.is_empty() {
                            sense.pos = inherited_pos.clone();
                        } else {
                            inherited_pos = sense.pos.clone();
                        }
                        if sense.has_glosses() {
                            word.senses.push(sense);
                        }
                    }
                    _ => cursor.skip()?,
                },
                Node::End => break,
                _ => {}
            }
        }

        if !has_id {
            return Err(cursor.malformed("entry without ent_seq"));
        }
        if word.senses.is_empty() {
            debug!(id = word.id, "Skipping entry without glosses in selected languages");
            return Ok(None);
        }
        if word.readings.is_empty() {
            warn!(id = word.id, "Entry has no reading");
        }
        Ok(Some(word))
    }

    fn parse_sense<R: BufRead>(&self, cursor: &mut XmlCursor<R>) -> Result<ParsedSense, ParseError> {
        let mut sense = ParsedSense::default();
        let mut glosses: BTreeMap<String, Vec<String>> = BTreeMap::new();

        loop {
            match cursor.next()? {
                Node::Start(el) => match el.name.as_str() {
                    "pos" => push_unique(&mut sense.pos, cursor.entity_text()?),
                    "misc" => push_unique(&mut sense.misc, cursor.entity_text()?),
                    "field" => push_unique(&mut sense.field, cursor.entity_text()?),
                    "dial" => push_unique(&mut sense.dialect, cursor.entity_text()?),
                    "stagk" => sense.restricted_to_writings.push(cursor.text()?),
                    "stagr" => sense.restricted_to_readings.push(cursor.text()?),
                    "s_inf" => sense.notes.push(cursor.text()?),
                    "gloss" => {
                        let lang = el.attr("xml:lang").map(language_code).unwrap_or("en").to_string();
                        let text = cursor.text()?;
                        if self.accepts(&lang) && !text.is_empty() {
                            glosses.entry(lang).or_default().push(text);
                        }
                    }
                    _ => cursor.skip()?,
                },
                Node::End => break,
                _ => {}
            }
        }

        sense.glosses = glosses;
        Ok(sense)
    }

    fn accepts(&self, lang: &str) -> bool {
        self.languages.is_empty() || self.languages.iter().any(|l| l == lang)
    }
}

fn parse_k_ele<R: BufRead>(cursor: &mut XmlCursor<R>) -> Result<ParsedWriting, ParseError> {
    let mut writing = ParsedWriting::default();
    loop {
        match cursor.next()? {
            Node::Start(el) => match el.name.as_str() {
                "keb" => writing.text = cursor.text()?,
                "ke_pri" => writing.priorities.push(cursor.text()?),
                _ => cursor.skip()?,
            },
            Node::End => return Ok(writing),
            _ => {}
        }
    }
}

fn parse_r_ele<R: BufRead>(cursor: &mut XmlCursor<R>) -> Result<ParsedReading, ParseError> {
    let mut reading = ParsedReading::default();
    loop {
        match cursor.next()? {
            Node::Start(el) => match el.name.as_str() {
                "reb" => reading.text = cursor.text()?,
                "re_nokanji" => {
                    reading.no_kanji = true;
                    cursor.skip()?;
                }
                "re_restr" => reading.restricted_to.push(cursor.text()?),
                "re_pri" => reading.priorities.push(cursor.text()?),
                _ => cursor.skip()?,
            },
            Node::End => return Ok(reading),
            _ => {}
        }
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !value.is_empty() && !list.contains(&value) {
        list.push(value);
    }
}

/// JMdict tags glosses with ISO 639-2 codes; the rest of the system uses
/// the two-letter form.
fn language_code(code: &str) -> &str {
    match code {
        "eng" => "en",
        "ger" => "de",
        "fre" => "fr",
        "rus" => "ru",
        "spa" => "es",
        "dut" => "nl",
        "hun" => "hu",
        "swe" => "sv",
        "slv" => "sl",
        "ita" => "it",
        "por" => "pt",
        other => other,
    }
}
