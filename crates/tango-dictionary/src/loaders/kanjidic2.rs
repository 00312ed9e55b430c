use std::io::BufRead;
use std::str::FromStr;

use tracing::warn;

use crate::error::ParseError;
use crate::types::ParsedKanji;
use crate::xml::{Node, XmlCursor};

/// Streaming KANJIDIC2 parser. Meanings are kept only for the configured
/// languages; `m_lang` defaults to English when absent.
pub struct Kanjidic2Parser {
    languages: Vec<String>,
}

impl Kanjidic2Parser {
    pub fn new(languages: Vec<String>) -> Self {
        Self { languages }
    }

    pub fn parse<R, F>(&mut self, source: R, mut on_entry: F) -> Result<(), ParseError>
    where
        R: BufRead,
        F: FnMut(ParsedKanji) -> bool,
    {
        let mut cursor = XmlCursor::new(source);
        let mut seen_root = false;

        loop {
            match cursor.next()? {
                Node::Start(el) if el.name == "kanjidic2" && !seen_root => {
                    seen_root = true;
                    loop {
                        match cursor.next()? {
                            Node::Start(el) if el.name == "character" => {
                                if let Some(kanji) = self.parse_character(&mut cursor)? {
                                    if !on_entry(kanji) {
                                        return Err(ParseError::AbortedByConsumer);
                                    }
                                }
                            }
                            Node::Start(_) => cursor.skip()?,
                            Node::End => break,
                            _ => {}
                        }
                    }
                }
                Node::Start(_) => cursor.skip()?,
                Node::Eof => break,
                _ => {}
            }
        }

        if !seen_root {
            return Err(cursor.malformed("missing <kanjidic2> root element"));
        }
        Ok(())
    }

    fn parse_character<R: BufRead>(
        &self,
        cursor: &mut XmlCursor<R>,
    ) -> Result<Option<ParsedKanji>, ParseError> {
        let mut literal = None;
        let mut kanji = ParsedKanji::new('\0');

        loop {
            match cursor.next()? {
                Node::Start(el) => match el.name.as_str() {
                    "literal" => {
                        let text = cursor.text()?;
                        let mut chars = text.chars();
                        literal = match (chars.next(), chars.next()) {
                            (Some(c), None) => Some(c),
                            _ => return Err(cursor.malformed(format!("invalid literal {text:?}"))),
                        };
                    }
                    "misc" => parse_misc(cursor, &mut kanji)?,
                    "query_code" => parse_query_code(cursor, &mut kanji)?,
                    "reading_meaning" => self.parse_reading_meaning(cursor, &mut kanji)?,
                    _ => cursor.skip()?,
                },
                Node::End => break,
                _ => {}
            }
        }

        let Some(literal) = literal else {
            warn!("Skipping character without literal");
            return Ok(None);
        };
        kanji.literal = literal;
        Ok(Some(kanji))
    }

    fn parse_reading_meaning<R: BufRead>(
        &self,
        cursor: &mut XmlCursor<R>,
        kanji: &mut ParsedKanji,
    ) -> Result<(), ParseError> {
        let mut groups = 0usize;
        loop {
            match cursor.next()? {
                Node::Start(el) => match el.name.as_str() {
                    // Readings and meanings live one level down in <rmgroup>.
                    "rmgroup" => groups += 1,
                    "reading" => {
                        let kind = el.attr("r_type").unwrap_or_default().to_string();
                        let text = cursor.text()?;
                        if !text.is_empty() {
                            kanji.readings.push((kind, text));
                        }
                    }
                    "meaning" => {
                        let lang = el.attr("m_lang").unwrap_or("en").to_string();
                        let text = cursor.text()?;
                        if self.accepts(&lang) && !text.is_empty() {
                            kanji.meanings.push((lang, text));
                        }
                    }
                    "nanori" => {
                        let text = cursor.text()?;
                        if !text.is_empty() {
                            kanji.nanori.push(text);
                        }
                    }
                    _ => cursor.skip()?,
                },
                Node::End if groups > 0 => groups -= 1,
                Node::End => return Ok(()),
                _ => {}
            }
        }
    }

    fn accepts(&self, lang: &str) -> bool {
        self.languages.is_empty() || self.languages.iter().any(|l| l == lang)
    }
}

fn parse_misc<R: BufRead>(cursor: &mut XmlCursor<R>, kanji: &mut ParsedKanji) -> Result<(), ParseError> {
    loop {
        match cursor.next()? {
            Node::Start(el) => match el.name.as_str() {
                "grade" => kanji.grade = number(cursor, "grade")?,
                // Later stroke counts list common miscounts.
                "stroke_count" => {
                    let count = number(cursor, "stroke_count")?;
                    if kanji.stroke_count.is_none() {
                        kanji.stroke_count = count;
                    }
                }
                "freq" => kanji.frequency = number(cursor, "freq")?,
                "jlpt" => kanji.jlpt = number(cursor, "jlpt")?,
                _ => cursor.skip()?,
            },
            Node::End => return Ok(()),
            _ => {}
        }
    }
}

fn parse_query_code<R: BufRead>(cursor: &mut XmlCursor<R>, kanji: &mut ParsedKanji) -> Result<(), ParseError> {
    loop {
        match cursor.next()? {
            Node::Start(el) if el.name == "q_code" => {
                let kind = el.attr("qc_type").unwrap_or_default().to_string();
                let misclassified = el.attr("skip_misclass").is_some();
                let text = cursor.text()?;
                match kind.as_str() {
                    "skip" if !misclassified && kanji.skip.is_none() => kanji.skip = Some(text),
                    "four_corner" if kanji.four_corner.is_none() => kanji.four_corner = Some(text),
                    _ => {}
                }
            }
            Node::Start(_) => cursor.skip()?,
            Node::End => return Ok(()),
            _ => {}
        }
    }
}

fn number<R: BufRead, T: FromStr>(cursor: &mut XmlCursor<R>, field: &str) -> Result<Option<T>, ParseError> {
    let text = cursor.text()?;
    match text.parse() {
        Ok(value) => Ok(Some(value)),
        Err(_) => {
            warn!(field, value = %text, "Ignoring unparsable number");
            Ok(None)
        }
    }
}
