use std::io::BufRead;

use tracing::debug;

use crate::error::ParseError;
use crate::types::{ParsedGroup, ParsedStroke, ParsedStrokes};
use crate::xml::{Element, Node, XmlCursor};

/// Streaming KanjiVG parser producing the stroke and component tree of
/// each character. Variant drawings (ids with a `-Suffix`) are skipped.
#[derive(Default)]
pub struct KanjiVgParser;

impl KanjiVgParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse<R, F>(&mut self, source: R, mut on_entry: F) -> Result<(), ParseError>
    where
        R: BufRead,
        F: FnMut(ParsedStrokes) -> bool,
    {
        let mut cursor = XmlCursor::new(source);
        let mut seen_root = false;

        loop {
            match cursor.next()? {
                Node::Start(el) if el.name == "kanjivg" && !seen_root => {
                    seen_root = true;
                    loop {
                        match cursor.next()? {
                            Node::Start(el) if el.name == "kanji" => {
                                let Some(literal) = literal_of(&el) else {
                                    debug!(id = el.attr("id"), "Skipping variant drawing");
                                    cursor.skip()?;
                                    continue;
                                };
                                let strokes = parse_kanji(&mut cursor, literal)?;
                                if !on_entry(strokes) {
                                    return Err(ParseError::AbortedByConsumer);
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
            return Err(cursor.malformed("missing <kanjivg> root element"));
        }
        Ok(())
    }
}

/// `kvg:kanji_0732b` -> '猫'. `None` for variants and unparsable ids.
fn literal_of(el: &Element) -> Option<char> {
    let id = el.attr("id")?;
    let code = id.rsplit(['_', ':']).next()?;
    if id.contains('-') {
        return None;
    }
    u32::from_str_radix(code, 16).ok().and_then(char::from_u32)
}

fn parse_kanji<R: BufRead>(cursor: &mut XmlCursor<R>, literal: char) -> Result<ParsedStrokes, ParseError> {
    let mut result = ParsedStrokes {
        literal,
        groups: Vec::new(),
        strokes: Vec::new(),
    };
    // One slot per open <g>; `Some` for groups that became components.
    let mut open: Vec<Option<usize>> = Vec::new();
    let mut seen_container = false;

    loop {
        match cursor.next()? {
            Node::Start(el) if el.name == "g" => {
                // The outermost group draws the character itself.
                if open.is_empty() && !seen_container {
                    seen_container = true;
                    open.push(None);
                    continue;
                }
                let slot = el
                    .local_attr("element")
                    .and_then(|e| e.chars().next())
                    .map(|element| open_group(&mut result, &open, &el, element));
                open.push(slot);
            }
            Node::Start(el) if el.name == "path" => {
                let index = result.strokes.len();
                for group in open.iter().flatten() {
                    result.groups[*group].strokes.push(index);
                }
                result.strokes.push(ParsedStroke {
                    kind: el.local_attr("type").and_then(|t| t.chars().next()),
                    path: el.attr("d").unwrap_or_default().to_string(),
                    group: innermost(&open),
                });
                cursor.skip()?;
            }
            Node::Start(_) => cursor.skip()?,
            Node::End => {
                if open.pop().is_none() {
                    return Ok(result);
                }
            }
            _ => {}
        }
    }
}

/// Registers a component group, merging continuation parts
/// (`kvg:part="2"`...) into the group that started it.
fn open_group(result: &mut ParsedStrokes, open: &[Option<usize>], el: &Element, element: char) -> usize {
    let parent = innermost(open);
    let continuation = el
        .local_attr("part")
        .and_then(|p| p.parse::<u32>().ok())
        .is_some_and(|p| p > 1);

    if continuation {
        if let Some(existing) = result
            .groups
            .iter()
            .rposition(|g| g.element == element && g.parent == parent)
        {
            return existing;
        }
    }

    result.groups.push(ParsedGroup {
        element,
        original: el.local_attr("original").and_then(|o| o.chars().next()),
        parent,
        strokes: Vec::new(),
    });
    result.groups.len() - 1
}

fn innermost(open: &[Option<usize>]) -> Option<usize> {
    open.iter().rev().flatten().next().copied()
}
