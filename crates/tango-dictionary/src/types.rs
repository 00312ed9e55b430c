//! Storage-agnostic records produced by the dictionary parsers.
//!
//! Tag fields hold entity names (`v1`, `uk`, ...) rather than their
//! expansions; the builder turns them into bits.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedWord {
    pub id: u32,
    pub writings: Vec<ParsedWriting>,
    pub readings: Vec<ParsedReading>,
    pub senses: Vec<ParsedSense>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedWriting {
    pub text: String,
    pub priorities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedReading {
    pub text: String,
    pub no_kanji: bool,
    /// Writing texts this reading is limited to. Empty means all.
    pub restricted_to: Vec<String>,
    pub priorities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSense {
    pub pos: Vec<String>,
    pub misc: Vec<String>,
    pub field: Vec<String>,
    pub dialect: Vec<String>,
    pub restricted_to_writings: Vec<String>,
    pub restricted_to_readings: Vec<String>,
    pub notes: Vec<String>,
    /// Language code -> glosses in document order.
    pub glosses: BTreeMap<String, Vec<String>>,
}

impl ParsedSense {
    pub fn has_glosses(&self) -> bool {
        self.glosses.values().any(|g| !g.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedKanji {
    pub literal: char,
    pub grade: Option<u8>,
    pub stroke_count: Option<u8>,
    pub frequency: Option<u16>,
    pub jlpt: Option<u8>,
    pub skip: Option<String>,
    pub four_corner: Option<String>,
    /// `(r_type, reading)` pairs.
    pub readings: Vec<(String, String)>,
    /// `(language, meaning)` pairs.
    pub meanings: Vec<(String, String)>,
    pub nanori: Vec<String>,
}

impl ParsedKanji {
    pub fn new(literal: char) -> Self {
        Self {
            literal,
            grade: None,
            stroke_count: None,
            frequency: None,
            jlpt: None,
            skip: None,
            four_corner: None,
            readings: Vec::new(),
            meanings: Vec::new(),
            nanori: Vec::new(),
        }
    }
}

/// Stroke decomposition of one character.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStrokes {
    pub literal: char,
    pub groups: Vec<ParsedGroup>,
    pub strokes: Vec<ParsedStroke>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedGroup {
    pub element: char,
    pub original: Option<char>,
    pub parent: Option<usize>,
    /// Strokes drawn inside this group or any of its descendants.
    pub strokes: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStroke {
    pub kind: Option<char>,
    pub path: String,
    /// Innermost named group enclosing the stroke.
    pub group: Option<usize>,
}
