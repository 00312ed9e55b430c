use std::sync::OnceLock;

use tango_lang_japanese::SkipCode;
use tango_types::EntryRef;

use crate::cover;
use crate::entry::DictionaryEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadingKind {
    On,
    Kun,
    Other(String),
}

impl ReadingKind {
    /// Map a KANJIDIC2 `r_type`
    pub fn from_r_type(r_type: &str) -> Self {
        match r_type {
            "ja_on" => ReadingKind::On,
            "ja_kun" => ReadingKind::Kun,
            other => ReadingKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ReadingKind::On => "ja_on",
            ReadingKind::Kun => "ja_kun",
            ReadingKind::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KanjiReading {
    pub kind: ReadingKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KanjiMeaning {
    pub lang: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KanjiStroke {
    /// Stroke type character from the stroke data, e.g. `㇐`
    pub kind: Option<char>,
    /// SVG path data
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KanjiComponent {
    pub element: char,
    /// Character this component is a variant of, looked up as its own entry
    pub original: Option<char>,
    /// Index of the enclosing component, `None` at the top level
    pub parent: Option<usize>,
    /// Indices into `KanjiEntry::strokes`, in drawing order
    pub strokes: Vec<usize>,
}

impl KanjiComponent {
    /// Character to display for this component
    pub fn repr(&self, simplified: bool) -> char {
        match (simplified, self.original) {
            (false, Some(original)) => original,
            _ => self.element,
        }
    }

    pub fn unicode(&self, simplified: bool) -> u32 {
        self.repr(simplified) as u32
    }
}

#[derive(Debug, Default)]
pub struct KanjiEntry {
    /// Unicode code point of the character
    pub id: u32,
    pub literal: char,
    /// False for characters only known from stroke data
    pub in_dictionary: bool,
    pub grade: Option<u8>,
    pub stroke_count: Option<u8>,
    pub frequency: Option<u16>,
    pub jlpt: Option<u8>,
    pub skip: Option<SkipCode>,
    pub four_corner: Option<String>,
    pub readings: Vec<KanjiReading>,
    pub meanings: Vec<KanjiMeaning>,
    pub nanori: Vec<String>,
    pub components: Vec<KanjiComponent>,
    pub strokes: Vec<KanjiStroke>,
    root_components: OnceLock<Vec<usize>>,
}

impl KanjiEntry {
    pub fn new(literal: char) -> Self {
        Self {
            id: literal as u32,
            literal,
            ..Self::default()
        }
    }

    /// Minimal ordered set of components covering the character's strokes.
    /// Computed on first access.
    pub fn root_components(&self) -> Vec<&KanjiComponent> {
        self.root_component_indices()
            .iter()
            .filter_map(|i| self.components.get(*i))
            .collect()
    }

    pub fn root_component_indices(&self) -> &[usize] {
        self.root_components.get_or_init(|| {
            let strokes: Vec<&[usize]> = self
                .components
                .iter()
                .map(|c| c.strokes.as_slice())
                .collect();
            cover::root_components(&strokes)
        })
    }

    pub fn onyomi(&self) -> impl Iterator<Item = &str> {
        self.readings_of(ReadingKind::On)
    }

    pub fn kunyomi(&self) -> impl Iterator<Item = &str> {
        self.readings_of(ReadingKind::Kun)
    }

    fn readings_of(&self, kind: ReadingKind) -> impl Iterator<Item = &str> {
        self.readings
            .iter()
            .filter(move |r| r.kind == kind)
            .map(|r| r.text.as_str())
    }

    pub fn meanings_in<'a>(&'a self, lang: &'a str) -> impl Iterator<Item = &'a str> {
        self.meanings
            .iter()
            .filter(move |m| m.lang == lang)
            .map(|m| m.text.as_str())
    }
}

impl Clone for KanjiEntry {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            literal: self.literal,
            in_dictionary: self.in_dictionary,
            grade: self.grade,
            stroke_count: self.stroke_count,
            frequency: self.frequency,
            jlpt: self.jlpt,
            skip: self.skip,
            four_corner: self.four_corner.clone(),
            readings: self.readings.clone(),
            meanings: self.meanings.clone(),
            nanori: self.nanori.clone(),
            components: self.components.clone(),
            strokes: self.strokes.clone(),
            root_components: OnceLock::new(),
        }
    }
}

impl PartialEq for KanjiEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.in_dictionary == other.in_dictionary
            && self.grade == other.grade
            && self.stroke_count == other.stroke_count
            && self.frequency == other.frequency
            && self.jlpt == other.jlpt
            && self.skip == other.skip
            && self.four_corner == other.four_corner
            && self.readings == other.readings
            && self.meanings == other.meanings
            && self.nanori == other.nanori
            && self.components == other.components
            && self.strokes == other.strokes
    }
}

impl DictionaryEntry for KanjiEntry {
    fn entry_ref(&self) -> EntryRef {
        EntryRef::kanji(self.id)
    }

    fn writings(&self) -> Vec<String> {
        vec![self.literal.to_string()]
    }

    fn readings(&self) -> Vec<String> {
        self.readings
            .iter()
            .filter(|r| !matches!(r.kind, ReadingKind::Other(_)))
            .map(|r| r.text.clone())
            .collect()
    }

    fn meanings(&self) -> Vec<String> {
        self.meanings.iter().map(|m| m.text.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(element: char, strokes: Vec<usize>) -> KanjiComponent {
        KanjiComponent {
            element,
            original: None,
            parent: None,
            strokes,
        }
    }

    #[test]
    fn root_components_cover_strokes() {
        let mut entry = KanjiEntry::new('猫');
        entry.components = vec![
            component('犭', vec![0, 1, 2]),
            component('丿', vec![1, 2]),
            component('苗', vec![3, 4, 5]),
        ];
        let roots: Vec<char> = entry.root_components().iter().map(|c| c.element).collect();
        assert_eq!(roots, vec!['犭', '苗']);
        // memoized
        assert_eq!(entry.root_component_indices(), &[0, 2]);
    }

    #[test]
    fn repr_prefers_original_unless_simplified() {
        let mut c = component('犭', vec![]);
        c.original = Some('犬');
        assert_eq!(c.repr(false), '犬');
        assert_eq!(c.repr(true), '犭');
        assert_eq!(c.unicode(true), '犭' as u32);
    }

    #[test]
    fn capability_views() {
        let mut entry = KanjiEntry::new('猫');
        entry.readings = vec![
            KanjiReading {
                kind: ReadingKind::On,
                text: "ビョウ".into(),
            },
            KanjiReading {
                kind: ReadingKind::Kun,
                text: "ねこ".into(),
            },
            KanjiReading {
                kind: ReadingKind::Other("pinyin".into()),
                text: "mao1".into(),
            },
        ];
        assert_eq!(entry.writings(), vec!["猫"]);
        assert_eq!(entry.readings(), vec!["ビョウ", "ねこ"]);
        assert_eq!(entry.onyomi().collect::<Vec<_>>(), vec!["ビョウ"]);
        assert_eq!(entry.entry_ref(), EntryRef::kanji(0x732B));
    }
}
