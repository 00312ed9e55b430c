use std::collections::BTreeMap;

use tango_types::EntryRef;

use crate::entry::DictionaryEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KanjiWriting {
    pub text: String,
    /// Rank derived from priority markers, lower is more common
    pub frequency: Option<u8>,
    /// Indices into `WordEntry::readings` valid for this writing
    pub readings: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KanaReading {
    pub text: String,
    pub frequency: Option<u8>,
    /// The reading is not a true reading of any writing
    pub no_kanji: bool,
    /// Indices into `WordEntry::writings` this reading attaches to
    pub writings: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sense {
    pub pos: u64,
    pub misc: u64,
    pub dialect: u64,
    pub field: u64,
    /// Language code -> gloss text, one per language
    pub glosses: BTreeMap<String, String>,
    pub notes: Vec<String>,
    /// Writings this sense is restricted to, empty if unrestricted
    pub restricted_to_writings: Vec<usize>,
    /// Readings this sense is restricted to, empty if unrestricted
    pub restricted_to_readings: Vec<usize>,
}

impl Sense {
    pub fn gloss(&self, lang: &str) -> Option<&str> {
        self.glosses.get(lang).map(String::as_str)
    }

    /// Whether this sense applies to the writing at `index`
    pub fn applies_to_writing(&self, index: usize) -> bool {
        self.restricted_to_writings.is_empty() || self.restricted_to_writings.contains(&index)
    }

    pub fn applies_to_reading(&self, index: usize) -> bool {
        self.restricted_to_readings.is_empty() || self.restricted_to_readings.contains(&index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    pub id: u32,
    pub frequency: Option<u8>,
    pub writings: Vec<KanjiWriting>,
    pub readings: Vec<KanaReading>,
    pub senses: Vec<Sense>,
}

impl WordEntry {
    /// Senses not hidden by `filter`.
    ///
    /// `filter` is the mask of misc tags hidden by default (archaic, vulgar,
    /// ...); bits set in `counter_filter` are requested back explicitly.
    pub fn relevant_senses(&self, filter: u64, counter_filter: u64) -> impl Iterator<Item = &Sense> {
        let hidden = filter & !counter_filter;
        self.senses.iter().filter(move |s| s.misc & hidden == 0)
    }

    /// Main form shown for this entry: first writing, else first reading
    pub fn headword(&self) -> &str {
        self.writings
            .first()
            .map(|w| w.text.as_str())
            .or_else(|| self.readings.first().map(|r| r.text.as_str()))
            .unwrap_or_default()
    }
}

impl DictionaryEntry for WordEntry {
    fn entry_ref(&self) -> EntryRef {
        EntryRef::word(self.id)
    }

    fn writings(&self) -> Vec<String> {
        self.writings.iter().map(|w| w.text.clone()).collect()
    }

    fn readings(&self) -> Vec<String> {
        self.readings.iter().map(|r| r.text.clone()).collect()
    }

    fn meanings(&self) -> Vec<String> {
        self.senses
            .iter()
            .filter_map(|s| s.glosses.values().next().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sense(gloss: &str, misc: u64) -> Sense {
        Sense {
            misc,
            glosses: BTreeMap::from([("en".to_string(), gloss.to_string())]),
            ..Sense::default()
        }
    }

    fn entry() -> WordEntry {
        WordEntry {
            id: 1,
            frequency: None,
            writings: vec![],
            readings: vec![KanaReading {
                text: "いぬ".into(),
                frequency: None,
                no_kanji: false,
                writings: vec![],
            }],
            senses: vec![sense("dog", 0), sense("spy", 0b01), sense("cur", 0b10)],
        }
    }

    #[test]
    fn filtered_senses_are_hidden() {
        let entry = entry();
        let relevant: Vec<_> = entry
            .relevant_senses(0b11, 0)
            .filter_map(|s| s.gloss("en"))
            .collect();
        assert_eq!(relevant, vec!["dog"]);
    }

    #[test]
    fn counter_filter_brings_senses_back() {
        let entry = entry();
        let relevant: Vec<_> = entry
            .relevant_senses(0b11, 0b10)
            .filter_map(|s| s.gloss("en"))
            .collect();
        assert_eq!(relevant, vec!["dog", "cur"]);
    }

    #[test]
    fn headword_falls_back_to_reading() {
        assert_eq!(entry().headword(), "いぬ");
        assert_eq!(entry().meanings(), vec!["dog", "spy", "cur"]);
    }

    #[test]
    fn unrestricted_sense_applies_everywhere() {
        let mut s = sense("x", 0);
        assert!(s.applies_to_writing(3));
        s.restricted_to_writings = vec![0];
        assert!(s.applies_to_writing(0));
        assert!(!s.applies_to_writing(1));
    }
}
