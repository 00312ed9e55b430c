use std::sync::Arc;

use tango_types::{DictionaryId, EntryRef};

use crate::kanji::KanjiEntry;
use crate::word::WordEntry;

/// Capabilities shared by every kind of dictionary entry
pub trait DictionaryEntry: Send + Sync {
    /// Dictionary and id this entry was loaded from
    fn entry_ref(&self) -> EntryRef;

    /// Written forms, in dictionary order
    fn writings(&self) -> Vec<String>;

    /// Readings, in dictionary order
    fn readings(&self) -> Vec<String>;

    /// One meaning line per sense or meaning, in dictionary order
    fn meanings(&self) -> Vec<String>;

    /// Main form: first writing, else first reading
    fn headword(&self) -> String {
        self.writings()
            .into_iter()
            .next()
            .or_else(|| self.readings().into_iter().next())
            .unwrap_or_default()
    }
}

/// An entry of any attached dictionary
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Word(WordEntry),
    Kanji(KanjiEntry),
}

/// Entries are immutable once built and shared between the cache and callers
pub type SharedEntry = Arc<Entry>;

impl Entry {
    pub fn dictionary(&self) -> DictionaryId {
        self.entry_ref().dictionary
    }

    pub fn id(&self) -> u32 {
        self.entry_ref().id
    }

    pub fn as_word(&self) -> Option<&WordEntry> {
        match self {
            Entry::Word(word) => Some(word),
            Entry::Kanji(_) => None,
        }
    }

    pub fn as_kanji(&self) -> Option<&KanjiEntry> {
        match self {
            Entry::Kanji(kanji) => Some(kanji),
            Entry::Word(_) => None,
        }
    }

    fn inner(&self) -> &dyn DictionaryEntry {
        match self {
            Entry::Word(word) => word,
            Entry::Kanji(kanji) => kanji,
        }
    }
}

impl DictionaryEntry for Entry {
    fn entry_ref(&self) -> EntryRef {
        self.inner().entry_ref()
    }

    fn writings(&self) -> Vec<String> {
        self.inner().writings()
    }

    fn readings(&self) -> Vec<String> {
        self.inner().readings()
    }

    fn meanings(&self) -> Vec<String> {
        self.inner().meanings()
    }
}

impl From<WordEntry> for Entry {
    fn from(word: WordEntry) -> Self {
        Entry::Word(word)
    }
}

impl From<KanjiEntry> for Entry {
    fn from(kanji: KanjiEntry) -> Self {
        Entry::Kanji(kanji)
    }
}
