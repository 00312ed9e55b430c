use std::fmt;

use serde::{Deserialize, Serialize};

/// Which attached dictionary an entry id belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DictionaryId {
    Words,
    Kanji,
}

impl DictionaryId {
    pub const ALL: [DictionaryId; 2] = [DictionaryId::Words, DictionaryId::Kanji];

    /// Numeric id stored in result rows and user data
    pub fn as_u8(self) -> u8 {
        match self {
            DictionaryId::Words => 1,
            DictionaryId::Kanji => 2,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(DictionaryId::Words),
            2 => Some(DictionaryId::Kanji),
            _ => None,
        }
    }

    /// Alias the dictionary file is attached under
    pub fn alias(self) -> &'static str {
        match self {
            DictionaryId::Words => "jmdict",
            DictionaryId::Kanji => "kanjidic2",
        }
    }
}

impl fmt::Display for DictionaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias())
    }
}

/// Identity of one entry across all attached dictionaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryRef {
    pub dictionary: DictionaryId,
    pub id: u32,
}

impl EntryRef {
    pub fn new(dictionary: DictionaryId, id: u32) -> Self {
        Self { dictionary, id }
    }

    pub fn word(id: u32) -> Self {
        Self::new(DictionaryId::Words, id)
    }

    pub fn kanji(id: u32) -> Self {
        Self::new(DictionaryId::Kanji, id)
    }
}

impl fmt::Display for EntryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.dictionary, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Query execution failed: {0}")]
    ExecutionFailed(String),
}

/// Events a query job posts back to its caller.
///
/// A fetch produces `FirstResult`, zero or more `Row`s and exactly one of
/// `LastResult`, `Aborted` or `Error`. Count jobs produce `Count` or `CountFailed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryEvent {
    FirstResult,
    Row(EntryRef),
    LastResult,
    Aborted,
    Error(FetchError),
    Count(u64),
    CountFailed(FetchError),
}

impl QueryEvent {
    /// Whether this event ends a fetch
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            QueryEvent::LastResult | QueryEvent::Aborted | QueryEvent::Error(_)
        )
    }
}
