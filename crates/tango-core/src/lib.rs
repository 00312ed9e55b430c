pub mod cover;
pub mod entry;
pub mod kanji;
pub mod search;
pub mod tags;
pub mod word;

pub use entry::{DictionaryEntry, Entry, SharedEntry};
pub use kanji::{KanjiComponent, KanjiEntry, KanjiMeaning, KanjiReading, KanjiStroke, ReadingKind};
pub use search::{Clause, MatchMode, NumericField, Order, QuerySpec, TextField};
pub use tags::{TagBitfield, TagCategory, TagError, TagRegistry};
pub use word::{KanaReading, KanjiWriting, Sense, WordEntry};
