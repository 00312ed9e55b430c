//! Fixed table layouts of the built dictionary files.
//!
//! Every indexed text column has a `normalized` twin used for exact and
//! prefix comparisons, and an FTS5 table whose rowid is the base row's
//! `docid`. The FTS tables store pre-segmented text only (`content=''`).

/// Schema version written into `info` by the JMdict builder
pub const JMDICT_DB_VERSION: u32 = 2;
/// Schema version written into `info` by the KANJIDIC2 builder
pub const KANJIDIC2_DB_VERSION: u32 = 2;
/// Version the user store is migrated to on open
pub const USER_DB_VERSION: u32 = 3;

pub const JMDICT_SCHEMA: &str = r#"
CREATE TABLE info(version INTEGER NOT NULL);
CREATE TABLE entries(id INTEGER PRIMARY KEY, frequency INTEGER);
CREATE TABLE kanji(
    docid INTEGER PRIMARY KEY,
    id INTEGER NOT NULL REFERENCES entries,
    position INTEGER NOT NULL,
    reading TEXT NOT NULL,
    normalized TEXT NOT NULL,
    frequency INTEGER
);
CREATE VIRTUAL TABLE kanjiText USING fts5(reading, content='', tokenize='unicode61 remove_diacritics 0');
CREATE TABLE kana(
    docid INTEGER PRIMARY KEY,
    id INTEGER NOT NULL REFERENCES entries,
    position INTEGER NOT NULL,
    reading TEXT NOT NULL,
    normalized TEXT NOT NULL,
    noKanji INTEGER NOT NULL,
    frequency INTEGER,
    restrictedTo TEXT
);
CREATE VIRTUAL TABLE kanaText USING fts5(reading, content='', tokenize='unicode61 remove_diacritics 0');
CREATE TABLE senses(
    id INTEGER NOT NULL REFERENCES entries,
    position INTEGER NOT NULL,
    pos INTEGER NOT NULL,
    misc INTEGER NOT NULL,
    dial INTEGER NOT NULL,
    field INTEGER NOT NULL,
    restrictedToKanji TEXT,
    restrictedToKana TEXT,
    notes TEXT
);
CREATE TABLE glosses(
    docid INTEGER PRIMARY KEY,
    id INTEGER NOT NULL REFERENCES entries,
    sense INTEGER NOT NULL,
    lang TEXT NOT NULL,
    position INTEGER NOT NULL,
    gloss TEXT NOT NULL,
    normalized TEXT NOT NULL
);
CREATE VIRTUAL TABLE glossText USING fts5(gloss, content='');
CREATE TABLE tags(
    category TEXT NOT NULL,
    bit INTEGER NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    PRIMARY KEY(category, bit)
);
"#;

pub const JMDICT_INDEXES: &str = r#"
CREATE INDEX idx_entries_frequency ON entries(frequency);
CREATE INDEX idx_kanji_id ON kanji(id, position);
CREATE INDEX idx_kanji_normalized ON kanji(normalized);
CREATE INDEX idx_kana_id ON kana(id, position);
CREATE INDEX idx_kana_normalized ON kana(normalized);
CREATE INDEX idx_senses_id ON senses(id, position);
CREATE INDEX idx_glosses_id ON glosses(id, sense, position);
"#;

pub const KANJIDIC2_SCHEMA: &str = r#"
CREATE TABLE info(version INTEGER NOT NULL);
CREATE TABLE entries(
    id INTEGER PRIMARY KEY,
    grade INTEGER,
    strokeCount INTEGER,
    frequency INTEGER,
    jlpt INTEGER,
    skip TEXT,
    fourCorner TEXT
);
CREATE TABLE reading(
    docid INTEGER PRIMARY KEY,
    entry INTEGER NOT NULL REFERENCES entries,
    type TEXT NOT NULL,
    position INTEGER NOT NULL,
    reading TEXT NOT NULL,
    normalized TEXT NOT NULL
);
CREATE VIRTUAL TABLE readingText USING fts5(reading, content='', tokenize='unicode61 remove_diacritics 0');
CREATE TABLE meaning(
    docid INTEGER PRIMARY KEY,
    entry INTEGER NOT NULL REFERENCES entries,
    lang TEXT NOT NULL,
    position INTEGER NOT NULL,
    meaning TEXT NOT NULL,
    normalized TEXT NOT NULL
);
CREATE VIRTUAL TABLE meaningText USING fts5(meaning, content='');
CREATE TABLE nanori(
    docid INTEGER PRIMARY KEY,
    entry INTEGER NOT NULL REFERENCES entries,
    position INTEGER NOT NULL,
    reading TEXT NOT NULL,
    normalized TEXT NOT NULL
);
CREATE VIRTUAL TABLE nanoriText USING fts5(reading, content='', tokenize='unicode61 remove_diacritics 0');
CREATE TABLE strokeGroups(
    id INTEGER PRIMARY KEY,
    kanji INTEGER NOT NULL,
    parentGroup INTEGER REFERENCES strokeGroups,
    number INTEGER NOT NULL,
    element INTEGER NOT NULL,
    original INTEGER,
    isRoot INTEGER NOT NULL
);
CREATE TABLE strokes(
    kanji INTEGER NOT NULL,
    number INTEGER NOT NULL,
    parentGroup INTEGER REFERENCES strokeGroups,
    strokeType INTEGER,
    path TEXT NOT NULL
);
CREATE TABLE skip(entry INTEGER NOT NULL, type INTEGER NOT NULL, c1 INTEGER NOT NULL, c2 INTEGER NOT NULL);
"#;

pub const KANJIDIC2_INDEXES: &str = r#"
CREATE INDEX idx_entries_frequency ON entries(frequency);
CREATE INDEX idx_entries_grade ON entries(grade);
CREATE INDEX idx_entries_strokeCount ON entries(strokeCount);
CREATE INDEX idx_entries_jlpt ON entries(jlpt);
CREATE INDEX idx_reading_entry ON reading(entry, position);
CREATE INDEX idx_reading_normalized ON reading(normalized);
CREATE INDEX idx_meaning_entry ON meaning(entry, position);
CREATE INDEX idx_nanori_entry ON nanori(entry, position);
CREATE INDEX idx_strokeGroups_kanji ON strokeGroups(kanji, number);
CREATE INDEX idx_strokeGroups_element ON strokeGroups(element);
CREATE INDEX idx_strokes_kanji ON strokes(kanji, number);
CREATE INDEX idx_skip ON skip(entry);
CREATE INDEX idx_skip_type ON skip(type, c1, c2);
"#;
