use std::collections::HashMap;

use rusqlite::OptionalExtension;
use tango_core::{KanjiComponent, KanjiEntry, KanjiMeaning, KanjiReading, KanjiStroke, ReadingKind};

use crate::error::LoadError;

struct EntryRow {
    grade: Option<u8>,
    stroke_count: Option<u8>,
    frequency: Option<u16>,
    jlpt: Option<u8>,
    skip: Option<String>,
    four_corner: Option<String>,
}

/// Loads a kanji and its component tree. Characters that only appear in
/// the stroke tables come back with `in_dictionary == false`.
pub(super) fn load(conn: &rusqlite::Connection, id: u32) -> Result<Option<KanjiEntry>, LoadError> {
    let Some(literal) = char::from_u32(id) else {
        return Ok(None);
    };

    let row = conn
        .prepare_cached(
            "SELECT grade, strokeCount, frequency, jlpt, skip, fourCorner FROM kanjidic2.entries WHERE id = ?1",
        )?
        .query_row([id], |row| {
            Ok(EntryRow {
                grade: row.get(0)?,
                stroke_count: row.get(1)?,
                frequency: row.get(2)?,
                jlpt: row.get(3)?,
                skip: row.get(4)?,
                four_corner: row.get(5)?,
            })
        })
        .optional()?;

    let mut entry = KanjiEntry::new(literal);
    load_components(conn, &mut entry)?;

    let Some(row) = row else {
        if entry.components.is_empty() && entry.strokes.is_empty() {
            return Ok(None);
        }
        return Ok(Some(entry));
    };

    entry.in_dictionary = true;
    entry.grade = row.grade;
    entry.stroke_count = row.stroke_count;
    entry.frequency = row.frequency;
    entry.jlpt = row.jlpt;
    entry.skip = row.skip.and_then(|code| code.parse().ok());
    entry.four_corner = row.four_corner;

    entry.readings = conn
        .prepare_cached(
            "SELECT type, reading FROM kanjidic2.reading WHERE entry = ?1 ORDER BY position",
        )?
        .query_map([id], |row| {
            Ok(KanjiReading {
                kind: ReadingKind::from_r_type(&row.get::<_, String>(0)?),
                text: row.get(1)?,
            })
        })?
        .collect::<Result<_, _>>()?;

    entry.meanings = conn
        .prepare_cached(
            "SELECT lang, meaning FROM kanjidic2.meaning WHERE entry = ?1 ORDER BY position",
        )?
        .query_map([id], |row| {
            Ok(KanjiMeaning {
                lang: row.get(0)?,
                text: row.get(1)?,
            })
        })?
        .collect::<Result<_, _>>()?;

    entry.nanori = conn
        .prepare_cached("SELECT reading FROM kanjidic2.nanori WHERE entry = ?1 ORDER BY position")?
        .query_map([id], |row| row.get(0))?
        .collect::<Result<_, _>>()?;

    Ok(Some(entry))
}

fn load_components(conn: &rusqlite::Connection, entry: &mut KanjiEntry) -> Result<(), LoadError> {
    let id = entry.id;
    // strokeGroups row id -> index in entry.components
    let mut index_of: HashMap<i64, usize> = HashMap::new();

    let mut stmt = conn.prepare_cached(
        "SELECT id, parentGroup, element, original FROM kanjidic2.strokeGroups WHERE kanji = ?1 ORDER BY number",
    )?;
    let mut rows = stmt.query([id])?;
    while let Some(row) = rows.next()? {
        let group: i64 = row.get(0)?;
        let parent: Option<i64> = row.get(1)?;
        let element = code_point(row.get(2)?)?;
        let original = row
            .get::<_, Option<u32>>(3)?
            .map(code_point)
            .transpose()?;

        index_of.insert(group, entry.components.len());
        entry.components.push(KanjiComponent {
            element,
            original,
            parent: parent.and_then(|p| index_of.get(&p).copied()),
            strokes: Vec::new(),
        });
    }

    let mut stmt = conn.prepare_cached(
        "SELECT parentGroup, strokeType, path FROM kanjidic2.strokes WHERE kanji = ?1 ORDER BY number",
    )?;
    let mut rows = stmt.query([id])?;
    while let Some(row) = rows.next()? {
        let group: Option<i64> = row.get(0)?;
        let stroke = entry.strokes.len();
        entry.strokes.push(KanjiStroke {
            kind: row.get::<_, Option<u32>>(1)?.and_then(char::from_u32),
            path: row.get(2)?,
        });

        // A stroke belongs to its group and to every enclosing group
        let mut owner = group.and_then(|g| index_of.get(&g).copied());
        while let Some(index) = owner {
            entry.components[index].strokes.push(stroke);
            owner = entry.components[index].parent;
        }
    }

    Ok(())
}

fn code_point(value: u32) -> Result<char, LoadError> {
    char::from_u32(value).ok_or_else(|| LoadError::Decode(format!("invalid code point {value:#x}")))
}
