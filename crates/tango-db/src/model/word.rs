use std::collections::BTreeMap;

use rusqlite::{OptionalExtension, Row};
use tango_core::{KanaReading, KanjiWriting, Sense, WordEntry};

use super::parse_indices;
use crate::error::LoadError;

pub(super) fn load(conn: &rusqlite::Connection, id: u32) -> Result<Option<WordEntry>, LoadError> {
    let Some(frequency) = conn
        .prepare_cached("SELECT frequency FROM jmdict.entries WHERE id = ?1")?
        .query_row([id], |row| row.get::<_, Option<u8>>(0))
        .optional()?
    else {
        return Ok(None);
    };

    let mut writings = conn
        .prepare_cached(
            "SELECT reading, frequency FROM jmdict.kanji WHERE id = ?1 ORDER BY position",
        )?
        .query_map([id], |row| {
            Ok(KanjiWriting {
                text: row.get(0)?,
                frequency: row.get(1)?,
                readings: Vec::new(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut readings = Vec::new();
    let mut stmt = conn.prepare_cached(
        "SELECT reading, frequency, noKanji, restrictedTo FROM jmdict.kana WHERE id = ?1 ORDER BY position",
    )?;
    let mut rows = stmt.query([id])?;
    while let Some(row) = rows.next()? {
        let no_kanji: bool = row.get(2)?;
        let restricted: Option<String> = row.get(3)?;
        let attached_to = if no_kanji {
            Vec::new()
        } else {
            match parse_indices(restricted.as_deref(), writings.len())? {
                all if all.is_empty() => (0..writings.len()).collect(),
                some => some,
            }
        };
        readings.push(KanaReading {
            text: row.get(0)?,
            frequency: row.get(1)?,
            no_kanji,
            writings: attached_to,
        });
    }

    for (index, reading) in readings.iter().enumerate() {
        for &writing in &reading.writings {
            writings[writing].readings.push(index);
        }
    }

    let senses = load_senses(conn, id, writings.len(), readings.len())?;

    Ok(Some(WordEntry {
        id,
        frequency,
        writings,
        readings,
        senses,
    }))
}

fn load_senses(
    conn: &rusqlite::Connection,
    id: u32,
    writings: usize,
    readings: usize,
) -> Result<Vec<Sense>, LoadError> {
    let mut positions = Vec::new();
    let mut senses = Vec::new();

    let mut stmt = conn.prepare_cached(
        "SELECT position, pos, misc, dial, field, restrictedToKanji, restrictedToKana, notes
         FROM jmdict.senses WHERE id = ?1 ORDER BY position",
    )?;
    let mut rows = stmt.query([id])?;
    while let Some(row) = rows.next()? {
        positions.push(row.get::<_, i64>(0)?);
        senses.push(sense_from_row(row, writings, readings)?);
    }

    let mut stmt = conn.prepare_cached(
        "SELECT sense, lang, gloss FROM jmdict.glosses WHERE id = ?1 ORDER BY sense, position",
    )?;
    let mut rows = stmt.query([id])?;
    while let Some(row) = rows.next()? {
        let position: i64 = row.get(0)?;
        let Some(index) = positions.iter().position(|p| *p == position) else {
            return Err(LoadError::Decode(format!(
                "gloss of entry {id} points to missing sense {position}"
            )));
        };
        let lang: String = row.get(1)?;
        let gloss: String = row.get(2)?;
        join_gloss(&mut senses[index].glosses, lang, gloss);
    }

    Ok(senses)
}

fn sense_from_row(row: &Row<'_>, writings: usize, readings: usize) -> Result<Sense, LoadError> {
    let to_writings: Option<String> = row.get(5)?;
    let to_readings: Option<String> = row.get(6)?;
    let notes = match row.get::<_, Option<String>>(7)? {
        Some(json) => {
            serde_json::from_str(&json).map_err(|e| LoadError::Decode(e.to_string()))?
        }
        None => Vec::new(),
    };

    Ok(Sense {
        pos: row.get::<_, i64>(1)? as u64,
        misc: row.get::<_, i64>(2)? as u64,
        dialect: row.get::<_, i64>(3)? as u64,
        field: row.get::<_, i64>(4)? as u64,
        glosses: BTreeMap::new(),
        notes,
        restricted_to_writings: parse_indices(to_writings.as_deref(), writings)?,
        restricted_to_readings: parse_indices(to_readings.as_deref(), readings)?,
    })
}

/// One gloss line per language, joined in source order
fn join_gloss(glosses: &mut BTreeMap<String, String>, lang: String, gloss: String) {
    match glosses.get_mut(&lang) {
        Some(text) => {
            text.push_str("; ");
            text.push_str(&gloss);
        }
        None => {
            glosses.insert(lang, gloss);
        }
    }
}
