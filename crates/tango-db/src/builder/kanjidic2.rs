use std::io::BufRead;
use std::path::Path;
use std::time::Instant;

use rusqlite::{Transaction, params};
use tango_core::cover::root_components;
use tango_dictionary::{KanjiVgParser, Kanjidic2Parser, ParsedKanji, ParsedStrokes};
use tango_lang_japanese::{Segmenter, SkipCode, segment_kana, segment_text};
use tracing::{info, warn};

use super::{BuildOptions, BuildStats, Staging};
use crate::error::BuildError;
use crate::schema::{KANJIDIC2_DB_VERSION, KANJIDIC2_INDEXES, KANJIDIC2_SCHEMA};

/// Builds a KANJIDIC2 database at `output`. When `strokes` is given, the
/// KanjiVG stroke and component data is written alongside.
pub fn build_kanjidic2<R: BufRead>(
    source: R,
    strokes: Option<&mut dyn BufRead>,
    output: impl AsRef<Path>,
    options: &BuildOptions,
) -> Result<BuildStats, BuildError> {
    let output = output.as_ref();
    let started = Instant::now();
    info!("Building KANJIDIC2 database {}", output.display());

    let mut staging = Staging::new(output)?;
    let entries = {
        let tx = staging.conn.transaction()?;
        tx.execute_batch(KANJIDIC2_SCHEMA)?;
        tx.execute("INSERT INTO info(version) VALUES (?1)", [KANJIDIC2_DB_VERSION])?;

        let mut entries = 0usize;
        let mut failure = None;
        let parsed = Kanjidic2Parser::new(options.languages.clone()).parse(source, |kanji| {
            match insert_kanji(&tx, &kanji) {
                Ok(()) => {
                    entries += 1;
                    true
                }
                Err(e) => {
                    failure = Some(e);
                    false
                }
            }
        });
        if let Some(e) = failure {
            return Err(e);
        }
        parsed?;

        if let Some(strokes) = strokes {
            let mut drawn = 0usize;
            let parsed = KanjiVgParser::new().parse(strokes, |kanji| {
                match insert_strokes(&tx, &kanji) {
                    Ok(()) => {
                        drawn += 1;
                        true
                    }
                    Err(e) => {
                        failure = Some(e);
                        false
                    }
                }
            });
            if let Some(e) = failure {
                return Err(e);
            }
            parsed?;
            info!("Inserted stroke data for {drawn} characters");
        }

        tx.execute_batch(KANJIDIC2_INDEXES)?;
        tx.commit()?;
        entries
    };
    staging.persist(output)?;

    let stats = BuildStats {
        entries,
        elapsed: started.elapsed(),
    };
    info!(entries, elapsed = ?stats.elapsed, "KANJIDIC2 database built");
    Ok(stats)
}

/// Okurigana and affix markers are kept for display but not matched on.
fn reading_key(reading: &str) -> String {
    reading.chars().filter(|c| !matches!(c, '.' | '-')).collect()
}

fn insert_kanji(tx: &Transaction<'_>, kanji: &ParsedKanji) -> Result<(), BuildError> {
    let id = kanji.literal as u32;
    let skip = kanji.skip.as_deref().and_then(|code| match code.parse::<SkipCode>() {
        Ok(skip) => Some(skip),
        Err(e) => {
            warn!(kanji = %kanji.literal, "{e}");
            None
        }
    });

    tx.prepare_cached(
        "INSERT INTO entries(id, grade, strokeCount, frequency, jlpt, skip, fourCorner) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?
    .execute(params![
        id,
        kanji.grade,
        kanji.stroke_count,
        kanji.frequency,
        kanji.jlpt,
        skip.map(|s| s.to_string()),
        kanji.four_corner,
    ])?;

    if let Some(skip) = skip {
        tx.prepare_cached("INSERT INTO skip(entry, type, c1, c2) VALUES (?1, ?2, ?3, ?4)")?
            .execute(params![id, skip.kind, skip.first, skip.second])?;
    }

    for (position, (r_type, reading)) in kanji.readings.iter().enumerate() {
        let key = reading_key(reading);
        tx.prepare_cached(
            "INSERT INTO reading(entry, type, position, reading, normalized) VALUES (?1, ?2, ?3, ?4, ?5)",
        )?
        .execute(params![
            id,
            r_type,
            position,
            reading,
            tango_lang_japanese::normalize(&key)
        ])?;
        index(tx, "readingText", "reading", segment_kana(&key))?;
    }

    for (position, (lang, meaning)) in kanji.meanings.iter().enumerate() {
        tx.prepare_cached(
            "INSERT INTO meaning(entry, lang, position, meaning, normalized) VALUES (?1, ?2, ?3, ?4, ?5)",
        )?
        .execute(params![
            id,
            lang,
            position,
            meaning,
            Segmenter::Plain.normalize(meaning)
        ])?;
        index(tx, "meaningText", "meaning", segment_text(meaning))?;
    }

    for (position, reading) in kanji.nanori.iter().enumerate() {
        tx.prepare_cached(
            "INSERT INTO nanori(entry, position, reading, normalized) VALUES (?1, ?2, ?3, ?4)",
        )?
        .execute(params![
            id,
            position,
            reading,
            tango_lang_japanese::normalize(reading)
        ])?;
        index(tx, "nanoriText", "reading", segment_kana(reading))?;
    }

    Ok(())
}

fn insert_strokes(tx: &Transaction<'_>, kanji: &ParsedStrokes) -> Result<(), BuildError> {
    let id = kanji.literal as u32;
    let strokes_of: Vec<&[usize]> = kanji.groups.iter().map(|g| g.strokes.as_slice()).collect();
    let roots = root_components(&strokes_of);

    // Parents always precede their children, so their row ids are known
    let mut group_ids: Vec<i64> = Vec::with_capacity(kanji.groups.len());
    for (number, group) in kanji.groups.iter().enumerate() {
        let parent = group.parent.and_then(|p| group_ids.get(p).copied());
        tx.prepare_cached(
            "INSERT INTO strokeGroups(kanji, parentGroup, number, element, original, isRoot) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?
        .execute(params![
            id,
            parent,
            number,
            group.element as u32,
            group.original.map(|c| c as u32),
            roots.contains(&number),
        ])?;
        group_ids.push(tx.last_insert_rowid());
    }

    for (number, stroke) in kanji.strokes.iter().enumerate() {
        let parent = stroke.group.and_then(|g| group_ids.get(g).copied());
        tx.prepare_cached(
            "INSERT INTO strokes(kanji, number, parentGroup, strokeType, path) VALUES (?1, ?2, ?3, ?4, ?5)",
        )?
        .execute(params![
            id,
            number,
            parent,
            stroke.kind.map(|c| c as u32),
            stroke.path,
        ])?;
    }

    Ok(())
}

fn index(tx: &Transaction<'_>, table: &str, column: &str, segmented: String) -> rusqlite::Result<()> {
    let docid = tx.last_insert_rowid();
    tx.prepare_cached(&format!(
        "INSERT INTO {table}(rowid, {column}) VALUES (?1, ?2)"
    ))?
    .execute(params![docid, segmented])?;
    Ok(())
}
