use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use std::time::Instant;

use rusqlite::{Transaction, params};
use tango_core::{TagCategory, TagRegistry};
use tango_dictionary::{JmdictParser, ParsedWord};
use tango_lang_japanese::{Segmenter, segment_kana, segment_text};
use tracing::{info, warn};

use super::{BuildOptions, BuildStats, Staging, index_list};
use crate::error::BuildError;
use crate::schema::{JMDICT_DB_VERSION, JMDICT_INDEXES, JMDICT_SCHEMA};

/// Builds a JMdict database at `output` from the XML in `source`.
pub fn build_jmdict<R: BufRead>(
    source: R,
    output: impl AsRef<Path>,
    options: &BuildOptions,
) -> Result<BuildStats, BuildError> {
    let output = output.as_ref();
    let started = Instant::now();
    info!("Building JMdict database {}", output.display());

    let mut staging = Staging::new(output)?;
    let entries = {
        let tx = staging.conn.transaction()?;
        tx.execute_batch(JMDICT_SCHEMA)?;
        tx.execute("INSERT INTO info(version) VALUES (?1)", [JMDICT_DB_VERSION])?;

        let mut writer = WordWriter {
            tx: &tx,
            tags: TagRegistry::new(),
            entries: 0,
        };
        let mut parser = JmdictParser::new(options.languages.clone());
        let mut failure = None;
        let parsed = parser.parse(source, |word| match writer.insert(&word) {
            Ok(()) => true,
            Err(e) => {
                failure = Some(e);
                false
            }
        });
        if let Some(e) = failure {
            return Err(e);
        }
        parsed?;

        writer.write_tags(parser.entities())?;
        let entries = writer.entries;
        tx.execute_batch(JMDICT_INDEXES)?;
        tx.commit()?;
        entries
    };
    staging.persist(output)?;

    let stats = BuildStats {
        entries,
        elapsed: started.elapsed(),
    };
    info!(entries, elapsed = ?stats.elapsed, "JMdict database built");
    Ok(stats)
}

/// Frequency rank from JMdict priority markers: `nfXX` ranks `XX`, the
/// other "common word" lists rank 49, any other marker 50. Lower is more
/// common; `None` when there is no marker at all.
pub fn priority_rank(priorities: &[String]) -> Option<u8> {
    priorities
        .iter()
        .map(|p| {
            let p = p.as_str();
            match p.strip_prefix("nf").and_then(|n| n.parse::<u8>().ok()) {
                Some(rank) => rank,
                None if matches!(p, "news1" | "ichi1" | "spec1" | "gai1") => 49,
                None => 50,
            }
        })
        .min()
}

struct WordWriter<'a> {
    tx: &'a Transaction<'a>,
    tags: TagRegistry,
    entries: usize,
}

impl WordWriter<'_> {
    fn insert(&mut self, word: &ParsedWord) -> Result<(), BuildError> {
        let writing_rank = word.writings.iter().filter_map(|w| priority_rank(&w.priorities));
        let reading_rank = word.readings.iter().filter_map(|r| priority_rank(&r.priorities));
        let frequency = writing_rank.chain(reading_rank).min();

        self.tx.execute(
            "INSERT INTO entries(id, frequency) VALUES (?1, ?2)",
            params![word.id, frequency],
        )?;

        for (position, writing) in word.writings.iter().enumerate() {
            self.tx
                .prepare_cached(
                    "INSERT INTO kanji(id, position, reading, normalized, frequency) VALUES (?1, ?2, ?3, ?4, ?5)",
                )?
                .execute(params![
                    word.id,
                    position,
                    writing.text,
                    Segmenter::Kana.normalize(&writing.text),
                    priority_rank(&writing.priorities),
                ])?;
            self.index("kanjiText", "reading", segment_kana(&writing.text))?;
        }

        let writing_index = |text: &str, what: &str| -> Option<usize> {
            let found = word.writings.iter().position(|w| w.text == text);
            if found.is_none() {
                warn!(id = word.id, "Dropping {what} restriction to unknown writing {text:?}");
            }
            found
        };
        let reading_index = |text: &str| -> Option<usize> {
            let found = word.readings.iter().position(|r| r.text == text);
            if found.is_none() {
                warn!(id = word.id, "Dropping sense restriction to unknown reading {text:?}");
            }
            found
        };

        for (position, reading) in word.readings.iter().enumerate() {
            let restricted: Vec<usize> = reading
                .restricted_to
                .iter()
                .filter_map(|text| writing_index(text.as_str(), "reading"))
                .collect();
            self.tx
                .prepare_cached(
                    "INSERT INTO kana(id, position, reading, normalized, noKanji, frequency, restrictedTo) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )?
                .execute(params![
                    word.id,
                    position,
                    reading.text,
                    Segmenter::Kana.normalize(&reading.text),
                    reading.no_kanji,
                    priority_rank(&reading.priorities),
                    index_list(&restricted),
                ])?;
            self.index("kanaText", "reading", segment_kana(&reading.text))?;
        }

        for (position, sense) in word.senses.iter().enumerate() {
            let to_writings: Vec<usize> = sense
                .restricted_to_writings
                .iter()
                .filter_map(|text| writing_index(text.as_str(), "sense"))
                .collect();
            let to_readings: Vec<usize> = sense
                .restricted_to_readings
                .iter()
                .filter_map(|text| reading_index(text.as_str()))
                .collect();
            let notes = if sense.notes.is_empty() {
                None
            } else {
                serde_json::to_string(&sense.notes).ok()
            };

            let pos = self.tags.encode(TagCategory::PartOfSpeech, &sense.pos)?;
            let misc = self.tags.encode(TagCategory::Misc, &sense.misc)?;
            let dial = self.tags.encode(TagCategory::Dialect, &sense.dialect)?;
            let field = self.tags.encode(TagCategory::Field, &sense.field)?;

            self.tx
                .prepare_cached(
                    "INSERT INTO senses(id, position, pos, misc, dial, field, restrictedToKanji, restrictedToKana, notes) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                )?
                .execute(params![
                    word.id,
                    position,
                    pos as i64,
                    misc as i64,
                    dial as i64,
                    field as i64,
                    index_list(&to_writings),
                    index_list(&to_readings),
                    notes,
                ])?;

            for (lang, glosses) in &sense.glosses {
                for (order, gloss) in glosses.iter().enumerate() {
                    self.tx
                        .prepare_cached(
                            "INSERT INTO glosses(id, sense, lang, position, gloss, normalized) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                        )?
                        .execute(params![
                            word.id,
                            position,
                            lang,
                            order,
                            gloss,
                            Segmenter::Plain.normalize(gloss),
                        ])?;
                    self.index("glossText", "gloss", segment_text(gloss))?;
                }
            }
        }

        self.entries += 1;
        if self.entries % 20_000 == 0 {
            info!("Inserted {} JMdict entries", self.entries);
        }
        Ok(())
    }

    /// Adds the segmented form of the row just inserted to an FTS table.
    fn index(&self, table: &str, column: &str, segmented: String) -> rusqlite::Result<()> {
        let docid = self.tx.last_insert_rowid();
        self.tx
            .prepare_cached(&format!(
                "INSERT INTO {table}(rowid, {column}) VALUES (?1, ?2)"
            ))?
            .execute(params![docid, segmented])?;
        Ok(())
    }

    fn write_tags(&self, entities: &HashMap<String, String>) -> rusqlite::Result<()> {
        for category in TagCategory::ALL {
            for (bit, name) in self.tags.category(category).iter() {
                self.tx.execute(
                    "INSERT INTO tags(category, bit, name, description) VALUES (?1, ?2, ?3, ?4)",
                    params![category.as_str(), bit, name, entities.get(name)],
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_prefers_the_most_common_marker() {
        let rank = |markers: &[&str]| {
            priority_rank(&markers.iter().map(|m| m.to_string()).collect::<Vec<_>>())
        };
        assert_eq!(rank(&["ichi1", "nf03"]), Some(3));
        assert_eq!(rank(&["news1"]), Some(49));
        assert_eq!(rank(&["news2"]), Some(50));
        assert_eq!(rank(&[]), None);
    }
}
