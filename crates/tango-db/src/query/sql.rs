//! Translation of a [`QuerySpec`] into SQL over the attached dictionaries.
//!
//! Each attached dictionary able to satisfy every clause contributes one
//! `SELECT dict, id, freq` branch; the branches are combined with
//! `UNION ALL` and ordered on the outside.

use rusqlite::types::Value;
use tango_core::{Clause, MatchMode, NumericField, Order, QuerySpec, TagCategory, TagRegistry, TextField};
use tango_lang_japanese::{SkipCode, is_kanji, normalize, segment_kana, segment_text};
use tango_types::DictionaryId;
use tracing::warn;

use crate::connection::Connection;
use crate::error::{QueryBuildError, StorageError};

/// What a query can be built against: the attached dictionaries and the tag
/// assignment of the word dictionary.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub dictionaries: Vec<DictionaryId>,
    pub tags: TagRegistry,
}

impl Catalog {
    pub fn load(conn: &Connection) -> Result<Self, StorageError> {
        let dictionaries: Vec<DictionaryId> = DictionaryId::ALL
            .into_iter()
            .filter(|d| conn.is_attached(d.alias()))
            .collect();

        let mut tags = TagRegistry::new();
        if dictionaries.contains(&DictionaryId::Words) {
            let mut stmt = conn
                .inner()
                .prepare("SELECT category, bit, name, description FROM jmdict.tags ORDER BY category, bit")?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let category: String = row.get(0)?;
                let bit: u8 = row.get(1)?;
                let name: String = row.get(2)?;
                let description: Option<String> = row.get(3)?;

                let restored = category
                    .parse::<TagCategory>()
                    .and_then(|category| tags.restore(category, bit, &name));
                if let Err(e) = restored {
                    warn!("Ignoring stored tag {name:?}: {e}");
                    continue;
                }
                if let Some(description) = description {
                    tags.set_description(&name, &description);
                }
            }
        }

        Ok(Self { dictionaries, tags })
    }
}

/// SQL and bound parameters of a prepared search
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    /// Ordered `(dict, id)` rows; `LIMIT ? OFFSET ?` is appended per fetch
    pub select_sql: String,
    pub count_sql: String,
    pub params: Vec<Value>,
}

pub fn build(spec: &QuerySpec, catalog: &Catalog) -> Result<PreparedQuery, QueryBuildError> {
    if spec.clauses.is_empty() {
        return Err(invalid("a search needs at least one clause"));
    }
    for clause in &spec.clauses {
        validate(clause, catalog)?;
    }

    let mut branches = Vec::new();
    let mut params = Vec::new();
    for &dictionary in &catalog.dictionaries {
        let mut conditions = Vec::new();
        let mut branch_params = Vec::new();
        let qualifies = spec.clauses.iter().all(|clause| {
            let condition = match dictionary {
                DictionaryId::Words => word_condition(clause, catalog, &mut branch_params),
                DictionaryId::Kanji => kanji_condition(clause, &mut branch_params),
            };
            match condition {
                Condition::Sql(sql) => {
                    conditions.push(sql);
                    true
                }
                Condition::Always => true,
                Condition::Never => false,
            }
        });
        if !qualifies {
            continue;
        }

        let alias = dictionary.alias();
        let filter = if conditions.is_empty() {
            "1".to_string()
        } else {
            conditions.join(" AND ")
        };
        branches.push(format!(
            "SELECT {} AS dict, e.id AS id, e.frequency AS freq FROM {alias}.entries e WHERE {filter}",
            dictionary.as_u8()
        ));
        params.extend(branch_params);
    }

    if branches.is_empty() {
        return Err(invalid("no attached dictionary can answer this search"));
    }

    let union = branches.join(" UNION ALL ");
    let order = match spec.order {
        Order::Frequency => "freq IS NULL, freq, dict, id",
        Order::Identifier => "dict, id",
    };
    Ok(PreparedQuery {
        select_sql: format!("SELECT dict, id FROM ({union}) ORDER BY {order}"),
        count_sql: format!("SELECT count(*) FROM ({union})"),
        params,
    })
}

fn invalid(message: impl Into<String>) -> QueryBuildError {
    QueryBuildError::InvalidSpec(message.into())
}

/// Checks that do not depend on which dictionary the clause runs against
fn validate(clause: &Clause, catalog: &Catalog) -> Result<(), QueryBuildError> {
    match clause {
        Clause::Text { pattern, .. } if pattern.trim().is_empty() => {
            Err(invalid("empty search text"))
        }
        Clause::Tag { category, name } => match catalog.tags.bit_of(*category, name) {
            Some(_) => Ok(()),
            None => Err(invalid(format!("unknown {category} tag {name:?}"))),
        },
        Clause::Range { field, min, max } => {
            let (low, high) = field.bounds();
            for bound in [min, max].into_iter().flatten() {
                if !(low..=high).contains(bound) {
                    return Err(invalid(format!(
                        "{field:?} bound {bound} is outside {low}..={high}"
                    )));
                }
            }
            match (min, max) {
                (Some(min), Some(max)) if min > max => {
                    Err(invalid(format!("{field:?} range {min}..{max} is empty")))
                }
                _ => Ok(()),
            }
        }
        Clause::Skip { code } => code
            .parse::<SkipCode>()
            .map(|_| ())
            .map_err(|e| invalid(e.to_string())),
        Clause::Components { elements } if elements.is_empty() => {
            Err(invalid("component search without components"))
        }
        _ => Ok(()),
    }
}

enum Condition {
    Sql(String),
    /// The clause holds for every entry of the dictionary
    Always,
    /// The dictionary cannot satisfy the clause
    Never,
}

/// An indexed text column: the base table, its FTS twin and the column
/// holding the owning entry's id.
struct TextIndex {
    table: &'static str,
    fts: &'static str,
    fts_table: &'static str,
    owner: &'static str,
}

const WORD_WRITINGS: TextIndex = TextIndex {
    table: "jmdict.kanji",
    fts: "jmdict.kanjiText",
    fts_table: "kanjiText",
    owner: "id",
};
const WORD_READINGS: TextIndex = TextIndex {
    table: "jmdict.kana",
    fts: "jmdict.kanaText",
    fts_table: "kanaText",
    owner: "id",
};
const WORD_GLOSSES: TextIndex = TextIndex {
    table: "jmdict.glosses",
    fts: "jmdict.glossText",
    fts_table: "glossText",
    owner: "id",
};
const KANJI_READINGS: TextIndex = TextIndex {
    table: "kanjidic2.reading",
    fts: "kanjidic2.readingText",
    fts_table: "readingText",
    owner: "entry",
};
const KANJI_MEANINGS: TextIndex = TextIndex {
    table: "kanjidic2.meaning",
    fts: "kanjidic2.meaningText",
    fts_table: "meaningText",
    owner: "entry",
};

fn word_condition(clause: &Clause, catalog: &Catalog, params: &mut Vec<Value>) -> Condition {
    match clause {
        Clause::Text {
            field,
            pattern,
            mode,
        } => {
            let writing = |params: &mut Vec<Value>| reading_match(&WORD_WRITINGS, pattern, *mode, params);
            let reading = |params: &mut Vec<Value>| reading_match(&WORD_READINGS, pattern, *mode, params);
            let meaning = |params: &mut Vec<Value>| meaning_match(&WORD_GLOSSES, pattern, *mode, params);
            match field {
                TextField::Writing => writing(params),
                TextField::Reading => reading(params),
                TextField::Meaning => meaning(params),
                TextField::Any => any_of(vec![writing(params), reading(params), meaning(params)]),
            }
        }
        Clause::Tag { category, name } => match catalog.tags.bit_of(*category, name) {
            Some(bit) => {
                params.push(Value::Integer((1u64 << bit) as i64));
                Condition::Sql(format!(
                    "e.id IN (SELECT s.id FROM jmdict.senses s WHERE (s.{} & ?) != 0)",
                    category.as_str()
                ))
            }
            None => Condition::Never,
        },
        Clause::Range {
            field: NumericField::Frequency,
            min,
            max,
        } => range("e.frequency", *min, *max, params),
        Clause::Range { .. } | Clause::Components { .. } | Clause::Skip { .. } => Condition::Never,
        Clause::Dictionary { id } => restrict_to(*id, DictionaryId::Words),
    }
}

fn kanji_condition(clause: &Clause, params: &mut Vec<Value>) -> Condition {
    match clause {
        Clause::Text {
            field,
            pattern,
            mode,
        } => {
            let reading = |params: &mut Vec<Value>| reading_match(&KANJI_READINGS, pattern, *mode, params);
            let meaning = |params: &mut Vec<Value>| meaning_match(&KANJI_MEANINGS, pattern, *mode, params);
            match field {
                TextField::Writing => literal_match(pattern, params),
                TextField::Reading => reading(params),
                TextField::Meaning => meaning(params),
                TextField::Any => any_of(vec![
                    literal_match(pattern, params),
                    reading(params),
                    meaning(params),
                ]),
            }
        }
        Clause::Tag { .. } => Condition::Never,
        Clause::Range { field, min, max } => {
            let column = match field {
                NumericField::StrokeCount => "e.strokeCount",
                NumericField::Grade => "e.grade",
                NumericField::Frequency => "e.frequency",
                NumericField::Jlpt => "e.jlpt",
            };
            range(column, *min, *max, params)
        }
        Clause::Skip { code } => match code.parse::<SkipCode>() {
            Ok(skip) => {
                params.extend([
                    Value::Integer(skip.kind.into()),
                    Value::Integer(skip.first.into()),
                    Value::Integer(skip.second.into()),
                ]);
                Condition::Sql(
                    "EXISTS (SELECT 1 FROM kanjidic2.skip s WHERE s.entry = e.id AND s.type = ? AND s.c1 = ? AND s.c2 = ?)"
                        .to_string(),
                )
            }
            Err(_) => Condition::Never,
        },
        Clause::Components { elements } => {
            let sql = elements
                .iter()
                .map(|element| {
                    params.push(Value::Integer(i64::from(u32::from(*element))));
                    "e.id IN (SELECT g.kanji FROM kanjidic2.strokeGroups g WHERE g.element = ?)"
                })
                .collect::<Vec<_>>()
                .join(" AND ");
            Condition::Sql(sql)
        }
        Clause::Dictionary { id } => restrict_to(*id, DictionaryId::Kanji),
    }
}

fn restrict_to(wanted: DictionaryId, this: DictionaryId) -> Condition {
    if wanted == this {
        Condition::Always
    } else {
        Condition::Never
    }
}

fn range(column: &str, min: Option<i64>, max: Option<i64>, params: &mut Vec<Value>) -> Condition {
    let mut sql = format!("{column} IS NOT NULL");
    if let Some(min) = min {
        sql.push_str(&format!(" AND {column} >= ?"));
        params.push(Value::Integer(min));
    }
    if let Some(max) = max {
        sql.push_str(&format!(" AND {column} <= ?"));
        params.push(Value::Integer(max));
    }
    Condition::Sql(sql)
}

/// `OR` of the branches that can hold at all
fn any_of(branches: Vec<Condition>) -> Condition {
    let mut parts = Vec::new();
    for branch in branches {
        match branch {
            Condition::Always => return Condition::Always,
            Condition::Sql(sql) => parts.push(sql),
            Condition::Never => {}
        }
    }
    if parts.is_empty() {
        Condition::Never
    } else {
        Condition::Sql(format!("({})", parts.join(" OR ")))
    }
}

/// Quotes segmented text as one FTS5 phrase
fn fts_phrase(segmented: &str) -> String {
    format!("\"{}\"", segmented.replace('"', "\"\""))
}

fn fts_lookup(index: &TextIndex) -> String {
    format!(
        "e.id IN (SELECT t.{owner} FROM {table} t WHERE t.docid IN (SELECT rowid FROM {fts} WHERE {fts_table} MATCH ?)",
        owner = index.owner,
        table = index.table,
        fts = index.fts,
        fts_table = index.fts_table,
    )
}

/// Kana-segmented match on a reading or writing column. The phrase query
/// finds the substring; exact and prefix modes then compare the
/// normalized column.
fn reading_match(index: &TextIndex, pattern: &str, mode: MatchMode, params: &mut Vec<Value>) -> Condition {
    let key: String = normalize(pattern)
        .chars()
        .filter(|c| !matches!(c, '.' | '-'))
        .collect();
    let segmented = segment_kana(&key);
    if segmented.is_empty() {
        return Condition::Never;
    }

    let mut sql = fts_lookup(index);
    params.push(Value::Text(fts_phrase(&segmented)));
    match mode {
        MatchMode::Exact => {
            sql.push_str(" AND t.normalized = ?");
            params.push(Value::Text(key));
        }
        MatchMode::Prefix => {
            sql.push_str(" AND substr(t.normalized, 1, length(?)) = ?");
            params.push(Value::Text(key.clone()));
            params.push(Value::Text(key));
        }
        MatchMode::Contains | MatchMode::Word => {}
    }
    sql.push(')');
    Condition::Sql(sql)
}

/// Match on meanings. Word and prefix modes go through the word index;
/// exact and substring matches compare the normalized column, since
/// SQLite's `lower()` only folds ASCII.
fn meaning_match(index: &TextIndex, pattern: &str, mode: MatchMode, params: &mut Vec<Value>) -> Condition {
    let segmented = segment_text(pattern);
    if segmented.is_empty() {
        return Condition::Never;
    }
    if mode == MatchMode::Contains {
        params.push(Value::Text(segmented));
        return Condition::Sql(format!(
            "e.id IN (SELECT t.{owner} FROM {table} t WHERE instr(t.normalized, ?) > 0)",
            owner = index.owner,
            table = index.table,
        ));
    }

    let mut sql = fts_lookup(index);
    match mode {
        MatchMode::Prefix => {
            params.push(Value::Text(format!("{}*", fts_phrase(&segmented))));
            sql.push_str(" AND substr(t.normalized, 1, length(?)) = ?");
            params.push(Value::Text(segmented.clone()));
            params.push(Value::Text(segmented));
        }
        MatchMode::Exact => {
            params.push(Value::Text(fts_phrase(&segmented)));
            sql.push_str(" AND t.normalized = ?");
            params.push(Value::Text(segmented));
        }
        MatchMode::Word | MatchMode::Contains => {
            params.push(Value::Text(fts_phrase(&segmented)));
        }
    }
    sql.push(')');
    Condition::Sql(sql)
}

/// Kanji searched by writing are looked up by their own code points
fn literal_match(pattern: &str, params: &mut Vec<Value>) -> Condition {
    let mut literals: Vec<char> = pattern.chars().filter(|c| is_kanji(*c)).collect();
    literals.dedup();
    if literals.is_empty() {
        return Condition::Never;
    }
    let placeholders = vec!["?"; literals.len()].join(", ");
    params.extend(
        literals
            .into_iter()
            .map(|c| Value::Integer(i64::from(u32::from(c)))),
    );
    Condition::Sql(format!("e.id IN ({placeholders})"))
}
