//! User store schema and its forward migrations.
//!
//! A fresh store is created at version 1 and walked forward like any
//! existing one. Each step runs in its own transaction, so a failing step
//! leaves the store at the last version that committed.

use rusqlite::{Transaction, params};
use tracing::info;

use crate::error::MigrationError;

pub struct Migration {
    /// Version the store is at once this step commits
    pub version: u32,
    pub apply: fn(&Transaction<'_>) -> rusqlite::Result<()>,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 2,
        apply: add_sets,
    },
    Migration {
        version: 3,
        apply: index_sets_and_track_mistakes,
    },
];

const INITIAL_SCHEMA: &str = r#"
CREATE TABLE info(version INTEGER NOT NULL);
CREATE TABLE training(
    type INTEGER NOT NULL,
    id INTEGER NOT NULL,
    score INTEGER NOT NULL DEFAULT 0,
    dateAdded INTEGER,
    dateLastTrain INTEGER,
    nbTrained INTEGER NOT NULL DEFAULT 0,
    nbSuccess INTEGER NOT NULL DEFAULT 0,
    dateLastSuccess INTEGER,
    PRIMARY KEY(type, id)
);
CREATE TABLE notes(
    noteId INTEGER PRIMARY KEY,
    type INTEGER NOT NULL,
    id INTEGER NOT NULL,
    dateAdded INTEGER,
    dateLastChange INTEGER,
    note TEXT NOT NULL
);
CREATE INDEX idx_notes_entry ON notes(type, id);
CREATE TABLE tags(tagId INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE);
CREATE TABLE taggedEntries(
    type INTEGER NOT NULL,
    id INTEGER NOT NULL,
    tagId INTEGER NOT NULL REFERENCES tags,
    date INTEGER,
    PRIMARY KEY(tagId, type, id)
);
"#;

fn add_sets(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    tx.execute_batch(
        r#"
        CREATE TABLE sets(
            id INTEGER PRIMARY KEY,
            parent INTEGER REFERENCES sets,
            position INTEGER NOT NULL,
            label TEXT NOT NULL,
            state BLOB
        );
        "#,
    )
}

fn index_sets_and_track_mistakes(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    tx.execute_batch(
        r#"
        CREATE INDEX idx_sets_parent ON sets(parent, position);
        ALTER TABLE training ADD COLUMN dateLastMistake INTEGER;
        "#,
    )
}

/// Version recorded in the store, `None` for an empty database.
pub fn current_version(conn: &rusqlite::Connection) -> rusqlite::Result<Option<u32>> {
    let has_info: bool = conn.query_row(
        "SELECT count(*) > 0 FROM main.sqlite_master WHERE type = 'table' AND name = 'info'",
        [],
        |row| row.get(0),
    )?;
    if !has_info {
        return Ok(None);
    }
    conn.query_row("SELECT version FROM main.info", [], |row| row.get(0))
        .map(Some)
}

pub fn migrate(conn: &mut rusqlite::Connection) -> Result<u32, MigrationError> {
    migrate_with(conn, MIGRATIONS)
}

/// Brings the store up to the last version of `steps`.
pub fn migrate_with(
    conn: &mut rusqlite::Connection,
    steps: &[Migration],
) -> Result<u32, MigrationError> {
    let mut version = match current_version(conn)? {
        Some(version) => version,
        None => {
            let tx = conn.transaction()?;
            tx.execute_batch(INITIAL_SCHEMA)
                .and_then(|_| tx.execute("INSERT INTO info(version) VALUES (1)", []))
                .map_err(|source| MigrationError::StepFailed { version: 1, source })?;
            tx.commit()?;
            info!("Created user store at version 1");
            1
        }
    };

    let latest = steps.last().map_or(1, |s| s.version);
    if version > latest {
        return Err(MigrationError::TooNew {
            found: version,
            supported: latest,
        });
    }

    let start = version;
    for step in steps.iter().filter(|s| s.version > start) {
        let tx = conn.transaction()?;
        (step.apply)(&tx)
            .and_then(|_| tx.execute("UPDATE info SET version = ?1", params![step.version]))
            .map_err(|source| MigrationError::StepFailed {
                version: step.version,
                source,
            })?;
        tx.commit().map_err(|source| MigrationError::StepFailed {
            version: step.version,
            source,
        })?;
        info!(from = version, to = step.version, "Migrated user store");
        version = step.version;
    }

    Ok(version)
}
