use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rusqlite::{InterruptHandle, OpenFlags, Transaction};
use tracing::{debug, info, warn};

use crate::error::{AttachError, ErrorInfo, StorageError};
use crate::migrations;

/// Primary (writable) user store plus the read-only dictionaries attached
/// to it.
///
/// Used directly by single-threaded callers; [`crate::Database`] wraps one
/// on a worker thread.
pub struct Connection {
    conn: rusqlite::Connection,
    attached: BTreeMap<String, PathBuf>,
    last_error: Option<ErrorInfo>,
}

impl Connection {
    /// Opens (or creates) the user store at `path` and migrates it to the
    /// current schema version.
    pub fn open_user_store(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        info!("Opening user store {}", path.display());
        Self::from_raw(rusqlite::Connection::open(path)?)
    }

    /// In-memory user store, mostly for tests and throwaway sessions.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_raw(rusqlite::Connection::open_in_memory()?)
    }

    fn from_raw(mut conn: rusqlite::Connection) -> Result<Self, StorageError> {
        conn.pragma_update(None, "foreign_keys", true)?;
        let version = migrations::migrate(&mut conn)?;
        debug!(version, "User store ready");
        Ok(Self {
            conn,
            attached: BTreeMap::new(),
            last_error: None,
        })
    }

    pub(crate) fn inner(&self) -> &rusqlite::Connection {
        &self.conn
    }

    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.conn.get_interrupt_handle()
    }

    pub fn last_error(&self) -> Option<&ErrorInfo> {
        self.last_error.as_ref()
    }

    pub(crate) fn set_last_error(&mut self, info: ErrorInfo) {
        self.last_error = Some(info);
    }

    /// Keeps a copy of any SQLite failure in `result` for [`Self::last_error`].
    pub(crate) fn track<T>(&mut self, result: rusqlite::Result<T>) -> rusqlite::Result<T> {
        if let Err(e) = &result {
            self.last_error = Some(ErrorInfo::from_sqlite(e));
        }
        result
    }

    /// Attaches the dictionary file at `path` read-only under `alias` after
    /// checking its embedded schema version.
    pub fn attach(
        &mut self,
        path: impl AsRef<Path>,
        alias: &str,
        expected_version: u32,
    ) -> Result<(), AttachError> {
        let path = path.as_ref();
        let result = self.try_attach(path, alias, expected_version);
        if let Err(e) = &result {
            self.last_error = Some(ErrorInfo::new(e.to_string()));
            warn!("Could not attach {}: {e}", path.display());
        }
        result
    }

    fn try_attach(&mut self, path: &Path, alias: &str, expected: u32) -> Result<(), AttachError> {
        if !is_identifier(alias) {
            return Err(AttachError::InvalidAlias(alias.to_string()));
        }
        if self.attached.contains_key(alias) {
            return Err(AttachError::AlreadyAttached(alias.to_string()));
        }
        if !path.is_file() {
            return Err(AttachError::NotFound(path.to_path_buf()));
        }

        let found = read_version(path)?;
        if found != expected {
            return Err(AttachError::VersionMismatch { expected, found });
        }

        self.conn.execute(
            &format!("ATTACH DATABASE ?1 AS \"{alias}\""),
            [read_only_uri(path)],
        )?;
        self.attached.insert(alias.to_string(), path.to_path_buf());
        info!(alias, version = found, "Attached {}", path.display());
        Ok(())
    }

    /// Detaches `alias`. Returns `false` if it was not attached or SQLite
    /// refused (e.g. a statement on it is still running).
    pub fn detach(&mut self, alias: &str) -> bool {
        if !self.attached.contains_key(alias) {
            return false;
        }
        // Cached statements may still reference the schema being removed.
        self.conn.flush_prepared_statement_cache();
        let result = self
            .conn
            .execute(&format!("DETACH DATABASE \"{alias}\""), []);
        match self.track(result) {
            Ok(_) => {
                self.attached.remove(alias);
                info!(alias, "Detached dictionary");
                true
            }
            Err(e) => {
                warn!(alias, "Detach failed: {e}");
                false
            }
        }
    }

    pub fn is_attached(&self, alias: &str) -> bool {
        self.attached.contains_key(alias)
    }

    /// Attached aliases and the files behind them, ordered by alias.
    pub fn attached(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.attached
            .iter()
            .map(|(alias, path)| (alias.as_str(), path.as_path()))
    }

    /// Starts an explicit transaction on the user store. Attached
    /// dictionaries are read-only and never take part in writes.
    pub fn transaction(&mut self) -> Result<(), StorageError> {
        let result = self.conn.execute_batch("BEGIN IMMEDIATE");
        Ok(self.track(result)?)
    }

    pub fn commit(&mut self) -> Result<(), StorageError> {
        let result = self.conn.execute_batch("COMMIT");
        Ok(self.track(result)?)
    }

    pub fn rollback(&mut self) -> Result<(), StorageError> {
        let result = self.conn.execute_batch("ROLLBACK");
        Ok(self.track(result)?)
    }

    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    /// Runs `f` inside a transaction, committing on `Ok` and rolling back
    /// on `Err`.
    pub fn with_transaction<T, E>(
        &mut self,
        f: impl FnOnce(&Transaction<'_>) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<rusqlite::Error>,
    {
        let tx = match self.conn.transaction() {
            Ok(tx) => tx,
            Err(e) => {
                self.last_error = Some(ErrorInfo::from_sqlite(&e));
                return Err(e.into());
            }
        };
        let value = f(&tx)?;
        let committed = tx.commit();
        self.track(committed)?;
        Ok(value)
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn is_identifier(alias: &str) -> bool {
    let mut chars = alias.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn read_version(path: &Path) -> Result<u32, AttachError> {
    let corrupt = |e: rusqlite::Error| AttachError::Corrupt {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let conn = rusqlite::Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(corrupt)?;
    conn.query_row("SELECT version FROM info", [], |row| row.get(0))
        .map_err(corrupt)
}

fn read_only_uri(path: &Path) -> String {
    let mut uri = String::from("file:");
    for c in path.to_string_lossy().chars() {
        match c {
            '%' => uri.push_str("%25"),
            '?' => uri.push_str("%3f"),
            '#' => uri.push_str("%23"),
            c => uri.push(c),
        }
    }
    uri.push_str("?mode=ro");
    uri
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_must_be_identifiers() {
        assert!(is_identifier("jmdict"));
        assert!(is_identifier("_dict2"));
        assert!(!is_identifier("2dict"));
        assert!(!is_identifier("jm dict"));
        assert!(!is_identifier("x\"; DROP TABLE info; --"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn uri_escapes_reserved_characters() {
        assert_eq!(
            read_only_uri(Path::new("/tmp/a?b#c%d.db")),
            "file:/tmp/a%3fb%23c%25d.db?mode=ro"
        );
    }

    #[test]
    fn missing_file_is_not_found() {
        let mut conn = Connection::open_in_memory().unwrap();
        let err = conn
            .attach("/nonexistent/jmdict.db", "jmdict", 1)
            .unwrap_err();
        assert!(matches!(err, AttachError::NotFound(_)));
        assert!(conn.last_error().is_some());
    }

    #[test]
    fn explicit_transaction_rolls_back() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.transaction().unwrap();
        assert!(conn.in_transaction());
        conn.inner()
            .execute("INSERT INTO tags(name) VALUES ('study')", [])
            .unwrap();
        conn.rollback().unwrap();
        let count: i64 = conn
            .inner()
            .query_row("SELECT count(*) FROM tags", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
