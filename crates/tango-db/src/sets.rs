//! Folders and saved searches kept in the user store.
//!
//! A node with a `state` is a saved search holding its [`QuerySpec`] as
//! JSON; a node without one is a folder. Siblings are ordered by
//! `position`.

use rusqlite::{OptionalExtension, Transaction, params};
use tango_core::QuerySpec;
use tracing::info;

use crate::connection::Connection;
use crate::error::SetsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetNodeKind {
    Folder,
    Set,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetNode {
    pub id: i64,
    pub parent: Option<i64>,
    pub position: i64,
    pub label: String,
    pub kind: SetNodeKind,
}

pub struct Sets<'a> {
    conn: &'a mut Connection,
}

impl<'a> Sets<'a> {
    pub fn new(conn: &'a mut Connection) -> Self {
        Self { conn }
    }

    pub fn create_folder(&mut self, parent: Option<i64>, label: &str) -> Result<i64, SetsError> {
        self.insert(parent, label, None)
    }

    pub fn create_set(
        &mut self,
        parent: Option<i64>,
        label: &str,
        spec: &QuerySpec,
    ) -> Result<i64, SetsError> {
        let state = serde_json::to_vec(spec)?;
        self.insert(parent, label, Some(state))
    }

    fn insert(
        &mut self,
        parent: Option<i64>,
        label: &str,
        state: Option<Vec<u8>>,
    ) -> Result<i64, SetsError> {
        let id = self.conn.with_transaction(|tx| {
            if let Some(parent) = parent {
                if kind_of(tx, parent)? != SetNodeKind::Folder {
                    return Err(SetsError::NotAFolder(parent));
                }
            }
            let position: i64 = tx.query_row(
                "SELECT coalesce(max(position), -1) + 1 FROM sets WHERE parent IS ?1",
                [parent],
                |row| row.get(0),
            )?;
            tx.execute(
                "INSERT INTO sets(parent, position, label, state) VALUES (?1, ?2, ?3, ?4)",
                params![parent, position, label, state],
            )?;
            Ok(tx.last_insert_rowid())
        })?;
        info!(id, label, "Created set node");
        Ok(id)
    }

    /// Direct children of `parent` (top level for `None`), in order
    pub fn children(&self, parent: Option<i64>) -> Result<Vec<SetNode>, SetsError> {
        let mut stmt = self.conn.inner().prepare_cached(
            "SELECT id, parent, position, label, state IS NULL FROM sets WHERE parent IS ?1 ORDER BY position, id",
        )?;
        let nodes = stmt
            .query_map([parent], |row| {
                let folder: bool = row.get(4)?;
                Ok(SetNode {
                    id: row.get(0)?,
                    parent: row.get(1)?,
                    position: row.get(2)?,
                    label: row.get(3)?,
                    kind: if folder {
                        SetNodeKind::Folder
                    } else {
                        SetNodeKind::Set
                    },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(nodes)
    }

    /// The search saved in set `id`
    pub fn load(&self, id: i64) -> Result<QuerySpec, SetsError> {
        let state: Option<Vec<u8>> = self
            .conn
            .inner()
            .query_row("SELECT state FROM sets WHERE id = ?1", [id], |row| row.get(0))
            .optional()?
            .ok_or(SetsError::NotFound(id))?;
        let state = state.ok_or(SetsError::NotASet(id))?;
        Ok(serde_json::from_slice(&state)?)
    }

    pub fn rename(&mut self, id: i64, label: &str) -> Result<(), SetsError> {
        self.conn.with_transaction(|tx| {
            let changed = tx.execute("UPDATE sets SET label = ?1 WHERE id = ?2", params![label, id])?;
            if changed == 0 {
                return Err(SetsError::NotFound(id));
            }
            Ok(())
        })
    }

    /// Removes `id` and, for a folder, everything below it. Returns the
    /// number of nodes removed.
    pub fn remove(&mut self, id: i64) -> Result<usize, SetsError> {
        let removed = self.conn.with_transaction(|tx| {
            kind_of(tx, id)?;
            Ok::<_, SetsError>(tx.execute(
                "WITH RECURSIVE tree(id) AS (
                     SELECT ?1
                     UNION ALL
                     SELECT s.id FROM sets s JOIN tree t ON s.parent = t.id
                 )
                 DELETE FROM sets WHERE id IN (SELECT id FROM tree)",
                [id],
            )?)
        })?;
        info!(id, removed, "Removed set node");
        Ok(removed)
    }
}

fn kind_of(tx: &Transaction<'_>, id: i64) -> Result<SetNodeKind, SetsError> {
    let folder: Option<bool> = tx
        .query_row("SELECT state IS NULL FROM sets WHERE id = ?1", [id], |row| row.get(0))
        .optional()?;
    match folder {
        Some(true) => Ok(SetNodeKind::Folder),
        Some(false) => Ok(SetNodeKind::Set),
        None => Err(SetsError::NotFound(id)),
    }
}
