//! Offline ingestion of dictionary sources into their own database files.
//!
//! A build writes into a temporary file next to the output and renames it
//! into place only after the single ingestion transaction has committed.
//! Any failure drops the temporary file, so callers never observe a
//! partially built dictionary.

mod jmdict;
mod kanjidic2;

use std::path::Path;
use std::time::Duration;

use tempfile::NamedTempFile;

use crate::error::BuildError;

pub use jmdict::{build_jmdict, priority_rank};
pub use kanjidic2::build_kanjidic2;

#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Gloss and meaning languages to keep
    pub languages: Vec<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub entries: usize,
    pub elapsed: Duration,
}

// Field order matters: the connection closes before the file is removed.
struct Staging {
    conn: rusqlite::Connection,
    file: NamedTempFile,
}

impl Staging {
    fn new(output: &Path) -> Result<Self, BuildError> {
        let dir = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file = NamedTempFile::new_in(dir)?;
        let conn = rusqlite::Connection::open(file.path())?;
        conn.pragma_update(None, "synchronous", "OFF")?;
        Ok(Self { conn, file })
    }

    fn persist(self, output: &Path) -> Result<(), BuildError> {
        self.conn.close().map_err(|(_, e)| e)?;
        self.file
            .persist(output)
            .map_err(|e| BuildError::IOFailure(e.error))?;
        Ok(())
    }
}

/// Comma-separated index list, `None` when empty (meaning unrestricted).
fn index_list(indices: &[usize]) -> Option<String> {
    if indices.is_empty() {
        return None;
    }
    Some(
        indices
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(","),
    )
}
