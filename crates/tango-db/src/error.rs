use std::path::PathBuf;

use tango_core::TagError;
use tango_dictionary::ParseError;
use tango_types::EntryRef;
use thiserror::Error;

/// Snapshot of the last failure seen by a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Extended SQLite result code, when the failure came from SQLite
    pub code: Option<i32>,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub(crate) fn from_sqlite(error: &rusqlite::Error) -> Self {
        Self {
            code: error.sqlite_error().map(|e| e.extended_code),
            message: error.to_string(),
        }
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {code})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

pub(crate) fn is_interrupt(error: &rusqlite::Error) -> bool {
    error.sqlite_error_code() == Some(rusqlite::ErrorCode::OperationInterrupted)
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),

    #[error("Attach error: {0}")]
    Attach(#[from] AttachError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database is closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum AttachError {
    #[error("Dictionary file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Dictionary file {} is corrupt: {message}", .path.display())]
    Corrupt { path: PathBuf, message: String },

    #[error("Dictionary schema version {found} does not match expected version {expected}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Invalid database alias {0:?}")]
    InvalidAlias(String),

    #[error("Alias {0} is already attached")]
    AlreadyAttached(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Migration to version {version} failed: {source}")]
    StepFailed {
        version: u32,
        #[source]
        source: rusqlite::Error,
    },

    #[error("User store version {found} is newer than supported version {supported}")]
    TooNew { found: u32, supported: u32 },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Parse failed: {0}")]
    ParseFailed(#[from] ParseError),

    #[error("Schema write failed: {0}")]
    SchemaWriteFailed(#[from] rusqlite::Error),

    #[error("IO failure: {0}")]
    IOFailure(#[from] std::io::Error),

    #[error("Tag error: {0}")]
    Tag(#[from] TagError),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Entry {0} not found")]
    NotFound(EntryRef),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Corrupt entry data: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum QueryBuildError {
    #[error("Invalid search: {0}")]
    InvalidSpec(String),

    #[error("No query has been prepared")]
    NotPrepared,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum SetsError {
    #[error("Set {0} not found")]
    NotFound(i64),

    #[error("Node {0} is a folder, not a saved search")]
    NotASet(i64),

    #[error("Node {0} is a saved search, not a folder")]
    NotAFolder(i64),

    #[error("Invalid saved search: {0}")]
    Spec(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
