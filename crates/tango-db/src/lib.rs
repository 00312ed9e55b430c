pub mod builder;
pub mod cache;
pub mod connection;
pub mod error;
pub mod migrations;
pub mod model;
pub mod query;
pub mod schema;
pub mod sets;
pub mod worker;

#[cfg(test)]
mod tests;

pub use builder::{BuildOptions, BuildStats, build_jmdict, build_kanjidic2};
pub use cache::{CacheStats, EntriesCache, EntryLoader};
pub use connection::Connection;
pub use error::{
    AttachError, BuildError, ErrorInfo, LoadError, MigrationError, QueryBuildError, SetsError,
    StorageError,
};
pub use query::{Catalog, EngineState, QueryEngine};
pub use schema::{JMDICT_DB_VERSION, KANJIDIC2_DB_VERSION, USER_DB_VERSION};
pub use sets::{SetNode, SetNodeKind, Sets};
pub use worker::{Database, DbState, JobContext};
