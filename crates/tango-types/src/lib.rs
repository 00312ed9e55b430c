pub mod types;

pub use types::{DictionaryId, EntryRef, FetchError, QueryEvent};
