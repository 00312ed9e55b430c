//! Rebuilds domain entries from the rows of an attached dictionary.

mod kanji;
mod word;

use tango_core::Entry;
use tango_types::{DictionaryId, EntryRef};

use crate::connection::Connection;
use crate::error::LoadError;

/// Loads one entry. A dictionary that is not attached has no entries.
pub fn load(conn: &Connection, entry: EntryRef) -> Result<Entry, LoadError> {
    if !conn.is_attached(entry.dictionary.alias()) {
        return Err(LoadError::NotFound(entry));
    }
    let loaded = match entry.dictionary {
        DictionaryId::Words => word::load(conn.inner(), entry.id)?.map(Entry::from),
        DictionaryId::Kanji => kanji::load(conn.inner(), entry.id)?.map(Entry::from),
    };
    loaded.ok_or(LoadError::NotFound(entry))
}

/// Parses a stored comma-separated index list, checking every index
/// against the length of the list it points into.
fn parse_indices(list: Option<&str>, len: usize) -> Result<Vec<usize>, LoadError> {
    let Some(list) = list.filter(|l| !l.is_empty()) else {
        return Ok(Vec::new());
    };
    list.split(',')
        .map(|item| match item.trim().parse::<usize>() {
            Ok(index) if index < len => Ok(index),
            _ => Err(LoadError::Decode(format!(
                "bad index {item:?} in list {list:?} of {len} items"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_lists() {
        assert_eq!(parse_indices(None, 3).unwrap(), Vec::<usize>::new());
        assert_eq!(parse_indices(Some("0,2"), 3).unwrap(), vec![0, 2]);
        assert!(parse_indices(Some("3"), 3).is_err());
        assert!(parse_indices(Some("x"), 3).is_err());
    }
}
