use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tango_core::{Entry, KanaReading, WordEntry};
use tango_types::{DictionaryId, EntryRef};

use crate::tests::fixtures::{self, CAT};
use crate::{EntriesCache, EntryLoader, LoadError};

/// Builds a bare word for any id except 0, counting every call
#[derive(Default)]
struct CountingLoader {
    calls: AtomicUsize,
}

impl EntryLoader for CountingLoader {
    fn load(&self, entry: EntryRef) -> Result<Entry, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if entry.id == 0 {
            return Err(LoadError::NotFound(entry));
        }
        Ok(Entry::Word(WordEntry {
            id: entry.id,
            frequency: None,
            writings: Vec::new(),
            readings: vec![KanaReading {
                text: "て".into(),
                frequency: None,
                no_kanji: false,
                writings: Vec::new(),
            }],
            senses: Vec::new(),
        }))
    }
}

#[test]
fn test_same_identity_is_shared() {
    let cache = EntriesCache::new(CountingLoader::default(), 10);
    let first = cache.get(DictionaryId::Words, 1).unwrap();
    let second = cache.get(DictionaryId::Words, 1).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.loader().calls.load(Ordering::SeqCst), 1);

    let stats = cache.stats();
    assert_eq!(stats.hit_count, 1);
    assert_eq!(stats.miss_count, 1);
    assert_eq!(stats.size, 1);
    assert_eq!(stats.hit_rate(), 0.5);
}

#[test]
fn test_not_found_is_not_cached() {
    let cache = EntriesCache::new(CountingLoader::default(), 10);
    for _ in 0..2 {
        assert!(matches!(
            cache.get(DictionaryId::Words, 0),
            Err(LoadError::NotFound(_))
        ));
    }
    assert_eq!(cache.loader().calls.load(Ordering::SeqCst), 2);
    assert!(cache.is_empty());
}

#[test]
fn test_eviction_only_drops_the_cache_reference() {
    let cache = EntriesCache::new(CountingLoader::default(), 1);
    let held = cache.get(DictionaryId::Words, 1).unwrap();
    cache.get(DictionaryId::Words, 2).unwrap();

    assert!(!cache.contains(EntryRef::word(1)));
    assert_eq!(Arc::strong_count(&held), 1);
    assert_eq!(held.id(), 1);

    let reloaded = cache.get(DictionaryId::Words, 1).unwrap();
    assert!(!Arc::ptr_eq(&held, &reloaded));
    assert_eq!(*held, *reloaded);
    assert_eq!(cache.loader().calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_zero_capacity_still_holds_one_entry() {
    let cache = EntriesCache::new(CountingLoader::default(), 0);
    cache.get(DictionaryId::Words, 1).unwrap();
    assert_eq!(cache.stats().capacity, 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_cache_over_inline_connection() {
    let fixture = fixtures::build();
    let conn = fixtures::connection(&fixture);
    let cache = EntriesCache::new(&conn, 16);

    let cat = cache.get(DictionaryId::Words, CAT).unwrap();
    assert_eq!(cat.as_word().map(|w| w.headword()), Some("猫"));
    let kanji = cache.resolve(EntryRef::kanji('猫' as u32)).unwrap();
    assert!(kanji.as_kanji().is_some());
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_cache_over_database_worker() {
    let fixture = fixtures::build();
    let db = fixtures::database(&fixture, true);
    let cache = EntriesCache::new(db.clone(), 16);

    let first = cache.get(DictionaryId::Words, CAT).unwrap();
    let second = cache.resolve(EntryRef::word(CAT)).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(matches!(
        cache.get(DictionaryId::Words, 7),
        Err(LoadError::NotFound(_))
    ));
}
