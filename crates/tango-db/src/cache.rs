use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lru::LruCache;
use parking_lot::Mutex;
use tango_core::{Entry, SharedEntry};
use tango_types::{DictionaryId, EntryRef};
use tracing::debug;

use crate::connection::Connection;
use crate::error::LoadError;
use crate::model;
use crate::worker::Database;

/// Anything that can materialize an entry on a cache miss
pub trait EntryLoader {
    fn load(&self, entry: EntryRef) -> Result<Entry, LoadError>;
}

impl EntryLoader for Connection {
    fn load(&self, entry: EntryRef) -> Result<Entry, LoadError> {
        model::load(self, entry)
    }
}

impl EntryLoader for Database {
    fn load(&self, entry: EntryRef) -> Result<Entry, LoadError> {
        self.call(move |conn| model::load(conn, entry))?
    }
}

impl<L: EntryLoader + ?Sized> EntryLoader for Arc<L> {
    fn load(&self, entry: EntryRef) -> Result<Entry, LoadError> {
        (**self).load(entry)
    }
}

impl<L: EntryLoader + ?Sized> EntryLoader for &L {
    fn load(&self, entry: EntryRef) -> Result<Entry, LoadError> {
        (**self).load(entry)
    }
}

/// Bounded LRU of shared entries.
///
/// The cache holds one strong reference per resident entry; evicting it only
/// frees the entry once no caller holds another. Failed loads are not
/// remembered.
pub struct EntriesCache<L> {
    loader: L,
    entries: Mutex<LruCache<EntryRef, SharedEntry>>,
    capacity: usize,
    hit_count: AtomicUsize,
    miss_count: AtomicUsize,
}

impl<L: EntryLoader> EntriesCache<L> {
    pub fn new(loader: L, capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            loader,
            entries: Mutex::new(LruCache::new(cap)),
            capacity: cap.get(),
            hit_count: AtomicUsize::new(0),
            miss_count: AtomicUsize::new(0),
        }
    }

    pub fn get(&self, dictionary: DictionaryId, id: u32) -> Result<SharedEntry, LoadError> {
        self.resolve(EntryRef::new(dictionary, id))
    }

    pub fn resolve(&self, entry: EntryRef) -> Result<SharedEntry, LoadError> {
        if let Some(found) = self.entries.lock().get(&entry) {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
            return Ok(found.clone());
        }
        self.miss_count.fetch_add(1, Ordering::Relaxed);

        // Not holding the lock while loading; another caller may have
        // inserted the same entry meanwhile, in which case theirs wins.
        let loaded = Arc::new(self.loader.load(entry)?);
        let mut entries = self.entries.lock();
        if let Some(found) = entries.get(&entry) {
            return Ok(found.clone());
        }
        if let Some((evicted, _)) = entries.push(entry, loaded.clone()) {
            if evicted != entry {
                debug!(%evicted, "Evicted entry from cache");
            }
        }
        Ok(loaded)
    }

    pub fn contains(&self, entry: EntryRef) -> bool {
        self.entries.lock().contains(&entry)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drops every cached reference, e.g. after a dictionary is replaced
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            size: self.entries.lock().len(),
            capacity: self.capacity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hit_count: usize,
    pub miss_count: usize,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}
