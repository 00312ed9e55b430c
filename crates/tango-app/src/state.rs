use std::sync::Arc;

use anyhow::Context;

use tango_config::Config;
use tango_config::database::DatabaseConfig;
use tango_core::TagCategory;
use tango_db::{
    Catalog, Database, EntriesCache, JMDICT_DB_VERSION, KANJIDIC2_DB_VERSION, StorageError,
};
use tango_types::DictionaryId;

pub struct AppState {
    pub config: Config,
    pub db: Arc<Database>,
    pub cache: EntriesCache<Arc<Database>>,
    /// Misc tag bits hidden from the relevant senses of a word
    pub misc_filter: u64,
}

impl AppState {
    /// Opens the user store and attaches whichever dictionaries have been
    /// built. A dictionary file that exists but cannot be attached is fatal.
    pub fn open(config: Config) -> anyhow::Result<Self> {
        let db = Arc::new(Database::open(config.database.user_db.clone())?);
        attach_dictionaries(&db, &config.database)?;

        let catalog = db.call(|conn| Catalog::load(conn))??;
        let misc_filter = catalog.tags.category(TagCategory::Misc).mask_of(
            config
                .dictionary
                .filtered_misc_tags
                .iter()
                .map(String::as_str),
        );

        let cache = EntriesCache::new(db.clone(), config.cache.capacity);
        Ok(Self {
            config,
            db,
            cache,
            misc_filter,
        })
    }

    /// Page size from the config unless overridden
    pub fn page_size(&self, limit: Option<u64>) -> u64 {
        limit.unwrap_or(self.config.query.results_per_page as u64)
    }
}

fn attach_dictionaries(db: &Database, config: &DatabaseConfig) -> anyhow::Result<()> {
    for (dictionary, version) in [
        (DictionaryId::Words, JMDICT_DB_VERSION),
        (DictionaryId::Kanji, KANJIDIC2_DB_VERSION),
    ] {
        let path = config.dictionary_path(&format!("{}.db", dictionary.alias()));
        if !path.is_file() {
            tracing::warn!(
                "{} not found, {dictionary} entries are unavailable",
                path.display()
            );
            continue;
        }
        match db.attach(path.clone(), dictionary.alias(), version) {
            Ok(()) => {}
            // Keep the attach error itself at the root so its kind survives
            Err(StorageError::Attach(e)) => {
                return Err(anyhow::Error::new(e))
                    .with_context(|| format!("Could not attach {dictionary} dictionary"));
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Could not attach {}", path.display()));
            }
        }
    }
    Ok(())
}
