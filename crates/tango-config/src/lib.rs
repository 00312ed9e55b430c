use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use self::cache::CacheConfig;
use self::database::DatabaseConfig;
use self::dictionary::DictionaryConfig;
use self::query::QueryConfig;

pub mod cache;
pub mod database;
pub mod dictionary;
pub mod query;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub query: QueryConfig,
    pub dictionary: DictionaryConfig,
}

impl Config {
    /// Defaults with environment overrides applied
    pub fn new() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Load a JSON config file; missing fields fall back to defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        tracing::info!("Loading config from {}", path.display());
        let file = File::open(path)?;
        let mut config: Config = serde_json::from_reader(BufReader::new(file))?;
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(path) = env::var("TANGO_USER_DB") {
            self.database.user_db = path.into();
        }

        if let Some(capacity) = env::var("TANGO_CACHE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.cache.capacity = capacity;
        }

        if let Some(per_page) = env::var("TANGO_RESULTS_PER_PAGE")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.query.results_per_page = per_page;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{ "cache": { "capacity": 10 } }"#).unwrap();
        assert_eq!(config.cache.capacity, 10);
        assert_eq!(config.query.results_per_page, 50);
        assert_eq!(config.dictionary.languages, vec!["en".to_string()]);
    }

    #[test]
    fn filtered_tags_default() {
        let config = DictionaryConfig::default();
        assert!(config.filtered_misc_tags.contains(&"arch".to_string()));
        assert!(config.filtered_misc_tags.contains(&"vulg".to_string()));
    }
}
