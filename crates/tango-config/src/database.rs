use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_user_db() -> PathBuf {
    PathBuf::from("user.db")
}

fn default_dictionary_dir() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Writable user data store
    #[serde(default = "default_user_db")]
    pub user_db: PathBuf,
    /// Directory holding jmdict.db and kanjidic2.db
    #[serde(default = "default_dictionary_dir")]
    pub dictionary_dir: PathBuf,
}

impl DatabaseConfig {
    pub fn dictionary_path(&self, file_name: &str) -> PathBuf {
        self.dictionary_dir.join(file_name)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            user_db: default_user_db(),
            dictionary_dir: default_dictionary_dir(),
        }
    }
}
