use serde::{Deserialize, Serialize};

fn default_languages() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_filtered_misc_tags() -> Vec<String> {
    vec!["arch".to_string(), "vulg".to_string()]
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DictionaryConfig {
    /// Gloss languages kept when building dictionaries
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    /// Misc tags hidden from relevant senses unless asked for
    #[serde(default = "default_filtered_misc_tags")]
    pub filtered_misc_tags: Vec<String>,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            languages: default_languages(),
            filtered_misc_tags: default_filtered_misc_tags(),
        }
    }
}
