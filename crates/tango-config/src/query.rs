use serde::{Deserialize, Serialize};

fn default_results_per_page() -> usize {
    50
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct QueryConfig {
    #[serde(default = "default_results_per_page")]
    pub results_per_page: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            results_per_page: default_results_per_page(),
        }
    }
}
