use anyhow::{bail, Context, Result};
use catalog::{DatasetStore, DEFAULT_DATASET_NAME, DEFAULT_DATA_DIR, DEFAULT_TOP_LIMIT};

/// Upper bound for any `limit` the API accepts.
pub const MAX_TOP_LIMIT: usize = 100;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    pub data_dir: String,
    pub dataset_name: String,
    pub static_dir: String,
    pub top_products_limit: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind_addr = get("DASHBOARD_BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string());
        let data_dir = get("DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        let dataset_name = get("DATASET_NAME").unwrap_or_else(|| DEFAULT_DATASET_NAME.to_string());
        let static_dir = get("STATIC_DIR").unwrap_or_else(|| "static".to_string());

        let top_products_limit = match get("TOP_PRODUCTS_LIMIT") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .with_context(|| format!("TOP_PRODUCTS_LIMIT must be a positive integer, got {v:?}"))?,
            None => DEFAULT_TOP_LIMIT,
        };

        // fail fast, fail loud
        if top_products_limit == 0 || top_products_limit > MAX_TOP_LIMIT {
            bail!("TOP_PRODUCTS_LIMIT must be between 1 and {MAX_TOP_LIMIT}");
        }
        if dataset_name.is_empty() || dataset_name.contains(['/', '\\']) {
            bail!("DATASET_NAME must be a bare file name without extension");
        }

        Ok(Self {
            bind_addr,
            data_dir,
            dataset_name,
            static_dir,
            top_products_limit,
        })
    }

    pub fn dataset_store(&self) -> DatasetStore {
        DatasetStore::from_dir(&self.data_dir, &self.dataset_name)
    }
}
