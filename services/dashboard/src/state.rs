use std::sync::Arc;

use catalog::ProductAnalytics;

use crate::config::AppConfig;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub analytics: ProductAnalytics,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            analytics: ProductAnalytics::new(config.dataset_store()),
            config,
        }
    }
}

#[cfg(test)]
pub fn test_state(data_dir: &std::path::Path, static_dir: &std::path::Path) -> SharedState {
    Arc::new(AppState::new(AppConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        data_dir: data_dir.display().to_string(),
        dataset_name: "products".to_string(),
        static_dir: static_dir.display().to_string(),
        top_products_limit: 3,
    }))
}
