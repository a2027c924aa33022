use std::sync::Arc;

use crate::config::AppConfig;
use crate::store::Storage;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Storage,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, store: Storage) -> Self {
        Self { config, store }
    }

    /// State backed by an in-memory user store, for handler tests.
    #[cfg(test)]
    pub fn fake(users: Arc<dyn crate::store::UserStore>, request_timeout: &str) -> Self {
        let timeout = request_timeout.to_string();
        let config = AppConfig::from_lookup(move |key| match key {
            "REQUEST_TIMEOUT" => Some(timeout.clone()),
            _ => None,
        })
        .expect("test config");

        Self {
            config: Arc::new(config),
            store: Storage { users },
        }
    }
}
