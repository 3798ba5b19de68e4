use std::sync::Arc;

use crate::config::Config;
use crate::db::store::SharedStore;
use crate::lifecycle::RequestLifecycle;
use crate::middleware::auth::{create_profile_cache, ProfileCache};
use crate::utils::messaging::Messenger;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub lifecycle: RequestLifecycle,
    pub config: Arc<Config>,
    pub profile_cache: ProfileCache,
    pub messenger: Messenger,
}

impl AppState {
    pub fn new(store: SharedStore, config: Config) -> Self {
        Self {
            lifecycle: RequestLifecycle::new(store.clone()),
            messenger: Messenger::new(&config),
            profile_cache: create_profile_cache(),
            config: Arc::new(config),
            store,
        }
    }
}
