use std::sync::Arc;

use crate::config::Config;
use crate::hashing::cache::TagHashCache;
use crate::matching::service::MatchingService;
use crate::matching::store::MatchStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Persistence collaborator. Postgres when `DATABASE_URL` is set, in-memory otherwise.
    pub store: Arc<dyn MatchStore>,
    pub matching: Arc<MatchingService>,
    /// Tag name ↔ hash index, built on first lookup.
    pub tag_cache: Arc<TagHashCache>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn MatchStore>) -> Self {
        let matching = MatchingService::new(Arc::clone(&store))
            .with_matcher_config(config.matcher_config())
            .with_sort_algorithm(config.sort_algorithm);
        Self {
            config,
            store,
            matching: Arc::new(matching),
            tag_cache: Arc::new(TagHashCache::new()),
        }
    }
}
