//! Application state shared across all handlers

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::cache::CollectionCache;

#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    /// Collection cache; mutation handlers invalidate it on completion.
    pub cache: Arc<CollectionCache>,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            cache: Arc::new(CollectionCache::new()),
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}
