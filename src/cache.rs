//! In-memory collection cache with explicit staleness.
//!
//! Every screen reads whole collections; mutations mark the touched
//! collection stale instead of patching cached rows. The next read after
//! an invalidation refetches from the database. Invalidations are also
//! published on a broadcast channel so other parties (push channels,
//! tests) can observe them without the cache knowing who they are.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use sea_orm::DatabaseConnection;
use tokio::sync::{RwLock, broadcast};

use crate::domain::DomainError;
use crate::models::{ProductWithMarkets, category, market, supplier};
use crate::services::{category_service, market_service, product_service, supplier_service};

/// Cached collection names, as published on the invalidation channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Products,
    Suppliers,
    Markets,
    Categories,
}

struct Slot<T> {
    data: RwLock<Option<Vec<T>>>,
    stale: AtomicBool,
}

impl<T: Clone> Slot<T> {
    fn new() -> Self {
        Self {
            data: RwLock::new(None),
            stale: AtomicBool::new(true),
        }
    }

    fn mark_stale(&self) {
        self.stale.store(true, Ordering::SeqCst);
    }

    /// Serve the cached collection, or run `refresh` when the slot is
    /// stale or empty. A failed refresh leaves the slot stale, so the
    /// next read tries again.
    async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Result<Vec<T>, DomainError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, DomainError>>,
    {
        if !self.stale.load(Ordering::SeqCst) {
            if let Some(data) = self.data.read().await.as_ref() {
                return Ok(data.clone());
            }
        }

        let fresh = refresh().await?;
        *self.data.write().await = Some(fresh.clone());
        self.stale.store(false, Ordering::SeqCst);
        Ok(fresh)
    }
}

/// One slot per collection. Last write wins on concurrent refreshes;
/// there is no coordination beyond the stale flags.
pub struct CollectionCache {
    products: Slot<ProductWithMarkets>,
    suppliers: Slot<supplier::Model>,
    markets: Slot<market::Model>,
    categories: Slot<category::Model>,
    events: broadcast::Sender<Collection>,
}

impl CollectionCache {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            products: Slot::new(),
            suppliers: Slot::new(),
            markets: Slot::new(),
            categories: Slot::new(),
            events,
        }
    }

    /// Mark a collection stale and tell whoever is listening. Mutation
    /// paths call this on completion whether the write succeeded or not:
    /// a failed multi-step write may still have persisted rows.
    pub fn invalidate(&self, collection: Collection) {
        match collection {
            Collection::Products => self.products.mark_stale(),
            Collection::Suppliers => self.suppliers.mark_stale(),
            Collection::Markets => self.markets.mark_stale(),
            Collection::Categories => self.categories.mark_stale(),
        }
        // No receivers is fine
        let _ = self.events.send(collection);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Collection> {
        self.events.subscribe()
    }

    pub async fn products(
        &self,
        db: &DatabaseConnection,
    ) -> Result<Vec<ProductWithMarkets>, DomainError> {
        self.products
            .get_or_refresh(|| product_service::fetch_products(db))
            .await
    }

    pub async fn suppliers(
        &self,
        db: &DatabaseConnection,
    ) -> Result<Vec<supplier::Model>, DomainError> {
        self.suppliers
            .get_or_refresh(|| supplier_service::fetch_suppliers(db))
            .await
    }

    pub async fn markets(
        &self,
        db: &DatabaseConnection,
    ) -> Result<Vec<market::Model>, DomainError> {
        self.markets
            .get_or_refresh(|| market_service::fetch_markets(db))
            .await
    }

    pub async fn categories(
        &self,
        db: &DatabaseConnection,
    ) -> Result<Vec<category::Model>, DomainError> {
        self.categories
            .get_or_refresh(|| category_service::fetch_categories(db))
            .await
    }
}

impl Default for CollectionCache {
    fn default() -> Self {
        Self::new()
    }
}
