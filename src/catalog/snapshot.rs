use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, instrument, warn};

use super::{CatalogError, CatalogService};
use crate::domain::{Product, ProductId};

/// The most recently fetched list of products. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

impl CatalogSnapshot {
    pub fn new(products: Vec<Product>) -> Self {
        let index = products
            .iter()
            .enumerate()
            .map(|(pos, product)| (product.id, pos))
            .collect();
        Self { products, index }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.index.get(&id).map(|&pos| &self.products[pos])
    }

    pub fn stock_of(&self, id: ProductId) -> Option<u32> {
        self.get(id).map(|product| product.quantity)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Case-insensitive substring match on the description. An empty term matches
    /// everything.
    pub fn search(&self, term: &str) -> Vec<&Product> {
        let needle = term.trim().to_lowercase();
        self.products
            .iter()
            .filter(|product| needle.is_empty() || product.description.to_lowercase().contains(&needle))
            .collect()
    }
}

/// Holds the current catalog snapshot and replaces it wholesale on refresh.
///
/// Readers never wait on a fetch: the lock only guards the pointer swap.
#[derive(Debug, Default)]
pub struct CatalogCache {
    current: RwLock<Arc<CatalogSnapshot>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current)
    }

    /// Fetches the catalog and swaps it in; concurrent refreshes resolve last write wins.
    /// On failure the previous snapshot stays in place and the error is returned.
    #[instrument(skip(self, service))]
    pub async fn refresh(&self, service: &dyn CatalogService) -> Result<Arc<CatalogSnapshot>, CatalogError> {
        match service.fetch_catalog().await {
            Ok(products) => {
                debug!(count = products.len(), "Catalog refreshed");
                let snapshot = Arc::new(CatalogSnapshot::new(products));
                *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&snapshot);
                Ok(snapshot)
            }
            Err(e) => {
                warn!(error = %e, stale_count = self.snapshot().len(), "Catalog refresh failed, keeping stale snapshot");
                Err(e)
            }
        }
    }
}
