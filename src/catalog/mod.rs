//! Access to the external product catalog and the cached snapshot of it.

pub mod form;
pub mod http;
pub mod memory;
pub mod snapshot;

pub use http::HttpCatalog;
pub use memory::InMemoryCatalog;
pub use snapshot::{CatalogCache, CatalogSnapshot};

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ImageUpload, Product, ProductCreate, ProductId, ProductUpdate};

/// Errors that can occur while talking to the catalog.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Catalog unreachable: {0}")]
    Unreachable(String),
    #[error("Catalog returned status {code}: {message}")]
    Status { code: u16, message: String },
    #[error("Product not found: {0}")]
    NotFound(ProductId),
    #[error("Could not decode catalog response: {0}")]
    Decode(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

/// The product REST API.
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn fetch_catalog(&self) -> Result<Vec<Product>, CatalogError>;

    async fn fetch_product(&self, id: ProductId) -> Result<Product, CatalogError>;

    async fn create_product(&self, product: ProductCreate, image: Option<ImageUpload>) -> Result<Product, CatalogError>;

    /// Replaces the full record of an existing product.
    async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product, CatalogError>;

    async fn delete_product(&self, id: ProductId) -> Result<(), CatalogError>;
}
