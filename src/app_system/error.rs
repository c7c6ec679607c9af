use thiserror::Error;

use crate::cart::CartError;
use crate::catalog::CatalogError;
use crate::domain::ProductId;

/// Errors surfaced by storefront operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StorefrontError {
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("Product not in catalog: {0}")]
    UnknownProduct(ProductId),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Task failed: {0}")]
    Task(String),
}
