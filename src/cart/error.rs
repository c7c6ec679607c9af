use thiserror::Error;

use crate::domain::ProductId;

/// Errors that can occur during cart operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    #[error("Not enough stock: requested {requested}, available {available}")]
    StockExceeded { requested: u32, available: u32 },
    #[error("Product not in cart: {0}")]
    NotFound(ProductId),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

/// Errors from the durable key-value store.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StorageError {
    #[error("Storage read error: {0}")]
    Read(String),
    #[error("Storage write error: {0}")]
    Write(String),
    #[error("Malformed stored data: {0}")]
    Malformed(String),
}
