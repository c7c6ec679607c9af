//! Cart state management: stock-aware mutations and persistence to a durable store.

pub mod error;
pub mod manager;
pub mod store;

pub use error::*;
pub use manager::*;
pub use store::*;
