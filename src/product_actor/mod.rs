//! In-process product store: `Product` managed by a `ResourceActor`.

mod dtos;
pub mod entity;

pub use dtos::*;

use crate::actor_framework::ResourceActor;
use crate::clients::ProductClient;
use crate::domain::Product;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Creates a new Product actor and its client. Ids start at 1.
pub fn new(buffer_size: usize) -> (ResourceActor<Product>, ProductClient) {
    let product_id_counter = Arc::new(AtomicU32::new(1));
    let next_product_id = move || product_id_counter.fetch_add(1, Ordering::SeqCst);

    let (actor, generic_client) = ResourceActor::new(buffer_size, next_product_id);
    let client = ProductClient::new(generic_client);

    (actor, client)
}
