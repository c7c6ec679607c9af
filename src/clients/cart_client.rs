use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

use crate::cart::{AddOutcome, CartError};
use crate::catalog::CatalogSnapshot;
use crate::domain::{CartState, Product, ProductId};
use crate::messages::CartRequest;

/// Handle to the cart service. Cheap to clone; every clone talks to the same cart.
#[derive(Clone)]
pub struct CartClient {
    sender: mpsc::Sender<CartRequest>,
}

impl CartClient {
    pub fn new(sender: mpsc::Sender<CartRequest>) -> Self {
        Self { sender }
    }

    // Written out by hand so the catalog snapshot stays out of the span fields.
    #[instrument(skip(self, product, catalog), fields(product_id = product.id))]
    pub async fn add_item(&self, product: Product, catalog: Arc<CatalogSnapshot>) -> Result<AddOutcome, CartError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(CartRequest::AddItem { product, catalog, respond_to })
            .await
            .map_err(|_| CartError::ActorCommunicationError("Actor closed".to_string()))?;
        response
            .await
            .map_err(|_| CartError::ActorCommunicationError("Actor dropped".to_string()))?
    }

    /// Asks the service to stop after the requests already queued.
    pub async fn shutdown(&self) -> Result<(), CartError> {
        self.sender
            .send(CartRequest::Shutdown)
            .await
            .map_err(|_| CartError::ActorCommunicationError("Actor closed".to_string()))
    }
}

crate::client_method!(CartClient => fn update_quantity(id: ProductId, quantity: i64) -> () as CartRequest::UpdateQuantity, Error = CartError);
crate::client_method!(CartClient => fn remove_item(id: ProductId) -> () as CartRequest::RemoveItem, Error = CartError);
crate::client_method!(CartClient => fn clear() -> () as CartRequest::Clear, Error = CartError);
crate::client_method!(CartClient => fn snapshot() -> CartState as CartRequest::GetCart, Error = CartError);
crate::client_method!(CartClient => fn total() -> Decimal as CartRequest::GetTotal, Error = CartError);
crate::client_method!(CartClient => fn item_count() -> u64 as CartRequest::GetItemCount, Error = CartError);
