use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::cart::{AddOutcome, CartError, CartManager, KeyValueStore, LoadOutcome};
use crate::catalog::CatalogSnapshot;
use crate::clients::CartClient;
use crate::domain::{Product, ProductId};
use crate::messages::{CartRequest, ServiceResponse};

// =============================================================================
// CART SERVICE
// =============================================================================

/// Runs the cart manager on its own task. Requests are handled strictly in arrival
/// order, so no two mutations ever interleave.
pub struct CartService<S: KeyValueStore> {
    receiver: mpsc::Receiver<CartRequest>,
    cart: CartManager<S>,
}

impl<S: KeyValueStore> CartService<S> {
    /// Loads the cart from `store` and returns the service, its client and how the
    /// stored cart was found.
    pub fn new(buffer_size: usize, store: S, key: impl Into<String>) -> (Self, CartClient, LoadOutcome) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (cart, outcome) = CartManager::initialize(store, key);
        let service = Self { receiver, cart };
        (service, CartClient::new(sender), outcome)
    }

    #[instrument(name = "cart_service", skip(self))]
    pub async fn run(mut self) {
        info!(items = self.cart.state().len(), "CartService starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CartRequest::AddItem { product, catalog, respond_to } => {
                    self.handle_add_item(product, catalog, respond_to);
                }
                CartRequest::UpdateQuantity { id, quantity, respond_to } => {
                    self.handle_update_quantity(id, quantity, respond_to);
                }
                CartRequest::RemoveItem { id, respond_to } => {
                    self.cart.remove_item(id);
                    debug!(product_id = id, "Item removed");
                    let _ = respond_to.send(Ok(()));
                }
                CartRequest::Clear { respond_to } => {
                    self.cart.clear();
                    info!("Cart cleared");
                    let _ = respond_to.send(Ok(()));
                }
                CartRequest::GetCart { respond_to } => {
                    let _ = respond_to.send(Ok(self.cart.state().clone()));
                }
                CartRequest::GetTotal { respond_to } => {
                    let _ = respond_to.send(Ok(self.cart.total()));
                }
                CartRequest::GetItemCount { respond_to } => {
                    let _ = respond_to.send(Ok(self.cart.item_count()));
                }
                CartRequest::Shutdown => {
                    info!("CartService shutting down");
                    break;
                }
            }
        }
        info!("CartService stopped");
    }

    #[instrument(fields(product_id = product.id), skip(self, product, catalog, respond_to))]
    fn handle_add_item(
        &mut self,
        product: Product,
        catalog: Arc<CatalogSnapshot>,
        respond_to: ServiceResponse<AddOutcome, CartError>,
    ) {
        debug!("Processing add_item request");
        let result = self.cart.add_item(&product, &catalog);
        match &result {
            Ok(outcome) => info!(?outcome, "Item added to cart"),
            Err(e) => warn!(error = %e, "Add to cart rejected"),
        }
        let _ = respond_to.send(result);
    }

    #[instrument(fields(product_id = id), skip(self, respond_to))]
    fn handle_update_quantity(&mut self, id: ProductId, quantity: i64, respond_to: ServiceResponse<(), CartError>) {
        debug!("Processing update_quantity request");
        self.cart.update_quantity(id, quantity);
        let _ = respond_to.send(Ok(()));
    }
}
