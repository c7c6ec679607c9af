use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use super::{AddProductForm, Notifications, Notifier, StorefrontConfig, StorefrontError};
use crate::actors::CartService;
use crate::cart::{AddOutcome, CartError, KeyValueStore, LoadOutcome};
use crate::catalog::{CatalogCache, CatalogService, CatalogSnapshot};
use crate::clients::CartClient;
use crate::domain::{CartLineItem, CartState, Product, ProductId};

/// What a completed checkout bought.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub lines: Vec<CartLineItem>,
    pub total: Decimal,
}

/// The storefront application: catalog access, the cart service and the notice channel,
/// wired together.
///
/// Every view operation goes through here. Cart mutations are forwarded to the cart
/// service; stock checks use the cached catalog snapshot, which only changes when
/// `refresh_catalog` succeeds.
pub struct Storefront {
    pub cart_client: CartClient,
    catalog: Arc<dyn CatalogService>,
    cache: CatalogCache,
    notifier: Notifier,
    load_outcome: LoadOutcome,
    handles: Vec<JoinHandle<()>>,
}

impl Storefront {
    /// Loads the cart from `store` and starts the cart service.
    pub fn start<S: KeyValueStore>(
        config: &StorefrontConfig,
        catalog: Arc<dyn CatalogService>,
        store: S,
    ) -> (Self, Notifications) {
        let (service, cart_client, load_outcome) = CartService::new(config.buffer_size, store, config.cart_key.clone());
        let handle = tokio::spawn(service.run());
        let (notifier, notifications) = Notifier::channel();

        info!(cart = ?load_outcome, "Storefront started");
        let storefront = Self {
            cart_client,
            catalog,
            cache: CatalogCache::new(),
            notifier,
            load_outcome,
            handles: vec![handle],
        };
        (storefront, notifications)
    }

    /// How the stored cart was found at startup.
    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    // -------------------------------------------------------------------------
    // Catalog list
    // -------------------------------------------------------------------------

    /// Fetches the catalog and replaces the cached snapshot. Safe to call repeatedly.
    /// Cart operations keep using the previous snapshot while a fetch is in flight.
    /// On failure the stale snapshot is kept and an error notice is sent.
    #[instrument(skip(self))]
    pub async fn refresh_catalog(&self) -> Result<Arc<CatalogSnapshot>, StorefrontError> {
        match self.cache.refresh(self.catalog.as_ref()).await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                self.notifier.error("Could not load products.");
                Err(e.into())
            }
        }
    }

    pub fn catalog(&self) -> Arc<CatalogSnapshot> {
        self.cache.snapshot()
    }

    pub fn search(&self, term: &str) -> Vec<Product> {
        self.catalog().search(term).into_iter().cloned().collect()
    }

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn add_to_cart(&self, id: ProductId) -> Result<AddOutcome, StorefrontError> {
        let snapshot = self.catalog();
        let product = snapshot.get(id).cloned().ok_or(StorefrontError::UnknownProduct(id))?;
        let description = product.description.clone();

        match self.cart_client.add_item(product, snapshot).await {
            Ok(AddOutcome::Added) => {
                self.notifier.success(format!("Added {} to cart!", description));
                Ok(AddOutcome::Added)
            }
            Ok(outcome @ AddOutcome::Incremented(_)) => {
                self.notifier.success(format!("Increased quantity of {} in cart!", description));
                Ok(outcome)
            }
            Err(e) => {
                self.notify_cart_error(&e);
                Err(e.into())
            }
        }
    }

    /// The cart view's "+" button. Checks stock here because the cart service does not
    /// re-check explicit quantity updates.
    #[instrument(skip(self))]
    pub async fn increment_in_cart(&self, id: ProductId) -> Result<u32, StorefrontError> {
        let line = self.line(id).await?;
        let available = self.catalog().stock_of(id).unwrap_or(line.product.quantity);
        if line.quantity_in_cart >= available {
            let e = CartError::StockExceeded {
                requested: line.quantity_in_cart.saturating_add(1),
                available,
            };
            self.notify_cart_error(&e);
            return Err(e.into());
        }
        let quantity = line.quantity_in_cart + 1;
        self.cart_client.update_quantity(id, i64::from(quantity)).await?;
        Ok(quantity)
    }

    /// The cart view's "-" button. Reaching zero removes the line.
    #[instrument(skip(self))]
    pub async fn decrement_in_cart(&self, id: ProductId) -> Result<u32, StorefrontError> {
        let line = self.line(id).await?;
        let quantity = line.quantity_in_cart - 1;
        self.cart_client.update_quantity(id, i64::from(quantity)).await?;
        Ok(quantity)
    }

    pub async fn remove_from_cart(&self, id: ProductId) -> Result<(), StorefrontError> {
        Ok(self.cart_client.remove_item(id).await?)
    }

    pub async fn cart(&self) -> Result<CartState, StorefrontError> {
        Ok(self.cart_client.snapshot().await?)
    }

    pub async fn cart_total(&self) -> Result<Decimal, StorefrontError> {
        Ok(self.cart_client.total().await?)
    }

    /// Number shown on the cart button.
    pub async fn cart_badge(&self) -> Result<u64, StorefrontError> {
        Ok(self.cart_client.item_count().await?)
    }

    async fn line(&self, id: ProductId) -> Result<CartLineItem, StorefrontError> {
        self.cart_client
            .snapshot()
            .await?
            .get(id)
            .cloned()
            .ok_or(StorefrontError::Cart(CartError::NotFound(id)))
    }

    fn notify_cart_error(&self, e: &CartError) {
        match e {
            CartError::StockExceeded { available, .. } => {
                self.notifier.warning(format!("Not enough stock. Only {} available.", available));
            }
            other => self.notifier.error(other.to_string()),
        }
    }

    // -------------------------------------------------------------------------
    // Product detail / purchase
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn product_detail(&self, id: ProductId) -> Result<Product, StorefrontError> {
        self.catalog.fetch_product(id).await.map_err(|e| {
            self.notifier.error("Could not find the product.");
            e.into()
        })
    }

    /// Buys `quantity` units straight from the detail view by resubmitting the product
    /// with its stock reduced, then refreshes the catalog.
    #[instrument(skip(self))]
    pub async fn purchase(&self, id: ProductId, quantity: u32) -> Result<Product, StorefrontError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(0).into());
        }
        let product = self.product_detail(id).await?;
        if quantity > product.quantity {
            let e = CartError::StockExceeded {
                requested: quantity,
                available: product.quantity,
            };
            self.notify_cart_error(&e);
            return Err(e.into());
        }

        let update = product.restocked(product.quantity - quantity);
        let updated = match self.catalog.update_product(id, update).await {
            Ok(updated) => updated,
            Err(e) => {
                error!(error = %e, "Purchase failed");
                self.notifier.error("Purchase failed. Please try again.");
                return Err(e.into());
            }
        };

        info!(remaining = updated.quantity, "Purchase confirmed");
        self.notifier.success(format!("Purchase of {} confirmed!", product.description));
        // The purchase already went through; a failed refresh only means a stale list.
        let _ = self.refresh_catalog().await;
        Ok(updated)
    }

    // -------------------------------------------------------------------------
    // Checkout
    // -------------------------------------------------------------------------

    /// Buys everything in the cart.
    ///
    /// All lines are checked against a fresh catalog before anything is submitted. Lines
    /// leave the cart as their purchase succeeds; if one fails the rest stay in the cart.
    #[instrument(skip(self))]
    pub async fn checkout(&self) -> Result<Receipt, StorefrontError> {
        let cart = self.cart_client.snapshot().await?;
        if cart.is_empty() {
            self.notifier.info("Your cart is empty.");
            return Err(StorefrontError::EmptyCart);
        }
        let snapshot = self.refresh_catalog().await?;

        let mut orders = Vec::with_capacity(cart.len());
        for line in cart.items() {
            let Some(current) = snapshot.get(line.id()) else {
                self.notifier.warning(format!(
                    "{} is no longer available.",
                    line.product.description
                ));
                return Err(StorefrontError::UnknownProduct(line.id()));
            };
            if line.quantity_in_cart > current.quantity {
                self.notifier.warning(format!(
                    "Not enough stock for {}. Only {} available.",
                    current.description, current.quantity
                ));
                return Err(CartError::StockExceeded {
                    requested: line.quantity_in_cart,
                    available: current.quantity,
                }
                .into());
            }
            orders.push((line, current.restocked(current.quantity - line.quantity_in_cart)));
        }

        for (line, update) in orders {
            if let Err(e) = self.catalog.update_product(line.id(), update).await {
                error!(product_id = line.id(), error = %e, "Checkout stopped");
                self.notifier.error("Purchase failed. Please try again.");
                let _ = self.refresh_catalog().await;
                return Err(e.into());
            }
            self.cart_client.remove_item(line.id()).await?;
        }

        self.cart_client.clear().await?;
        let receipt = Receipt {
            lines: cart.items().to_vec(),
            total: cart.total(),
        };
        info!(lines = receipt.lines.len(), total = %receipt.total, "Checkout complete");
        self.notifier.success(format!("Order placed! Total: {:.2}", receipt.total));
        let _ = self.refresh_catalog().await;
        Ok(receipt)
    }

    // -------------------------------------------------------------------------
    // Add product
    // -------------------------------------------------------------------------

    #[instrument(skip(self, form), fields(description = %form.description))]
    pub async fn add_product(&self, form: AddProductForm) -> Result<Product, StorefrontError> {
        let create = match form.validate() {
            Ok(create) => create,
            Err(e) => {
                self.notifier.error(e.to_string());
                return Err(e);
            }
        };
        let product = match self.catalog.create_product(create, form.image).await {
            Ok(product) => product,
            Err(e) => {
                warn!(error = %e, "Create product failed");
                self.notifier.error(format!("Failed to add product: {}", e));
                return Err(e.into());
            }
        };
        info!(product_id = product.id, "Product added");
        self.notifier.success("Product added successfully!");
        let _ = self.refresh_catalog().await;
        Ok(product)
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    pub async fn shutdown(self) -> Result<(), StorefrontError> {
        info!("Shutting down storefront...");
        // Closing the channel lets the cart service finish what is queued and exit.
        drop(self.cart_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Service task failed: {:?}", e);
                return Err(StorefrontError::Task(e.to_string()));
            }
        }

        info!("Storefront shutdown complete.");
        Ok(())
    }
}
