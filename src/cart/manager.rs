use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::error::{CartError, StorageError};
use super::store::KeyValueStore;
use crate::catalog::CatalogSnapshot;
use crate::domain::{CartLineItem, CartState, Product, ProductId};

/// How the cart came back at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Stored cart parsed; carries the number of line items.
    Restored(usize),
    /// Nothing stored under the cart key.
    Absent,
    /// Stored data was unreadable; the cart starts empty.
    Corrupt(StorageError),
}

/// Result of a successful `add_item`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Incremented(u32),
}

/// Sole owner of the cart contents.
///
/// Every mutation that changes the state writes the whole cart back to the store.
/// A failed write is logged and otherwise ignored; the in-memory state stays
/// authoritative for the session.
pub struct CartManager<S: KeyValueStore> {
    state: CartState,
    store: S,
    key: String,
}

impl<S: KeyValueStore> CartManager<S> {
    pub fn initialize(store: S, key: impl Into<String>) -> (Self, LoadOutcome) {
        let key = key.into();
        let (state, outcome) = match read_state(&store, &key) {
            Ok(Some(state)) => {
                let count = state.len();
                info!(items = count, "Cart restored from storage");
                (state, LoadOutcome::Restored(count))
            }
            Ok(None) => {
                debug!("No stored cart, starting empty");
                (CartState::new(), LoadOutcome::Absent)
            }
            Err(e) => {
                warn!(error = %e, "Stored cart unusable, starting empty");
                (CartState::new(), LoadOutcome::Corrupt(e))
            }
        };
        (Self { state, store, key }, outcome)
    }

    pub fn state(&self) -> &CartState {
        &self.state
    }

    /// Adds one unit of `product`.
    ///
    /// The stock ceiling comes from `catalog` when it knows the product, otherwise from
    /// the product record passed in.
    pub fn add_item(&mut self, product: &Product, catalog: &CatalogSnapshot) -> Result<AddOutcome, CartError> {
        let available = catalog.stock_of(product.id).unwrap_or(product.quantity);

        let outcome = match self.state.get_mut(product.id) {
            Some(item) => {
                if item.quantity_in_cart >= available {
                    debug!(product_id = product.id, in_cart = item.quantity_in_cart, available, "Stock exceeded");
                    return Err(CartError::StockExceeded {
                        requested: item.quantity_in_cart.saturating_add(1),
                        available,
                    });
                }
                item.quantity_in_cart += 1;
                AddOutcome::Incremented(item.quantity_in_cart)
            }
            None => {
                if available == 0 {
                    debug!(product_id = product.id, "Out of stock");
                    return Err(CartError::StockExceeded { requested: 1, available });
                }
                self.state.push(CartLineItem::new(product.clone()));
                AddOutcome::Added
            }
        };

        self.persist();
        Ok(outcome)
    }

    /// Sets the quantity of a line item. Zero or less removes it; unknown ids are
    /// ignored. Stock is not re-checked here, callers validate beforehand.
    pub fn update_quantity(&mut self, id: ProductId, new_quantity: i64) {
        if new_quantity <= 0 {
            self.remove_item(id);
            return;
        }
        let quantity = u32::try_from(new_quantity).unwrap_or(u32::MAX);
        match self.state.get_mut(id) {
            Some(item) if item.quantity_in_cart != quantity => {
                item.quantity_in_cart = quantity;
                self.persist();
            }
            Some(_) => {}
            None => debug!(product_id = id, "Update for product not in cart ignored"),
        }
    }

    pub fn remove_item(&mut self, id: ProductId) {
        if self.state.remove(id) {
            self.persist();
        }
    }

    pub fn clear(&mut self) {
        self.state.clear();
        self.persist();
    }

    pub fn total(&self) -> Decimal {
        self.state.total()
    }

    pub fn item_count(&self) -> u64 {
        self.state.item_count()
    }

    fn persist(&mut self) {
        let result = serde_json::to_string(&self.state)
            .map_err(|e| StorageError::Write(e.to_string()))
            .and_then(|json| self.store.save(&self.key, &json));
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist cart");
        }
    }
}

fn read_state<S: KeyValueStore>(store: &S, key: &str) -> Result<Option<CartState>, StorageError> {
    let Some(raw) = store.load(key)? else {
        return Ok(None);
    };
    let state: CartState = serde_json::from_str(&raw).map_err(|e| StorageError::Malformed(e.to_string()))?;
    Ok(Some(state.normalized()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::store::MemoryStore;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const KEY: &str = "shoppingCart";

    fn widget() -> Product {
        Product::new(1, "Widget", Decimal::new(1000, 2), 2)
    }

    fn gadget() -> Product {
        Product::new(2, "Gadget", Decimal::new(250, 2), 5)
    }

    fn empty_cart() -> (CartManager<MemoryStore>, MemoryStore) {
        let store = MemoryStore::new();
        let (manager, outcome) = CartManager::initialize(store.clone(), KEY);
        assert_eq!(outcome, LoadOutcome::Absent);
        (manager, store)
    }

    /// Store whose writes always fail.
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn load(&self, _: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn save(&mut self, _: &str, _: &str) -> Result<(), StorageError> {
            Err(StorageError::Write("quota exceeded".into()))
        }

        fn remove(&mut self, _: &str) -> Result<(), StorageError> {
            Err(StorageError::Write("quota exceeded".into()))
        }
    }

    #[test]
    fn widget_scenario() {
        let (mut cart, _) = empty_cart();
        let catalog = CatalogSnapshot::new(vec![widget()]);

        assert_eq!(cart.add_item(&widget(), &catalog), Ok(AddOutcome::Added));
        assert_eq!(cart.add_item(&widget(), &catalog), Ok(AddOutcome::Incremented(2)));
        assert_eq!(cart.state().len(), 1);

        let err = cart.add_item(&widget(), &catalog).unwrap_err();
        assert_eq!(err, CartError::StockExceeded { requested: 3, available: 2 });
        assert_eq!(cart.state().get(1).unwrap().quantity_in_cart, 2);

        cart.update_quantity(1, 0);
        assert!(cart.state().is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn out_of_stock_product_is_rejected() {
        let (mut cart, store) = empty_cart();
        let sold_out = Product::new(9, "Sold out", Decimal::ONE, 0);
        let catalog = CatalogSnapshot::new(vec![sold_out.clone()]);

        let err = cart.add_item(&sold_out, &catalog).unwrap_err();
        assert_eq!(err, CartError::StockExceeded { requested: 1, available: 0 });
        assert!(cart.state().is_empty());
        assert_eq!(store.load(KEY).unwrap(), None);
    }

    #[test]
    fn catalog_stock_wins_over_stale_product_record() {
        let (mut cart, _) = empty_cart();
        // The view holds a record claiming 2 units but the catalog was refreshed to 1.
        let catalog = CatalogSnapshot::new(vec![Product::new(1, "Widget", Decimal::new(1000, 2), 1)]);

        cart.add_item(&widget(), &catalog).unwrap();
        assert!(cart.add_item(&widget(), &catalog).is_err());
    }

    #[test]
    fn product_record_used_when_catalog_is_unaware() {
        let (mut cart, _) = empty_cart();
        let catalog = CatalogSnapshot::default();
        cart.add_item(&widget(), &catalog).unwrap();
        cart.add_item(&widget(), &catalog).unwrap();
        assert!(cart.add_item(&widget(), &catalog).is_err());
    }

    #[test]
    fn remove_then_add_starts_from_one() {
        let (mut cart, _) = empty_cart();
        let catalog = CatalogSnapshot::new(vec![gadget()]);
        for _ in 0..4 {
            cart.add_item(&gadget(), &catalog).unwrap();
        }
        cart.remove_item(2);
        assert!(cart.state().get(2).is_none());

        cart.add_item(&gadget(), &catalog).unwrap();
        assert_eq!(cart.state().get(2).unwrap().quantity_in_cart, 1);
    }

    #[test]
    fn update_quantity_rules() {
        let (mut cart, _) = empty_cart();
        let catalog = CatalogSnapshot::new(vec![widget(), gadget()]);
        cart.add_item(&widget(), &catalog).unwrap();
        cart.add_item(&gadget(), &catalog).unwrap();

        cart.update_quantity(2, 4);
        assert_eq!(cart.state().get(2).unwrap().quantity_in_cart, 4);

        // No stock re-check on explicit updates.
        cart.update_quantity(1, 10);
        assert_eq!(cart.state().get(1).unwrap().quantity_in_cart, 10);

        cart.update_quantity(1, -3);
        assert!(cart.state().get(1).is_none());

        cart.update_quantity(77, 3);
        assert_eq!(cart.state().len(), 1);
    }

    #[test]
    fn clear_empties_cart_and_storage() {
        let (mut cart, store) = empty_cart();
        let catalog = CatalogSnapshot::new(vec![widget(), gadget()]);
        cart.add_item(&widget(), &catalog).unwrap();
        cart.add_item(&gadget(), &catalog).unwrap();

        cart.clear();
        assert!(cart.state().is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(store.load(KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn totals() {
        let (mut cart, _) = empty_cart();
        let catalog = CatalogSnapshot::new(vec![widget(), gadget()]);
        cart.add_item(&widget(), &catalog).unwrap();
        cart.add_item(&widget(), &catalog).unwrap();
        cart.add_item(&gadget(), &catalog).unwrap();

        assert_eq!(cart.total(), Decimal::new(2250, 2));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn persisted_state_reloads_equal() {
        let (mut cart, store) = empty_cart();
        let catalog = CatalogSnapshot::new(vec![widget(), gadget()]);
        cart.add_item(&gadget(), &catalog).unwrap();
        cart.add_item(&widget(), &catalog).unwrap();
        cart.update_quantity(2, 3);

        let (reloaded, outcome) = CartManager::initialize(store.clone(), KEY);
        assert_eq!(outcome, LoadOutcome::Restored(2));
        assert_eq!(reloaded.state(), cart.state());
        assert_eq!(reloaded.state().items()[0].id(), 2);
    }

    #[test]
    fn empty_state_round_trips() {
        let (mut cart, store) = empty_cart();
        cart.clear();
        let (reloaded, outcome) = CartManager::initialize(store, KEY);
        assert_eq!(outcome, LoadOutcome::Restored(0));
        assert_eq!(reloaded.state(), &CartState::new());
    }

    #[test]
    fn malformed_storage_yields_empty_cart() {
        for raw in ["not json", "{\"id\":1}", "[{\"id\":\"x\"}]", ""] {
            let store = MemoryStore::with_entry(KEY, raw);
            let (cart, outcome) = CartManager::initialize(store, KEY);
            assert!(cart.state().is_empty(), "input {:?}", raw);
            assert!(matches!(outcome, LoadOutcome::Corrupt(StorageError::Malformed(_))));
        }
    }

    #[test]
    fn write_failures_keep_memory_state() {
        let (mut cart, outcome) = CartManager::initialize(ReadOnlyStore, KEY);
        assert_eq!(outcome, LoadOutcome::Absent);
        let catalog = CatalogSnapshot::new(vec![widget()]);

        cart.add_item(&widget(), &catalog).unwrap();
        cart.add_item(&widget(), &catalog).unwrap();
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn random_sequences_hold_invariants() {
        let catalog = CatalogSnapshot::new(vec![
            widget(),
            gadget(),
            Product::new(3, "Gizmo", Decimal::new(199, 2), 1),
            Product::new(4, "Sold out", Decimal::new(5000, 2), 0),
        ]);

        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let store = MemoryStore::new();
            let (mut cart, _) = CartManager::initialize(store.clone(), KEY);

            for _ in 0..40 {
                let product = &catalog.products()[rng.gen_range(0..catalog.len())];
                match rng.gen_range(0..4) {
                    0 | 1 => {
                        let before = cart.state().clone();
                        if cart.add_item(product, &catalog).is_err() {
                            assert_eq!(cart.state(), &before);
                        }
                        if let Some(item) = cart.state().get(product.id) {
                            assert!(item.quantity_in_cart <= product.quantity);
                        }
                    }
                    2 => {
                        let qty = rng.gen_range(-1..=product.quantity as i64);
                        cart.update_quantity(product.id, qty);
                        if qty <= 0 {
                            assert!(cart.state().get(product.id).is_none());
                        }
                    }
                    _ => {
                        cart.remove_item(product.id);
                        assert!(cart.state().get(product.id).is_none());
                    }
                }

                let expected: Decimal = cart
                    .state()
                    .items()
                    .iter()
                    .map(|item| item.product.price * Decimal::from(item.quantity_in_cart))
                    .sum();
                assert_eq!(cart.total(), expected);
                assert!(cart.state().items().iter().all(|item| item.quantity_in_cart >= 1));
            }

            let (reloaded, _) = CartManager::initialize(store, KEY);
            assert_eq!(reloaded.state(), cart.state(), "seed {}", seed);
        }
    }
}
