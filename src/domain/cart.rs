use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::product::{Product, ProductId};

/// One entry in the cart: a snapshot of the product at the time it was added plus the
/// quantity the shopper intends to buy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity_in_cart: u32,
}

impl CartLineItem {
    pub fn new(product: Product) -> Self {
        Self {
            product,
            quantity_in_cart: 1,
        }
    }

    pub fn id(&self) -> ProductId {
        self.product.id
    }

    pub fn subtotal(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity_in_cart)
    }
}

/// Ordered cart contents, unique by product id.
///
/// Serialized as a bare JSON array of line items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartState {
    items: Vec<CartLineItem>,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn get(&self, id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: ProductId) -> Option<&mut CartLineItem> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    pub(crate) fn push(&mut self, item: CartLineItem) {
        debug_assert!(self.get(item.id()).is_none());
        self.items.push(item);
    }

    /// Returns true if a line item was removed.
    pub(crate) fn remove(&mut self, id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        self.items.len() != before
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartLineItem::subtotal).sum()
    }

    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity_in_cart)).sum()
    }

    /// Drops duplicate ids and zero-quantity lines from data read back from storage.
    pub(crate) fn normalized(self) -> Self {
        let mut out = CartState::new();
        for item in self.items {
            if item.quantity_in_cart == 0 || out.get(item.id()).is_some() {
                continue;
            }
            out.push(item);
        }
        out
    }
}
