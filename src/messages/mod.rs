use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::oneshot;

use crate::cart::{AddOutcome, CartError};
use crate::catalog::CatalogSnapshot;
use crate::domain::{CartState, Product, ProductId};

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Typed messages for the cart service. Each variant includes parameters
/// and a oneshot channel for the response.
#[derive(Debug)]
pub enum CartRequest {
    AddItem {
        product: Product,
        catalog: Arc<CatalogSnapshot>,
        respond_to: ServiceResponse<AddOutcome, CartError>,
    },
    UpdateQuantity {
        id: ProductId,
        quantity: i64,
        respond_to: ServiceResponse<(), CartError>,
    },
    RemoveItem {
        id: ProductId,
        respond_to: ServiceResponse<(), CartError>,
    },
    Clear {
        respond_to: ServiceResponse<(), CartError>,
    },
    GetCart {
        respond_to: ServiceResponse<CartState, CartError>,
    },
    GetTotal {
        respond_to: ServiceResponse<Decimal, CartError>,
    },
    GetItemCount {
        respond_to: ServiceResponse<u64, CartError>,
    },
    Shutdown,
}
