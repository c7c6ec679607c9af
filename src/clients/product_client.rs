use tracing::{debug, instrument};
use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::catalog::CatalogError;
use crate::domain::{Product, ProductId, ProductUpdate};
use crate::product_actor::NewProduct;

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

fn to_catalog_error(e: FrameworkError) -> CatalogError {
    match e {
        FrameworkError::Validation(message) => CatalogError::Status { code: 400, message },
        other => CatalogError::ActorCommunicationError(other.to_string()),
    }
}

impl ProductClient {
    pub fn new(inner: ResourceClient<Product>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        debug!("Sending request");
        self.inner.list().await.map_err(to_catalog_error)
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        debug!("Sending request");
        self.inner
            .get(id)
            .await
            .map_err(to_catalog_error)?
            .ok_or(CatalogError::NotFound(id))
    }

    #[instrument(skip(self, product), fields(description = %product.fields.description))]
    pub async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogError> {
        debug!("Sending request");
        self.inner.create(product).await.map_err(to_catalog_error)
    }

    #[instrument(skip(self, update), fields(quantity = update.quantity))]
    pub async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product, CatalogError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(|e| match e {
            FrameworkError::NotFound(_) => CatalogError::NotFound(id),
            other => to_catalog_error(other),
        })
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), CatalogError> {
        debug!("Sending request");
        self.inner.delete(id).await.map_err(|e| match e {
            FrameworkError::NotFound(_) => CatalogError::NotFound(id),
            other => to_catalog_error(other),
        })
    }
}
