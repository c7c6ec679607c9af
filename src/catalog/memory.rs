use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::info;

use super::{CatalogError, CatalogService};
use crate::clients::ProductClient;
use crate::domain::{ImageUpload, Product, ProductCreate, ProductId, ProductUpdate};
use crate::product_actor::{self, NewProduct};

/// Catalog served by an in-process product actor instead of the REST API.
///
/// Uploaded images are not stored; the product only records the path the API would
/// have served them under.
pub struct InMemoryCatalog {
    client: ProductClient,
    handle: Option<JoinHandle<()>>,
}

impl InMemoryCatalog {
    /// Spawns the product actor on the current tokio runtime.
    pub fn spawn(buffer_size: usize) -> Self {
        let (actor, client) = product_actor::new(buffer_size);
        let handle = tokio::spawn(actor.run());
        Self {
            client,
            handle: Some(handle),
        }
    }

    /// Wraps an existing client, e.g. one whose other end is driven by a test.
    pub fn from_client(client: ProductClient) -> Self {
        Self { client, handle: None }
    }

    pub async fn seed(&self, products: Vec<ProductCreate>) -> Result<Vec<Product>, CatalogError> {
        let mut created = Vec::with_capacity(products.len());
        for fields in products {
            created.push(self.client.create_product(NewProduct { fields, img_url: None }).await?);
        }
        info!(count = created.len(), "Catalog seeded");
        Ok(created)
    }

    /// Drops the client and waits for the actor to drain.
    pub async fn shutdown(self) -> Result<(), CatalogError> {
        let Self { client, handle } = self;
        drop(client);
        if let Some(handle) = handle {
            handle
                .await
                .map_err(|e| CatalogError::ActorCommunicationError(e.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogService for InMemoryCatalog {
    async fn fetch_catalog(&self) -> Result<Vec<Product>, CatalogError> {
        self.client.list_products().await
    }

    async fn fetch_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.client.get_product(id).await
    }

    async fn create_product(&self, product: ProductCreate, image: Option<ImageUpload>) -> Result<Product, CatalogError> {
        let img_url = image.map(|upload| format!("/images/{}", upload.file_name));
        self.client.create_product(NewProduct { fields: product, img_url }).await
    }

    async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product, CatalogError> {
        self.client.update_product(id, update).await
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), CatalogError> {
        self.client.delete_product(id).await
    }
}
