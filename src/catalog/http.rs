use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::form::MultipartForm;
use super::{CatalogError, CatalogService};
use crate::app_system::StorefrontConfig;
use crate::domain::{ImageUpload, Product, ProductCreate, ProductId, ProductUpdate};

/// Catalog backed by the product REST API.
///
/// `ureq` is blocking, so every request runs on tokio's blocking pool.
#[derive(Clone)]
pub struct HttpCatalog {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &StorefrontConfig) -> Self {
        Self::new(config.backend_url.clone(), Duration::from_secs(config.request_timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of the product image, if it has one.
    #[allow(dead_code)]
    pub fn image_url(&self, product: &Product) -> Option<String> {
        product.img_url.as_deref().map(|path| {
            if path.starts_with("http://") || path.starts_with("https://") {
                path.to_string()
            } else if path.starts_with('/') {
                format!("{}{}", self.base_url, path)
            } else {
                format!("{}/{}", self.base_url, path)
            }
        })
    }

    fn products_url(&self) -> String {
        format!("{}/api/products", self.base_url)
    }

    fn product_url(&self, id: ProductId) -> String {
        format!("{}/api/products/{}", self.base_url, id)
    }

    async fn blocking<T, F>(&self, request: F) -> Result<T, CatalogError>
    where
        T: Send + 'static,
        F: FnOnce(ureq::Agent) -> Result<T, CatalogError> + Send + 'static,
    {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || request(agent))
            .await
            .map_err(|e| CatalogError::Unreachable(e.to_string()))?
    }
}

fn map_error(error: ureq::Error) -> CatalogError {
    match error {
        ureq::Error::Status(code, response) => {
            let message = response.into_string().unwrap_or_default();
            CatalogError::Status { code, message }
        }
        ureq::Error::Transport(transport) => CatalogError::Unreachable(transport.to_string()),
    }
}

fn decode<T: DeserializeOwned>(response: ureq::Response) -> Result<T, CatalogError> {
    let body = response.into_string().map_err(|e| CatalogError::Decode(e.to_string()))?;
    parse_body(&body)
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, CatalogError> {
    serde_json::from_str(body).map_err(|e| CatalogError::Decode(e.to_string()))
}

fn not_found_as(id: ProductId) -> impl Fn(CatalogError) -> CatalogError {
    move |e| match e {
        CatalogError::Status { code: 404, .. } => CatalogError::NotFound(id),
        other => other,
    }
}

#[async_trait]
impl CatalogService for HttpCatalog {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_catalog(&self) -> Result<Vec<Product>, CatalogError> {
        debug!("Sending request");
        let url = self.products_url();
        self.blocking(move |agent| agent.get(&url).call().map_err(map_error).and_then(decode))
            .await
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        debug!("Sending request");
        let url = self.product_url(id);
        self.blocking(move |agent| agent.get(&url).call().map_err(map_error).and_then(decode))
            .await
            .map_err(not_found_as(id))
    }

    #[instrument(skip(self, product, image), fields(description = %product.description, has_image = image.is_some()))]
    async fn create_product(&self, product: ProductCreate, image: Option<ImageUpload>) -> Result<Product, CatalogError> {
        debug!("Sending request");
        let mut form = MultipartForm::product_fields(&product.description, product.model, product.quantity, product.price);
        if let Some(upload) = &image {
            form = form.file("image", upload);
        }
        let content_type = form.content_type();
        let body = form.finish();
        let url = self.products_url();
        self.blocking(move |agent| {
            agent
                .post(&url)
                .set("Content-Type", &content_type)
                .send_bytes(&body)
                .map_err(map_error)
                .and_then(decode)
        })
        .await
    }

    #[instrument(skip(self, update), fields(quantity = update.quantity))]
    async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product, CatalogError> {
        debug!("Sending request");
        let form = MultipartForm::product_fields(&update.description, update.model, update.quantity, update.price);
        let content_type = form.content_type();
        let body = form.finish();
        let url = self.product_url(id);
        self.blocking(move |agent| {
            agent
                .put(&url)
                .set("Content-Type", &content_type)
                .send_bytes(&body)
                .map_err(map_error)
                .and_then(decode)
        })
        .await
        .map_err(not_found_as(id))
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: ProductId) -> Result<(), CatalogError> {
        debug!("Sending request");
        let url = self.product_url(id);
        self.blocking(move |agent| agent.delete(&url).call().map(|_| ()).map_err(map_error))
            .await
            .map_err(not_found_as(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn catalog() -> HttpCatalog {
        HttpCatalog::new("http://localhost:8080/", Duration::from_secs(5))
    }

    #[test]
    fn builds_endpoints_without_double_slash() {
        let catalog = catalog();
        assert_eq!(catalog.base_url(), "http://localhost:8080");
        assert_eq!(catalog.products_url(), "http://localhost:8080/api/products");
        assert_eq!(catalog.product_url(12), "http://localhost:8080/api/products/12");
    }

    #[test]
    fn resolves_image_urls() {
        let catalog = catalog();
        let product = Product::new(1, "Widget", Decimal::ONE, 1);
        assert_eq!(catalog.image_url(&product), None);

        let product = product.with_img_url("/images/widget.png");
        assert_eq!(
            catalog.image_url(&product).as_deref(),
            Some("http://localhost:8080/images/widget.png")
        );

        let product = product.with_img_url("https://cdn.example.com/w.png");
        assert_eq!(catalog.image_url(&product).as_deref(), Some("https://cdn.example.com/w.png"));
    }

    #[test]
    fn parses_product_list() {
        let body = r#"[{"id":1,"description":"Widget","model":1,"quantity":2,"price":10.00,"imgUrl":null}]"#;
        let products: Vec<Product> = parse_body(body).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].price, Decimal::from(10));
    }

    #[test]
    fn rejects_garbage_body() {
        let err = parse_body::<Vec<Product>>("<html>").unwrap_err();
        assert!(matches!(err, CatalogError::Decode(_)));
    }

    #[test]
    fn maps_404_to_not_found() {
        let mapped = not_found_as(5)(CatalogError::Status { code: 404, message: String::new() });
        assert_eq!(mapped, CatalogError::NotFound(5));
        let kept = not_found_as(5)(CatalogError::Status { code: 500, message: "boom".into() });
        assert!(matches!(kept, CatalogError::Status { code: 500, .. }));
    }

    #[tokio::test]
    async fn unreachable_backend_is_reported() {
        // Port 9 (discard) on localhost is not expected to run an HTTP server.
        let catalog = HttpCatalog::new("http://127.0.0.1:9", Duration::from_millis(500));
        let err = catalog.fetch_catalog().await.unwrap_err();
        assert!(matches!(err, CatalogError::Unreachable(_)));
    }
}
