mod domain;
mod cart;
mod catalog;
mod clients;
mod messages;
mod actors;

mod app_system;

#[cfg(test)]
mod mock_framework;

mod actor_framework;
mod product_actor;

use std::env;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{error, info, warn, Instrument};

use crate::app_system::{setup_tracing, Storefront, StorefrontConfig, BACKEND_URL_ENV};
use crate::cart::{FileStore, KeyValueStore, MemoryStore};
use crate::catalog::{CatalogService, HttpCatalog, InMemoryCatalog};
use crate::domain::ProductCreate;

fn demo_products() -> Vec<ProductCreate> {
    vec![
        ProductCreate {
            description: "Widget".to_string(),
            model: 1,
            quantity: 2,
            price: Decimal::new(1000, 2),
        },
        ProductCreate {
            description: "Gadget".to_string(),
            model: 2,
            quantity: 5,
            price: Decimal::new(250, 2),
        },
    ]
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let config = StorefrontConfig::load().map_err(|e| e.to_string())?;
    setup_tracing(&config.log_level);

    info!(backend = %config.backend_url, "Starting storefront");

    // Without an explicit backend the demo runs against an in-process catalog.
    let catalog: Arc<dyn CatalogService> = if env::var(BACKEND_URL_ENV).is_ok() {
        Arc::new(HttpCatalog::from_config(&config))
    } else {
        let local = InMemoryCatalog::spawn(config.buffer_size);
        local.seed(demo_products()).await.map_err(|e| e.to_string())?;
        Arc::new(local)
    };

    let store: Box<dyn KeyValueStore> = match FileStore::open(&config.storage_dir) {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!(error = %e, "Cart will not survive a restart");
            Box::new(MemoryStore::new())
        }
    };

    let (storefront, mut notices) = Storefront::start(&config, catalog, store);

    let span = tracing::info_span!("browse");
    let snapshot = async {
        info!("Loading catalog");
        storefront.refresh_catalog().await.map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;

    info!(products = snapshot.len(), "Catalog loaded");

    let span = tracing::info_span!("shopping");
    async {
        for product in snapshot.products().iter().take(2) {
            if let Err(e) = storefront.add_to_cart(product.id).await {
                error!(product_id = product.id, error = %e, "Add to cart failed");
            }
        }
    }
    .instrument(span)
    .await;

    let total = storefront.cart_total().await.map_err(|e| e.to_string())?;
    let badge = storefront.cart_badge().await.map_err(|e| e.to_string())?;
    info!(items = badge, total = %total, "Cart ready");

    while let Ok(notice) = notices.try_recv() {
        info!(level = ?notice.level, "{}", notice.message);
    }

    storefront.shutdown().await.map_err(|e| e.to_string())?;

    info!("Application completed successfully");
    Ok(())
}
