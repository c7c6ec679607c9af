use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type ProductId = u32;

/// A product as served by the catalog API.
///
/// The client only ever holds snapshots of these; `quantity` is the stock that was
/// available at the time of the last fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub description: String,
    pub model: i32,
    pub quantity: u32,
    pub price: Decimal,
    #[serde(default)]
    pub img_url: Option<String>,
}

impl Product {
    /// Creates a new Product instance.
    ///
    /// # Arguments
    /// * `id` - Identifier assigned by the catalog
    /// * `description` - Display text
    /// * `price` - Unit price
    /// * `quantity` - Available stock
    pub fn new(id: ProductId, description: impl Into<String>, price: Decimal, quantity: u32) -> Self {
        Self {
            id,
            description: description.into(),
            model: 0,
            quantity,
            price,
            img_url: None,
        }
    }

    pub fn with_model(mut self, model: i32) -> Self {
        self.model = model;
        self
    }

    pub fn with_img_url(mut self, img_url: impl Into<String>) -> Self {
        self.img_url = Some(img_url.into());
        self
    }

    /// Full record for a PUT that leaves everything but the stock untouched.
    pub fn restocked(&self, quantity: u32) -> ProductUpdate {
        ProductUpdate {
            description: self.description.clone(),
            model: self.model,
            quantity,
            price: self.price,
        }
    }
}

/// Payload for creating a new product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCreate {
    pub description: String,
    pub model: i32,
    pub quantity: u32,
    pub price: Decimal,
}

/// Full mutable record submitted when updating a product.
///
/// The catalog API replaces every field, so a purchase resubmits the whole record with
/// the decremented stock.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub description: String,
    pub model: i32,
    pub quantity: u32,
    pub price: Decimal,
}

/// An image file forwarded untouched to the catalog API.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}
