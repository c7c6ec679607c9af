use std::str::FromStr;

use rust_decimal::Decimal;

use super::StorefrontError;
use crate::domain::{ImageUpload, ProductCreate};

/// Raw input of the add-product form, exactly as typed.
#[derive(Debug, Clone, Default)]
pub struct AddProductForm {
    pub description: String,
    pub model: String,
    pub quantity: String,
    pub price: String,
    pub image: Option<ImageUpload>,
}

impl AddProductForm {
    /// Parses and checks every field; the first problem found is reported.
    pub fn validate(&self) -> Result<ProductCreate, StorefrontError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(invalid("Description is required"));
        }
        let model = self
            .model
            .trim()
            .parse::<i32>()
            .map_err(|_| invalid(format!("Model must be a whole number, got {:?}", self.model)))?;
        let quantity = self
            .quantity
            .trim()
            .parse::<u32>()
            .map_err(|_| invalid(format!("Quantity must be a whole number of at least 0, got {:?}", self.quantity)))?;
        let price = Decimal::from_str(self.price.trim())
            .map_err(|_| invalid(format!("Price must be a number, got {:?}", self.price)))?;
        if price.is_sign_negative() && !price.is_zero() {
            return Err(invalid("Price must not be negative"));
        }
        Ok(ProductCreate {
            description: description.to_string(),
            model,
            quantity,
            price,
        })
    }
}

fn invalid(message: impl Into<String>) -> StorefrontError {
    StorefrontError::Validation(message.into())
}
