use crate::actor_framework::{Entity, FrameworkError};
use crate::domain::{Product, ProductId, ProductUpdate};
use super::dtos::NewProduct;

impl Entity for Product {
    type Id = ProductId;
    type CreatePayload = NewProduct;
    type Patch = ProductUpdate;

    fn id(&self) -> &ProductId { &self.id }

    /// Creates a new Product from creation parameters.
    ///
    /// # Errors
    /// Rejects an empty description or a negative price.
    fn from_create(id: ProductId, payload: NewProduct) -> Result<Self, FrameworkError> {
        let fields = payload.fields;
        validate(&fields.description, fields.price.is_sign_negative())?;
        Ok(Self {
            id,
            description: fields.description,
            model: fields.model,
            quantity: fields.quantity,
            price: fields.price,
            img_url: payload.img_url,
        })
    }

    /// Replaces every mutable field. The image path is kept.
    fn on_update(&mut self, patch: ProductUpdate) -> Result<(), FrameworkError> {
        validate(&patch.description, patch.price.is_sign_negative())?;
        self.description = patch.description;
        self.model = patch.model;
        self.quantity = patch.quantity;
        self.price = patch.price;
        Ok(())
    }
}

fn validate(description: &str, negative_price: bool) -> Result<(), FrameworkError> {
    if description.trim().is_empty() {
        return Err(FrameworkError::Validation("description is required".to_string()));
    }
    if negative_price {
        return Err(FrameworkError::Validation("price must not be negative".to_string()));
    }
    Ok(())
}
