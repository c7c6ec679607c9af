use crate::domain::ProductCreate;

// DTOs for the in-process product store
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub fields: ProductCreate,
    /// Path under which the uploaded image is served, if one was sent.
    pub img_url: Option<String>,
}
