//! `multipart/form-data` bodies for the product create/update endpoints.

use std::time::{SystemTime, UNIX_EPOCH};

use rust_decimal::Decimal;

use crate::domain::ImageUpload;

pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        Self::with_boundary(format!("storefront-{:x}", nanos))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            body: Vec::new(),
        }
    }

    /// The four fields every product create/update carries.
    pub fn product_fields(description: &str, model: i32, quantity: u32, price: Decimal) -> Self {
        Self::new()
            .text("description", description)
            .text("model", &model.to_string())
            .text("quantity", &quantity.to_string())
            .text("price", &price.to_string())
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.open_part();
        self.body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", escape(name)).as_bytes(),
        );
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn file(mut self, name: &str, upload: &ImageUpload) -> Self {
        self.open_part();
        self.body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                escape(name),
                escape(&upload.file_name),
                escape(&upload.content_type)
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(&upload.bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        self.body
    }

    fn open_part(&mut self) {
        self.body.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

fn escape(value: &str) -> String {
    value.replace('"', "%22").replace('\r', "%0D").replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_text_fields() {
        let form = MultipartForm::with_boundary("XYZ").text("description", "Widget").text("model", "7");
        assert_eq!(form.content_type(), "multipart/form-data; boundary=XYZ");
        let body = String::from_utf8(form.finish()).unwrap();
        assert_eq!(
            body,
            "--XYZ\r\nContent-Disposition: form-data; name=\"description\"\r\n\r\nWidget\r\n\
             --XYZ\r\nContent-Disposition: form-data; name=\"model\"\r\n\r\n7\r\n\
             --XYZ--\r\n"
        );
    }

    #[test]
    fn encodes_file_part() {
        let upload = ImageUpload {
            file_name: "lamp \"big\".png".into(),
            content_type: "image/png".into(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        };
        let body = MultipartForm::with_boundary("B").file("image", &upload).finish();
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("name=\"image\"; filename=\"lamp %22big%22.png\""));
        assert!(text.contains("Content-Type: image/png\r\n\r\n"));
        assert!(body.windows(4).any(|w| w == [0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn content_type_cannot_add_headers() {
        let upload = ImageUpload {
            file_name: "a.png".into(),
            content_type: "image/png\r\nX-Injected: 1".into(),
            bytes: vec![1],
        };
        let body = MultipartForm::with_boundary("B").file("image", &upload).finish();
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("Content-Type: image/png%0D%0AX-Injected: 1\r\n\r\n"));
        assert!(!text.contains("\r\nX-Injected"));
    }

    #[test]
    fn product_fields_render_price_exactly() {
        let body = MultipartForm::product_fields("Widget", 3, 8, Decimal::new(1050, 2)).finish();
        let text = String::from_utf8(body).unwrap();
        assert!(text.contains("name=\"price\"\r\n\r\n10.50\r\n"));
        assert!(text.contains("name=\"quantity\"\r\n\r\n8\r\n"));
    }
}
