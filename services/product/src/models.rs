//! Product models for records, requests and response payloads

use chrono::{DateTime, Utc};
use common::{
    Error,
    validation::{self, Validator},
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Copy of the owning category taken when the product was written.
///
/// Renaming the category later does not touch this copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub uuid: String,
    pub name: String,
}

/// Product record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub uuid: String,
    pub name: String,
    pub price: f64,
    /// Location of the product image in object storage
    pub image: String,
    pub qrcode: Option<String>,
    pub is_top: bool,
    pub category: ProductCategory,
    pub created_at: String,
    pub updated_at: String,
}

/// Flat row layout of the `products` table
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub uuid: String,
    pub name: String,
    pub price: f64,
    pub image: String,
    pub qrcode: Option<String>,
    pub is_top: bool,
    pub category_uuid: String,
    pub category_name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            uuid: row.uuid,
            name: row.name,
            price: row.price,
            image: row.image,
            qrcode: row.qrcode,
            is_top: row.is_top,
            category: ProductCategory {
                uuid: row.category_uuid,
                name: row.category_name,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Everything needed to create a product
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub uuid: String,
    pub name: String,
    pub price: f64,
    pub qrcode: Option<String>,
    pub is_top: bool,
    pub category: ProductCategory,
    pub image: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Replacement fields for an existing product; the image is optional
#[derive(Debug, Clone)]
pub struct ProductUpdate {
    pub uuid: String,
    pub name: String,
    pub price: f64,
    pub qrcode: Option<String>,
    pub is_top: bool,
    pub category: ProductCategory,
    pub image: Option<Vec<u8>>,
    pub updated_at: DateTime<Utc>,
}

/// Field set written by a conditional update.
///
/// `image` is only written when a new location is supplied.
#[derive(Debug, Clone)]
pub struct ProductChanges {
    pub uuid: String,
    pub name: String,
    pub price: f64,
    pub qrcode: Option<String>,
    pub is_top: bool,
    pub category: ProductCategory,
    pub image: Option<String>,
    pub updated_at: String,
}

/// Query parameters of `GET /products`
///
/// At most one filter is honored: `category_uuid`, then `qrcode`, then
/// `name`. Empty values count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub category_uuid: Option<String>,
    pub qrcode: Option<String>,
    pub name: Option<String>,
}

/// The filter a search resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductFilter {
    Category(String),
    QrCode(String),
    NamePrefix(String),
    Top,
}

impl SearchParams {
    pub fn filter(self) -> ProductFilter {
        let present = |value: Option<String>| value.filter(|v| !v.is_empty());

        if let Some(uuid) = present(self.category_uuid) {
            ProductFilter::Category(uuid)
        } else if let Some(qrcode) = present(self.qrcode) {
            ProductFilter::QrCode(qrcode)
        } else if let Some(name) = present(self.name) {
            ProductFilter::NamePrefix(name)
        } else {
            ProductFilter::Top
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CategoryRequest {
    pub uuid: String,
    pub name: String,
}

/// Body of `POST /products` and `PUT /products/{uuid}`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductRequest {
    pub name: String,
    pub price: Option<f64>,
    /// Base64 encoded image
    pub image: Option<String>,
    pub qrcode: Option<String>,
    pub is_top: bool,
    pub category: CategoryRequest,
}

impl ProductRequest {
    /// Rules for creation: the image is mandatory
    pub fn validate_add(&self) -> Result<(), Error> {
        self.validate(true)
    }

    /// Rules for replacement: the image may be omitted
    pub fn validate_update(&self) -> Result<(), Error> {
        self.validate(false)
    }

    fn validate(&self, image_required: bool) -> Result<(), Error> {
        let mut validator = Validator::new();

        validator
            .field(
                "name",
                validation::required(&self.name)
                    .and_then(|_| validation::length(&self.name, 1, 100)),
            )
            .field(
                "price",
                self.price
                    .ok_or_else(|| "cannot be blank".to_string())
                    .and_then(|price| validation::min(price, 0.0)),
            );

        match self.image.as_deref().filter(|image| !image.is_empty()) {
            Some(image) => {
                validator.field("image", validation::base64(image));
            }
            None if image_required => {
                validator.field("image", Err("cannot be blank".to_string()));
            }
            None => {}
        }

        if let Some(qrcode) = self.qrcode() {
            validator.field("qrcode", validation::alphanumeric(qrcode));
        }

        validator
            .field(
                "category.uuid",
                validation::required(&self.category.uuid)
                    .and_then(|_| validation::uuid(&self.category.uuid)),
            )
            .field(
                "category.name",
                validation::required(&self.category.name)
                    .and_then(|_| validation::length(&self.category.name, 1, 50)),
            );

        validator.finish()
    }

    /// QR code, ignoring an empty string
    pub fn qrcode(&self) -> Option<&str> {
        self.qrcode.as_deref().filter(|code| !code.is_empty())
    }

    /// Encoded image, ignoring an empty string
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref().filter(|image| !image.is_empty())
    }

    pub fn category(&self) -> ProductCategory {
        ProductCategory {
            uuid: self.category.uuid.clone(),
            name: self.category.name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SelectedProducts {
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct ProductAdded {
    pub product: Product,
}

#[derive(Debug, Serialize)]
pub struct ProductDeleted {
    pub product: &'static str,
}
