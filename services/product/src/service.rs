//! Product business service

use std::sync::Arc;

use common::{Result, response::format_datetime, storage::ObjectStorage};
use tracing::{debug, info};

use crate::{
    models::{NewProduct, Product, ProductChanges, ProductFilter, ProductUpdate, SearchParams},
    repository::ProductRepository,
};

pub struct ProductService {
    repository: Arc<dyn ProductRepository>,
    storage: Arc<dyn ObjectStorage>,
}

impl ProductService {
    pub fn new(repository: Arc<dyn ProductRepository>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            repository,
            storage,
        }
    }

    /// Run the single lookup selected by the search parameters
    pub async fn search(&self, params: SearchParams) -> Result<Vec<Product>> {
        let filter = params.filter();
        debug!("Searching products by {:?}", filter);

        match filter {
            ProductFilter::Category(uuid) => self.repository.query_by_category(&uuid).await,
            ProductFilter::QrCode(qrcode) => self.repository.query_by_qrcode(&qrcode).await,
            ProductFilter::NamePrefix(name) => self.repository.scan_by_name_prefix(&name).await,
            ProductFilter::Top => self.repository.scan_top().await,
        }
    }

    /// Upload the image, then persist the record pointing at it
    pub async fn add(&self, new_product: NewProduct) -> Result<Product> {
        let location = self
            .storage
            .upload(&new_product.uuid, new_product.image)
            .await?;

        let product = Product {
            uuid: new_product.uuid,
            name: new_product.name,
            price: new_product.price,
            image: location,
            qrcode: new_product.qrcode,
            is_top: new_product.is_top,
            category: new_product.category,
            created_at: format_datetime(new_product.created_at),
            updated_at: format_datetime(new_product.updated_at),
        };

        let product = self.repository.put(product).await?;
        info!("Product added: {}", product.uuid);
        Ok(product)
    }

    /// Replace the fields of an existing product.
    ///
    /// A new image is uploaded first and replaces the stored location. The
    /// previous image is left in storage.
    pub async fn update(&self, update: ProductUpdate) -> Result<Product> {
        let image = match update.image {
            Some(image) => Some(self.storage.upload(&update.uuid, image).await?),
            None => None,
        };

        let product = self
            .repository
            .update(ProductChanges {
                uuid: update.uuid,
                name: update.name,
                price: update.price,
                qrcode: update.qrcode,
                is_top: update.is_top,
                category: update.category,
                image,
                updated_at: format_datetime(update.updated_at),
            })
            .await?;

        info!("Product updated: {}", product.uuid);
        Ok(product)
    }

    /// Delete the record, then its image
    pub async fn delete(&self, uuid: &str) -> Result<()> {
        let product = self.repository.delete(uuid).await?;
        self.storage.delete(&product.image).await
    }
}
