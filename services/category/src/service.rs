//! Category business service
//!
//! Coordinates the record store and the image storage. Images are uploaded
//! before the record that references them is written; on delete the record
//! goes first and its stored location drives the image removal.

use std::sync::Arc;

use common::{Result, response::format_datetime, storage::ObjectStorage};
use tracing::info;

use crate::{
    models::{Category, NewCategory},
    repository::CategoryRepository,
};

pub struct CategoryService {
    repository: Arc<dyn CategoryRepository>,
    storage: Arc<dyn ObjectStorage>,
}

impl CategoryService {
    pub fn new(repository: Arc<dyn CategoryRepository>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            repository,
            storage,
        }
    }

    pub async fn list(&self) -> Result<Vec<Category>> {
        self.repository.list().await
    }

    /// Upload the image, then persist the record pointing at it.
    ///
    /// A failed record write leaves the uploaded image orphaned.
    pub async fn add(&self, new_category: NewCategory) -> Result<Category> {
        let location = self
            .storage
            .upload(&new_category.uuid, new_category.image)
            .await?;

        let category = Category {
            uuid: new_category.uuid,
            name: new_category.name,
            image: location,
            created_at: format_datetime(new_category.created_at),
            updated_at: format_datetime(new_category.updated_at),
        };

        let category = self.repository.put(category).await?;
        info!("Category added: {}", category.uuid);
        Ok(category)
    }

    /// Delete the record, then its image.
    ///
    /// The record deletion is not rolled back when the image removal fails.
    pub async fn delete(&self, uuid: &str) -> Result<()> {
        let category = self.repository.delete(uuid).await?;
        self.storage.delete(&category.image).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::MemoryCategoryRepository;
    use chrono::Utc;
    use common::{ErrorCode, storage::memory::MemoryStorage};

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn service() -> (
        CategoryService,
        Arc<MemoryCategoryRepository>,
        Arc<MemoryStorage>,
    ) {
        let repository = Arc::new(MemoryCategoryRepository::default());
        let storage = Arc::new(MemoryStorage::new("category"));
        let service = CategoryService::new(repository.clone(), storage.clone());
        (service, repository, storage)
    }

    fn new_category(uuid: &str) -> NewCategory {
        let now = Utc::now();
        NewCategory {
            uuid: uuid.to_string(),
            name: "Drinks".to_string(),
            image: PNG.to_vec(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn add_links_record_to_uploaded_image() {
        let (service, repository, storage) = service();

        let category = service.add(new_category("c-1")).await.unwrap();

        assert_eq!(category.name, "Drinks");
        assert!(category.image.ends_with("category/c-1.png"));
        assert!(storage.contains(&category.image));
        assert_eq!(repository.get("c-1"), Some(category));
    }

    #[tokio::test]
    async fn failed_upload_writes_no_record() {
        let (service, repository, storage) = service();
        storage.fail_uploads(true);

        let err = service.add(new_category("c-1")).await.unwrap_err();

        assert_eq!(err.code(), None);
        assert_eq!(repository.len(), 0);
    }

    #[tokio::test]
    async fn failed_record_write_leaves_uploaded_image() {
        let (service, repository, storage) = service();
        repository.fail_writes(true);

        assert!(service.add(new_category("c-1")).await.is_err());
        assert_eq!(storage.len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_record_then_image() {
        let (service, repository, storage) = service();
        let category = service.add(new_category("c-1")).await.unwrap();

        service.delete("c-1").await.unwrap();

        assert!(repository.get("c-1").is_none());
        assert!(!storage.contains(&category.image));
    }

    #[tokio::test]
    async fn delete_unknown_uuid_is_not_found() {
        let (service, _, storage) = service();
        storage.fail_deletes(true);

        let err = service.delete("missing").await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotFound));
    }

    #[tokio::test]
    async fn failed_image_delete_keeps_record_deleted() {
        let (service, repository, storage) = service();
        service.add(new_category("c-1")).await.unwrap();
        storage.fail_deletes(true);

        let err = service.delete("c-1").await.unwrap_err();

        assert_eq!(err.code(), None);
        assert!(repository.get("c-1").is_none());
    }
}
