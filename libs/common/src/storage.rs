//! Object storage for record images
//!
//! Images are written under a per-resource folder (`category/`, `product/`)
//! and addressed by an opaque location string. The location is enough to
//! derive the object key again when the owning record is deleted.

use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_s3::{Client, primitives::ByteStream};
use std::env;
use tracing::info;

use crate::error::Result;

/// Blob store capability consumed by the resource services
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `image` under a name derived from `id`, returning its location
    async fn upload(&self, id: &str, image: Vec<u8>) -> Result<String>;

    /// Remove the object a previous `upload` returned `location` for
    async fn delete(&self, location: &str) -> Result<()>;
}

/// Content type sniffed from the leading bytes, with the file extension to use
pub fn detect_content_type(data: &[u8]) -> (&'static str, &'static str) {
    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

    if data.starts_with(PNG) {
        ("image/png", "png")
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        ("image/jpeg", "jpeg")
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        ("image/gif", "gif")
    } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        ("image/webp", "webp")
    } else if data.starts_with(b"BM") {
        ("image/bmp", "bmp")
    } else {
        ("application/octet-stream", "bin")
    }
}

/// Object key for a location: the folder plus the location's last segment
pub fn object_key(folder: &str, location: &str) -> String {
    let filename = location.rsplit('/').next().unwrap_or(location);
    format!("{}/{}", folder, filename)
}

/// S3 configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket the images are written to
    pub bucket: String,
    /// Public URL prefix the locations are built from
    pub public_url: String,
}

impl StorageConfig {
    /// Create a new StorageConfig from environment variables
    ///
    /// # Environment Variables
    /// - `BUCKET_NAME`: Target bucket
    /// - `BUCKET_PUBLIC_URL`: Location prefix (default: `https://{bucket}.s3.amazonaws.com`)
    pub fn from_env() -> anyhow::Result<Self> {
        let bucket = env::var("BUCKET_NAME")
            .map_err(|_| anyhow::anyhow!("BUCKET_NAME environment variable not set"))?;

        let public_url = env::var("BUCKET_PUBLIC_URL")
            .unwrap_or_else(|_| format!("https://{}.s3.amazonaws.com", bucket));

        Ok(StorageConfig {
            bucket,
            public_url: public_url.trim_end_matches('/').to_string(),
        })
    }
}

/// S3-backed image storage for one resource folder
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    config: StorageConfig,
    folder: &'static str,
}

impl S3Storage {
    pub fn new(client: Client, config: StorageConfig, folder: &'static str) -> Self {
        Self {
            client,
            config,
            folder,
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn upload(&self, id: &str, image: Vec<u8>) -> Result<String> {
        let (content_type, extension) = detect_content_type(&image);
        let key = format!("{}/{}.{}", self.folder, id, extension);

        info!("Uploading image to S3: {}", key);

        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(&key)
            .body(ByteStream::from(image))
            .content_type(content_type)
            .send()
            .await
            .context("error uploading image")?;

        Ok(format!("{}/{}", self.config.public_url, key))
    }

    async fn delete(&self, location: &str) -> Result<()> {
        let key = object_key(self.folder, location);

        info!("Deleting image from S3: {}", key);

        self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(&key)
            .send()
            .await
            .context("error deleting image")?;

        Ok(())
    }
}

/// In-memory storage with fault injection for service tests
#[cfg(any(test, feature = "test-support"))]
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    pub struct MemoryStorage {
        folder: &'static str,
        objects: Mutex<HashMap<String, Vec<u8>>>,
        fail_uploads: AtomicBool,
        fail_deletes: AtomicBool,
    }

    impl MemoryStorage {
        pub fn new(folder: &'static str) -> Self {
            Self {
                folder,
                objects: Mutex::new(HashMap::new()),
                fail_uploads: AtomicBool::new(false),
                fail_deletes: AtomicBool::new(false),
            }
        }

        pub fn fail_uploads(&self, fail: bool) {
            self.fail_uploads.store(fail, Ordering::SeqCst);
        }

        pub fn fail_deletes(&self, fail: bool) {
            self.fail_deletes.store(fail, Ordering::SeqCst);
        }

        pub fn contains(&self, location: &str) -> bool {
            let key = object_key(self.folder, location);
            self.objects.lock().unwrap().contains_key(&key)
        }

        pub fn len(&self) -> usize {
            self.objects.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    #[async_trait]
    impl ObjectStorage for MemoryStorage {
        async fn upload(&self, id: &str, image: Vec<u8>) -> Result<String> {
            if self.fail_uploads.load(Ordering::SeqCst) {
                return Err(anyhow::anyhow!("error uploading image: injected failure").into());
            }

            let (_, extension) = detect_content_type(&image);
            let key = format!("{}/{}.{}", self.folder, id, extension);
            self.objects.lock().unwrap().insert(key.clone(), image);

            Ok(format!("memory://bucket/{}", key))
        }

        async fn delete(&self, location: &str) -> Result<()> {
            if self.fail_deletes.load(Ordering::SeqCst) {
                return Err(anyhow::anyhow!("error deleting image: injected failure").into());
            }

            let key = object_key(self.folder, location);
            self.objects.lock().unwrap().remove(&key);
            Ok(())
        }
    }
}
