//! Upload rules shared by every admin call site.

use std::sync::Arc;

use esther_core::image_ref::cdn_public_id;
use esther_core::upload::{ImageFile, UploadError, UploadPolicy};

use super::{ImageStore, ImageStoreError, MediaError, StoredImage};

/// Outcome of a batch upload.
#[derive(Debug, Default)]
pub struct BatchUpload {
    /// Uploaded images, in input order.
    pub uploaded: Vec<StoredImage>,
    /// Files the store rejected, with the reason.
    pub failed: Vec<(String, ImageStoreError)>,
}

impl BatchUpload {
    /// Delivery URLs of the uploaded images.
    #[must_use]
    pub fn urls(&self) -> Vec<String> {
        self.uploaded.iter().map(|image| image.url.clone()).collect()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Validates files and pushes them to an [`ImageStore`].
#[derive(Clone)]
pub struct ImageUploader {
    store: Arc<dyn ImageStore>,
}

impl ImageUploader {
    #[must_use]
    pub fn new(store: Arc<dyn ImageStore>) -> Self {
        Self { store }
    }

    /// Upload `files` into a gallery that already holds `existing` images.
    ///
    /// Every file and the gallery capacity are checked before the first
    /// network call. Once uploading starts, a failed file is logged and
    /// skipped; files uploaded before it are kept.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError`] if any file breaks `policy`; nothing is uploaded
    /// in that case.
    pub async fn upload_batch(
        &self,
        policy: UploadPolicy,
        existing: usize,
        files: &[ImageFile],
    ) -> Result<BatchUpload, UploadError> {
        policy.check_capacity(existing, files.len())?;
        for file in files {
            policy.validate(file)?;
        }

        let mut outcome = BatchUpload::default();
        for file in files {
            match self.store.upload(file, policy.folder).await {
                Ok(image) => outcome.uploaded.push(image),
                Err(e) => {
                    tracing::error!(error = %e, file_name = %file.file_name, "Image upload failed");
                    outcome.failed.push((file.file_name.clone(), e));
                }
            }
        }

        tracing::info!(
            uploaded = outcome.uploaded.len(),
            failed = outcome.failed.len(),
            folder = %policy.folder,
            "Batch upload finished"
        );
        Ok(outcome)
    }

    /// Validate and upload a single file.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Invalid`] before any network call if the file
    /// breaks `policy`, or [`MediaError::Store`] if the upload fails.
    pub async fn upload_one(
        &self,
        policy: UploadPolicy,
        file: &ImageFile,
    ) -> Result<StoredImage, MediaError> {
        policy.validate(file)?;
        let image = self.store.upload(file, policy.folder).await.map_err(|e| {
            tracing::error!(error = %e, file_name = %file.file_name, "Image upload failed");
            e
        })?;
        Ok(image)
    }

    /// Delete the binary behind a CDN delivery URL.
    ///
    /// Returns `false` without calling the store when `url` is not a CDN URL.
    ///
    /// # Errors
    ///
    /// Returns [`ImageStoreError`] if the store call fails.
    pub async fn delete_by_url(&self, url: &str) -> Result<bool, ImageStoreError> {
        let Some(public_id) = cdn_public_id(url) else {
            tracing::warn!(url = %url, "Not a CDN url, nothing to delete");
            return Ok(false);
        };
        self.store.delete(&public_id).await?;
        Ok(true)
    }

    /// Delete a binary by public reference id.
    ///
    /// # Errors
    ///
    /// Returns [`ImageStoreError`] if the store call fails.
    pub async fn delete(&self, public_id: &str) -> Result<(), ImageStoreError> {
        self.store.delete(public_id).await
    }
}

/// Drop `url` from an image list.
///
/// Only the reference goes away; the binary stays in the image store.
/// Returns whether anything was removed.
pub fn remove_reference(urls: &mut Vec<String>, url: &str) -> bool {
    let before = urls.len();
    urls.retain(|existing| existing != url);
    let removed = urls.len() != before;
    if removed {
        tracing::info!(url = %url, "Image reference removed, binary kept in store");
    }
    removed
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use esther_core::upload::ImageFolder;

    use super::*;

    /// Store double recording calls; files named `fail*` are rejected.
    #[derive(Default)]
    struct RecordingStore {
        uploads: Mutex<Vec<String>>,
        deletes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ImageStore for RecordingStore {
        async fn upload(
            &self,
            file: &ImageFile,
            folder: ImageFolder,
        ) -> Result<StoredImage, ImageStoreError> {
            self.uploads.lock().unwrap().push(file.file_name.clone());
            if file.file_name.starts_with("fail") {
                return Err(ImageStoreError::Api {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            let stem = file.file_name.split('.').next().unwrap_or_default();
            Ok(StoredImage {
                url: format!("https://res.cloudinary.com/demo/image/upload/v1/{folder}/{}", file.file_name),
                public_id: format!("{folder}/{stem}"),
            })
        }

        async fn delete(&self, public_id: &str) -> Result<(), ImageStoreError> {
            self.deletes.lock().unwrap().push(public_id.to_string());
            Ok(())
        }
    }

    fn png(name: &str, size: usize) -> ImageFile {
        ImageFile::new(name, "image/png", vec![1; size])
    }

    fn uploader() -> (Arc<RecordingStore>, ImageUploader) {
        let store = Arc::new(RecordingStore::default());
        (store.clone(), ImageUploader::new(store))
    }

    #[tokio::test]
    async fn test_oversized_file_never_reaches_store() {
        let (store, uploader) = uploader();
        let files = vec![png("small.png", 10), png("big.png", 6 * 1024 * 1024)];

        let result = uploader
            .upload_batch(UploadPolicy::PRODUCT_GALLERY, 0, &files)
            .await;

        assert!(matches!(result, Err(UploadError::TooLarge { .. })));
        assert!(store.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_capacity_checked_before_upload() {
        let (store, uploader) = uploader();
        let files = vec![png("a.png", 10), png("b.png", 10)];

        let result = uploader
            .upload_batch(UploadPolicy::PRODUCT_GALLERY, 4, &files)
            .await;

        assert!(matches!(result, Err(UploadError::TooManyImages { .. })));
        assert!(store.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_file_keeps_earlier_uploads() {
        let (store, uploader) = uploader();
        let files = vec![png("a.png", 10), png("fail.png", 10), png("c.png", 10)];

        let outcome = uploader
            .upload_batch(UploadPolicy::COLOR_GALLERY, 0, &files)
            .await
            .unwrap();

        assert_eq!(outcome.uploaded.len(), 2);
        assert_eq!(outcome.failed.len(), 1);
        assert!(!outcome.is_complete());
        assert_eq!(store.uploads.lock().unwrap().len(), 3);
        assert!(outcome.urls()[0].contains("esther/products/a.png"));
    }

    #[tokio::test]
    async fn test_section_image_uses_section_folder() {
        let (_, uploader) = uploader();
        let image = uploader
            .upload_one(UploadPolicy::SECTION_IMAGE, &png("men.png", 8 * 1024 * 1024))
            .await
            .unwrap();
        assert_eq!(image.public_id, "esther/sections/men");
    }

    #[tokio::test]
    async fn test_delete_by_url() {
        let (store, uploader) = uploader();

        let deleted = uploader
            .delete_by_url("https://res.cloudinary.com/demo/image/upload/v17/esther/products/a.png")
            .await
            .unwrap();
        assert!(deleted);

        let skipped = uploader
            .delete_by_url("https://drive.google.com/uc?export=view&id=1")
            .await
            .unwrap();
        assert!(!skipped);

        assert_eq!(*store.deletes.lock().unwrap(), vec!["esther/products/a"]);
    }

    #[test]
    fn test_remove_reference_only_touches_list() {
        let mut urls = vec!["a.jpg".to_string(), "b.jpg".to_string()];
        assert!(remove_reference(&mut urls, "a.jpg"));
        assert!(!remove_reference(&mut urls, "zzz.jpg"));
        assert_eq!(urls, vec!["b.jpg"]);
    }
}
