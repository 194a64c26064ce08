//! Image CDN access.
//!
//! [`ImageStore`] uploads binaries and deletes them by public reference id.
//! [`CloudinaryStore`] is the hosted adapter; [`ImageUploader`] adds the
//! validation and batch rules shared by the admin tools.

mod cloudinary;
mod uploader;

pub use cloudinary::CloudinaryStore;
pub use uploader::{BatchUpload, ImageUploader, remove_reference};

use async_trait::async_trait;
use esther_core::upload::{ImageFile, ImageFolder, UploadError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when talking to the image store.
#[derive(Debug, Error)]
pub enum ImageStoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Signed calls need the API key and secret.
    #[error("Image deletion requires CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET")]
    MissingCredentials,

    /// The store refused the operation.
    #[error("Rejected: {0}")]
    Rejected(String),
}

/// Failure of a single validated upload.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error(transparent)]
    Invalid(#[from] UploadError),

    #[error(transparent)]
    Store(#[from] ImageStoreError),
}

/// An uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredImage {
    /// Public HTTPS delivery URL, the value stored on records.
    pub url: String,
    /// Reference id used to delete the binary later.
    pub public_id: String,
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Upload a file into `folder`.
    async fn upload(
        &self,
        file: &ImageFile,
        folder: ImageFolder,
    ) -> Result<StoredImage, ImageStoreError>;

    /// Delete a binary by public reference id. Deleting a missing id succeeds.
    async fn delete(&self, public_id: &str) -> Result<(), ImageStoreError>;
}
