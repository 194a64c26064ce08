//! Admin commands.
//!
//! # Environment Variables
//!
//! - `SUPABASE_URL`, `SUPABASE_ANON_KEY` - Data store endpoint and key
//! - `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_UPLOAD_PRESET` - Image uploads
//! - `CLOUDINARY_API_KEY`, `CLOUDINARY_API_SECRET` - Image deletion

pub mod catalog;
pub mod category;
pub mod image;
pub mod product;
pub mod section;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use esther_core::upload::ImageFile;
use esther_storefront::admin::{AdminError, AdminService};
use esther_storefront::config::{ConfigError, StorefrontConfig};
use esther_storefront::gateway::{GatewayError, RestGateway};
use esther_storefront::media::{CloudinaryStore, ImageUploader};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Admin(#[from] AdminError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Build the admin service from environment configuration.
pub fn admin_service() -> Result<AdminService, CliError> {
    let config = StorefrontConfig::from_env()?;
    let gateway = RestGateway::new(&config.supabase)?;
    let store = CloudinaryStore::new(&config.cloudinary);

    if !config.cloudinary.can_sign() {
        tracing::debug!("Image store credentials not set, deletes will fail");
    }

    Ok(AdminService::new(
        Arc::new(gateway),
        ImageUploader::new(Arc::new(store)),
    ))
}

/// Read an image from disk, guessing its MIME type from the extension.
///
/// Unknown extensions get `application/octet-stream`, which the upload
/// checks reject.
pub async fn read_image(path: &Path) -> Result<ImageFile, CliError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let file_name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    let mime_type = ImageFile::mime_from_extension(&file_name).unwrap_or("application/octet-stream");

    Ok(ImageFile::new(file_name, mime_type, bytes))
}
