//! Section banner commands.

use std::path::Path;

use esther_core::SectionKey;
use esther_storefront::admin::AdminService;

use super::{CliError, read_image};

/// Point `key` at `url`, or upload `file` and point it at the result.
pub async fn set(
    admin: &AdminService,
    key: SectionKey,
    url: Option<&str>,
    file: Option<&Path>,
) -> Result<(), CliError> {
    let section = match (url, file) {
        (_, Some(path)) => {
            let image = read_image(path).await?;
            admin.upload_section_image(key, &image).await?
        }
        (Some(url), None) => admin.set_section_image(key, url).await?,
        (None, None) => admin.set_section_image(key, "").await?,
    };

    tracing::info!("Section {} now shows {}", section.gender, section.image_url);
    Ok(())
}

/// Remove the banner record of `key`; the storefront falls back to its
/// placeholder.
pub async fn clear(admin: &AdminService, key: SectionKey) -> Result<(), CliError> {
    if admin.clear_section_image(key).await? {
        tracing::info!("Section {key} cleared");
    } else {
        tracing::warn!("Section {key} had no image");
    }
    Ok(())
}
