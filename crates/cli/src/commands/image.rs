//! Image binary commands.

use esther_storefront::admin::AdminService;

use super::CliError;

/// Delete an image by delivery URL or public id.
///
/// Product records are left untouched; remove references first with
/// `product remove-image`.
pub async fn delete(admin: &AdminService, target: &str) -> Result<(), CliError> {
    if admin.delete_image(target).await? {
        tracing::info!("Deleted {target}");
    } else {
        tracing::warn!("{target} is not served by the image CDN, nothing deleted");
    }
    Ok(())
}
