//! Catalog listing.

use esther_core::catalog::category_name;
use esther_storefront::admin::AdminService;

use super::CliError;

/// Log every category, product and section banner.
pub async fn list(admin: &AdminService) -> Result<(), CliError> {
    let snapshot = admin.snapshot().await?;

    tracing::info!("Categories ({}):", snapshot.categories.len());
    for category in &snapshot.categories {
        tracing::info!(
            "  {}  {} [{}]",
            category.id,
            category.name,
            category.gender.display_name()
        );
    }

    tracing::info!("Products ({}):", snapshot.products.len());
    for product in &snapshot.products {
        let category = category_name(&snapshot.categories, &product.category_id).unwrap_or("-");
        let images = product.image_urls.len()
            + product
                .colors
                .iter()
                .map(|c| c.image_urls.len())
                .sum::<usize>();
        tracing::info!(
            "  {}  {} - {} Bs [{} / {}] {} colors, {} images",
            product.id,
            product.name,
            product.price.display(),
            product.gender.display_name(),
            category,
            product.colors.len(),
            images
        );
        if product.has_no_images() {
            tracing::warn!("  {} has no images and shows the placeholder", product.id);
        }
    }

    tracing::info!("Sections ({}):", snapshot.section_images.len());
    for section in &snapshot.section_images {
        tracing::info!("  {}  {}", section.gender, section.image_url);
    }

    Ok(())
}
