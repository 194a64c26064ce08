//! Catalog administration.
//!
//! Every operation validates its input before touching the gateway or the
//! image store. Authentication is out of scope: whoever holds an
//! [`AdminService`] is trusted.

use std::sync::Arc;

use esther_core::drafts::{CategoryDraft, DraftError, NewProduct, NewSectionImage, ProductDraft};
use esther_core::upload::{ImageFile, UploadError, UploadPolicy};
use esther_core::{Category, CategoryId, ColorId, Product, ProductId, SectionImage, SectionKey};
use thiserror::Error;

use crate::gateway::{CatalogGateway, GatewayError};
use crate::media::{BatchUpload, ImageStoreError, ImageUploader, MediaError, remove_reference};

/// Errors from admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Invalid input: {0}")]
    Draft(#[from] DraftError),

    #[error("Invalid upload: {0}")]
    Upload(#[from] UploadError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Image store error: {0}")]
    ImageStore(#[from] ImageStoreError),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<MediaError> for AdminError {
    fn from(error: MediaError) -> Self {
        match error {
            MediaError::Invalid(e) => Self::Upload(e),
            MediaError::Store(e) => Self::ImageStore(e),
        }
    }
}

/// Full catalog snapshot for admin listings.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub section_images: Vec<SectionImage>,
}

/// Result of adding images to a product or color gallery.
#[derive(Debug)]
pub struct GalleryUpdate {
    pub product: Product,
    pub batch: BatchUpload,
}

/// Admin operations over the gateway and image store.
#[derive(Clone)]
pub struct AdminService {
    gateway: Arc<dyn CatalogGateway>,
    uploader: ImageUploader,
}

impl AdminService {
    #[must_use]
    pub fn new(gateway: Arc<dyn CatalogGateway>, uploader: ImageUploader) -> Self {
        Self { gateway, uploader }
    }

    /// Load products, categories and section images concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first gateway error.
    pub async fn snapshot(&self) -> Result<CatalogSnapshot, AdminError> {
        let (products, categories, section_images) = tokio::try_join!(
            self.gateway.list_products(),
            self.gateway.list_categories(),
            self.gateway.list_section_images(),
        )?;
        Ok(CatalogSnapshot {
            products,
            categories,
            section_images,
        })
    }

    /// # Errors
    ///
    /// Returns [`AdminError::Draft`] for a blank name, or the gateway error.
    pub async fn add_category(&self, draft: CategoryDraft) -> Result<Category, AdminError> {
        let category = draft.validate()?;
        let saved = self.gateway.insert_category(&category).await.map_err(|e| {
            tracing::error!(error = %e, name = %category.name, "Failed to add category");
            e
        })?;
        tracing::info!(category_id = %saved.id, name = %saved.name, "Category added");
        Ok(saved)
    }

    /// # Errors
    ///
    /// Returns the gateway error.
    pub async fn delete_category(&self, id: &CategoryId) -> Result<(), AdminError> {
        self.gateway.delete_category(id).await.map_err(|e| {
            tracing::error!(error = %e, category_id = %id, "Failed to delete category");
            e
        })?;
        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`AdminError::Draft`] for invalid input, or the gateway error.
    pub async fn add_product(&self, draft: ProductDraft) -> Result<Product, AdminError> {
        let product = draft.validate()?;
        let saved = self.gateway.insert_product(&product).await.map_err(|e| {
            tracing::error!(error = %e, name = %product.name, "Failed to add product");
            e
        })?;
        tracing::info!(product_id = %saved.id, name = %saved.name, "Product added");
        Ok(saved)
    }

    /// # Errors
    ///
    /// Returns the gateway error, [`GatewayError::NotFound`] for an unknown id.
    pub async fn product(&self, id: &ProductId) -> Result<Product, AdminError> {
        Ok(self.gateway.get_product(id).await?)
    }

    /// Replace a product's editable fields.
    ///
    /// Sizes still offered keep their ids.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Draft`] for invalid input, or the gateway error.
    pub async fn update_product(
        &self,
        id: &ProductId,
        draft: ProductDraft,
    ) -> Result<Product, AdminError> {
        let mut product = draft.validate()?;
        let existing = self.gateway.get_product(id).await?;
        product.keep_size_ids(&existing.sizes);
        self.save(id, &product).await
    }

    /// Delete a product record. Its images stay in the image store.
    ///
    /// # Errors
    ///
    /// Returns the gateway error.
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), AdminError> {
        self.gateway.delete_product(id).await.map_err(|e| {
            tracing::error!(error = %e, product_id = %id, "Failed to delete product");
            e
        })?;
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Point a section at `image_url`, updating its record or creating one.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Draft`] for a blank url, or the gateway error.
    pub async fn set_section_image(
        &self,
        key: SectionKey,
        image_url: &str,
    ) -> Result<SectionImage, AdminError> {
        let image = NewSectionImage::new(key, image_url)?;
        let existing = self
            .gateway
            .list_section_images()
            .await?
            .into_iter()
            .find(|s| s.gender == key);

        let saved = match existing {
            Some(record) => {
                self.gateway
                    .update_section_image(&record.id, &image.image_url)
                    .await?
            }
            None => self.gateway.insert_section_image(&image).await?,
        };
        tracing::info!(section = %key, "Section image set");
        Ok(saved)
    }

    /// Drop the record of a section so the storefront shows its placeholder.
    ///
    /// Returns `false` if the section had no image. The binary is kept.
    ///
    /// # Errors
    ///
    /// Returns the gateway error.
    pub async fn clear_section_image(&self, key: SectionKey) -> Result<bool, AdminError> {
        let existing = self
            .gateway
            .list_section_images()
            .await?
            .into_iter()
            .find(|s| s.gender == key);

        let Some(record) = existing else {
            return Ok(false);
        };
        self.gateway.delete_section_image(&record.id).await.map_err(|e| {
            tracing::error!(error = %e, section = %key, "Failed to clear section image");
            e
        })?;
        tracing::info!(section = %key, "Section image cleared");
        Ok(true)
    }

    /// Upload a banner and point the section at it.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Upload`] before any network call for an invalid
    /// file, or the image store or gateway error.
    pub async fn upload_section_image(
        &self,
        key: SectionKey,
        file: &ImageFile,
    ) -> Result<SectionImage, AdminError> {
        let stored = self
            .uploader
            .upload_one(UploadPolicy::SECTION_IMAGE, file)
            .await?;
        self.set_section_image(key, &stored.url).await
    }

    /// Upload general images and append them to the product.
    ///
    /// Images uploaded before a failing file are kept and saved.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Upload`] before any upload when a file or the
    /// gallery capacity is invalid, or the gateway error.
    pub async fn add_product_images(
        &self,
        id: &ProductId,
        files: &[ImageFile],
    ) -> Result<GalleryUpdate, AdminError> {
        let mut product = NewProduct::from(&self.gateway.get_product(id).await?);
        let batch = self
            .uploader
            .upload_batch(UploadPolicy::PRODUCT_GALLERY, product.image_urls.len(), files)
            .await?;

        product.image_urls.extend(batch.urls());
        let product = self.save(id, &product).await?;
        Ok(GalleryUpdate { product, batch })
    }

    /// Upload images for one color variant and append them to it.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotFound`] for an unknown color,
    /// [`AdminError::Upload`] before any upload for invalid files, or the
    /// gateway error.
    pub async fn add_color_images(
        &self,
        id: &ProductId,
        color_id: &ColorId,
        files: &[ImageFile],
    ) -> Result<GalleryUpdate, AdminError> {
        let mut product = NewProduct::from(&self.gateway.get_product(id).await?);
        let color = product
            .colors
            .iter_mut()
            .find(|c| &c.id == color_id)
            .ok_or_else(|| AdminError::NotFound(format!("color {color_id}")))?;

        let batch = self
            .uploader
            .upload_batch(UploadPolicy::COLOR_GALLERY, color.image_urls.len(), files)
            .await?;
        color.image_urls.extend(batch.urls());

        let product = self.save(id, &product).await?;
        Ok(GalleryUpdate { product, batch })
    }

    /// Remove an image reference from a product and all its colors.
    ///
    /// The binary stays in the image store; use [`Self::delete_image`] to
    /// remove it explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotFound`] if no gallery referenced `url`, or the
    /// gateway error.
    pub async fn remove_product_image(
        &self,
        id: &ProductId,
        url: &str,
    ) -> Result<Product, AdminError> {
        let mut product = NewProduct::from(&self.gateway.get_product(id).await?);

        let mut removed = remove_reference(&mut product.image_urls, url);
        for color in &mut product.colors {
            removed |= remove_reference(&mut color.image_urls, url);
        }
        if !removed {
            return Err(AdminError::NotFound(format!("image {url} on product {id}")));
        }

        self.save(id, &product).await
    }

    /// Delete an image binary by delivery URL or public reference id.
    ///
    /// Returns `false` when a URL is not served by the CDN. A failure is
    /// logged and returned; records are never touched.
    ///
    /// # Errors
    ///
    /// Returns the image store error.
    pub async fn delete_image(&self, url_or_public_id: &str) -> Result<bool, AdminError> {
        let result = if url_or_public_id.contains("://") {
            self.uploader.delete_by_url(url_or_public_id).await
        } else {
            self.uploader.delete(url_or_public_id).await.map(|()| true)
        };

        result.map_err(|e| {
            tracing::warn!(error = %e, image = %url_or_public_id, "Image deletion failed");
            AdminError::ImageStore(e)
        })
    }

    async fn save(&self, id: &ProductId, product: &NewProduct) -> Result<Product, AdminError> {
        let saved = self
            .gateway
            .update_product(id, product)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, product_id = %id, "Failed to update product");
                e
            })?;
        tracing::info!(product_id = %id, "Product updated");
        Ok(saved)
    }
}
