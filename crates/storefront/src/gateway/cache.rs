//! Read-through cache in front of a gateway.

use std::time::Duration;

use async_trait::async_trait;
use esther_core::drafts::{NewCategory, NewProduct, NewSectionImage};
use esther_core::{Category, CategoryId, Product, ProductId, SectionImage, SectionImageId};
use moka::future::Cache;
use tracing::debug;

use super::{CatalogGateway, GatewayError};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Products,
    Categories,
    SectionImages,
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Products(Vec<Product>),
    Categories(Vec<Category>),
    SectionImages(Vec<SectionImage>),
    Product(Box<Product>),
}

/// Gateway wrapper caching reads for 5 minutes.
///
/// Every write drops the whole cache, whether or not it succeeded.
pub struct CachedGateway<G> {
    inner: G,
    cache: Cache<CacheKey, CacheValue>,
}

impl<G: CatalogGateway> CachedGateway<G> {
    #[must_use]
    pub fn new(inner: G) -> Self {
        Self::with_ttl(inner, Duration::from_secs(300))
    }

    #[must_use]
    pub fn with_ttl(inner: G, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();
        Self { inner, cache }
    }

    #[cfg(test)]
    pub(crate) const fn inner(&self) -> &G {
        &self.inner
    }

    /// Invalidate all cached data.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

#[async_trait]
impl<G: CatalogGateway> CatalogGateway for CachedGateway<G> {
    async fn ping(&self) -> Result<(), GatewayError> {
        self.inner.ping().await
    }

    async fn list_products(&self) -> Result<Vec<Product>, GatewayError> {
        if let Some(CacheValue::Products(products)) = self.cache.get(&CacheKey::Products).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products = self.inner.list_products().await?;
        self.cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, GatewayError> {
        if let Some(CacheValue::Categories(categories)) =
            self.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories = self.inner.list_categories().await?;
        self.cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;
        Ok(categories)
    }

    async fn list_section_images(&self) -> Result<Vec<SectionImage>, GatewayError> {
        if let Some(CacheValue::SectionImages(images)) =
            self.cache.get(&CacheKey::SectionImages).await
        {
            debug!("Cache hit for section images");
            return Ok(images);
        }

        let images = self.inner.list_section_images().await?;
        self.cache
            .insert(
                CacheKey::SectionImages,
                CacheValue::SectionImages(images.clone()),
            )
            .await;
        Ok(images)
    }

    async fn get_product(&self, id: &ProductId) -> Result<Product, GatewayError> {
        let key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.cache.get(&key).await {
            debug!(product_id = %id, "Cache hit for product");
            return Ok(*product);
        }

        let product = self.inner.get_product(id).await?;
        self.cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    async fn insert_product(&self, product: &NewProduct) -> Result<Product, GatewayError> {
        let result = self.inner.insert_product(product).await;
        self.invalidate_all().await;
        result
    }

    async fn update_product(
        &self,
        id: &ProductId,
        product: &NewProduct,
    ) -> Result<Product, GatewayError> {
        let result = self.inner.update_product(id, product).await;
        self.invalidate_all().await;
        result
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), GatewayError> {
        let result = self.inner.delete_product(id).await;
        self.invalidate_all().await;
        result
    }

    async fn insert_category(&self, category: &NewCategory) -> Result<Category, GatewayError> {
        let result = self.inner.insert_category(category).await;
        self.invalidate_all().await;
        result
    }

    async fn delete_category(&self, id: &CategoryId) -> Result<(), GatewayError> {
        let result = self.inner.delete_category(id).await;
        self.invalidate_all().await;
        result
    }

    async fn insert_section_image(
        &self,
        image: &NewSectionImage,
    ) -> Result<SectionImage, GatewayError> {
        let result = self.inner.insert_section_image(image).await;
        self.invalidate_all().await;
        result
    }

    async fn update_section_image(
        &self,
        id: &SectionImageId,
        image_url: &str,
    ) -> Result<SectionImage, GatewayError> {
        let result = self.inner.update_section_image(id, image_url).await;
        self.invalidate_all().await;
        result
    }

    async fn delete_section_image(&self, id: &SectionImageId) -> Result<(), GatewayError> {
        let result = self.inner.delete_section_image(id).await;
        self.invalidate_all().await;
        result
    }
}
