//! Catalog kept in process memory.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use esther_core::catalog::{sort_categories, sort_products};
use esther_core::drafts::{NewCategory, NewProduct, NewSectionImage};
use esther_core::{
    Category, CategoryId, Product, ProductId, SectionImage, SectionImageId,
};
use uuid::Uuid;

use super::{CatalogGateway, GatewayError};

#[derive(Debug, Default)]
struct Tables {
    products: Vec<Product>,
    categories: Vec<Category>,
    section_images: Vec<SectionImage>,
}

/// Gateway over in-memory tables.
///
/// Ids are generated the way the hosted store does (random UUIDs). Reads can
/// be switched to fail with [`GatewayError::Unavailable`] to exercise
/// degraded paths.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
    reads: AtomicUsize,
}

impl InMemoryGateway {
    /// Gateway preloaded with records.
    #[must_use]
    pub fn with_catalog(
        products: Vec<Product>,
        categories: Vec<Category>,
        section_images: Vec<SectionImage>,
    ) -> Self {
        Self {
            tables: RwLock::new(Tables {
                products,
                categories,
                section_images,
            }),
            ..Self::default()
        }
    }

    /// Make every call fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of read calls served so far.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), GatewayError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("in-memory store offline".to_string()));
        }
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, GatewayError> {
        self.check()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.tables.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, GatewayError> {
        self.check()?;
        Ok(self.tables.write().unwrap_or_else(PoisonError::into_inner))
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn product_from(id: ProductId, draft: &NewProduct) -> Product {
    let now = Utc::now();
    Product {
        id,
        name: draft.name.clone(),
        price: draft.price,
        description: draft.description.clone(),
        image_urls: draft.image_urls.clone(),
        category_id: draft.category_id.clone(),
        gender: draft.gender,
        colors: draft.colors.clone(),
        sizes: draft.sizes.clone(),
        created_at: Some(now),
        updated_at: Some(now),
    }
}

#[async_trait]
impl CatalogGateway for InMemoryGateway {
    async fn ping(&self) -> Result<(), GatewayError> {
        self.check()
    }

    async fn list_products(&self) -> Result<Vec<Product>, GatewayError> {
        let mut products = self.read()?.products.clone();
        sort_products(&mut products);
        Ok(products)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, GatewayError> {
        let mut categories = self.read()?.categories.clone();
        sort_categories(&mut categories);
        Ok(categories)
    }

    async fn list_section_images(&self) -> Result<Vec<SectionImage>, GatewayError> {
        Ok(self.read()?.section_images.clone())
    }

    async fn get_product(&self, id: &ProductId) -> Result<Product, GatewayError> {
        self.read()?
            .products
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("product {id}")))
    }

    async fn insert_product(&self, product: &NewProduct) -> Result<Product, GatewayError> {
        let record = product_from(ProductId::new(new_id()), product);
        self.write()?.products.push(record.clone());
        Ok(record)
    }

    async fn update_product(
        &self,
        id: &ProductId,
        product: &NewProduct,
    ) -> Result<Product, GatewayError> {
        let mut tables = self.write()?;
        let existing = tables
            .products
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| GatewayError::NotFound(format!("product {id}")))?;

        let created_at = existing.created_at;
        *existing = product_from(id.clone(), product);
        existing.created_at = created_at;
        Ok(existing.clone())
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), GatewayError> {
        let mut tables = self.write()?;
        let before = tables.products.len();
        tables.products.retain(|p| &p.id != id);
        if tables.products.len() == before {
            return Err(GatewayError::NotFound(format!("product {id}")));
        }
        Ok(())
    }

    async fn insert_category(&self, category: &NewCategory) -> Result<Category, GatewayError> {
        let now = Utc::now();
        let record = Category {
            id: CategoryId::new(new_id()),
            name: category.name.clone(),
            gender: category.gender,
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.write()?.categories.push(record.clone());
        Ok(record)
    }

    async fn delete_category(&self, id: &CategoryId) -> Result<(), GatewayError> {
        let mut tables = self.write()?;
        let before = tables.categories.len();
        tables.categories.retain(|c| &c.id != id);
        if tables.categories.len() == before {
            return Err(GatewayError::NotFound(format!("category {id}")));
        }
        Ok(())
    }

    async fn insert_section_image(
        &self,
        image: &NewSectionImage,
    ) -> Result<SectionImage, GatewayError> {
        let now = Utc::now();
        let record = SectionImage {
            id: SectionImageId::new(new_id()),
            gender: image.gender,
            image_url: image.image_url.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.write()?.section_images.push(record.clone());
        Ok(record)
    }

    async fn update_section_image(
        &self,
        id: &SectionImageId,
        image_url: &str,
    ) -> Result<SectionImage, GatewayError> {
        let mut tables = self.write()?;
        let existing = tables
            .section_images
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| GatewayError::NotFound(format!("section image {id}")))?;
        image_url.clone_into(&mut existing.image_url);
        existing.updated_at = Some(Utc::now());
        Ok(existing.clone())
    }

    async fn delete_section_image(&self, id: &SectionImageId) -> Result<(), GatewayError> {
        let mut tables = self.write()?;
        let before = tables.section_images.len();
        tables.section_images.retain(|s| &s.id != id);
        if tables.section_images.len() == before {
            return Err(GatewayError::NotFound(format!("section image {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use esther_core::drafts::ProductDraft;
    use esther_core::Gender;

    fn draft(name: &str) -> NewProduct {
        ProductDraft {
            name: name.to_string(),
            price: "10".to_string(),
            category_id: "c1".to_string(),
            gender: Gender::Men,
            ..ProductDraft::default()
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn test_products_are_listed_by_name() {
        let gateway = InMemoryGateway::default();
        gateway.insert_product(&draft("Zapatos")).await.unwrap();
        gateway.insert_product(&draft("Abrigo")).await.unwrap();

        let names: Vec<String> = gateway
            .list_products()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Abrigo", "Zapatos"]);
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_product() {
        let gateway = InMemoryGateway::default();
        let missing = ProductId::new("missing");
        assert!(matches!(
            gateway.update_product(&missing, &draft("X")).await,
            Err(GatewayError::NotFound(_))
        ));
        assert!(matches!(
            gateway.delete_product(&missing).await,
            Err(GatewayError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_created_at() {
        let gateway = InMemoryGateway::default();
        let saved = gateway.insert_product(&draft("Camisa")).await.unwrap();
        let updated = gateway
            .update_product(&saved.id, &draft("Camisa Azul"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Camisa Azul");
        assert_eq!(updated.created_at, saved.created_at);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let gateway = InMemoryGateway::default();
        gateway.set_unavailable(true);
        assert!(matches!(
            gateway.list_categories().await,
            Err(GatewayError::Unavailable(_))
        ));
    }
}
