//! Access to the hosted catalog data store.
//!
//! # Architecture
//!
//! - [`CatalogGateway`] is the only way products, categories and section images
//!   are read or written; vendor request shapes stay inside the adapters
//! - [`RestGateway`] speaks the PostgREST dialect of the hosted store
//! - [`CachedGateway`] wraps any gateway with an in-memory `moka` cache
//!   (5 minute TTL) that every write invalidates
//! - [`InMemoryGateway`] keeps the catalog in process, for tests and demos
//!
//! Nothing here retries. Failures surface as [`GatewayError`] and the caller
//! decides whether to log, fall back or give up.

mod cache;
mod memory;
mod rest;

pub use cache::CachedGateway;
pub use memory::InMemoryGateway;
pub use rest::RestGateway;

use async_trait::async_trait;
use esther_core::drafts::{NewCategory, NewProduct, NewSectionImage};
use esther_core::{Category, CategoryId, Product, ProductId, SectionImage, SectionImageId};
use thiserror::Error;

/// Errors that can occur when talking to the data store.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Record not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The store could not be reached.
    #[error("Unavailable: {0}")]
    Unavailable(String),
}

/// Operations the storefront and admin tools need from the data store.
///
/// List operations return records ordered by name where records have one.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Round-trip to the store. Never answered from a cache.
    async fn ping(&self) -> Result<(), GatewayError>;

    async fn list_products(&self) -> Result<Vec<Product>, GatewayError>;

    async fn list_categories(&self) -> Result<Vec<Category>, GatewayError>;

    async fn list_section_images(&self) -> Result<Vec<SectionImage>, GatewayError>;

    /// Fetch one product, [`GatewayError::NotFound`] if it does not exist.
    async fn get_product(&self, id: &ProductId) -> Result<Product, GatewayError>;

    async fn insert_product(&self, product: &NewProduct) -> Result<Product, GatewayError>;

    /// Replace every editable field of an existing product.
    async fn update_product(
        &self,
        id: &ProductId,
        product: &NewProduct,
    ) -> Result<Product, GatewayError>;

    async fn delete_product(&self, id: &ProductId) -> Result<(), GatewayError>;

    async fn insert_category(&self, category: &NewCategory) -> Result<Category, GatewayError>;

    async fn delete_category(&self, id: &CategoryId) -> Result<(), GatewayError>;

    async fn insert_section_image(
        &self,
        image: &NewSectionImage,
    ) -> Result<SectionImage, GatewayError>;

    async fn update_section_image(
        &self,
        id: &SectionImageId,
        image_url: &str,
    ) -> Result<SectionImage, GatewayError>;

    async fn delete_section_image(&self, id: &SectionImageId) -> Result<(), GatewayError>;
}
