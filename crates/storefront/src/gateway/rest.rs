//! PostgREST adapter for the hosted data store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use esther_core::drafts::{NewCategory, NewProduct, NewSectionImage};
use esther_core::{Category, CategoryId, Product, ProductId, SectionImage, SectionImageId};
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use super::{CatalogGateway, GatewayError};
use crate::config::SupabaseConfig;

const PRODUCTS: &str = "products";
const CATEGORIES: &str = "categories";
const SECTION_IMAGES: &str = "section_images";

/// Client for the data store's REST interface.
#[derive(Clone)]
pub struct RestGateway {
    client: reqwest::Client,
    /// `<project url>/rest/v1`, without trailing slash.
    base_url: String,
}

/// Update body; the store does not bump `updated_at` by itself.
#[derive(Serialize)]
struct Touched<'a, T> {
    #[serde(flatten)]
    fields: &'a T,
    updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct ImageUrlUpdate<'a> {
    image_url: &'a str,
}

impl RestGateway {
    /// Create a new data store client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &SupabaseConfig) -> Result<Self, GatewayError> {
        let key = config.anon_key.expose_secret();
        let mut headers = HeaderMap::new();

        headers.insert(
            "apikey",
            HeaderValue::from_str(key)
                .map_err(|e| GatewayError::Unavailable(format!("Invalid API key format: {e}")))?,
        );
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| GatewayError::Unavailable(format!("Invalid API key format: {e}")))?,
        );
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        // Writes echo the stored rows back.
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: rest_base_url(config.url.as_str()),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{table}", self.base_url)
    }

    fn row_url(&self, table: &str, id: &str) -> String {
        format!("{}/{table}?id=eq.{}", self.base_url, urlencoding::encode(id))
    }

    /// Send a request and decode the JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, GatewayError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Data store returned non-success status"
            );
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse data store response"
            );
            GatewayError::Parse(e)
        })
    }

    /// Send a request that returns the affected rows and keep the first one.
    async fn send_one<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T, GatewayError> {
        let rows: Vec<T> = self.send(request).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| GatewayError::NotFound(what.to_string()))
    }

    async fn delete_row(&self, table: &str, id: &str) -> Result<(), GatewayError> {
        let rows: Vec<serde_json::Value> = self
            .send(self.client.delete(self.row_url(table, id)))
            .await?;
        if rows.is_empty() {
            return Err(GatewayError::NotFound(format!("{table} {id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogGateway for RestGateway {
    #[instrument(skip(self))]
    async fn ping(&self) -> Result<(), GatewayError> {
        let url = format!("{}?select=id&limit=1", self.table_url(CATEGORIES));
        let _: Vec<serde_json::Value> = self.send(self.client.get(url)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, GatewayError> {
        let url = format!("{}?select=*&order=name.asc", self.table_url(PRODUCTS));
        self.send(self.client.get(url)).await
    }

    #[instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<Category>, GatewayError> {
        let url = format!("{}?select=*&order=name.asc", self.table_url(CATEGORIES));
        self.send(self.client.get(url)).await
    }

    #[instrument(skip(self))]
    async fn list_section_images(&self) -> Result<Vec<SectionImage>, GatewayError> {
        let url = format!("{}?select=*", self.table_url(SECTION_IMAGES));
        self.send(self.client.get(url)).await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: &ProductId) -> Result<Product, GatewayError> {
        let url = format!("{}&select=*", self.row_url(PRODUCTS, id.as_str()));
        self.send_one(self.client.get(url), &format!("product {id}"))
            .await
    }

    #[instrument(skip(self, product), fields(name = %product.name))]
    async fn insert_product(&self, product: &NewProduct) -> Result<Product, GatewayError> {
        let request = self.client.post(self.table_url(PRODUCTS)).json(product);
        self.send_one(request, "inserted product").await
    }

    #[instrument(skip(self, product), fields(product_id = %id))]
    async fn update_product(
        &self,
        id: &ProductId,
        product: &NewProduct,
    ) -> Result<Product, GatewayError> {
        let body = Touched {
            fields: product,
            updated_at: Utc::now(),
        };
        let request = self
            .client
            .patch(self.row_url(PRODUCTS, id.as_str()))
            .json(&body);
        self.send_one(request, &format!("product {id}")).await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn delete_product(&self, id: &ProductId) -> Result<(), GatewayError> {
        self.delete_row(PRODUCTS, id.as_str()).await
    }

    #[instrument(skip(self, category), fields(name = %category.name))]
    async fn insert_category(&self, category: &NewCategory) -> Result<Category, GatewayError> {
        let request = self.client.post(self.table_url(CATEGORIES)).json(category);
        self.send_one(request, "inserted category").await
    }

    #[instrument(skip(self), fields(category_id = %id))]
    async fn delete_category(&self, id: &CategoryId) -> Result<(), GatewayError> {
        self.delete_row(CATEGORIES, id.as_str()).await
    }

    #[instrument(skip(self, image), fields(section = %image.gender))]
    async fn insert_section_image(
        &self,
        image: &NewSectionImage,
    ) -> Result<SectionImage, GatewayError> {
        let request = self.client.post(self.table_url(SECTION_IMAGES)).json(image);
        self.send_one(request, "inserted section image").await
    }

    #[instrument(skip(self, image_url), fields(section_image_id = %id))]
    async fn update_section_image(
        &self,
        id: &SectionImageId,
        image_url: &str,
    ) -> Result<SectionImage, GatewayError> {
        let body = Touched {
            fields: &ImageUrlUpdate { image_url },
            updated_at: Utc::now(),
        };
        let request = self
            .client
            .patch(self.row_url(SECTION_IMAGES, id.as_str()))
            .json(&body);
        self.send_one(request, &format!("section image {id}")).await
    }

    #[instrument(skip(self), fields(section_image_id = %id))]
    async fn delete_section_image(&self, id: &SectionImageId) -> Result<(), GatewayError> {
        self.delete_row(SECTION_IMAGES, id.as_str()).await
    }
}

/// REST root of a project URL.
fn rest_base_url(project_url: &str) -> String {
    format!("{}/rest/v1", project_url.trim_end_matches('/'))
}
