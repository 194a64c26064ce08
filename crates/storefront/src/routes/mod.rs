//! JSON API route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /api/sections                    - Section banner URLs
//! GET  /api/catalog/{gender}?category=  - Categories and product cards of a partition
//! GET  /api/products/{id}?color=&image=&size= - Product detail with gallery state
//! GET  /api/favorites                   - Favorite product cards
//! POST /api/favorites/{id}              - Toggle a favorite
//! ```

pub mod catalog;
pub mod favorites;
pub mod products;
pub mod sections;

use axum::{
    Router,
    routing::{get, post},
};
use esther_core::Product;
use esther_core::gallery::Gallery;
use esther_core::image_ref::resolve;
use serde::Serialize;

use crate::state::AppState;

/// Product summary shown in grids.
#[derive(Debug, Clone, Serialize)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    /// Two decimals, e.g. `"89.99"`.
    pub price: String,
    /// Resolved cover image, `None` renders the placeholder.
    pub image: Option<String>,
    pub favorite: bool,
}

impl ProductCard {
    /// Card for `product`; the cover is the main image of a fresh gallery.
    #[must_use]
    pub fn new(product: &Product, favorite: bool) -> Self {
        let image = Gallery::open(product)
            .main_image(product)
            .map(resolve)
            .filter(|url| !url.is_empty());

        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price.display(),
            image,
            favorite,
        }
    }
}

/// Create all routes for the storefront API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/sections", get(sections::index))
        .route("/api/catalog/{gender}", get(catalog::show))
        .route("/api/products/{id}", get(products::show))
        .route("/api/favorites", get(favorites::index))
        .route("/api/favorites/{id}", post(favorites::toggle))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testing {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode};
    use esther_core::{Category, CategoryId, Product, ProductId};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::gateway::InMemoryGateway;
    use crate::local_store::LocalStore;
    use crate::state::AppState;

    pub fn product(id: &str, gender: &str, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: "89.99".parse().unwrap(),
            description: String::new(),
            image_urls: vec![],
            category_id: CategoryId::new(category),
            gender: gender.parse().unwrap(),
            colors: vec![],
            sizes: vec![],
            created_at: None,
            updated_at: None,
        }
    }

    pub fn category(id: &str, gender: &str) -> Category {
        Category {
            id: CategoryId::new(id),
            name: format!("Category {id}"),
            gender: gender.parse().unwrap(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn state_with(products: Vec<Product>, categories: Vec<Category>) -> AppState {
        let gateway = InMemoryGateway::with_catalog(products, categories, vec![]);
        AppState::new(
            Arc::new(gateway),
            Arc::new(LocalStore::in_memory()),
            "59170000000",
        )
    }

    async fn send(state: AppState, method: Method, uri: &str) -> (StatusCode, Value) {
        let response = super::routes()
            .with_state(state)
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get(state: AppState, uri: &str) -> (StatusCode, Value) {
        send(state, Method::GET, uri).await
    }

    pub async fn post(state: AppState, uri: &str) -> (StatusCode, Value) {
        send(state, Method::POST, uri).await
    }
}
