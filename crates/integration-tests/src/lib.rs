//! Integration tests for Esther.
//!
//! Each test starts the storefront router on an ephemeral port, backed by an
//! in-memory gateway and an in-memory local store, and talks to it over HTTP.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p esther-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::Arc;

use esther_core::{
    Category, CategoryId, Color, ColorId, Gender, Product, ProductId, SectionImage,
    SectionImageId, SectionKey, Size, SizeName,
};
use esther_storefront::gateway::InMemoryGateway;
use esther_storefront::local_store::LocalStore;
use esther_storefront::state::AppState;
use reqwest::Client;

/// Running storefront plus handles on its collaborators.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub gateway: Arc<InMemoryGateway>,
    pub local: Arc<LocalStore>,
}

impl TestContext {
    /// Serve the sample catalog.
    pub async fn new() -> Self {
        Self::with_gateway(sample_gateway()).await
    }

    /// Serve `gateway` with an empty local store.
    pub async fn with_gateway(gateway: InMemoryGateway) -> Self {
        Self::start(Arc::new(gateway), Arc::new(LocalStore::in_memory())).await
    }

    /// Serve `gateway` with an existing local store, as after a restart.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start(gateway: Arc<InMemoryGateway>, local: Arc<LocalStore>) -> Self {
        let state = AppState::new(gateway.clone(), Arc::clone(&local), "59170000000");
        let app = esther_storefront::app(state);

        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            client: Client::new(),
            base_url: format!("http://{addr}"),
            gateway,
            local,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[must_use]
pub fn product(id: &str, name: &str, gender: Gender, category: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        price: "89.99".parse().unwrap_or_default(),
        description: String::new(),
        image_urls: Vec::new(),
        category_id: CategoryId::new(category),
        gender,
        colors: Vec::new(),
        sizes: Vec::new(),
        created_at: None,
        updated_at: None,
    }
}

#[must_use]
pub fn color(id: &str, name: &str, images: &[&str]) -> Color {
    Color {
        id: ColorId::new(id),
        name: name.to_string(),
        hex_code: "#000000".to_string(),
        image_urls: images.iter().map(ToString::to_string).collect(),
    }
}

#[must_use]
pub fn category(id: &str, name: &str, gender: Gender) -> Category {
    Category {
        id: CategoryId::new(id),
        name: name.to_string(),
        gender,
        created_at: None,
        updated_at: None,
    }
}

#[must_use]
pub fn section(key: SectionKey, url: &str) -> SectionImage {
    SectionImage {
        id: SectionImageId::new(key.as_str()),
        gender: key,
        image_url: url.to_string(),
        created_at: None,
        updated_at: None,
    }
}

/// Three products across two partitions.
///
/// `p1` has no general images and two colors, `c1` (`a.jpg`) and `c2`
/// (`b.jpg`).
#[must_use]
pub fn sample_gateway() -> InMemoryGateway {
    let mut blouse = product("p1", "Blusa Lino", Gender::Women, "c1");
    blouse.colors = vec![
        color("c1", "Rojo", &["https://img.test/a.jpg"]),
        color("c2", "Azul", &["https://img.test/b.jpg"]),
    ];
    blouse.sizes = vec![Size::new(SizeName::S), Size::new(SizeName::M)];

    let mut shirt = product("p2", "Camisa Oxford", Gender::Men, "c2");
    shirt.image_urls = vec!["https://drive.google.com/file/d/abc123/view".to_string()];

    let dress = product("p3", "Vestido Floral", Gender::Women, "c3");

    InMemoryGateway::with_catalog(
        vec![blouse, shirt, dress],
        vec![
            category("c1", "Blusas", Gender::Women),
            category("c2", "Camisas", Gender::Men),
            category("c3", "Vestidos", Gender::Women),
        ],
        vec![
            section(SectionKey::MainBanner, "https://img.test/main.jpg"),
            section(SectionKey::Gender(Gender::Women), "https://img.test/women.jpg"),
        ],
    )
}
