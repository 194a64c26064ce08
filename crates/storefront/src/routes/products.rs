//! Product detail handler.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use esther_core::catalog::category_name;
use esther_core::gallery::{Gallery, thumbnails};
use esther_core::image_ref::resolve;
use esther_core::order::order_message;
use esther_core::{ColorId, Gender, ProductId, SizeName};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;

/// Shopper selection carried in the query string.
#[derive(Debug, Default, Deserialize)]
pub struct SelectionQuery {
    pub color: Option<String>,
    /// Clicked thumbnail URL, as stored on the product.
    pub image: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ThumbnailView {
    /// Reference as stored, echoed back in `?image=`.
    pub source: String,
    pub url: String,
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct GalleryView {
    pub images: Vec<String>,
    pub main_index: usize,
    pub main_image: Option<String>,
    pub thumbnails: Vec<ThumbnailView>,
}

#[derive(Debug, Serialize)]
pub struct ColorView {
    pub id: String,
    pub name: String,
    pub hex_code: String,
    pub selected: bool,
}

#[derive(Debug, Serialize)]
pub struct SizeView {
    pub name: SizeName,
    pub selected: bool,
}

#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub id: String,
    pub name: String,
    pub price: String,
    pub description: String,
    pub gender: Gender,
    pub gender_label: &'static str,
    pub category: Option<String>,
    pub gallery: GalleryView,
    pub colors: Vec<ColorView>,
    pub sizes: Vec<SizeView>,
    pub favorite: bool,
    /// Chat link with the prefilled order message.
    pub order_url: String,
}

/// Product detail with the gallery state for the given selection.
///
/// A clicked image takes precedence over `color`, since it selects its own
/// color. Unknown colors and images leave the initial selection in place;
/// a size the product does not offer is dropped.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<SelectionQuery>,
) -> Result<Json<ProductPage>> {
    let size = match query.size.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            raw.parse::<SizeName>()
                .map_err(|e| AppError::BadRequest(e.to_string()))?,
        ),
        None => None,
    };

    let id = ProductId::new(id);
    let product = state.gateway().get_product(&id).await?;
    let categories = state.gateway().list_categories().await?;

    let mut gallery = Gallery::open(&product);
    if let Some(color) = query.color.as_deref().filter(|c| !c.is_empty()) {
        gallery.select_color(&product, &ColorId::new(color));
    }
    if let Some(image) = query.image.as_deref().filter(|i| !i.is_empty()) {
        gallery.select_thumbnail(&product, image);
    }

    let size = size.filter(|name| product.sizes.iter().any(|s| s.name == *name));
    let selected = gallery.selected_color(&product);

    let gallery_view = GalleryView {
        images: gallery
            .display_images(&product)
            .iter()
            .map(|url| resolve(url))
            .collect(),
        main_index: gallery.main_index(),
        main_image: gallery.main_image(&product).map(resolve),
        thumbnails: thumbnails(&product)
            .into_iter()
            .map(|source| ThumbnailView {
                url: resolve(source),
                active: gallery.is_active(&product, source),
                source: source.to_string(),
            })
            .collect(),
    };

    let colors = product
        .colors
        .iter()
        .map(|c| ColorView {
            id: c.id.to_string(),
            name: c.name.clone(),
            hex_code: c.hex_code.clone(),
            selected: selected.is_some_and(|s| s.id == c.id),
        })
        .collect();

    let sizes = product
        .sizes
        .iter()
        .map(|s| SizeView {
            name: s.name,
            selected: size == Some(s.name),
        })
        .collect();

    let message = order_message(&product, selected, size);
    let order_url = format!(
        "https://wa.me/{}?text={}",
        state.order_phone(),
        urlencoding::encode(&message)
    );

    add_breadcrumb("catalog", "Viewed product", &[("product_id", id.as_str())]);
    let favorite = state.favorites().is_favorite(&product.id);

    Ok(Json(ProductPage {
        id: product.id.to_string(),
        name: product.name.clone(),
        price: product.price.display(),
        description: product.description.clone(),
        gender: product.gender,
        gender_label: product.gender.display_name(),
        category: category_name(&categories, &product.category_id).map(str::to_string),
        gallery: gallery_view,
        colors,
        sizes,
        favorite,
        order_url,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use esther_core::{Color, ColorId, Size, SizeName};

    use super::super::testing::{category, get, product, state_with};

    fn two_color_product() -> esther_core::Product {
        let mut p = product("p1", "women", "c1");
        p.colors = vec![
            Color {
                id: ColorId::new("c1"),
                name: "Rojo".to_string(),
                hex_code: "#ff0000".to_string(),
                image_urls: vec!["https://img.test/a.jpg".to_string()],
            },
            Color {
                id: ColorId::new("c2"),
                name: "Azul".to_string(),
                hex_code: "#0000ff".to_string(),
                image_urls: vec!["https://img.test/b.jpg".to_string()],
            },
        ];
        p.sizes = vec![Size::new(SizeName::S), Size::new(SizeName::M)];
        p
    }

    #[tokio::test]
    async fn test_opens_with_first_color_with_images() {
        let state = state_with(vec![two_color_product()], vec![category("c1", "women")]);

        let (status, body) = get(state, "/api/products/p1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["gallery"]["main_image"], "https://img.test/a.jpg");
        assert_eq!(body["colors"][0]["selected"], true);
        assert_eq!(body["category"], "Category c1");
        assert_eq!(body["gender_label"], "Mujer");

        let thumbs = body["gallery"]["thumbnails"].as_array().unwrap();
        assert_eq!(thumbs.len(), 2);
        assert_eq!(thumbs[0]["active"], true);
        assert_eq!(thumbs[1]["active"], false);
    }

    #[tokio::test]
    async fn test_clicking_other_color_image_switches_color() {
        let state = state_with(vec![two_color_product()], vec![]);

        let (_, body) = get(state, "/api/products/p1?image=https%3A%2F%2Fimg.test%2Fb.jpg").await;
        assert_eq!(body["gallery"]["main_image"], "https://img.test/b.jpg");
        assert_eq!(body["gallery"]["main_index"], 0);
        assert_eq!(body["colors"][1]["selected"], true);
        assert_eq!(body["colors"][0]["selected"], false);
    }

    #[tokio::test]
    async fn test_order_url_carries_selection() {
        let state = state_with(vec![two_color_product()], vec![]);

        let (_, body) = get(state, "/api/products/p1?color=c2&size=M").await;
        let url = body["order_url"].as_str().unwrap();
        assert!(url.starts_with("https://wa.me/59170000000?text="));
        assert!(url.contains("Color%3A%20Azul."));
        assert!(url.contains("Talla%3A%20M."));
        assert_eq!(body["sizes"][1]["selected"], true);
    }

    #[tokio::test]
    async fn test_size_not_offered_is_dropped() {
        let state = state_with(vec![two_color_product()], vec![]);

        let (status, body) = get(state, "/api/products/p1?size=XXL").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["order_url"].as_str().unwrap().contains("Talla"));
    }

    #[tokio::test]
    async fn test_unknown_size_name_is_bad_request() {
        let state = state_with(vec![two_color_product()], vec![]);
        let (status, _) = get(state, "/api/products/p1?size=huge").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_product_is_not_found() {
        let state = state_with(vec![], vec![]);
        let (status, _) = get(state, "/api/products/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
