//! Favorites handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use esther_core::ProductId;
use esther_core::favorites::FavoritesView;
use serde::Serialize;

use super::ProductCard;
use crate::error::{Result, add_breadcrumb};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FavoritesPage {
    /// `true` renders the empty state instead of a grid.
    pub empty: bool,
    pub count: usize,
    pub items: Vec<ProductCard>,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub id: String,
    pub favorite: bool,
    pub count: usize,
}

/// Favorite products in catalog order.
///
/// `count` is the size of the stored set, which may include ids of products
/// no longer in the catalog.
pub async fn index(State(state): State<AppState>) -> Result<Json<FavoritesPage>> {
    let products = state.gateway().list_products().await?;

    let favorites = state.favorites();
    let items = match favorites.view(&products) {
        FavoritesView::Empty => Vec::new(),
        FavoritesView::Items(items) => items
            .into_iter()
            .map(|p| ProductCard::new(p, true))
            .collect(),
    };

    Ok(Json(FavoritesPage {
        empty: items.is_empty(),
        count: favorites.count(),
        items,
    }))
}

/// Flip a product in or out of the favorites set.
///
/// The id is not checked against the catalog.
pub async fn toggle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<ToggleResponse> {
    let id = ProductId::new(id);
    let (favorite, count) = {
        let mut favorites = state.favorites();
        let favorite = favorites.toggle(&id);
        (favorite, favorites.count())
    };

    tracing::info!(product_id = %id, favorite, "Favorite toggled");
    add_breadcrumb(
        "favorites",
        if favorite { "Added favorite" } else { "Removed favorite" },
        &[("product_id", id.as_str())],
    );

    Json(ToggleResponse {
        id: id.into_inner(),
        favorite,
        count,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;

    use super::super::testing::{get, post, product, state_with};

    #[tokio::test]
    async fn test_empty_state() {
        let state = state_with(vec![product("p1", "women", "c1")], vec![]);
        let (status, body) = get(state, "/api/favorites").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["empty"], true);
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn test_toggle_adds_then_removes() {
        let state = state_with(vec![product("p1", "women", "c1")], vec![]);

        let (_, body) = post(state.clone(), "/api/favorites/p1").await;
        assert_eq!(body["favorite"], true);
        assert_eq!(body["count"], 1);

        let (_, body) = get(state.clone(), "/api/favorites").await;
        assert_eq!(body["empty"], false);
        assert_eq!(body["items"][0]["id"], "p1");
        assert_eq!(body["items"][0]["favorite"], true);

        let (_, body) = post(state, "/api/favorites/p1").await;
        assert_eq!(body["favorite"], false);
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn test_items_follow_catalog_order() {
        let state = state_with(
            vec![product("p1", "women", "c1"), product("p2", "men", "c1")],
            vec![],
        );
        post(state.clone(), "/api/favorites/p2").await;
        post(state.clone(), "/api/favorites/p1").await;

        let (_, body) = get(state, "/api/favorites").await;
        let ids: Vec<&str> = body["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_toggle_is_written_through() {
        let state = state_with(vec![], vec![]);
        post(state.clone(), "/api/favorites/p9").await;
        assert_eq!(
            state.local().get(esther_core::favorites::FAVORITES_KEY).as_deref(),
            Some(r#"["p9"]"#)
        );
    }
}
