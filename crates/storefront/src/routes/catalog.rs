//! Catalog partition handler.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use esther_core::catalog::{categories_for, filter_products};
use esther_core::{CategoryId, Gender};
use serde::{Deserialize, Serialize};

use super::ProductCard;
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryLink {
    pub id: String,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct CatalogPage {
    pub gender: Gender,
    pub title: &'static str,
    pub categories: Vec<CategoryLink>,
    pub products: Vec<ProductCard>,
}

/// Categories and product cards of one partition.
///
/// An empty `category` parameter means all categories.
pub async fn show(
    State(state): State<AppState>,
    Path(gender): Path<String>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogPage>> {
    let gender: Gender = gender
        .parse()
        .map_err(|e: esther_core::UnknownGender| AppError::BadRequest(e.to_string()))?;

    let category = query
        .category
        .filter(|id| !id.trim().is_empty())
        .map(CategoryId::new);

    let (products, categories) = tokio::try_join!(
        state.gateway().list_products(),
        state.gateway().list_categories(),
    )?;

    let categories = categories_for(&categories, gender)
        .into_iter()
        .map(|c| CategoryLink {
            id: c.id.to_string(),
            name: c.name.clone(),
            active: category.as_ref() == Some(&c.id),
        })
        .collect();

    let products = {
        let favorites = state.favorites();
        filter_products(&products, gender, category.as_ref())
            .into_iter()
            .map(|p| ProductCard::new(p, favorites.is_favorite(&p.id)))
            .collect()
    };

    Ok(Json(CatalogPage {
        gender,
        title: gender.display_name(),
        categories,
        products,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;

    use super::super::testing::{category, get, product, state_with};

    #[tokio::test]
    async fn test_filters_by_gender_and_category() {
        let state = state_with(
            vec![
                product("p1", "women", "c1"),
                product("p2", "men", "c2"),
                product("p3", "women", "c3"),
            ],
            vec![category("c1", "women"), category("c2", "men")],
        );

        let (status, body) = get(state.clone(), "/api/catalog/women").await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body["products"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["p1", "p3"]);
        assert_eq!(body["categories"].as_array().unwrap().len(), 1);
        assert_eq!(body["title"], "Mujer");

        let (_, body) = get(state, "/api/catalog/women?category=c1").await;
        let products = body["products"].as_array().unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0]["id"], "p1");
        assert_eq!(body["categories"][0]["active"], true);
    }

    #[tokio::test]
    async fn test_empty_category_means_all() {
        let state = state_with(vec![product("p1", "men", "c1")], vec![]);
        let (_, body) = get(state, "/api/catalog/men?category=").await;
        assert_eq!(body["products"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_match_is_empty_list() {
        let state = state_with(vec![product("p1", "men", "c1")], vec![]);
        let (status, body) = get(state, "/api/catalog/cold_weather").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["products"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_gender_is_bad_request() {
        let state = state_with(vec![], vec![]);
        let (status, _) = get(state, "/api/catalog/kids").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
