//! Section banner handler.

use axum::{Json, extract::State};

use crate::error::Result;
use crate::sections::{SectionLoad, load_section_images};
use crate::state::AppState;

/// Banner URLs keyed by section.
///
/// Served from the local copy when the data store is unreachable.
pub async fn index(State(state): State<AppState>) -> Result<Json<SectionLoad>> {
    let load = load_section_images(state.gateway(), state.local()).await?;
    Ok(Json(load))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use esther_core::{Gender, SectionImage, SectionImageId, SectionKey};

    use super::super::testing::get;
    use crate::gateway::InMemoryGateway;
    use crate::local_store::LocalStore;
    use crate::state::AppState;

    fn banner(key: SectionKey, url: &str) -> SectionImage {
        SectionImage {
            id: SectionImageId::new(key.as_str()),
            gender: key,
            image_url: url.to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_serves_cached_copy_when_store_is_down() {
        let gateway = Arc::new(InMemoryGateway::with_catalog(
            vec![],
            vec![],
            vec![
                banner(SectionKey::MainBanner, "https://img.test/main.jpg"),
                banner(SectionKey::Gender(Gender::Men), ""),
            ],
        ));
        let state = AppState::new(gateway.clone(), Arc::new(LocalStore::in_memory()), "1");

        let (status, body) = get(state.clone(), "/api/sections").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["from_cache"], false);
        assert_eq!(body["urls"]["main_banner"], "https://img.test/main.jpg");
        assert!(body["urls"].get("men").is_none());

        gateway.set_unavailable(true);
        let (status, body) = get(state, "/api/sections").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["from_cache"], true);
        assert_eq!(body["urls"]["main_banner"], "https://img.test/main.jpg");
    }

    #[tokio::test]
    async fn test_store_down_without_cache_is_bad_gateway() {
        let gateway = Arc::new(InMemoryGateway::default());
        gateway.set_unavailable(true);
        let state = AppState::new(gateway, Arc::new(LocalStore::in_memory()), "1");

        let (status, body) = get(state, "/api/sections").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "External service error");
    }
}
